use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use super::Block;
use super::block::hash_meets_difficulty;
use crate::error::ChainError;
use crate::observer::ChainObserver;

/// Pause taken after every rejected nonce.
pub trait Throttle: Send + Sync {
    fn pause(&self);
}

/// Sleeps the current thread for a fixed interval.
#[derive(Debug, Clone, Copy)]
pub struct Sleep(pub Duration);

impl Throttle for Sleep {
    fn pause(&self) {
        if !self.0.is_zero() {
            thread::sleep(self.0);
        }
    }
}

/// Proof-of-work search over an unbounded hex nonce counter.
pub struct Miner {
    difficulty: u32,
    throttle: Box<dyn Throttle>,
    observer: Arc<dyn ChainObserver>,
    stop: Arc<AtomicBool>,
}

impl Miner {
    pub fn new(
        difficulty: u32,
        throttle: impl Throttle + 'static,
        observer: Arc<dyn ChainObserver>,
    ) -> Self {
        Self {
            difficulty,
            throttle: Box::new(throttle),
            observer,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// Cancel any in-flight or future search.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Build the successor of `tail` carrying `payload` and search nonces
    /// until its hash meets the miner's difficulty.
    pub fn mine(&self, tail: &Block, payload: &str) -> Result<Block, ChainError> {
        let mut block = Block::successor(tail, payload, self.difficulty);
        let mut counter: u64 = 0;
        loop {
            if self.stop.load(Ordering::SeqCst) {
                return Err(ChainError::MiningCancelled {
                    index: block.index,
                    attempts: counter,
                });
            }

            block.nonce = format!("{counter:x}");
            let digest = block.compute_hash();
            if hash_meets_difficulty(&digest, block.difficulty) {
                self.observer.nonce_accepted(&digest);
                block.hash = digest;
                return Ok(block);
            }

            self.observer.nonce_rejected(&digest);
            self.throttle.pause();
            counter = counter.wrapping_add(1);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    /// No pause between attempts.
    pub(crate) struct NoDelay;

    impl Throttle for NoDelay {
        fn pause(&self) {}
    }

    /// Counts pauses and raises the stop flag once `limit` is reached.
    struct StopAfter {
        pauses: AtomicUsize,
        limit: usize,
        stop: Arc<AtomicBool>,
    }

    impl Throttle for Arc<StopAfter> {
        fn pause(&self) {
            if self.pauses.fetch_add(1, Ordering::SeqCst) + 1 >= self.limit {
                self.stop.store(true, Ordering::SeqCst);
            }
        }
    }

    #[derive(Default)]
    pub(crate) struct Recorder {
        pub rejected: Mutex<Vec<String>>,
        pub accepted: Mutex<Vec<String>>,
        pub updates: Mutex<Vec<usize>>,
    }

    impl ChainObserver for Recorder {
        fn nonce_rejected(&self, digest: &str) {
            self.rejected.lock().unwrap().push(digest.to_string());
        }

        fn nonce_accepted(&self, digest: &str) {
            self.accepted.lock().unwrap().push(digest.to_string());
        }

        fn chain_updated(&self, chain: &[Block]) {
            self.updates.lock().unwrap().push(chain.len());
        }
    }

    #[test]
    fn mines_hello_on_genesis() {
        let recorder = Arc::new(Recorder::default());
        let miner = Miner::new(1, NoDelay, recorder.clone());
        let genesis = Block::genesis();

        let block = miner.mine(&genesis, "hello").unwrap();

        assert_eq!(block.index, 1);
        assert_eq!(block.payload, "hello");
        assert_eq!(block.previous_hash, genesis.hash);
        assert_eq!(block.difficulty, 1);
        assert!(block.hash.starts_with('0'));
        assert_eq!(block.hash, block.compute_hash());

        let rejected = recorder.rejected.lock().unwrap();
        let accepted = recorder.accepted.lock().unwrap();
        assert_eq!(accepted.as_slice(), [block.hash.clone()]);
        assert_eq!(
            u64::from_str_radix(&block.nonce, 16).unwrap(),
            rejected.len() as u64
        );
        assert!(rejected.iter().all(|d| !d.starts_with('0')));
    }

    #[test]
    fn difficulty_zero_accepts_first_nonce() {
        let recorder = Arc::new(Recorder::default());
        let miner = Miner::new(0, NoDelay, recorder.clone());
        let block = miner.mine(&Block::genesis(), "").unwrap();

        assert_eq!(block.nonce, "0");
        assert!(recorder.rejected.lock().unwrap().is_empty());
    }

    #[test]
    fn pauses_once_per_rejected_nonce() {
        let recorder = Arc::new(Recorder::default());
        let throttle = Arc::new(StopAfter {
            pauses: AtomicUsize::new(0),
            limit: usize::MAX,
            stop: Arc::new(AtomicBool::new(false)),
        });
        let miner = Miner::new(1, throttle.clone(), recorder.clone());
        miner.mine(&Block::genesis(), "count me").unwrap();

        assert_eq!(
            throttle.pauses.load(Ordering::SeqCst),
            recorder.rejected.lock().unwrap().len()
        );
    }

    #[test]
    fn stop_flag_cancels_search() {
        let stop = Arc::new(AtomicBool::new(false));
        let throttle = Arc::new(StopAfter {
            pauses: AtomicUsize::new(0),
            limit: 3,
            stop: stop.clone(),
        });
        let mut miner = Miner::new(64, throttle, Arc::new(Recorder::default()));
        miner.stop = stop;

        let err = miner.mine(&Block::genesis(), "never").unwrap_err();
        assert_eq!(
            err,
            ChainError::MiningCancelled {
                index: 1,
                attempts: 3
            }
        );
    }

    #[test]
    fn stopped_miner_does_not_search() {
        let recorder = Arc::new(Recorder::default());
        let miner = Miner::new(0, NoDelay, recorder.clone());
        miner.stop();

        assert!(miner.mine(&Block::genesis(), "x").is_err());
        assert!(recorder.accepted.lock().unwrap().is_empty());
    }
}
