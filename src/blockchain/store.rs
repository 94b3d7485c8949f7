use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use log::{info, warn};
use tokio::sync::broadcast;

use super::miner::Miner;
use super::model::{Blockchain, ReplaceOutcome};
use super::Block;
use crate::error::{ChainError, InvalidBlock};
use crate::observer::ChainObserver;

/// Immutable copy of the chain handed to readers and subscribers.
pub type ChainSnapshot = Arc<Vec<Block>>;

/// Outcome of a local payload submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Appended(Block),
    Rejected(InvalidBlock),
}

/// Process-wide chain. Every mutation (mine+append, replace) runs under one
/// mutex; readers use the last published snapshot and never wait on mining.
pub struct ChainStore {
    chain: Mutex<Blockchain>,
    latest: RwLock<ChainSnapshot>,
    updates: broadcast::Sender<ChainSnapshot>,
    observer: Arc<dyn ChainObserver>,
}

impl ChainStore {
    /// Seed a store with `genesis`. `difficulty` is the least work a block
    /// of an adopted chain may carry. `capacity` bounds how many snapshots a
    /// slow subscriber may fall behind before it starts skipping.
    pub fn new(
        genesis: Block,
        difficulty: u32,
        capacity: usize,
        observer: Arc<dyn ChainObserver>,
    ) -> Self {
        let chain = Blockchain::new(genesis, difficulty);
        let latest = Arc::new(chain.blocks().to_vec());
        let (updates, _) = broadcast::channel(capacity.max(1));
        Self {
            chain: Mutex::new(chain),
            latest: RwLock::new(latest),
            updates,
            observer,
        }
    }

    pub fn snapshot(&self) -> ChainSnapshot {
        self.latest
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Receive every snapshot published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ChainSnapshot> {
        self.updates.subscribe()
    }

    /// Mine `payload` on top of the current tail, validate and append it.
    /// The whole step holds the chain lock, so concurrent submissions are
    /// mined one after another.
    pub fn submit(&self, miner: &Miner, payload: &str) -> Result<Submission, ChainError> {
        let (block, snapshot) = {
            let mut chain = self.lock();
            let block = miner.mine(chain.last_block(), payload)?;
            if let Err(reason) = chain.append(block.clone()) {
                warn!("discarding mined block #{}: {reason}", block.index);
                return Ok(Submission::Rejected(reason));
            }
            (block, self.refresh(&chain))
        };

        info!("appended block #{} ({})", block.index, block.hash);
        self.publish(snapshot);
        Ok(Submission::Appended(block))
    }

    /// Offer a candidate chain to the longest-chain rule.
    pub fn replace(&self, candidate: Vec<Block>) -> ReplaceOutcome {
        let (outcome, snapshot) = {
            let mut chain = self.lock();
            let outcome = chain.replace(candidate);
            let snapshot = outcome.is_replaced().then(|| self.refresh(&chain));
            (outcome, snapshot)
        };

        match (&outcome, snapshot) {
            (ReplaceOutcome::Replaced { previous_len }, Some(snapshot)) => {
                info!("chain replaced, height {previous_len} -> {}", snapshot.len());
                self.publish(snapshot);
            }
            _ => warn!("candidate chain discarded: {outcome:?}"),
        }
        outcome
    }

    fn lock(&self) -> MutexGuard<'_, Blockchain> {
        // mutations are a single push or swap, so a poisoned chain is intact
        self.chain.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn refresh(&self, chain: &Blockchain) -> ChainSnapshot {
        let snapshot = Arc::new(chain.blocks().to_vec());
        *self.latest.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&snapshot);
        snapshot
    }

    fn publish(&self, snapshot: ChainSnapshot) {
        self.observer.chain_updated(&snapshot);
        // no subscribers is fine
        let _ = self.updates.send(snapshot);
    }
}
