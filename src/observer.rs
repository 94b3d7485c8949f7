use log::{debug, info};

use crate::blockchain::Block;

/// Sink for mining progress and chain updates. Fire-and-forget: nothing
/// returned from here feeds back into control flow.
pub trait ChainObserver: Send + Sync {
    fn nonce_rejected(&self, _digest: &str) {}

    fn nonce_accepted(&self, _digest: &str) {}

    fn chain_updated(&self, _chain: &[Block]) {}
}

/// Routes chain events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ChainObserver for LogObserver {
    fn nonce_rejected(&self, digest: &str) {
        debug!("{digest} needs more work");
    }

    fn nonce_accepted(&self, digest: &str) {
        info!("{digest} work done");
    }

    fn chain_updated(&self, chain: &[Block]) {
        debug!("chain height {}:\n{:#?}", chain.len(), chain);
    }
}
