pub mod block;
pub mod miner;
pub mod model;
pub mod store;
pub mod validate;

pub use block::Block;
pub use miner::{Miner, Sleep};
pub use model::ReplaceOutcome;
pub use store::{ChainStore, Submission};

/// Default Proof-of-Work difficulty (number of leading zero hex chars).
pub const DEFAULT_DIFFICULTY: u32 = 1;

/// A hex SHA-256 digest has 64 characters; anything above can never be met.
pub const MAX_DIFFICULTY: u32 = 64;

/// Payload carried by the genesis block.
pub const GENESIS_PAYLOAD: &str = "0";

/// Default pause after a rejected nonce, in milliseconds.
pub const DEFAULT_MINE_DELAY_MS: u64 = 1000;
