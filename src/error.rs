use thiserror::Error;

/// Why a block cannot follow its predecessor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidBlock {
    #[error("index {found} does not follow {previous}")]
    IndexMismatch { previous: u64, found: u64 },
    #[error("previous_hash does not match the hash of block #{previous}")]
    PreviousHashMismatch { previous: u64 },
    #[error("stored hash of block #{index} does not match its contents")]
    HashMismatch { index: u64 },
    #[error("hash of block #{index} has fewer than {difficulty} leading zeros")]
    InsufficientWork { index: u64, difficulty: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("chain has no blocks")]
    EmptyChain,
    #[error("genesis block is malformed")]
    InvalidGenesis,
    #[error("broken link at position {position}: {reason}")]
    BrokenLink {
        position: usize,
        #[source]
        reason: InvalidBlock,
    },
    #[error("mining of block #{index} cancelled after {attempts} attempts")]
    MiningCancelled { index: u64, attempts: u64 },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Fatal errors that stop the process.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
