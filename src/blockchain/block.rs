use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::GENESIS_PAYLOAD;

/// A single entry of the chain carrying its own proof-of-work solution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: String, // RFC 3339 (UTC), informational only
    pub payload: String,
    pub previous_hash: String,
    pub difficulty: u32, // leading zero hex chars required of `hash`
    pub nonce: String,   // hex rendering of the miner's counter
    pub hash: String,
}

impl Block {
    /// Create the genesis block (first block in the chain).
    pub fn genesis() -> Self {
        let mut block = Self {
            index: 0,
            timestamp: now(),
            payload: GENESIS_PAYLOAD.to_string(),
            previous_hash: String::new(),
            difficulty: 0,
            nonce: String::new(),
            hash: String::new(),
        };
        block.hash = block.compute_hash();
        block
    }

    /// Create the unsolved successor of `previous`. The miner fills in
    /// `nonce` and `hash`.
    pub fn successor(previous: &Block, payload: &str, difficulty: u32) -> Self {
        Self {
            index: previous.index + 1,
            timestamp: now(),
            payload: payload.to_string(),
            previous_hash: previous.hash.clone(),
            difficulty,
            nonce: String::new(),
            hash: String::new(),
        }
    }

    /// SHA-256 of the canonical fields (everything except `difficulty` and
    /// `hash` itself).
    pub fn compute_hash(&self) -> String {
        calculate_hash(
            self.index,
            &self.timestamp,
            &self.payload,
            &self.previous_hash,
            &self.nonce,
        )
    }

    pub fn has_valid_work(&self) -> bool {
        hash_meets_difficulty(&self.hash, self.difficulty)
    }
}

/// Hex-encoded SHA-256 over `index ‖ timestamp ‖ payload ‖ previous_hash ‖ nonce`.
pub fn calculate_hash(
    index: u64,
    timestamp: &str,
    payload: &str,
    previous_hash: &str,
    nonce: &str,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(index.to_string().as_bytes());
    hasher.update(timestamp.as_bytes());
    hasher.update(payload.as_bytes());
    hasher.update(previous_hash.as_bytes());
    hasher.update(nonce.as_bytes());
    hex::encode(hasher.finalize())
}

/// True iff the first `difficulty` characters of `hash` are all `'0'`.
pub fn hash_meets_difficulty(hash: &str, difficulty: u32) -> bool {
    let difficulty = difficulty as usize;
    hash.len() >= difficulty && hash.chars().take(difficulty).all(|c| c == '0')
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true)
}
