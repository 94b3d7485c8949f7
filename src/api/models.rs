use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::blockchain::{ChainStore, ReplaceOutcome};

/// Shared application state: the process-wide chain store.
pub struct AppState {
    pub store: Arc<ChainStore>,
}

impl AppState {
    pub fn new(store: Arc<ChainStore>) -> Self {
        Self { store }
    }
}

/* ---------- Chain API Models ---------- */

#[derive(Debug, Serialize, Deserialize)]
pub struct ReplaceResponse {
    pub replaced: bool,
    pub length: usize,
    pub reason: Option<String>,
}

impl ReplaceResponse {
    pub fn new(outcome: &ReplaceOutcome, length: usize) -> Self {
        let reason = match outcome {
            ReplaceOutcome::Replaced { .. } => None,
            ReplaceOutcome::NotLonger {
                candidate_len,
                current_len,
            } => Some(format!(
                "candidate length {candidate_len} is not greater than {current_len}"
            )),
            ReplaceOutcome::Invalid(err) => Some(err.to_string()),
            ReplaceOutcome::ForeignGenesis => {
                Some("candidate has a different genesis block".into())
            }
            ReplaceOutcome::InsufficientDifficulty {
                position,
                difficulty,
            } => Some(format!(
                "block at position {position} has difficulty {difficulty}, below ours"
            )),
        };
        Self {
            replaced: outcome.is_replaced(),
            length,
            reason,
        }
    }
}
