use super::Block;
use super::validate::{check_successor, validate_chain};
use crate::error::{ChainError, InvalidBlock};

/// Result of offering a candidate chain to the longest-chain rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplaceOutcome {
    Replaced { previous_len: usize },
    NotLonger { candidate_len: usize, current_len: usize },
    Invalid(ChainError),
    ForeignGenesis,
    /// A non-genesis block claims less work than this chain requires.
    InsufficientDifficulty { position: usize, difficulty: u32 },
}

impl ReplaceOutcome {
    pub fn is_replaced(&self) -> bool {
        matches!(self, Self::Replaced { .. })
    }
}

/// Ordered, append-only sequence of accepted blocks.
#[derive(Debug, Clone)]
pub struct Blockchain {
    chain: Vec<Block>,
    difficulty: u32,
}

impl Blockchain {
    /// Initialize a chain holding only `genesis`. Blocks adopted from other
    /// chains must carry at least `difficulty`.
    pub fn new(genesis: Block, difficulty: u32) -> Self {
        Self {
            chain: vec![genesis],
            difficulty,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    /// Return the last block in the chain.
    pub fn last_block(&self) -> &Block {
        // never empty: built from a genesis block, only ever replaced by a
        // longer (validated, hence non-empty) chain
        &self.chain[self.chain.len() - 1]
    }

    pub fn genesis(&self) -> &Block {
        &self.chain[0]
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Append `block` if it validly extends the tail.
    pub fn append(&mut self, block: Block) -> Result<(), InvalidBlock> {
        check_successor(&block, self.last_block())?;
        self.chain.push(block);
        Ok(())
    }

    /// Longest-chain rule: swap in `candidate` only if it is strictly
    /// longer, valid, grows from the same genesis block, and every block
    /// after genesis meets this chain's difficulty.
    pub fn replace(&mut self, candidate: Vec<Block>) -> ReplaceOutcome {
        let previous_len = self.len();
        if candidate.len() <= previous_len {
            return ReplaceOutcome::NotLonger {
                candidate_len: candidate.len(),
                current_len: previous_len,
            };
        }
        if let Err(err) = validate_chain(&candidate) {
            return ReplaceOutcome::Invalid(err);
        }
        if candidate[0] != *self.genesis() {
            return ReplaceOutcome::ForeignGenesis;
        }
        // validate_chain only checks each block against its own claim
        if let Some((position, block)) = candidate
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, b)| b.difficulty < self.difficulty)
        {
            return ReplaceOutcome::InsufficientDifficulty {
                position,
                difficulty: block.difficulty,
            };
        }

        self.chain = candidate;
        ReplaceOutcome::Replaced { previous_len }
    }
}
