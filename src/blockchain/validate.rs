use super::Block;
use crate::error::{ChainError, InvalidBlock};

/// Check that `new` may follow `old`: index continuity, linkage, hash
/// integrity and proof-of-work, in that order. `Ok(())` is the "valid"
/// verdict; the error names the first failed check.
pub fn check_successor(new: &Block, old: &Block) -> Result<(), InvalidBlock> {
    if old.index + 1 != new.index {
        return Err(InvalidBlock::IndexMismatch {
            previous: old.index,
            found: new.index,
        });
    }
    if old.hash != new.previous_hash {
        return Err(InvalidBlock::PreviousHashMismatch {
            previous: old.index,
        });
    }
    if new.compute_hash() != new.hash {
        return Err(InvalidBlock::HashMismatch { index: new.index });
    }
    if !new.has_valid_work() {
        return Err(InvalidBlock::InsufficientWork {
            index: new.index,
            difficulty: new.difficulty,
        });
    }
    Ok(())
}

/// Validate a whole chain from genesis to tail, stopping at the first
/// broken pair.
pub fn validate_chain(blocks: &[Block]) -> Result<(), ChainError> {
    let genesis = blocks.first().ok_or(ChainError::EmptyChain)?;
    if genesis.index != 0
        || !genesis.previous_hash.is_empty()
        || genesis.hash != genesis.compute_hash()
    {
        return Err(ChainError::InvalidGenesis);
    }

    for (position, pair) in blocks.windows(2).enumerate() {
        check_successor(&pair[1], &pair[0]).map_err(|reason| ChainError::BrokenLink {
            position: position + 1,
            reason,
        })?;
    }
    Ok(())
}
