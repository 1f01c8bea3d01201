use rayon::prelude::*;
use tracing::info;

use crate::block::{hash_with_nonce, Block};
use crate::constants::HASH_HEX_SIZE;
use crate::error::{LedgerError, Result};
use crate::hash::meets_difficulty;

/// Proof-of-work search settings. The default is an unbounded sequential
/// search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Miner {
    /// Maximum number of hashes to try before giving up. `None` searches
    /// until a nonce is found.
    pub max_attempts: Option<u64>,
    /// Spread the nonce range over the rayon thread pool. The winning nonce is
    /// the same one a sequential search would find.
    pub parallel: bool,
}

impl Miner {
    pub fn new(max_attempts: Option<u64>, parallel: bool) -> Self {
        Self {
            max_attempts,
            parallel,
        }
    }

    /// Seals `block` by incrementing its nonce, starting from the current value,
    /// until the hash has `difficulty` leading zero hex digits.
    pub fn mine(&self, block: &mut Block, difficulty: usize) -> Result<()> {
        if difficulty > HASH_HEX_SIZE {
            return Err(LedgerError::InvalidDifficulty {
                requested: difficulty,
                max: HASH_HEX_SIZE,
            });
        }

        let prefix = block.hash_prefix();
        let start = block.nonce;
        let (nonce, hash) = if self.parallel {
            self.search_parallel(&prefix, start, difficulty)?
        } else {
            self.search_sequential(&prefix, start, difficulty)?
        };

        block.nonce = nonce;
        block.hash = hash;
        block.difficulty = difficulty;

        info!(
            "Mined block {} with nonce {} and hash {}",
            block.index, block.nonce, block.hash
        );
        Ok(())
    }

    fn search_sequential(&self, prefix: &str, start: u64, difficulty: usize) -> Result<(u64, String)> {
        let mut nonce = start;
        let mut attempts = 0u64;
        loop {
            if self.max_attempts.is_some_and(|max| attempts >= max) {
                return Err(LedgerError::MiningExhausted { attempts });
            }
            let hash = hash_with_nonce(prefix, nonce);
            attempts += 1;
            if meets_difficulty(&hash, difficulty) {
                return Ok((nonce, hash));
            }
            nonce = nonce.wrapping_add(1);
        }
    }

    fn search_parallel(&self, prefix: &str, start: u64, difficulty: usize) -> Result<(u64, String)> {
        let end = match self.max_attempts {
            Some(max) => start.saturating_add(max),
            None => u64::MAX,
        };

        (start..end)
            .into_par_iter()
            .find_first(|nonce| meets_difficulty(&hash_with_nonce(prefix, *nonce), difficulty))
            .map(|nonce| (nonce, hash_with_nonce(prefix, nonce)))
            .ok_or(LedgerError::MiningExhausted {
                attempts: end - start,
            })
    }
}

/// Unbounded sequential proof-of-work.
pub fn mine(block: &mut Block, difficulty: usize) -> Result<()> {
    Miner::default().mine(block, difficulty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::leading_zero_nibbles;

    fn fresh_block() -> Block {
        Block::new(1, vec![], 1_600_000_000, "0")
    }

    #[test]
    fn difficulty_zero_keeps_initial_nonce() {
        let mut block = fresh_block();
        mine(&mut block, 0).unwrap();
        assert_eq!(block.nonce, 0);
        assert_eq!(block.hash, block.calculate_hash());
        assert_eq!(block.difficulty, 0);
    }

    #[test]
    fn mined_hash_meets_difficulty() {
        for difficulty in 1..=3 {
            let mut block = fresh_block();
            mine(&mut block, difficulty).unwrap();
            assert!(leading_zero_nibbles(&block.hash) >= difficulty);
            assert_eq!(block.hash, block.calculate_hash());
            assert!(block.is_sealed());
        }
    }

    #[test]
    fn search_starts_from_current_nonce() {
        let mut first = fresh_block();
        mine(&mut first, 2).unwrap();

        let mut resumed = fresh_block();
        resumed.nonce = first.nonce + 1;
        mine(&mut resumed, 2).unwrap();
        assert!(resumed.nonce > first.nonce);
    }

    #[test]
    fn parallel_finds_the_sequential_nonce() {
        let mut seq = fresh_block();
        let mut par = fresh_block();
        Miner::new(None, false).mine(&mut seq, 2).unwrap();
        Miner::new(None, true).mine(&mut par, 2).unwrap();
        assert_eq!(seq.nonce, par.nonce);
        assert_eq!(seq.hash, par.hash);
    }

    #[test]
    fn bounded_search_gives_up() {
        // 64 leading zero hex digits will not turn up in three tries.
        let mut block = fresh_block();
        let err = Miner::new(Some(3), false).mine(&mut block, 64).unwrap_err();
        assert_eq!(err, LedgerError::MiningExhausted { attempts: 3 });

        let mut block = fresh_block();
        let err = Miner::new(Some(3), true).mine(&mut block, 64).unwrap_err();
        assert_eq!(err, LedgerError::MiningExhausted { attempts: 3 });
    }

    #[test]
    fn zero_attempt_budget_fails_in_both_modes() {
        for parallel in [false, true] {
            let mut block = fresh_block();
            let err = Miner::new(Some(0), parallel).mine(&mut block, 0).unwrap_err();
            assert_eq!(err, LedgerError::MiningExhausted { attempts: 0 });
            assert_eq!(block.nonce, 0);
        }
    }

    #[test]
    fn unsatisfiable_difficulty_rejected() {
        let mut block = fresh_block();
        let err = mine(&mut block, 65).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidDifficulty { requested: 65, .. }));
    }
}
