use serde::Serialize;
use tracing::info;

use crate::block::{unix_now, Block};
use crate::constants::GENESIS_PREVIOUS_HASH;
use crate::error::{ChainError, Result};
use crate::pow::Miner;
use crate::transaction::Transaction;

/// Append-only sequence of sealed blocks starting at genesis.
#[derive(Clone, Debug, Serialize)]
pub struct Blockchain {
    blocks: Vec<Block>,
}

impl Blockchain {
    /// Creates the chain with its genesis block mined at `difficulty`.
    pub fn new(difficulty: usize, miner: &Miner) -> Result<Self> {
        let mut genesis = Block::new(0, vec![], unix_now(), GENESIS_PREVIOUS_HASH);
        miner.mine(&mut genesis, difficulty)?;
        info!(hash = %genesis.hash, difficulty, "genesis block created");
        Ok(Self {
            blocks: vec![genesis],
        })
    }

    /// Mines the next block on top of the tip without appending it.
    pub fn prepare_block(
        &self,
        transactions: Vec<Transaction>,
        difficulty: usize,
        miner: &Miner,
    ) -> Result<Block> {
        let tip = self.tip();
        let mut block = Block::new(
            self.blocks.len() as u64,
            transactions,
            unix_now(),
            tip.hash.clone(),
        );
        miner.mine(&mut block, difficulty)?;
        Ok(block)
    }

    /// Appends a block produced by `prepare_block` against the current tip.
    pub fn push_sealed(&mut self, block: Block) -> &Block {
        debug_assert_eq!(block.index, self.blocks.len() as u64);
        debug_assert_eq!(block.previous_hash, self.tip().hash);
        self.blocks.push(block);
        self.tip()
    }

    pub fn append_transactions(
        &mut self,
        transactions: Vec<Transaction>,
        difficulty: usize,
        miner: &Miner,
    ) -> Result<&Block> {
        let block = self.prepare_block(transactions, difficulty, miner)?;
        Ok(self.push_sealed(block))
    }

    pub fn tip(&self) -> &Block {
        // Never empty: genesis is created in `new` and blocks are never removed.
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn get(&self, index: u64) -> Option<&Block> {
        usize::try_from(index).ok().and_then(|i| self.blocks.get(i))
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn verify(&self) -> std::result::Result<(), ChainError> {
        verify_blocks(&self.blocks)
    }
}

/// Checks genesis, index sequence, hash linkage, stored hashes and work.
pub fn verify_blocks(blocks: &[Block]) -> std::result::Result<(), ChainError> {
    let genesis = blocks.first().ok_or(ChainError::Empty)?;
    if genesis.index != 0
        || !genesis.transactions.is_empty()
        || genesis.previous_hash != GENESIS_PREVIOUS_HASH
    {
        return Err(ChainError::BadGenesis);
    }

    for (position, block) in blocks.iter().enumerate() {
        if block.index != position as u64 {
            return Err(ChainError::BadIndex {
                position,
                index: block.index,
            });
        }
        if position > 0 && block.previous_hash != blocks[position - 1].hash {
            return Err(ChainError::BrokenLink { index: block.index });
        }
        if block.hash != block.calculate_hash() {
            return Err(ChainError::HashMismatch { index: block.index });
        }
        if !block.is_sealed() {
            return Err(ChainError::InsufficientWork {
                index: block.index,
                difficulty: block.difficulty,
            });
        }
    }
    Ok(())
}
