use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::hash::{meets_difficulty, sha256_hex};
use crate::transaction::Transaction;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub transactions: Vec<Transaction>,
    pub timestamp: u64,
    pub previous_hash: String,
    pub nonce: u64,
    pub hash: String,
    /// Difficulty the block was sealed at. Not part of the hash input.
    #[serde(default)]
    pub difficulty: usize,
}

pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

impl Block {
    /// Unsealed block with nonce 0 and its hash computed.
    pub fn new(
        index: u64,
        transactions: Vec<Transaction>,
        timestamp: u64,
        previous_hash: impl Into<String>,
    ) -> Self {
        let mut block = Self {
            index,
            transactions,
            timestamp,
            previous_hash: previous_hash.into(),
            nonce: 0,
            hash: String::new(),
            difficulty: 0,
        };
        block.hash = block.calculate_hash();
        block
    }

    /// Compact JSON of the transaction list. This is the stringification fed
    /// into the block hash, so it must stay stable.
    pub fn transactions_repr(&self) -> String {
        // Plain structs with string keys cannot fail to serialize.
        serde_json::to_string(&self.transactions).expect("transaction list serializes to JSON")
    }

    /// Everything hashed ahead of the nonce: `index ‖ txs ‖ timestamp ‖ previous_hash`.
    pub fn hash_prefix(&self) -> String {
        format!(
            "{}{}{}{}",
            self.index,
            self.transactions_repr(),
            self.timestamp,
            self.previous_hash
        )
    }

    pub fn calculate_hash(&self) -> String {
        hash_with_nonce(&self.hash_prefix(), self.nonce)
    }

    /// Stored hash matches the contents and satisfies the seal difficulty.
    pub fn is_sealed(&self) -> bool {
        self.hash == self.calculate_hash() && meets_difficulty(&self.hash, self.difficulty)
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }
}

pub fn hash_with_nonce(prefix: &str, nonce: u64) -> String {
    sha256_hex(format!("{prefix}{nonce}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_txs() -> Vec<Transaction> {
        let ts = NaiveDate::from_ymd_opt(2020, 9, 13)
            .unwrap()
            .and_hms_micro_opt(12, 26, 40, 0)
            .unwrap();
        vec![
            Transaction::with_timestamp("Alice", "Bob", 10, None, ts),
            Transaction::with_timestamp("Bob", "Charlie", 5, Some("lunch"), ts),
        ]
    }

    #[test]
    fn block_hash_matches_documented_layout() {
        let block = Block::new(1, sample_txs(), 1_600_000_200, "abc");
        let repr = serde_json::to_string(&block.transactions).unwrap();
        let expected = sha256_hex(format!("1{repr}1600000200abc0"));
        assert_eq!(block.hash, expected);
        assert_eq!(block.calculate_hash(), expected);
    }

    #[test]
    fn empty_transaction_list_repr() {
        let block = Block::new(0, vec![], 1_600_000_000, "0");
        assert_eq!(block.transactions_repr(), "[]");
        assert_eq!(block.hash, sha256_hex("0[]160000000000"));
    }

    #[test]
    fn block_hash_consistency() {
        let block = Block::new(1, sample_txs(), 1_600_000_200, "abc");
        assert_eq!(block.calculate_hash(), block.calculate_hash());
    }

    #[test]
    fn block_hash_changes_with_nonce() {
        let mut block = Block::new(1, sample_txs(), 1_600_000_200, "abc");
        let hash1 = block.calculate_hash();
        block.nonce += 1;
        let hash2 = block.calculate_hash();
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn block_hash_changes_with_contents() {
        let a = Block::new(1, sample_txs(), 1_600_000_200, "abc");
        let mut txs = sample_txs();
        txs[0].amount = 11;
        let b = Block::new(1, txs, 1_600_000_200, "abc");
        let c = Block::new(1, sample_txs(), 1_600_000_201, "abc");
        let d = Block::new(1, sample_txs(), 1_600_000_200, "abd");
        assert_ne!(a.hash, b.hash);
        assert_ne!(a.hash, c.hash);
        assert_ne!(a.hash, d.hash);
    }

    #[test]
    fn tampering_breaks_seal() {
        let mut block = Block::new(1, sample_txs(), 1_600_000_200, "abc");
        assert!(block.is_sealed());
        block.transactions[1].amount = 500;
        assert!(!block.is_sealed());
    }

    #[test]
    fn block_serialization_example() {
        let block = Block::new(3, sample_txs(), 1_600_000_200, "abc");
        let json = serde_json::to_string(&block).unwrap();
        let back: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(back, block);
    }
}
