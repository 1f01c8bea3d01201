//! Single-writer token ledger: named wallets, transfers sealed into a
//! proof-of-work hash chain, and a Merkle tree over every transaction.

pub mod account;
pub mod block;
pub mod chain;
pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod hash;
pub mod ledger;
pub mod merkle;
pub mod pow;
pub mod shared;
pub mod transaction;

pub use account::Account;
pub use block::Block;
pub use chain::Blockchain;
pub use config::LedgerConfig;
pub use error::{ChainError, LedgerError, Result};
pub use ledger::{Ledger, Receipt};
pub use merkle::{verify_proof, MerkleProof, MerkleTree, ProofStep};
pub use pow::Miner;
pub use shared::SharedLedger;
pub use transaction::Transaction;
