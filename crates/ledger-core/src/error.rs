use thiserror::Error;

/// Rejections returned by ledger operations. None of them leave state
/// partially applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Wallet '{0}' does not exist.")]
    UnknownAccount(String),

    #[error("Wallet '{0}' already exists.")]
    DuplicateAccount(String),

    #[error("Amount must be positive.")]
    InvalidAmount,

    #[error("Insufficient balance.")]
    InsufficientBalance { available: u64, requested: u64 },

    #[error("Invalid wallet name {0:?}.")]
    InvalidAccountName(String),

    #[error("Difficulty {requested} exceeds the maximum of {max}.")]
    InvalidDifficulty { requested: usize, max: usize },

    #[error("Balance of wallet '{0}' would overflow.")]
    BalanceOverflow(String),

    #[error("No valid nonce found after {attempts} attempts.")]
    MiningExhausted { attempts: u64 },
}

/// Integrity failures found by `Blockchain::verify`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("chain has no genesis block")]
    Empty,

    #[error("genesis block is malformed")]
    BadGenesis,

    #[error("block at position {position} carries index {index}")]
    BadIndex { position: usize, index: u64 },

    #[error("block {index} does not link to its predecessor")]
    BrokenLink { index: u64 },

    #[error("block {index} hash does not match its contents")]
    HashMismatch { index: u64 },

    #[error("block {index} hash does not meet difficulty {difficulty}")]
    InsufficientWork { index: u64, difficulty: usize },
}

pub type Result<T> = std::result::Result<T, LedgerError>;
