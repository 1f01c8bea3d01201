use sha2::{Digest, Sha256};

use crate::constants::HASH_HEX_SIZE;

/// SHA-256 of `data` as a lowercase hex string.
pub fn sha256_hex(data: impl AsRef<[u8]>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data.as_ref());
    hex::encode(hasher.finalize())
}

/// Number of leading `'0'` characters in a hex digest.
pub fn leading_zero_nibbles(hex: &str) -> usize {
    hex.bytes().take_while(|b| *b == b'0').count()
}

/// True when the first `difficulty` hex characters of `hex` are all zero.
pub fn meets_difficulty(hex: &str, difficulty: usize) -> bool {
    difficulty <= HASH_HEX_SIZE && leading_zero_nibbles(hex) >= difficulty
}
