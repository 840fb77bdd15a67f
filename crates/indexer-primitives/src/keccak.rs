//! Keccak-256 hashing, the only hash function this crate ever reaches for.

use alloy_primitives::B256;
use sha3::{Digest, Keccak256};

/// Hashes `bytes` with Keccak-256.
pub fn keccak256(bytes: impl AsRef<[u8]>) -> B256 {
    let mut hasher = Keccak256::new();
    hasher.update(bytes.as_ref());
    B256::from_slice(&hasher.finalize())
}
