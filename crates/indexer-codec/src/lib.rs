//! Turns decoded block entities into `(CID, multihash key, bytes)` triples.
//!
//! Two encoder families, both pure and stateless: [`structured`] builds the
//! canonical IPLD nodes for header/uncle/transaction/receipt and their trie
//! envelopes; [`raw`] wraps caller-supplied bytes (state/storage trie nodes,
//! contract code) under a supplied multicodec tag. Keccak-256 is the only
//! hash function either ever reaches for.

pub mod multicodec;
pub mod raw;
pub mod structured;

use alloy_primitives::{Bytes, B256};
use cid::Cid;
use multihash::Multihash;

/// Multihash buffer capacity; matches `cid::Cid`'s default 64-byte bound.
/// Keccak-256 only ever fills 32 of those bytes.
const MULTIHASH_SIZE: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("multihash construction failed: {0}")]
    Multihash(#[from] multihash::Error),
}

/// A content-addressed object ready to publish: its CID, the stable string
/// form of its multihash (the primary key into the raw-bytes table), and
/// the bytes it addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedNode {
    pub cid: Cid,
    pub mh_key: String,
    pub bytes: Bytes,
}

/// Builds the `(CID, multihash key)` pair for `digest` under `codec`. Shared
/// by both encoder families since both hash with Keccak-256.
fn cid_and_key(codec: u64, digest: B256) -> Result<(Cid, String), CodecError> {
    let multihash = Multihash::<MULTIHASH_SIZE>::wrap(multicodec::KECCAK_256, digest.as_slice())?;
    let cid = Cid::new_v1(codec, multihash);
    let mh_key = hex::encode(multihash.to_bytes());
    Ok((cid, mh_key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_bytes_produce_same_key() {
        let digest = B256::repeat_byte(0x42);
        let (cid1, key1) = cid_and_key(multicodec::ETH_BLOCK, digest).unwrap();
        let (cid2, key2) = cid_and_key(multicodec::ETH_BLOCK, digest).unwrap();
        assert_eq!(key1, key2);
        assert_eq!(cid1, cid2);
    }

    #[test]
    fn different_codecs_produce_different_cids() {
        let digest = B256::repeat_byte(0x1);
        let (cid1, _) = cid_and_key(multicodec::ETH_BLOCK, digest).unwrap();
        let (cid2, _) = cid_and_key(multicodec::ETH_TX, digest).unwrap();
        assert_ne!(cid1, cid2);
    }
}
