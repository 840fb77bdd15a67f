use alloy_primitives::{Address, Bloom, Bytes, B256, B64, U256};
use alloy_rlp::{RlpDecodable, RlpEncodable};

use crate::keccak::keccak256;

/// An Ethereum block header, decoded from `blockRlp`.
///
/// Field order and RLP shape follow the yellow paper; this mirrors what
/// `reth_primitives::Header` looks like pre-4844 plus the single
/// post-London trailing field this indexer needs (`base_fee_per_gas`).
#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
#[rlp(trailing)]
pub struct Header {
    pub parent_hash: B256,
    pub ommers_hash: B256,
    pub beneficiary: Address,
    pub state_root: B256,
    pub transactions_root: B256,
    pub receipts_root: B256,
    pub logs_bloom: Bloom,
    pub difficulty: U256,
    pub number: u64,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub timestamp: u64,
    pub extra_data: Bytes,
    pub mix_hash: B256,
    pub nonce: B64,
    pub base_fee_per_gas: Option<u64>,
}

impl Header {
    /// Keccak-256 hash of the RLP-encoded header; this is the block hash.
    pub fn hash_slow(&self) -> B256 {
        let mut buf = Vec::new();
        alloy_rlp::Encodable::encode(self, &mut buf);
        keccak256(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_rlp::Decodable;

    fn sample_header(number: u64) -> Header {
        Header {
            parent_hash: B256::ZERO,
            ommers_hash: B256::ZERO,
            beneficiary: Address::ZERO,
            state_root: B256::ZERO,
            transactions_root: B256::ZERO,
            receipts_root: B256::ZERO,
            logs_bloom: Bloom::ZERO,
            difficulty: U256::ZERO,
            number,
            gas_limit: 30_000_000,
            gas_used: 0,
            timestamp: 0,
            extra_data: Bytes::new(),
            mix_hash: B256::ZERO,
            nonce: B64::ZERO,
            base_fee_per_gas: None,
        }
    }

    #[test]
    fn round_trips_through_rlp() {
        let header = sample_header(1);
        let mut buf = Vec::new();
        alloy_rlp::Encodable::encode(&header, &mut buf);
        let decoded = Header::decode(&mut buf.as_slice()).unwrap();
        assert_eq!(header, decoded);
    }

    #[test]
    fn hash_is_deterministic() {
        let header = sample_header(2);
        assert_eq!(header.hash_slow(), header.hash_slow());
    }
}
