use alloy_rlp::{RlpDecodable, RlpEncodable};

use crate::{header::Header, transaction::TransactionSigned};

/// A full block body as published over `statediff_stream`/`statediff_stateDiffAt`:
/// a header, zero or more uncle (ommer) headers, and the transaction list.
#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct Block {
    pub header: Header,
    pub transactions: Vec<TransactionSigned>,
    pub ommers: Vec<Header>,
}

impl Block {
    pub fn number(&self) -> u64 {
        self.header.number
    }

    pub fn hash(&self) -> alloy_primitives::B256 {
        self.header.hash_slow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, Bloom, Bytes, B256, B64, U256};
    use alloy_rlp::{Decodable, Encodable};

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
    fn round_trips_with_no_transactions_or_ommers() {
        let block = Block { header: sample_header(10), transactions: vec![], ommers: vec![] };
        let mut buf = Vec::new();
        block.encode(&mut buf);
        let decoded = Block::decode(&mut buf.as_slice()).unwrap();
        assert_eq!(block, decoded);
    }

    #[test]
    fn round_trips_with_ommers() {
        let block = Block {
            header: sample_header(11),
            transactions: vec![],
            ommers: vec![sample_header(10)],
        };
        let mut buf = Vec::new();
        block.encode(&mut buf);
        let decoded = Block::decode(&mut buf.as_slice()).unwrap();
        assert_eq!(block, decoded);
        assert_eq!(decoded.ommers.len(), 1);
    }
}
