use alloy_primitives::{Address, Bloom, Bytes, B256};
use alloy_rlp::{RlpDecodable, RlpEncodable};

#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct Log {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

/// Pre-Byzantium receipts commit to an intermediate state root; post-Byzantium
/// (EIP-658) receipts commit to a boolean success status instead. The two are
/// mutually exclusive on the wire, never both present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostTransactionState {
    State(B256),
    Status(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub post_state: PostTransactionState,
    pub cumulative_gas_used: u64,
    pub bloom: Bloom,
    pub logs: Vec<Log>,
}

impl Receipt {
    pub fn status(&self) -> Option<bool> {
        match self.post_state {
            PostTransactionState::Status(success) => Some(success),
            PostTransactionState::State(_) => None,
        }
    }

    pub fn state_root(&self) -> Option<B256> {
        match self.post_state {
            PostTransactionState::State(root) => Some(root),
            PostTransactionState::Status(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
struct ReceiptWithStateRoot {
    post_state: B256,
    cumulative_gas_used: u64,
    bloom: Bloom,
    logs: Vec<Log>,
}

#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
struct ReceiptWithStatus {
    status: u8,
    cumulative_gas_used: u64,
    bloom: Bloom,
    logs: Vec<Log>,
}

impl alloy_rlp::Encodable for Receipt {
    fn encode(&self, out: &mut dyn alloy_rlp::BufMut) {
        match self.post_state {
            PostTransactionState::State(root) => ReceiptWithStateRoot {
                post_state: root,
                cumulative_gas_used: self.cumulative_gas_used,
                bloom: self.bloom,
                logs: self.logs.clone(),
            }
            .encode(out),
            PostTransactionState::Status(success) => ReceiptWithStatus {
                status: success as u8,
                cumulative_gas_used: self.cumulative_gas_used,
                bloom: self.bloom,
                logs: self.logs.clone(),
            }
            .encode(out),
        }
    }

    fn length(&self) -> usize {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        buf.len()
    }
}

impl alloy_rlp::Decodable for Receipt {
    /// EIP-658's `post_state` field is either a 32-byte root or a single byte
    /// (0 or 1). Peek the RLP string's length to disambiguate: a status byte
    /// encodes as a single-byte string (or the empty-string shorthand for 0).
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let mut probe = *buf;
        let header = alloy_rlp::Header::decode(&mut probe)?;
        if !header.list {
            return Err(alloy_rlp::Error::UnexpectedString);
        }
        let first_field_header = alloy_rlp::Header::decode(&mut probe)?;
        if first_field_header.list {
            return Err(alloy_rlp::Error::UnexpectedList);
        }

        if first_field_header.payload_length <= 1 {
            let r = ReceiptWithStatus::decode(buf)?;
            Ok(Receipt {
                post_state: PostTransactionState::Status(r.status != 0),
                cumulative_gas_used: r.cumulative_gas_used,
                bloom: r.bloom,
                logs: r.logs,
            })
        } else {
            let r = ReceiptWithStateRoot::decode(buf)?;
            Ok(Receipt {
                post_state: PostTransactionState::State(r.post_state),
                cumulative_gas_used: r.cumulative_gas_used,
                bloom: r.bloom,
                logs: r.logs,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_rlp::{Decodable, Encodable};

    fn sample_log() -> Log {
        Log { address: Address::repeat_byte(0x1), topics: vec![B256::repeat_byte(0x2)], data: Bytes::new() }
    }

    #[test]
    fn status_receipt_round_trips() {
        let receipt = Receipt {
            post_state: PostTransactionState::Status(true),
            cumulative_gas_used: 21_000,
            bloom: Bloom::ZERO,
            logs: vec![sample_log()],
        };
        let mut buf = Vec::new();
        receipt.encode(&mut buf);
        let decoded = Receipt::decode(&mut buf.as_slice()).unwrap();
        assert_eq!(decoded, receipt);
        assert_eq!(decoded.status(), Some(true));
    }

    #[test]
    fn state_root_receipt_round_trips() {
        let receipt = Receipt {
            post_state: PostTransactionState::State(B256::repeat_byte(0xab)),
            cumulative_gas_used: 50_000,
            bloom: Bloom::ZERO,
            logs: vec![],
        };
        let mut buf = Vec::new();
        receipt.encode(&mut buf);
        let decoded = Receipt::decode(&mut buf.as_slice()).unwrap();
        assert_eq!(decoded, receipt);
        assert_eq!(decoded.state_root(), Some(B256::repeat_byte(0xab)));
    }
}
