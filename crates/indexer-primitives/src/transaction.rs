use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_rlp::{Buf, BufMut, Decodable, Encodable, Header, RlpDecodable, RlpEncodable};

use crate::{
    keccak::keccak256,
    signature::{Signature, SignatureError},
};

/// The recipient of a transaction: a call target, or the empty "create a
/// contract" marker. RLP-encodes as the address, or as the empty string for
/// contract creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TxKind {
    #[default]
    Create,
    Call(Address),
}

impl TxKind {
    pub fn to(&self) -> Option<Address> {
        match self {
            TxKind::Call(addr) => Some(*addr),
            TxKind::Create => None,
        }
    }
}

impl Encodable for TxKind {
    fn encode(&self, out: &mut dyn BufMut) {
        match self {
            TxKind::Call(addr) => addr.encode(out),
            TxKind::Create => out.put_u8(0x80),
        }
    }

    fn length(&self) -> usize {
        match self {
            TxKind::Call(addr) => addr.length(),
            TxKind::Create => 1,
        }
    }
}

impl Decodable for TxKind {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        if let Some(&first) = buf.first() {
            if first == 0x80 {
                buf.advance(1);
                return Ok(TxKind::Create);
            }
        }
        Ok(TxKind::Call(Address::decode(buf)?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
pub struct AccessListItem {
    pub address: Address,
    pub storage_keys: Vec<B256>,
}

/// EIP-2930 access list: a plain RLP list, so it round-trips with no extra
/// wrapping beyond its elements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccessList(pub Vec<AccessListItem>);

impl Encodable for AccessList {
    fn encode(&self, out: &mut dyn BufMut) {
        self.0.encode(out)
    }
    fn length(&self) -> usize {
        self.0.length()
    }
}

impl Decodable for AccessList {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        Ok(AccessList(Vec::decode(buf)?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxLegacy {
    /// `None` for transactions signed before EIP-155.
    pub chain_id: Option<u64>,
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub to: TxKind,
    pub value: U256,
    pub input: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxEip2930 {
    pub chain_id: u64,
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub to: TxKind,
    pub value: U256,
    pub input: Bytes,
    pub access_list: AccessList,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxEip1559 {
    pub chain_id: u64,
    pub nonce: u64,
    pub max_priority_fee_per_gas: u128,
    pub max_fee_per_gas: u128,
    pub gas_limit: u64,
    pub to: TxKind,
    pub value: U256,
    pub input: Bytes,
    pub access_list: AccessList,
}

/// A decoded transaction body, without its signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    Legacy(TxLegacy),
    Eip2930(TxEip2930),
    Eip1559(TxEip1559),
}

impl Transaction {
    pub fn nonce(&self) -> u64 {
        match self {
            Transaction::Legacy(tx) => tx.nonce,
            Transaction::Eip2930(tx) => tx.nonce,
            Transaction::Eip1559(tx) => tx.nonce,
        }
    }

    pub fn gas_limit(&self) -> u64 {
        match self {
            Transaction::Legacy(tx) => tx.gas_limit,
            Transaction::Eip2930(tx) => tx.gas_limit,
            Transaction::Eip1559(tx) => tx.gas_limit,
        }
    }

    pub fn to(&self) -> TxKind {
        match self {
            Transaction::Legacy(tx) => tx.to,
            Transaction::Eip2930(tx) => tx.to,
            Transaction::Eip1559(tx) => tx.to,
        }
    }

    pub fn input(&self) -> &Bytes {
        match self {
            Transaction::Legacy(tx) => &tx.input,
            Transaction::Eip2930(tx) => &tx.input,
            Transaction::Eip1559(tx) => &tx.input,
        }
    }

    pub fn chain_id(&self) -> Option<u64> {
        match self {
            Transaction::Legacy(tx) => tx.chain_id,
            Transaction::Eip2930(tx) => Some(tx.chain_id),
            Transaction::Eip1559(tx) => Some(tx.chain_id),
        }
    }

    /// The gas price paid by the sender, given the block's base fee (if any).
    /// Legacy/EIP-2930 transactions pay a flat `gas_price`; EIP-1559
    /// transactions pay `min(max_fee_per_gas, base_fee + max_priority_fee_per_gas)`.
    pub fn effective_gas_price(&self, base_fee_per_gas: Option<u128>) -> u128 {
        match self {
            Transaction::Legacy(tx) => tx.gas_price,
            Transaction::Eip2930(tx) => tx.gas_price,
            Transaction::Eip1559(tx) => match base_fee_per_gas {
                Some(base_fee) => {
                    let priority = tx.max_priority_fee_per_gas.min(tx.max_fee_per_gas.saturating_sub(base_fee));
                    base_fee + priority
                }
                None => tx.max_fee_per_gas,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
struct TxLegacyRlp {
    nonce: u64,
    gas_price: u128,
    gas_limit: u64,
    to: TxKind,
    value: U256,
    input: Bytes,
    v: U256,
    r: U256,
    s: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
struct TxLegacyUnsignedRlp {
    nonce: u64,
    gas_price: u128,
    gas_limit: u64,
    to: TxKind,
    value: U256,
    input: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
struct TxLegacyUnsignedEip155Rlp {
    nonce: u64,
    gas_price: u128,
    gas_limit: u64,
    to: TxKind,
    value: U256,
    input: Bytes,
    chain_id: u64,
    zero1: u8,
    zero2: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
struct TxEip2930Rlp {
    chain_id: u64,
    nonce: u64,
    gas_price: u128,
    gas_limit: u64,
    to: TxKind,
    value: U256,
    input: Bytes,
    access_list: AccessList,
    y_parity: u8,
    r: U256,
    s: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
struct TxEip2930UnsignedRlp {
    chain_id: u64,
    nonce: u64,
    gas_price: u128,
    gas_limit: u64,
    to: TxKind,
    value: U256,
    input: Bytes,
    access_list: AccessList,
}

#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
struct TxEip1559Rlp {
    chain_id: u64,
    nonce: u64,
    max_priority_fee_per_gas: u128,
    max_fee_per_gas: u128,
    gas_limit: u64,
    to: TxKind,
    value: U256,
    input: Bytes,
    access_list: AccessList,
    y_parity: u8,
    r: U256,
    s: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, RlpEncodable, RlpDecodable)]
struct TxEip1559UnsignedRlp {
    chain_id: u64,
    nonce: u64,
    max_priority_fee_per_gas: u128,
    max_fee_per_gas: u128,
    gas_limit: u64,
    to: TxKind,
    value: U256,
    input: Bytes,
    access_list: AccessList,
}

/// `v` for a post-EIP-155 legacy transaction decomposes into a chain id and
/// a recovery parity: `v = chain_id * 2 + 35 + parity`. Pre-EIP-155
/// transactions use the bare `v = 27 + parity`.
fn split_legacy_v(v: U256) -> (Option<u64>, bool) {
    let v: u64 = v.to::<u64>();
    if v == 27 || v == 28 {
        (None, v == 28)
    } else if v >= 35 {
        let chain_id = (v - 35) / 2;
        let parity = (v - 35) % 2 == 1;
        (Some(chain_id), parity)
    } else {
        (None, v % 2 == 1)
    }
}

fn legacy_v(chain_id: Option<u64>, odd_y_parity: bool) -> U256 {
    match chain_id {
        Some(id) => U256::from(id) * U256::from(2) + U256::from(35u8) + U256::from(odd_y_parity as u8),
        None => U256::from(27u8) + U256::from(odd_y_parity as u8),
    }
}

/// A transaction together with its signature and cached hash, as published
/// in a block body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionSigned {
    pub transaction: Transaction,
    pub signature: Signature,
    pub hash: B256,
}

impl TransactionSigned {
    /// Recovers the sender address, per §4.3 step 9 (`ECRecover`).
    pub fn recover_signer(&self) -> Result<Address, SignatureError> {
        let signing_hash = self.signature_hash();
        self.signature.recover_signer(signing_hash)
    }

    /// The hash that was signed to produce `self.signature`.
    fn signature_hash(&self) -> B256 {
        let mut buf = Vec::new();
        match &self.transaction {
            Transaction::Legacy(tx) => match tx.chain_id {
                Some(chain_id) => TxLegacyUnsignedEip155Rlp {
                    nonce: tx.nonce,
                    gas_price: tx.gas_price,
                    gas_limit: tx.gas_limit,
                    to: tx.to,
                    value: tx.value,
                    input: tx.input.clone(),
                    chain_id,
                    zero1: 0,
                    zero2: 0,
                }
                .encode(&mut buf),
                None => TxLegacyUnsignedRlp {
                    nonce: tx.nonce,
                    gas_price: tx.gas_price,
                    gas_limit: tx.gas_limit,
                    to: tx.to,
                    value: tx.value,
                    input: tx.input.clone(),
                }
                .encode(&mut buf),
            },
            Transaction::Eip2930(tx) => {
                buf.put_u8(0x01);
                TxEip2930UnsignedRlp {
                    chain_id: tx.chain_id,
                    nonce: tx.nonce,
                    gas_price: tx.gas_price,
                    gas_limit: tx.gas_limit,
                    to: tx.to,
                    value: tx.value,
                    input: tx.input.clone(),
                    access_list: tx.access_list.clone(),
                }
                .encode(&mut buf);
            }
            Transaction::Eip1559(tx) => {
                buf.put_u8(0x02);
                TxEip1559UnsignedRlp {
                    chain_id: tx.chain_id,
                    nonce: tx.nonce,
                    max_priority_fee_per_gas: tx.max_priority_fee_per_gas,
                    max_fee_per_gas: tx.max_fee_per_gas,
                    gas_limit: tx.gas_limit,
                    to: tx.to,
                    value: tx.value,
                    input: tx.input.clone(),
                    access_list: tx.access_list.clone(),
                }
                .encode(&mut buf);
            }
        }
        keccak256(buf)
    }
}

impl Encodable for TransactionSigned {
    fn encode(&self, out: &mut dyn BufMut) {
        match &self.transaction {
            Transaction::Legacy(tx) => {
                let (chain_id, odd_y_parity) = (tx.chain_id, self.signature.odd_y_parity);
                TxLegacyRlp {
                    nonce: tx.nonce,
                    gas_price: tx.gas_price,
                    gas_limit: tx.gas_limit,
                    to: tx.to,
                    value: tx.value,
                    input: tx.input.clone(),
                    v: legacy_v(chain_id, odd_y_parity),
                    r: self.signature.r,
                    s: self.signature.s,
                }
                .encode(out)
            }
            Transaction::Eip2930(tx) => {
                let inner = TxEip2930Rlp {
                    chain_id: tx.chain_id,
                    nonce: tx.nonce,
                    gas_price: tx.gas_price,
                    gas_limit: tx.gas_limit,
                    to: tx.to,
                    value: tx.value,
                    input: tx.input.clone(),
                    access_list: tx.access_list.clone(),
                    y_parity: self.signature.odd_y_parity as u8,
                    r: self.signature.r,
                    s: self.signature.s,
                };
                encode_typed(0x01, &inner, out);
            }
            Transaction::Eip1559(tx) => {
                let inner = TxEip1559Rlp {
                    chain_id: tx.chain_id,
                    nonce: tx.nonce,
                    max_priority_fee_per_gas: tx.max_priority_fee_per_gas,
                    max_fee_per_gas: tx.max_fee_per_gas,
                    gas_limit: tx.gas_limit,
                    to: tx.to,
                    value: tx.value,
                    input: tx.input.clone(),
                    access_list: tx.access_list.clone(),
                    y_parity: self.signature.odd_y_parity as u8,
                    r: self.signature.r,
                    s: self.signature.s,
                };
                encode_typed(0x02, &inner, out);
            }
        }
    }

    fn length(&self) -> usize {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        buf.len()
    }
}

/// Wraps a typed transaction's RLP body as the EIP-2718 envelope: an RLP
/// string whose payload is `transaction_type || rlp(body)`.
fn encode_typed(tx_type: u8, body: &impl Encodable, out: &mut dyn BufMut) {
    let payload_len = 1 + body.length();
    Header { list: false, payload_length: payload_len }.encode(out);
    out.put_u8(tx_type);
    body.encode(out);
}

impl Decodable for TransactionSigned {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let first = *buf.first().ok_or(alloy_rlp::Error::InputTooShort)?;
        if first >= 0xc0 {
            let rlp = TxLegacyRlp::decode(buf)?;
            let (chain_id, odd_y_parity) = split_legacy_v(rlp.v);
            let transaction = Transaction::Legacy(TxLegacy {
                chain_id,
                nonce: rlp.nonce,
                gas_price: rlp.gas_price,
                gas_limit: rlp.gas_limit,
                to: rlp.to,
                value: rlp.value,
                input: rlp.input,
            });
            let signature = Signature { r: rlp.r, s: rlp.s, odd_y_parity };
            let signed = TransactionSigned { transaction, signature, hash: B256::ZERO };
            Ok(signed.with_computed_hash())
        } else {
            let bytes = alloy_rlp::Bytes::decode(buf)?;
            let mut payload: &[u8] = bytes.as_ref();
            let tx_type = *payload.first().ok_or(alloy_rlp::Error::InputTooShort)?;
            payload.advance(1);
            let signed = match tx_type {
                0x01 => {
                    let rlp = TxEip2930Rlp::decode(&mut payload)?;
                    let transaction = Transaction::Eip2930(TxEip2930 {
                        chain_id: rlp.chain_id,
                        nonce: rlp.nonce,
                        gas_price: rlp.gas_price,
                        gas_limit: rlp.gas_limit,
                        to: rlp.to,
                        value: rlp.value,
                        input: rlp.input,
                        access_list: rlp.access_list,
                    });
                    let signature =
                        Signature { r: rlp.r, s: rlp.s, odd_y_parity: rlp.y_parity != 0 };
                    TransactionSigned { transaction, signature, hash: B256::ZERO }
                }
                0x02 => {
                    let rlp = TxEip1559Rlp::decode(&mut payload)?;
                    let transaction = Transaction::Eip1559(TxEip1559 {
                        chain_id: rlp.chain_id,
                        nonce: rlp.nonce,
                        max_priority_fee_per_gas: rlp.max_priority_fee_per_gas,
                        max_fee_per_gas: rlp.max_fee_per_gas,
                        gas_limit: rlp.gas_limit,
                        to: rlp.to,
                        value: rlp.value,
                        input: rlp.input,
                        access_list: rlp.access_list,
                    });
                    let signature =
                        Signature { r: rlp.r, s: rlp.s, odd_y_parity: rlp.y_parity != 0 };
                    TransactionSigned { transaction, signature, hash: B256::ZERO }
                }
                other => return Err(alloy_rlp::Error::Custom(unknown_tx_type_msg(other))),
            };
            Ok(signed.with_computed_hash())
        }
    }
}

fn unknown_tx_type_msg(_tx_type: u8) -> &'static str {
    "unknown transaction type"
}

impl TransactionSigned {
    fn with_computed_hash(mut self) -> Self {
        let mut buf = Vec::new();
        Encodable::encode(&self, &mut buf);
        self.hash = keccak256(buf);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy_tx() -> Transaction {
        Transaction::Legacy(TxLegacy {
            chain_id: Some(1),
            nonce: 5,
            gas_price: 20_000_000_000,
            gas_limit: 21_000,
            to: TxKind::Call(Address::repeat_byte(0x11)),
            value: U256::from(1_000_000_000_000_000_000u128),
            input: Bytes::new(),
        })
    }

    #[test]
    fn legacy_round_trips_through_rlp() {
        let signed = TransactionSigned {
            transaction: legacy_tx(),
            signature: Signature { r: U256::from(1u8), s: U256::from(2u8), odd_y_parity: true },
            hash: B256::ZERO,
        }
        .with_computed_hash();

        let mut buf = Vec::new();
        signed.encode(&mut buf);
        let decoded = TransactionSigned::decode(&mut buf.as_slice()).unwrap();
        assert_eq!(decoded.transaction, signed.transaction);
        assert_eq!(decoded.hash, signed.hash);
    }

    #[test]
    fn eip1559_effective_gas_price_is_capped_by_max_fee() {
        let tx = TxEip1559 {
            chain_id: 1,
            nonce: 0,
            max_priority_fee_per_gas: 2,
            max_fee_per_gas: 10,
            gas_limit: 21_000,
            to: TxKind::Call(Address::ZERO),
            value: U256::ZERO,
            input: Bytes::new(),
            access_list: AccessList::default(),
        };
        let transaction = Transaction::Eip1559(tx);
        assert_eq!(transaction.effective_gas_price(Some(9)), 10);
        assert_eq!(transaction.effective_gas_price(Some(1)), 3);
    }

    #[test]
    fn tx_kind_create_is_the_empty_rlp_string() {
        let mut buf = Vec::new();
        TxKind::Create.encode(&mut buf);
        assert_eq!(buf, vec![0x80]);
        let decoded = TxKind::decode(&mut buf.as_slice()).unwrap();
        assert_eq!(decoded, TxKind::Create);
    }
}
