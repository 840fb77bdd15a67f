use alloy_primitives::{Address, B256, U256};
use secp256k1::{
    ecdsa::{RecoverableSignature, RecoveryId},
    Message, SECP256K1,
};

use crate::keccak::keccak256;

/// Error recovering the sender address of a transaction.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("invalid recovery id")]
    InvalidRecoveryId,
    #[error("invalid signature: {0}")]
    InvalidSignature(#[from] secp256k1::Error),
}

/// An ECDSA signature over secp256k1, as carried by a signed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub r: U256,
    pub s: U256,
    /// `y` parity bit. For legacy transactions this is derived from `v`
    /// (`v - 27` or `v - 35 - 2*chain_id`, depending on EIP-155); for typed
    /// transactions it is carried directly.
    pub odd_y_parity: bool,
}

impl Signature {
    /// Recovers the signer address given the Keccak-256 signing hash of the
    /// transaction payload (the hash of the RLP-encoded, signature-less
    /// transaction fields).
    pub fn recover_signer(&self, signing_hash: B256) -> Result<Address, SignatureError> {
        let recovery_id = RecoveryId::from_i32(self.odd_y_parity as i32)
            .map_err(|_| SignatureError::InvalidRecoveryId)?;

        let mut sig_bytes = [0u8; 64];
        sig_bytes[..32].copy_from_slice(&self.r.to_be_bytes::<32>());
        sig_bytes[32..].copy_from_slice(&self.s.to_be_bytes::<32>());

        let recoverable = RecoverableSignature::from_compact(&sig_bytes, recovery_id)?;
        let message = Message::from_digest(signing_hash.0);
        let public_key = SECP256K1.recover_ecdsa(&message, &recoverable)?;

        let uncompressed = public_key.serialize_uncompressed();
        // Skip the leading 0x04 tag; an Ethereum address is the low 20 bytes
        // of the Keccak-256 hash of the 64-byte public key.
        let hash = keccak256(&uncompressed[1..]);
        Ok(Address::from_slice(&hash[12..]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secp256k1::{rand, Keypair};

    #[test]
    fn recovers_the_signer_of_a_known_hash() {
        let secp = secp256k1::Secp256k1::new();
        let keypair = Keypair::new(&secp, &mut rand::thread_rng());
        let (secret_key, public_key) = (keypair.secret_key(), keypair.public_key());

        let uncompressed = public_key.serialize_uncompressed();
        let expected = Address::from_slice(&keccak256(&uncompressed[1..])[12..]);

        let signing_hash = B256::from([7u8; 32]);
        let message = Message::from_digest(signing_hash.0);
        let (recovery_id, compact) =
            SECP256K1.sign_ecdsa_recoverable(&message, &secret_key).serialize_compact();

        let signature = Signature {
            r: U256::from_be_slice(&compact[..32]),
            s: U256::from_be_slice(&compact[32..]),
            odd_y_parity: recovery_id.to_i32() != 0,
        };

        let recovered = signature.recover_signer(signing_hash).unwrap();
        assert_eq!(recovered, expected);
    }
}
