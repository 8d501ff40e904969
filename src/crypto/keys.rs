//! ECDSA key management for batch signing
//!
//! Provides key pair handling, recoverable signing, and address recovery
//! over the secp256k1 curve. Signatures are produced in the compact
//! 64-byte r‖s form plus a recovery id, which the signature layer encodes
//! into the 65-byte wire format the verifying contract expects.

use rand::rngs::OsRng;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use thiserror::Error;

use super::address::Address;

/// Upper bound for the lower half of the curve order (inclusive).
///
/// An s value above this bound has a complementary low-s twin that
/// verifies for the same key, so high-s signatures are rejected outright.
const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B,
    0x20, 0xA0,
];

/// Errors that can occur during key operations
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid private key")]
    InvalidPrivateKey,
    #[error("Invalid recovery id: {0}")]
    InvalidRecoveryId(u8),
    #[error("Signature recovery failed")]
    RecoveryFailed,
    #[error("Secp256k1 error: {0}")]
    Secp256k1Error(#[from] secp256k1::Error),
}

/// A key pair consisting of a private key and its corresponding public key
#[derive(Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut OsRng);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from an existing secret key
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from a hex-encoded private key
    pub fn from_private_key_hex(hex_key: &str) -> Result<Self, KeyError> {
        let stripped = hex_key.strip_prefix("0x").unwrap_or(hex_key);
        let bytes = hex::decode(stripped).map_err(|_| KeyError::InvalidPrivateKey)?;
        let secret_key =
            SecretKey::from_slice(&bytes).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self::from_secret_key(secret_key))
    }

    /// The address derived from this key pair's public key
    pub fn address(&self) -> Address {
        Address::from_public_key(&self.public_key.serialize_uncompressed())
    }

    /// Sign a 32-byte digest, returning the compact signature and its
    /// recovery id (0 or 1).
    ///
    /// RFC 6979 deterministic nonces via the curve library, so the same
    /// (key, digest) pair always yields the same signature. The library
    /// normalizes s into the lower half-order.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> Result<([u8; 64], u8), KeyError> {
        let secp = Secp256k1::new();
        let message = Message::from_digest_slice(digest)?;
        let signature = secp.sign_ecdsa_recoverable(&message, &self.secret_key);
        let (rec_id, compact) = signature.serialize_compact();
        Ok((compact, rec_id.to_i32() as u8))
    }
}

/// Recover the signer address from a digest and a compact signature.
///
/// `rec_id` is the raw recovery id (0 or 1), not the offset v value.
pub fn recover_address(
    digest: &[u8; 32],
    compact: &[u8; 64],
    rec_id: u8,
) -> Result<Address, KeyError> {
    if rec_id > 1 {
        return Err(KeyError::InvalidRecoveryId(rec_id));
    }
    let secp = Secp256k1::new();
    let message = Message::from_digest_slice(digest)?;
    let recovery_id =
        RecoveryId::from_i32(rec_id as i32).map_err(|_| KeyError::InvalidRecoveryId(rec_id))?;
    let signature = RecoverableSignature::from_compact(compact, recovery_id)
        .map_err(|_| KeyError::RecoveryFailed)?;
    let public_key = secp
        .recover_ecdsa(&message, &signature)
        .map_err(|_| KeyError::RecoveryFailed)?;
    Ok(Address::from_public_key(&public_key.serialize_uncompressed()))
}

/// Check that an s value lies in the lower half of the curve order
pub fn is_low_s(s: &[u8; 32]) -> bool {
    *s <= SECP256K1_HALF_ORDER
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::keccak256;

    #[test]
    fn test_sign_and_recover() {
        let kp = KeyPair::generate();
        let digest = keccak256(b"batch payload");

        let (compact, rec_id) = kp.sign_digest(&digest).unwrap();
        let recovered = recover_address(&digest, &compact, rec_id).unwrap();
        assert_eq!(recovered, kp.address());
    }

    #[test]
    fn test_signing_is_deterministic() {
        let kp = KeyPair::generate();
        let digest = keccak256(b"same payload");

        let first = kp.sign_digest(&digest).unwrap();
        let second = kp.sign_digest(&digest).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_produced_signatures_are_low_s() {
        let kp = KeyPair::generate();
        for i in 0..8u8 {
            let digest = keccak256(&[i]);
            let (compact, _) = kp.sign_digest(&digest).unwrap();
            let mut s = [0u8; 32];
            s.copy_from_slice(&compact[32..]);
            assert!(is_low_s(&s));
        }
    }

    #[test]
    fn test_key_pair_from_hex() {
        let kp1 = KeyPair::generate();
        let private_hex = hex::encode(kp1.secret_key.secret_bytes());

        let kp2 = KeyPair::from_private_key_hex(&private_hex).unwrap();
        assert_eq!(kp1.address(), kp2.address());
    }

    #[test]
    fn test_recovery_rejects_bad_rec_id() {
        let kp = KeyPair::generate();
        let digest = keccak256(b"payload");
        let (compact, _) = kp.sign_digest(&digest).unwrap();

        assert!(matches!(
            recover_address(&digest, &compact, 7),
            Err(KeyError::InvalidRecoveryId(7))
        ));
    }

    #[test]
    fn test_half_order_boundary() {
        assert!(is_low_s(&SECP256K1_HALF_ORDER));
        let mut above = SECP256K1_HALF_ORDER;
        above[31] += 1;
        assert!(!is_low_s(&above));
        assert!(is_low_s(&[0u8; 32]));
    }
}
