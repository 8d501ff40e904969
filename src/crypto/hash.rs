//! Keccak-256 hashing utilities
//!
//! Provides the Keccak-256 primitives used for batch digests, signer
//! addresses, and personal-message hashes. The verifying contract family
//! hashes with Keccak-256 (not the NIST SHA-3 padding), so every digest
//! produced here must match that convention byte for byte.

use sha3::{Digest as _, Keccak256};

/// Prefix prepended to a 32-byte digest for `eth_sign`-style signatures.
const PERSONAL_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Computes the Keccak-256 hash of the input data
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Computes the Keccak-256 hash of several concatenated byte slices
pub fn keccak256_concat(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Computes the Keccak-256 hash and returns it as a 0x-prefixed hex string
pub fn keccak256_hex(data: &[u8]) -> String {
    format!("0x{}", hex::encode(keccak256(data)))
}

/// Wraps a 32-byte digest in the personal-message prefix and hashes it.
///
/// Some signing backends refuse to sign a raw 32-byte digest; they sign
/// this prefixed form instead. The validator must recompute the same hash
/// before recovery for the `EthSign` scheme.
pub fn personal_message_hash(digest: &[u8; 32]) -> [u8; 32] {
    keccak256_concat(&[PERSONAL_MESSAGE_PREFIX, digest])
}

/// Left-pads a byte slice to a 32-byte big-endian word.
///
/// Panics if the input is longer than 32 bytes; callers only pass
/// addresses (20 bytes) and integers already sized below the word.
pub fn pad32(bytes: &[u8]) -> [u8; 32] {
    assert!(bytes.len() <= 32, "pad32 input exceeds one word");
    let mut word = [0u8; 32];
    word[32 - bytes.len()..].copy_from_slice(bytes);
    word
}

/// Encodes an unsigned integer as a 32-byte big-endian word
pub fn u256_word(value: u128) -> [u8; 32] {
    pad32(&value.to_be_bytes())
}
