//! Cryptographic utilities for batch signing
//!
//! This module provides:
//! - Keccak-256 hashing
//! - 20-byte address handling
//! - ECDSA key management with address recovery (secp256k1)

pub mod address;
pub mod hash;
pub mod keys;

pub use address::{Address, AddressError};
pub use hash::{keccak256, keccak256_concat, keccak256_hex, pad32, personal_message_hash, u256_word};
pub use keys::{is_low_s, recover_address, KeyError, KeyPair};
