//! Signature encoding and validation
//!
//! Signatures travel as 65 bytes of r‖s‖v. The v byte both selects the
//! recovery id and marks the signing scheme, following the verifying
//! contract's convention:
//!
//! - `27`/`28`: direct ECDSA over the raw digest
//! - `31`/`32`: ECDSA over the personal-message-prefixed digest
//!   (`eth_sign` backends), the plain v offset by 4
//! - `1`: pre-validated sentinel with no cryptographic content; validity
//!   is an on-chain approval fact checked against a caller-supplied
//!   allow-set
//!
//! A validator can therefore classify the scheme from the encoded v alone.

pub mod validator;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::hash::pad32;
use crate::crypto::Address;

pub use validator::{validate, ValidationError};

/// Offset added to v for personal-message-prefixed signatures
pub const ETH_SIGN_V_OFFSET: u8 = 4;

/// v byte of the pre-validated sentinel encoding
pub const PREVALIDATED_V: u8 = 1;

/// Wire length of every signature
pub const SIGNATURE_LEN: usize = 65;

/// The signing convention a signature was produced under
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureScheme {
    /// Direct ECDSA over the raw 32-byte digest
    EoaEcdsa,
    /// ECDSA over the personal-message-prefixed digest
    EthSign,
    /// On-chain approval sentinel, never cryptographically checked here
    ContractPrevalidated,
}

impl SignatureScheme {
    /// Classify a scheme from an encoded v byte
    pub fn from_v(v: u8) -> Option<Self> {
        match v {
            PREVALIDATED_V => Some(SignatureScheme::ContractPrevalidated),
            27 | 28 => Some(SignatureScheme::EoaEcdsa),
            31 | 32 => Some(SignatureScheme::EthSign),
            _ => None,
        }
    }
}

/// A signature over exactly one (digest, signer) pair
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Claimed signer; validation fails unless the bytes prove it
    pub signer: Address,
    /// Signing convention, cross-checked against the encoded v
    pub scheme: SignatureScheme,
    /// 65-byte r‖s‖v wire encoding (hex on the wire)
    #[serde(with = "hex_sig")]
    pub bytes: Vec<u8>,
    /// When the signature was produced
    pub signed_at: DateTime<Utc>,
}

impl Signature {
    /// Assemble a direct-ECDSA signature from a compact signature and its
    /// raw recovery id (0 or 1)
    pub fn eoa(signer: Address, compact: &[u8; 64], rec_id: u8) -> Self {
        Self::from_parts(signer, SignatureScheme::EoaEcdsa, compact, 27 + rec_id)
    }

    /// Assemble an `eth_sign`-style signature; v carries the +4 offset
    pub fn eth_sign(signer: Address, compact: &[u8; 64], rec_id: u8) -> Self {
        Self::from_parts(
            signer,
            SignatureScheme::EthSign,
            compact,
            27 + rec_id + ETH_SIGN_V_OFFSET,
        )
    }

    /// Assemble the pre-validated sentinel for a signer: the signer
    /// address left-padded into r, s zero, v = 1
    pub fn prevalidated(signer: Address) -> Self {
        let mut bytes = Vec::with_capacity(SIGNATURE_LEN);
        bytes.extend_from_slice(&pad32(signer.as_bytes()));
        bytes.extend_from_slice(&[0u8; 32]);
        bytes.push(PREVALIDATED_V);
        Self {
            signer,
            scheme: SignatureScheme::ContractPrevalidated,
            bytes,
            signed_at: Utc::now(),
        }
    }

    fn from_parts(signer: Address, scheme: SignatureScheme, compact: &[u8; 64], v: u8) -> Self {
        let mut bytes = Vec::with_capacity(SIGNATURE_LEN);
        bytes.extend_from_slice(compact);
        bytes.push(v);
        Self {
            signer,
            scheme,
            bytes,
            signed_at: Utc::now(),
        }
    }

    /// The encoded v byte; `None` on a malformed length
    pub fn v(&self) -> Option<u8> {
        (self.bytes.len() == SIGNATURE_LEN).then(|| self.bytes[SIGNATURE_LEN - 1])
    }

    /// The 64-byte r‖s body; `None` on a malformed length
    pub fn compact(&self) -> Option<[u8; 64]> {
        (self.bytes.len() == SIGNATURE_LEN).then(|| {
            let mut compact = [0u8; 64];
            compact.copy_from_slice(&self.bytes[..64]);
            compact
        })
    }

    /// The s component; `None` on a malformed length
    pub fn s(&self) -> Option<[u8; 32]> {
        (self.bytes.len() == SIGNATURE_LEN).then(|| {
            let mut s = [0u8; 32];
            s.copy_from_slice(&self.bytes[32..64]);
            s
        })
    }
}

/// Serde adapter storing signature bytes as 0x-prefixed hex
mod hex_sig {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        let stripped = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(stripped).map_err(serde::de::Error::custom)
    }
}
