//! Batch construction and digest derivation
//!
//! A batch is an ordered, non-empty sequence of calls bound to one
//! {chain id, contract, nonce} context. This module owns the digest
//! construction that the on-chain verifier re-derives; everything
//! downstream (signing, validation, aggregation) operates on that digest.

pub mod batch;
pub mod call;
pub mod digest;

pub use batch::Batch;
pub use call::{Call, Operation};
pub use digest::{
    batch_digest, digest_hex, domain_separator, encode_calls, parse_digest, BatchError,
    ChainContext, Digest,
};
