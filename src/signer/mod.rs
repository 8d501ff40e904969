//! Polymorphic signing backends
//!
//! A `Signer` is an external capability that produces a signature over a
//! batch digest and exposes its claimed address. Backends vary: a local
//! secp256k1 key, a remote signing service (hardware wallets sit behind
//! one), or an on-chain pre-approval that needs no cryptography at all.
//! The aggregator never trusts the claim; every produced signature still
//! goes through the validator.

pub mod local;
pub mod prevalidated;
pub mod remote;

use async_trait::async_trait;
use thiserror::Error;

use crate::batch::Digest;
use crate::crypto::{Address, KeyError};
use crate::signature::Signature;

pub use local::LocalSigner;
pub use prevalidated::PrevalidatedSigner;
pub use remote::HttpSigner;

/// Errors raised by signing backends
#[derive(Error, Debug)]
pub enum SignerError {
    #[error("Signer unavailable: {0}")]
    Unavailable(String),
    #[error("Signer rejected the request: {0}")]
    Rejected(String),
    #[error("Key error: {0}")]
    Key(#[from] KeyError),
}

/// A capability that signs 32-byte digests.
///
/// Signing is the suspension point of the pipeline (network or hardware
/// I/O); implementations must be shareable across tasks so independent
/// signers can be driven concurrently.
#[async_trait]
pub trait Signer: Send + Sync {
    /// The 20-byte address this backend signs as
    fn address(&self) -> Address;

    /// Sign a batch digest
    async fn sign(&self, digest: &Digest) -> Result<Signature, SignerError>;
}
