//! safe-batcher: off-chain assembly and threshold-signature collection
//! for multisig transaction batches
//!
//! This crate provides:
//! - Deterministic batch digests binding calls to a chain, contract, and
//!   nonce, bit-exact with the on-chain verifier's recomputation
//! - Polymorphic signing backends (local key, remote service, on-chain
//!   pre-approval)
//! - Signature validation with address recovery, malleability guards,
//!   and scheme classification from the encoded v byte
//! - Proposal lifecycle management: canonical signature ordering,
//!   threshold tracking, submission to a remote transaction queue
//!
//! # Example
//!
//! ```rust
//! use safe_batcher::batch::{Batch, Call, ChainContext};
//! use safe_batcher::crypto::KeyPair;
//! use safe_batcher::proposal::Proposal;
//! use safe_batcher::signature::Signature;
//! use std::collections::BTreeSet;
//!
//! let context = ChainContext {
//!     chain_id: 42161,
//!     contract: "0x266489bde85ff0dfe1ebf9f0a7e6fed3a973cec3".parse().unwrap(),
//!     nonce: 0,
//! };
//! let target = "0x00000000219ab540356cbb839cbe05303d7705fa".parse().unwrap();
//! let batch = Batch::new(context, vec![Call::new(target, vec![0xa9, 0x05, 0x9c, 0xbb])]).unwrap();
//!
//! let mut proposal = Proposal::new(batch, 1).unwrap();
//! let keypair = KeyPair::generate();
//! let (compact, rec_id) = keypair.sign_digest(&proposal.digest()).unwrap();
//! let signature = Signature::eoa(keypair.address(), &compact, rec_id);
//!
//! proposal.add_signature(signature, &BTreeSet::new()).unwrap();
//! assert!(proposal.is_ready());
//! ```

pub mod batch;
pub mod cli;
pub mod crypto;
pub mod gateway;
pub mod proposal;
pub mod signature;
pub mod signer;

// Re-export commonly used types
pub use batch::{Batch, BatchError, Call, ChainContext, Digest, Operation};
pub use crypto::{Address, KeyPair};
pub use gateway::{GatewayError, HttpQueueGateway, PendingBatch, ProposalId, QueueGateway};
pub use proposal::{Proposal, ProposalError, ProposalStatus};
pub use signature::{Signature, SignatureScheme, ValidationError};
pub use signer::{HttpSigner, LocalSigner, PrevalidatedSigner, Signer, SignerError};
