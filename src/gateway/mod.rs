//! Remote transaction-queue service interface
//!
//! The queue service stores proposed batches while their signatures are
//! collected out-of-band and hands them to executors once ready. The core
//! only needs this narrow contract: submit a ready batch with its ordered
//! signatures, list pending batches for a contract, withdraw by id.
//! Gateway failures leave the caller's proposal untouched so a retry
//! needs no re-collection; the core itself never retries.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::batch::Batch;
use crate::crypto::Address;
use crate::signature::Signature;

pub use http::HttpQueueGateway;

/// Errors raised by queue-service calls
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Queue service unavailable: {0}")]
    Unavailable(String),
    #[error("Queue service rejected the request: {0}")]
    Rejected(String),
}

/// Opaque id the queue service assigns to an accepted proposal
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProposalId(pub String);

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A ready batch plus its canonically ordered signatures
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub chain_id: u64,
    pub contract: Address,
    pub batch: Batch,
    /// Strictly ascending by signer address, no duplicates
    pub signatures: Vec<Signature>,
}

/// A batch the queue service holds for a contract, awaiting signatures
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PendingBatch {
    pub proposal_id: ProposalId,
    pub batch: Batch,
}

/// Submit, list, and withdraw batches on the remote queue service
#[async_trait]
pub trait QueueGateway: Send + Sync {
    /// Hand over a ready batch; returns the assigned proposal id.
    /// Re-submitting the same batch must be idempotent service-side.
    async fn submit(&self, request: &SubmitRequest) -> Result<ProposalId, GatewayError>;

    /// Batches queued for a contract, used to seed new drafts
    async fn fetch_pending(
        &self,
        chain_id: u64,
        contract: &Address,
    ) -> Result<Vec<PendingBatch>, GatewayError>;

    /// Withdraw a previously submitted proposal
    async fn delete(&self, proposal_id: &ProposalId) -> Result<(), GatewayError>;
}
