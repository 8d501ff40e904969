//! Proposal lifecycle and signature aggregation
//!
//! A proposal owns one batch and the signature set accumulating over its
//! digest, merges signatures from independent signers into the canonical
//! accepted order, and gates the lifecycle transitions: Draft through
//! Collecting to Ready once the threshold is met, Submitted after the
//! queue service accepts it, then Executed or Deleted (both terminal).
//!
//! All mutation goes through `&mut self`, so the validate-then-insert
//! sequence can never interleave for one proposal; concurrent signers are
//! expected, the merge point is serialized by the borrow checker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::batch::{Batch, Digest};
use crate::crypto::Address;
use crate::gateway::{GatewayError, PendingBatch, ProposalId, QueueGateway, SubmitRequest};
use crate::signature::{validate, Signature, ValidationError};

/// Lifecycle states of a proposal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    /// Created, no signatures yet
    Draft,
    /// At least one valid signature, below threshold
    Collecting,
    /// Threshold met, submittable
    Ready,
    /// Accepted by the queue service
    Submitted,
    /// Confirmed executed on-chain (terminal)
    Executed,
    /// Withdrawn (terminal)
    Deleted,
}

impl ProposalStatus {
    /// Terminal states admit no further transition
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProposalStatus::Executed | ProposalStatus::Deleted)
    }
}

/// Errors raised by proposal operations
#[derive(Error, Debug)]
pub enum ProposalError {
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(usize),
    #[error("Conflicting signature for signer {0}")]
    ConflictingSignature(Address),
    #[error("Proposal finalized (status {0:?})")]
    ProposalFinalized(ProposalStatus),
    #[error("Insufficient signatures: have {have}, need {need}")]
    InsufficientSignatures { have: usize, need: usize },
    #[error("Invalid transition from status {0:?}")]
    InvalidTransition(ProposalStatus),
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

/// A batch plus its accumulating signature set and lifecycle status.
///
/// The signature set is keyed by signer address; iteration order of the
/// map is already the canonical submission order (ascending address
/// bytes), so ordering is a property of reads and nothing is ever
/// re-sorted in place.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Proposal {
    batch: Batch,
    signatures: BTreeMap<Address, Signature>,
    threshold: usize,
    status: ProposalStatus,
    proposal_id: Option<ProposalId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Proposal {
    /// Wrap a batch into a draft proposal
    pub fn new(batch: Batch, threshold: usize) -> Result<Self, ProposalError> {
        if threshold == 0 {
            return Err(ProposalError::InvalidThreshold(threshold));
        }
        let now = Utc::now();
        Ok(Self {
            batch,
            signatures: BTreeMap::new(),
            threshold,
            status: ProposalStatus::Draft,
            proposal_id: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Seed a draft from a batch the queue service already holds
    pub fn from_pending(pending: PendingBatch, threshold: usize) -> Result<Self, ProposalError> {
        let mut proposal = Self::new(pending.batch, threshold)?;
        proposal.proposal_id = Some(pending.proposal_id);
        Ok(proposal)
    }

    /// The owned batch
    pub fn batch(&self) -> &Batch {
        &self.batch
    }

    /// Digest the collected signatures are bound to
    pub fn digest(&self) -> Digest {
        self.batch.digest()
    }

    /// Current lifecycle status
    pub fn status(&self) -> ProposalStatus {
        self.status
    }

    /// Required number of distinct valid signatures
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Queue-service id, present once submitted (or seeded from pending)
    pub fn proposal_id(&self) -> Option<&ProposalId> {
        self.proposal_id.as_ref()
    }

    /// Number of accepted signatures
    pub fn signature_count(&self) -> usize {
        self.signatures.len()
    }

    /// Signers that have already been accepted
    pub fn signed_by(&self) -> Vec<Address> {
        self.signatures.keys().copied().collect()
    }

    /// True once the signature count meets the threshold
    pub fn is_ready(&self) -> bool {
        self.signatures.len() >= self.threshold
    }

    /// Signatures in the canonical submission order: strictly ascending
    /// by signer address, no duplicates. The verifying contract demands
    /// exactly this order, so it is part of the external contract, not a
    /// formatting choice. Pure read; stored state is never reordered.
    pub fn ordered_signatures(&self) -> Vec<&Signature> {
        self.signatures.values().collect()
    }

    /// Validate and merge one signature.
    ///
    /// Idempotent for an identical duplicate. A different byte string for
    /// an already-present signer fails with `ConflictingSignature`: a
    /// changed signature for the same (signer, digest) means signer
    /// inconsistency and is never silently overwritten. Fails with
    /// `ProposalFinalized` once submitted or terminal. `approved` is the
    /// allow-set for pre-validated signatures.
    pub fn add_signature(
        &mut self,
        signature: Signature,
        approved: &BTreeSet<Address>,
    ) -> Result<(), ProposalError> {
        if matches!(self.status, ProposalStatus::Submitted) || self.status.is_terminal() {
            return Err(ProposalError::ProposalFinalized(self.status));
        }

        // Validation binds the signature to the batch's current digest;
        // anything signed over a stale digest fails here.
        let signer = validate(&self.digest(), &signature, approved)?;

        if let Some(existing) = self.signatures.get(&signer) {
            if existing.bytes == signature.bytes {
                log::debug!("duplicate signature from {}, no-op", signer);
                return Ok(());
            }
            return Err(ProposalError::ConflictingSignature(signer));
        }

        self.signatures.insert(signer, signature);
        self.updated_at = Utc::now();
        self.status = if self.is_ready() {
            ProposalStatus::Ready
        } else {
            ProposalStatus::Collecting
        };
        log::info!(
            "accepted signature from {} ({}/{} collected, status {:?})",
            signer,
            self.signatures.len(),
            self.threshold,
            self.status
        );
        Ok(())
    }

    /// Hand the batch and its ordered signatures to the queue service.
    ///
    /// Requires `Ready`. On gateway failure the proposal stays `Ready`
    /// and the error surfaces; the caller may retry without collecting
    /// anything again.
    pub async fn submit(
        &mut self,
        gateway: &dyn QueueGateway,
    ) -> Result<ProposalId, ProposalError> {
        match self.status {
            ProposalStatus::Ready => {}
            ProposalStatus::Submitted | ProposalStatus::Executed | ProposalStatus::Deleted => {
                return Err(ProposalError::ProposalFinalized(self.status));
            }
            ProposalStatus::Draft | ProposalStatus::Collecting => {
                return Err(ProposalError::InsufficientSignatures {
                    have: self.signatures.len(),
                    need: self.threshold,
                });
            }
        }

        let request = SubmitRequest {
            chain_id: self.batch.context().chain_id,
            contract: self.batch.context().contract,
            batch: self.batch.clone(),
            signatures: self.ordered_signatures().into_iter().cloned().collect(),
        };
        let proposal_id = gateway.submit(&request).await?;

        self.status = ProposalStatus::Submitted;
        self.proposal_id = Some(proposal_id.clone());
        self.updated_at = Utc::now();
        Ok(proposal_id)
    }

    /// Record external confirmation that the batch executed on-chain
    pub fn mark_executed(&mut self) -> Result<(), ProposalError> {
        if self.status != ProposalStatus::Submitted {
            return Err(ProposalError::InvalidTransition(self.status));
        }
        self.status = ProposalStatus::Executed;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Withdraw the proposal.
    ///
    /// Purely local unless submitted, in which case the queue service is
    /// told to withdraw first; a gateway failure leaves the proposal
    /// `Submitted`. Idempotent once `Deleted`; an executed proposal can
    /// no longer be deleted.
    pub async fn delete(&mut self, gateway: &dyn QueueGateway) -> Result<(), ProposalError> {
        match self.status {
            ProposalStatus::Deleted => return Ok(()),
            ProposalStatus::Executed => {
                return Err(ProposalError::ProposalFinalized(self.status));
            }
            ProposalStatus::Submitted => {
                if let Some(proposal_id) = &self.proposal_id {
                    gateway.delete(proposal_id).await?;
                }
            }
            ProposalStatus::Draft | ProposalStatus::Collecting | ProposalStatus::Ready => {}
        }
        self.status = ProposalStatus::Deleted;
        self.updated_at = Utc::now();
        log::info!("proposal deleted");
        Ok(())
    }
}
