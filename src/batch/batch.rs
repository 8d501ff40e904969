//! Batch assembly with a cached digest
//!
//! A `Batch` owns its chain context and call sequence and always carries
//! the digest matching its current contents: the constructor computes it
//! and every mutator recomputes it, so a stale cached digest cannot be
//! observed through this API.

use serde::{Deserialize, Serialize};

use crate::batch::call::Call;
use crate::batch::digest::{batch_digest, BatchError, ChainContext, Digest};

/// A non-empty, ordered sequence of calls bound to one chain context
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BatchSpec", into = "BatchSpec")]
pub struct Batch {
    context: ChainContext,
    calls: Vec<Call>,
    digest: Digest,
}

/// Wire form of a batch: the digest is derived, never transmitted.
/// Deserialization funnels through `Batch::new`, so a decoded batch
/// carries the same guarantees as a constructed one.
#[derive(Serialize, Deserialize)]
struct BatchSpec {
    context: ChainContext,
    calls: Vec<Call>,
}

impl TryFrom<BatchSpec> for Batch {
    type Error = BatchError;

    fn try_from(spec: BatchSpec) -> Result<Self, Self::Error> {
        Batch::new(spec.context, spec.calls)
    }
}

impl From<Batch> for BatchSpec {
    fn from(batch: Batch) -> Self {
        BatchSpec {
            context: batch.context,
            calls: batch.calls,
        }
    }
}

impl Batch {
    /// Build a batch and compute its digest.
    ///
    /// Fails with `EmptyBatch` on an empty call sequence and with
    /// `UnsafeDelegateCall` on a delegatecall to the zero address.
    pub fn new(context: ChainContext, calls: Vec<Call>) -> Result<Self, BatchError> {
        let digest = batch_digest(&context, &calls)?;
        Ok(Self {
            context,
            calls,
            digest,
        })
    }

    /// The chain context this batch is bound to
    pub fn context(&self) -> &ChainContext {
        &self.context
    }

    /// The calls in execution order
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// The digest of the current contents.
    ///
    /// Always matches `batch_digest(context, calls)`; every path into a
    /// `Batch` recomputes it, including deserialization.
    pub fn digest(&self) -> Digest {
        self.digest
    }

    /// Append a call, recomputing the digest.
    ///
    /// Previously collected signatures no longer match the new digest and
    /// must be discarded by the owner.
    pub fn push_call(&mut self, call: Call) -> Result<(), BatchError> {
        self.calls.push(call);
        match batch_digest(&self.context, &self.calls) {
            Ok(digest) => {
                self.digest = digest;
                Ok(())
            }
            Err(err) => {
                self.calls.pop();
                Err(err)
            }
        }
    }

    /// Rebind the batch to a different nonce, recomputing the digest
    pub fn set_nonce(&mut self, nonce: u64) -> Result<(), BatchError> {
        self.context.nonce = nonce;
        self.digest = batch_digest(&self.context, &self.calls)?;
        Ok(())
    }

    /// Number of calls
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// A batch is never empty once constructed; kept for API symmetry
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Address;

    fn context() -> ChainContext {
        ChainContext {
            chain_id: 1,
            contract: "0x266489bde85ff0dfe1ebf9f0a7e6fed3a973cec3".parse().unwrap(),
            nonce: 3,
        }
    }

    fn one_call() -> Call {
        Call::new(
            "0x00000000219ab540356cbb839cbe05303d7705fa".parse().unwrap(),
            vec![0x01, 0x02],
        )
    }

    #[test]
    fn test_constructor_rejects_empty() {
        assert_eq!(
            Batch::new(context(), vec![]).unwrap_err(),
            BatchError::EmptyBatch
        );
    }

    #[test]
    fn test_digest_cached_and_stable() {
        let batch = Batch::new(context(), vec![one_call()]).unwrap();
        assert_eq!(batch.digest(), batch.digest());
        assert_eq!(
            batch.digest(),
            batch_digest(&context(), batch.calls()).unwrap()
        );
    }

    #[test]
    fn test_push_call_changes_digest() {
        let mut batch = Batch::new(context(), vec![one_call()]).unwrap();
        let before = batch.digest();
        batch.push_call(one_call().with_value(9)).unwrap();
        assert_ne!(before, batch.digest());
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_push_unsafe_call_rolls_back() {
        let mut batch = Batch::new(context(), vec![one_call()]).unwrap();
        let before = batch.digest();
        let err = batch
            .push_call(Call::new(Address::ZERO, vec![]).delegate())
            .unwrap_err();
        assert_eq!(err, BatchError::UnsafeDelegateCall);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.digest(), before);
    }

    #[test]
    fn test_set_nonce_changes_digest() {
        let mut batch = Batch::new(context(), vec![one_call()]).unwrap();
        let before = batch.digest();
        batch.set_nonce(4).unwrap();
        assert_ne!(before, batch.digest());
        assert_eq!(batch.context().nonce, 4);
    }

    #[test]
    fn test_serde_round_trip_recomputes_digest() {
        let batch = Batch::new(context(), vec![one_call()]).unwrap();
        let json = serde_json::to_string(&batch).unwrap();
        let back: Batch = serde_json::from_str(&json).unwrap();
        assert_eq!(back.digest(), batch.digest());
    }
}
