//! Deterministic batch digest construction
//!
//! Encodes a batch into the single domain-bound digest the on-chain
//! verifier re-derives before checking signatures. The encoding is
//! EIP-712-shaped: a domain separator binds chain id and contract, a
//! typed payload binds the batched calls and the nonce, and the two are
//! combined under the fixed 0x19 0x01 prefix. Any byte here that drifts
//! from the verifying contract's encoding produces digests the contract
//! will reject, so the type strings and field layout are pinned.

use thiserror::Error;

use crate::batch::call::{Call, Operation};
use crate::crypto::hash::{keccak256, keccak256_concat, pad32, u256_word};
use crate::crypto::Address;

/// A 32-byte batch digest
pub type Digest = [u8; 32];

/// EIP-712 domain type string; its hash is the fixed protocol version tag
/// mixed into every domain separator.
const DOMAIN_TYPE: &[u8] = b"EIP712Domain(uint256 chainId,address verifyingContract)";

/// Typed-payload type string for a batched transaction
const BATCH_TYPE: &[u8] = b"MultisigBatch(bytes transactions,uint256 nonce)";

/// Prefix marking structured data, per the verifier's convention
const STRUCTURED_DATA_PREFIX: [u8; 2] = [0x19, 0x01];

/// Errors raised while constructing a batch digest
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BatchError {
    #[error("Batch contains no calls")]
    EmptyBatch,
    #[error("Delegatecall to the zero address is not allowed")]
    UnsafeDelegateCall,
}

/// Immutable chain binding of a batch.
///
/// Changing any field changes the digest and invalidates every signature
/// collected so far.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChainContext {
    /// EIP-155 chain id
    pub chain_id: u64,
    /// Address of the verifying multisig contract
    pub contract: Address,
    /// Contract nonce the batch executes at
    pub nonce: u64,
}

/// Compute the domain separator binding a contract on one chain
pub fn domain_separator(chain_id: u64, contract: &Address) -> Digest {
    keccak256_concat(&[
        &keccak256(DOMAIN_TYPE),
        &u256_word(chain_id as u128),
        &pad32(contract.as_bytes()),
    ])
}

/// Pack the calls into the batched-call byte sequence.
///
/// Per call, in batch order:
/// `operation (1) ‖ target (20) ‖ value (32 BE) ‖ data length (32 BE) ‖ data`.
/// The verifier unpacks exactly this layout, so no separators and no
/// padding between entries.
pub fn encode_calls(calls: &[Call]) -> Result<Vec<u8>, BatchError> {
    if calls.is_empty() {
        return Err(BatchError::EmptyBatch);
    }
    let mut encoded = Vec::new();
    for call in calls {
        if call.operation == Operation::DelegateCall && call.target == Address::ZERO {
            return Err(BatchError::UnsafeDelegateCall);
        }
        encoded.push(call.operation.wire_value());
        encoded.extend_from_slice(call.target.as_bytes());
        encoded.extend_from_slice(&u256_word(call.value));
        encoded.extend_from_slice(&u256_word(call.data.len() as u128));
        encoded.extend_from_slice(&call.data);
    }
    Ok(encoded)
}

/// Compute the digest of a batch: pure, deterministic, no I/O.
///
/// `digest = keccak256(0x19 ‖ 0x01 ‖ domain ‖ payload)` where the payload
/// hash folds the batched-call bytes and the nonce under the batch type
/// hash. Rejects empty batches and delegatecalls to the zero address.
pub fn batch_digest(context: &ChainContext, calls: &[Call]) -> Result<Digest, BatchError> {
    let batched = encode_calls(calls)?;
    let payload = keccak256_concat(&[
        &keccak256(BATCH_TYPE),
        &keccak256(&batched),
        &u256_word(context.nonce as u128),
    ]);
    let domain = domain_separator(context.chain_id, &context.contract);
    Ok(keccak256_concat(&[
        &STRUCTURED_DATA_PREFIX,
        &domain,
        &payload,
    ]))
}

/// Format a digest as a 0x-prefixed hex string
pub fn digest_hex(digest: &Digest) -> String {
    format!("0x{}", hex::encode(digest))
}

/// Parse a digest from a 0x-prefixed hex string
pub fn parse_digest(s: &str) -> Option<Digest> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(stripped).ok()?;
    bytes.try_into().ok()
}
