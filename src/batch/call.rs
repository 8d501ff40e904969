//! Individual contract calls inside a batch

use serde::{Deserialize, Serialize};

use crate::crypto::Address;

/// How the multisig contract dispatches a call
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Regular CALL
    Call,
    /// DELEGATECALL executing in the multisig's own storage context
    DelegateCall,
}

impl Operation {
    /// Wire value hashed into the batched-call byte sequence
    pub fn wire_value(&self) -> u8 {
        match self {
            Operation::Call => 0,
            Operation::DelegateCall => 1,
        }
    }

    fn default_call() -> Self {
        Operation::Call
    }
}

/// A single call to be executed as part of a batch.
///
/// Batches execute their calls in sequence, so the position of a call is
/// semantically significant and is part of the hashed payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    /// Call target
    pub target: Address,
    /// Native value forwarded with the call, in wei
    #[serde(default)]
    pub value: u128,
    /// Calldata
    #[serde(with = "hex_bytes", default)]
    pub data: Vec<u8>,
    /// Dispatch mode
    #[serde(default = "Operation::default_call")]
    pub operation: Operation,
}

impl Call {
    /// A plain CALL with calldata and no value
    pub fn new(target: Address, data: Vec<u8>) -> Self {
        Self {
            target,
            value: 0,
            data,
            operation: Operation::Call,
        }
    }

    /// Set the forwarded value
    pub fn with_value(mut self, value: u128) -> Self {
        self.value = value;
        self
    }

    /// Switch the dispatch mode to DELEGATECALL
    pub fn delegate(mut self) -> Self {
        self.operation = Operation::DelegateCall;
        self
    }
}

/// Serde adapter storing byte sequences as 0x-prefixed hex strings
mod hex_bytes {
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
