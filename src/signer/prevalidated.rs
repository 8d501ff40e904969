//! Pre-validated (on-chain approval) signing backend

use async_trait::async_trait;

use crate::batch::Digest;
use crate::crypto::Address;
use crate::signature::Signature;
use crate::signer::{Signer, SignerError};

/// Represents a signer whose approval lives on-chain.
///
/// Produces the sentinel signature only; whether the address has actually
/// approved the digest is established by the allow-set handed to the
/// validator, not by anything this type can check offline.
#[derive(Clone, Copy, Debug)]
pub struct PrevalidatedSigner {
    address: Address,
}

impl PrevalidatedSigner {
    pub fn new(address: Address) -> Self {
        Self { address }
    }
}

#[async_trait]
impl Signer for PrevalidatedSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign(&self, _digest: &Digest) -> Result<Signature, SignerError> {
        Ok(Signature::prevalidated(self.address))
    }
}
