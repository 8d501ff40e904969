//! Local-key signing backend

use async_trait::async_trait;

use crate::batch::Digest;
use crate::crypto::hash::personal_message_hash;
use crate::crypto::{Address, KeyPair};
use crate::signature::Signature;
use crate::signer::{Signer, SignerError};

/// Signs with an in-process secp256k1 key.
///
/// Produces direct ECDSA signatures by default. `with_eth_sign` switches
/// to the personal-message-prefixed scheme for parity with backends that
/// refuse to sign a raw 32-byte digest; the two modes produce different
/// bytes and different v markers but validate to the same address.
#[derive(Clone)]
pub struct LocalSigner {
    keypair: KeyPair,
    eth_sign: bool,
}

impl LocalSigner {
    /// Wrap a key pair, signing raw digests
    pub fn new(keypair: KeyPair) -> Self {
        Self {
            keypair,
            eth_sign: false,
        }
    }

    /// Create from a hex-encoded private key
    pub fn from_private_key_hex(hex_key: &str) -> Result<Self, SignerError> {
        Ok(Self::new(KeyPair::from_private_key_hex(hex_key)?))
    }

    /// Sign the personal-message-prefixed digest instead of the raw one
    pub fn with_eth_sign(mut self) -> Self {
        self.eth_sign = true;
        self
    }
}

#[async_trait]
impl Signer for LocalSigner {
    fn address(&self) -> Address {
        self.keypair.address()
    }

    async fn sign(&self, digest: &Digest) -> Result<Signature, SignerError> {
        let signer = self.keypair.address();
        if self.eth_sign {
            let prefixed = personal_message_hash(digest);
            let (compact, rec_id) = self.keypair.sign_digest(&prefixed)?;
            log::debug!("signed digest (eth_sign) as {}", signer);
            Ok(Signature::eth_sign(signer, &compact, rec_id))
        } else {
            let (compact, rec_id) = self.keypair.sign_digest(digest)?;
            log::debug!("signed digest as {}", signer);
            Ok(Signature::eoa(signer, &compact, rec_id))
        }
    }
}
