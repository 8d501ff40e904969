//! Remote signing service backend
//!
//! Speaks a minimal JSON protocol to an HTTP signing service (hardware
//! wallets and custodial keys typically sit behind one). The service
//! receives the digest and the address to sign as, and answers with the
//! 65-byte signature in hex; the scheme is read back off the encoded v.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::batch::{digest_hex, Digest};
use crate::crypto::Address;
use crate::signature::{Signature, SignatureScheme, SIGNATURE_LEN};
use crate::signer::{Signer, SignerError};

/// Signs by delegating to a remote HTTP signing service
#[derive(Clone)]
pub struct HttpSigner {
    client: reqwest::Client,
    endpoint: String,
    address: Address,
}

#[derive(Serialize)]
struct SignRequest<'a> {
    address: Address,
    digest: &'a str,
}

#[derive(Deserialize)]
struct SignResponse {
    signature: String,
}

impl HttpSigner {
    /// Point at a signing service endpoint, signing as `address`
    pub fn new(endpoint: impl Into<String>, address: Address) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            address,
        }
    }

    fn parse_signature(&self, raw: &str) -> Result<Signature, SignerError> {
        let stripped = raw.strip_prefix("0x").unwrap_or(raw);
        let bytes = hex::decode(stripped)
            .map_err(|e| SignerError::Unavailable(format!("undecodable signature: {e}")))?;
        if bytes.len() != SIGNATURE_LEN {
            return Err(SignerError::Unavailable(format!(
                "signature of {} bytes from service",
                bytes.len()
            )));
        }
        let scheme = SignatureScheme::from_v(bytes[SIGNATURE_LEN - 1]).ok_or_else(|| {
            SignerError::Unavailable(format!("unknown v marker {}", bytes[SIGNATURE_LEN - 1]))
        })?;
        Ok(Signature {
            signer: self.address,
            scheme,
            bytes,
            signed_at: Utc::now(),
        })
    }
}

#[async_trait]
impl Signer for HttpSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign(&self, digest: &Digest) -> Result<Signature, SignerError> {
        let digest_str = digest_hex(digest);
        let request = SignRequest {
            address: self.address,
            digest: &digest_str,
        };
        log::debug!("requesting signature from {} as {}", self.endpoint, self.address);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| SignerError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            // The service understood us and said no: user denied on the
            // device, key locked, policy refusal.
            let body = response.text().await.unwrap_or_default();
            return Err(SignerError::Rejected(format!("{status}: {body}")));
        }
        if !status.is_success() {
            return Err(SignerError::Unavailable(format!("service returned {status}")));
        }

        let body: SignResponse = response
            .json()
            .await
            .map_err(|e| SignerError::Unavailable(format!("invalid response: {e}")))?;
        self.parse_signature(&body.signature)
    }
}
