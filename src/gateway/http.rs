//! HTTP implementation of the queue-service gateway

use async_trait::async_trait;
use serde::Deserialize;

use crate::crypto::Address;
use crate::gateway::{GatewayError, PendingBatch, ProposalId, QueueGateway, SubmitRequest};

/// REST client for a transaction-queue service
#[derive(Clone)]
pub struct HttpQueueGateway {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct SubmitResponse {
    proposal_id: ProposalId,
}

impl HttpQueueGateway {
    /// Point at a queue service, e.g. `https://queue.example.org`
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    fn batches_url(&self, chain_id: u64, contract: &Address) -> String {
        format!(
            "{}/v1/chains/{}/contracts/{}/batches",
            self.base_url, chain_id, contract
        )
    }

    /// Map an HTTP response status onto the gateway error split: client
    /// errors are rejections (retrying the identical request is
    /// pointless), everything else transient unavailability.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        if status.is_client_error() {
            Err(GatewayError::Rejected(format!("{status}: {body}")))
        } else {
            Err(GatewayError::Unavailable(format!("{status}: {body}")))
        }
    }
}

#[async_trait]
impl QueueGateway for HttpQueueGateway {
    async fn submit(&self, request: &SubmitRequest) -> Result<ProposalId, GatewayError> {
        let url = self.batches_url(request.chain_id, &request.contract);
        log::info!(
            "submitting batch of {} call(s) with {} signature(s) to {}",
            request.batch.len(),
            request.signatures.len(),
            url
        );

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;
        let body: SubmitResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| GatewayError::Unavailable(format!("invalid response: {e}")))?;

        log::info!("queue service accepted proposal {}", body.proposal_id);
        Ok(body.proposal_id)
    }

    async fn fetch_pending(
        &self,
        chain_id: u64,
        contract: &Address,
    ) -> Result<Vec<PendingBatch>, GatewayError> {
        let url = format!("{}/pending", self.batches_url(chain_id, contract));
        log::debug!("fetching pending batches from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;
        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| GatewayError::Unavailable(format!("invalid response: {e}")))
    }

    async fn delete(&self, proposal_id: &ProposalId) -> Result<(), GatewayError> {
        let url = format!("{}/v1/batches/{}", self.base_url, proposal_id);
        log::info!("withdrawing proposal {}", proposal_id);

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;
        Self::check(response).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalization() {
        let gateway = HttpQueueGateway::new("https://queue.example.org///");
        let contract: Address = "0x266489bde85ff0dfe1ebf9f0a7e6fed3a973cec3".parse().unwrap();
        assert_eq!(
            gateway.batches_url(42161, &contract),
            "https://queue.example.org/v1/chains/42161/contracts/0x266489bde85ff0dfe1ebf9f0a7e6fed3a973cec3/batches"
        );
    }
}
