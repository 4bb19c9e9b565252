//! Remote evaluator capability and its calcsrv client

use std::time::Duration;

use async_trait::async_trait;
use calc_engine::Value;
use common::{ErrorResponse, SuccessResponse};
use reqwest::Client;
use tracing::debug;

use crate::api::{CalculateRequest, CalculateResponse};
use crate::error::RemoteError;

/// Evaluator reached out of process
///
/// Only the raw [`Value`] is consumed; formatting stays with the pipeline so
/// local and remote results render identically.
#[async_trait]
pub trait RemoteEvaluator: Send + Sync {
    async fn evaluate(&self, expression: &str) -> Result<Value, RemoteError>;
}

/// calcsrv `/api/calculator/calculate` client
#[derive(Debug, Clone)]
pub struct HttpRemoteEvaluator {
    client: Client,
    base_url: String,
}

impl HttpRemoteEvaluator {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl RemoteEvaluator for HttpRemoteEvaluator {
    async fn evaluate(&self, expression: &str) -> Result<Value, RemoteError> {
        let url = format!("{}/api/calculator/calculate", self.base_url);
        let body = CalculateRequest {
            expression: expression.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RemoteError::Transport(format!("request to {} timed out", url))
                } else {
                    RemoteError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            // Prefer the service's own message when the error envelope decodes
            let message = match response.json::<ErrorResponse>().await {
                Ok(envelope) => envelope.error.message,
                Err(_) => status.to_string(),
            };
            return Err(RemoteError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: SuccessResponse<CalculateResponse> = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        debug!(
            "Remote evaluated '{}' -> {}",
            envelope.data.expression, envelope.data.result
        );
        Ok(envelope.data.value)
    }
}
