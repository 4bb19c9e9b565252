//! Remote history log reached over calcsrv's HTTP API

use std::time::Duration;

use async_trait::async_trait;
use common::SuccessResponse;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::{ClearResponse, HistoryListResponse};
use crate::error::{HistoryError, Result};
use crate::log::{HistoryLog, HistoryPage};
use crate::record::{HistoryRecord, NewRecord};
use crate::stats::HistoryStats;

/// HTTP client for a remote history log
///
/// Every fault (connect error, timeout, non-2xx, undecodable body) is reported as
/// [`HistoryError::Transport`]; the one exception is a `404` on delete, which
/// means the remote never had the record.
#[derive(Debug, Clone)]
pub struct HttpHistoryLog {
    client: Client,
    base_url: String,
}

impl HttpHistoryLog {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HistoryError::transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/history{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| HistoryError::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HistoryError::transport(format!(
                "{} returned {}",
                response.url().path(),
                status
            )));
        }

        let envelope: SuccessResponse<T> = response
            .json()
            .await
            .map_err(|e| HistoryError::transport(format!("Malformed response: {}", e)))?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl HistoryLog for HttpHistoryLog {
    async fn list(&self, limit: usize, offset: usize) -> Result<HistoryPage> {
        let request = self
            .client
            .get(self.url(""))
            .query(&[("limit", limit), ("offset", offset)]);
        let listed: HistoryListResponse = self.send(request).await?;
        debug!("Fetched {} of {} remote records", listed.records.len(), listed.total);
        Ok(HistoryPage {
            records: listed.records,
            total: listed.total,
        })
    }

    async fn add(&self, record: HistoryRecord) -> Result<HistoryRecord> {
        let request = self.client.post(self.url("")).json(&NewRecord::from(&record));
        self.send(request).await
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let response = self
            .client
            .delete(self.url(&format!("/{}", id)))
            .send()
            .await
            .map_err(|e| HistoryError::transport(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(HistoryError::transport(format!(
                "Delete of {} returned {}",
                id, status
            ))),
        }
    }

    async fn clear(&self) -> Result<usize> {
        let cleared: ClearResponse = self.send(self.client.delete(self.url(""))).await?;
        Ok(cleared.removed)
    }

    async fn stats(&self) -> Result<HistoryStats> {
        self.send(self.client.get(self.url("/stats"))).await
    }
}
