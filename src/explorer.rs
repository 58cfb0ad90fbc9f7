//! Block-explorer log fetcher.
//!
//! Retrieves historical event logs through an explorer-style REST API
//! (`module=logs&action=getLogs`). Payload decoding is the caller's job; this
//! module returns raw logs only.

use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::config::RetryConfig;
use crate::constants::{DEFAULT_REQUEST_TIMEOUT, EXPLORER_PAGE};
use crate::error::{ResolverError, ResolverResult};
use crate::metrics::{EXPLORER_QUERIES_TOTAL, LABEL_OUTCOME};
use crate::registry::ChainDescriptor;
use crate::retry::{retry_op, RetryError};
use crate::rpc::RpcError;

/// An address/topic filter for an explorer log query.
#[derive(Debug, Clone)]
pub struct LogQuery {
    /// Contract address the logs were emitted by.
    pub address: Address,
    /// Event signature hash (topic 0).
    pub topic0: B256,
    /// Optional first indexed argument (topic 1).
    pub topic1: Option<B256>,
    /// Optional lower block bound.
    pub from_block: Option<u64>,
}

/// A raw event log as returned by the explorer API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerLog {
    /// Contract address that emitted the log.
    pub address: Address,
    /// Log topics; topic 0 is the event signature hash.
    pub topics: Vec<B256>,
    /// ABI-encoded, non-indexed event data.
    pub data: Bytes,
    /// Block the log was included in.
    #[serde(rename = "blockNumber", default, with = "alloy_serde::quantity::opt")]
    pub block_number: Option<u64>,
}

/// Wrapper shape of explorer API responses.
#[derive(Debug, Deserialize)]
struct ExplorerResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    result: Vec<ExplorerLog>,
}

/// A single failed fetch attempt.
#[derive(Debug, Error)]
enum FetchAttempt {
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("malformed body: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Interface for historical event-log retrieval.
#[async_trait]
pub trait ExplorerApi: Send + Sync {
    /// Fetches all logs matching the given filter.
    async fn fetch_logs(&self, query: LogQuery) -> ResolverResult<Vec<ExplorerLog>>;
}

/// Explorer API client backed by a REST endpoint.
#[derive(Debug, Clone)]
pub struct ExplorerClient {
    http: reqwest::Client,
    base: Url,
    api_key: String,
    retry: RetryConfig,
}

impl ExplorerClient {
    /// Creates a new client for the given explorer base URL.
    pub fn new(base: Url, api_key: Option<String>, retry: RetryConfig) -> ResolverResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                ResolverError::Rpc(RpcError::Connection(format!(
                    "failed to build HTTP client: {e}"
                )))
            })?;

        Ok(Self { http, base, api_key: api_key.unwrap_or_default(), retry })
    }

    /// Creates a client from a descriptor's explorer configuration.
    pub fn from_descriptor(
        descriptor: &ChainDescriptor,
        retry: RetryConfig,
    ) -> ResolverResult<Self> {
        let base = descriptor
            .explorer_api_url
            .clone()
            .ok_or(ResolverError::ExplorerNotConfigured { chain_id: descriptor.chain_id })?;
        Self::new(base, descriptor.explorer_api_key.clone(), retry)
    }

    fn query_params(&self, query: &LogQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("module", "logs".to_string()),
            ("action", "getLogs".to_string()),
            ("address", query.address.to_string()),
            ("topic0", query.topic0.to_string()),
        ];
        if let Some(topic1) = query.topic1 {
            params.push(("topic0_1_opr", "and".to_string()));
            params.push(("topic1", topic1.to_string()));
        }
        if let Some(from_block) = query.from_block {
            params.push(("fromBlock", from_block.to_string()));
        }
        params.push(("page", EXPLORER_PAGE.to_string()));
        params.push(("apikey", self.api_key.clone()));
        params
    }
}

#[async_trait]
impl ExplorerApi for ExplorerClient {
    async fn fetch_logs(&self, query: LogQuery) -> ResolverResult<Vec<ExplorerLog>> {
        let url = self.base.join("api").map_err(|e| ResolverError::ExplorerQueryFailed {
            status: None,
            message: format!("invalid explorer URL: {e}"),
        })?;
        let params = self.query_params(&query);

        let result = retry_op("explorer.getLogs", &self.retry, || async {
            let response = self.http.get(url.clone()).query(&params).send().await?;
            let status = response.status();
            let body = response.text().await?;
            if !status.is_success() {
                return Err(FetchAttempt::Status(status.as_u16()));
            }
            let parsed: ExplorerResponse = serde_json::from_str(&body)?;
            Ok(parsed)
        })
        .await;

        let outcome = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!(EXPLORER_QUERIES_TOTAL, LABEL_OUTCOME => outcome).increment(1);

        let response = result.map_err(|err| match err {
            RetryError::Exhausted { last_error: FetchAttempt::Status(status), attempts, .. } => {
                ResolverError::ExplorerQueryFailed {
                    status: Some(status),
                    message: format!("explorer returned status {status} after {attempts} attempts"),
                }
            }
            RetryError::Exhausted { last_error: FetchAttempt::Transport(e), attempts, .. } => {
                ResolverError::ExplorerQueryFailed {
                    status: None,
                    message: format!("transport failure after {attempts} attempts: {e}"),
                }
            }
            RetryError::Exhausted { last_error: FetchAttempt::Malformed(e), .. } => {
                ResolverError::ExplorerResponseMalformed { message: e.to_string() }
            }
            err @ RetryError::Rejected { .. } => ResolverError::from_retry(err),
        })?;

        tracing::debug!(
            address = %query.address,
            topic0 = %query.topic0,
            status = ?response.status,
            message = ?response.message,
            count = response.result.len(),
            "fetched explorer logs"
        );

        Ok(response.result)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use alloy_primitives::{address, b256};
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;

    fn fast_retry() -> RetryConfig {
        RetryConfig::default()
            .with_max_attempts(2)
            .with_initial_delay(Duration::from_millis(1))
            .with_max_delay(Duration::from_millis(2))
            .without_jitter()
    }

    fn client_for(server: &MockServer) -> ExplorerClient {
        let base = Url::parse(&server.base_url()).unwrap();
        ExplorerClient::new(base, Some("test-key".to_string()), fast_retry()).unwrap()
    }

    fn sample_query() -> LogQuery {
        LogQuery {
            address: address!("042b2e6c5e99d4c521bd49beed5e99651d9b0cf4"),
            topic0: b256!("901c3aee23cf4478825462caaab375c606ab83516060388344f0650340753630"),
            topic1: Some(B256::repeat_byte(0x11)),
            from_block: None,
        }
    }

    #[tokio::test]
    async fn test_fetch_logs_parses_result() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api")
                .query_param("module", "logs")
                .query_param("action", "getLogs")
                .query_param("page", "1")
                .query_param("apikey", "test-key");
            then.status(200).json_body(json!({
                "status": "1",
                "message": "OK",
                "result": [{
                    "address": "0x042b2e6c5e99d4c521bd49beed5e99651d9b0cf4",
                    "topics": [
                        "0x901c3aee23cf4478825462caaab375c606ab83516060388344f0650340753630"
                    ],
                    "data": "0xdeadbeef",
                    "blockNumber": "0x3e8"
                }]
            }));
        });

        let logs = client_for(&server).fetch_logs(sample_query()).await.unwrap();
        mock.assert();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].block_number, Some(1000));
        assert_eq!(logs[0].data.as_ref(), &[0xde, 0xad, 0xbe, 0xef]);
    }

    #[tokio::test]
    async fn test_non_success_status_fails_after_retries() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/api");
            then.status(502).body("bad gateway");
        });

        let err = client_for(&server).fetch_logs(sample_query()).await.unwrap_err();
        assert_eq!(mock.hits(), 2);
        assert!(matches!(err, ResolverError::ExplorerQueryFailed { status: Some(502), .. }));
    }

    #[tokio::test]
    async fn test_malformed_body_is_distinct() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api");
            then.status(200).body("{\"result\": \"Max rate limit reached\"}");
        });

        let err = client_for(&server).fetch_logs(sample_query()).await.unwrap_err();
        assert!(matches!(err, ResolverError::ExplorerResponseMalformed { .. }));
    }

    #[tokio::test]
    async fn test_topic1_filter_forwarded() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api")
                .query_param("topic0_1_opr", "and")
                .query_param(
                    "topic1",
                    "0x1111111111111111111111111111111111111111111111111111111111111111",
                );
            then.status(200).json_body(json!({ "result": [] }));
        });

        let logs = client_for(&server).fetch_logs(sample_query()).await.unwrap();
        mock.assert();
        assert!(logs.is_empty());
    }
}
