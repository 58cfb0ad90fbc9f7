//! Beacon chain client.
//!
//! Two independent entry points: the beacon root embedded in the source
//! chain's latest execution block (the oracle lookup key for cross-chain
//! beacon-root attestation), and full signed beacon blocks fetched from a
//! Beacon API node for validator-root based proofs.

mod consensus;

pub use consensus::{BeaconBlockMessage, SignedBeaconBlock};

use std::sync::Arc;

use alloy_primitives::B256;
use reqwest::{header::ACCEPT, StatusCode};
use tracing::debug;
use url::Url;

use crate::config::RetryConfig;
use crate::constants::DEFAULT_REQUEST_TIMEOUT;
use crate::error::{ResolverError, ResolverResult};
use crate::metrics::{BEACON_FETCHES_TOTAL, LABEL_OUTCOME};
use crate::retry::{retry_op_with, RetryError};
use crate::rpc::{EthClient, RpcError};

/// The beacon root carried by an execution block, with the timestamp used as
/// the oracle lookup key on the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeaconRootSnapshot {
    /// Parent beacon root embedded in the execution block header.
    pub beacon_root: B256,
    /// Timestamp of the execution block carrying that root.
    pub reference_timestamp: u64,
}

/// One observed Beacon API response, before status handling.
#[derive(Debug)]
struct BeaconResponse {
    status: StatusCode,
    version: Option<String>,
    body: Vec<u8>,
}

/// Beacon chain client over a Beacon API node and the source chain's
/// execution RPC.
#[allow(missing_debug_implementations)]
pub struct BeaconChainClient {
    http: reqwest::Client,
    endpoint: Url,
    source: Arc<dyn EthClient>,
    retry: RetryConfig,
}

impl BeaconChainClient {
    /// Creates a new client for the given Beacon API endpoint.
    pub fn new(
        endpoint: Url,
        source: Arc<dyn EthClient>,
        retry: RetryConfig,
    ) -> ResolverResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                ResolverError::Rpc(RpcError::Connection(format!(
                    "failed to build HTTP client: {e}"
                )))
            })?;
        Ok(Self { http, endpoint, source, retry })
    }

    /// Returns the parent beacon root of the source chain's latest execution
    /// block, together with that block's timestamp.
    pub async fn current_beacon_root(&self) -> ResolverResult<BeaconRootSnapshot> {
        let block = self.source.block_by_number(None).await?;
        let header = &block.header;

        let beacon_root = header.parent_beacon_block_root.ok_or(
            ResolverError::BeaconRootUnavailable { block_number: header.number },
        )?;

        debug!(number = header.number, %beacon_root, "read current beacon root");
        Ok(BeaconRootSnapshot { beacon_root, reference_timestamp: header.timestamp })
    }

    /// Fetches and decodes the signed beacon block for the given slot or tag,
    /// returning its message.
    ///
    /// A 404 is terminal and never retried: the slot does not exist yet or
    /// was pruned. Any other non-success status is treated as transient and
    /// retried up to the policy limit.
    pub async fn beacon_block(&self, tag: &str) -> ResolverResult<BeaconBlockMessage> {
        let url = self
            .endpoint
            .join(&format!("eth/v2/beacon/blocks/{tag}"))
            .map_err(|e| ResolverError::BeaconFetchFailed {
                tag: tag.to_string(),
                message: format!("invalid beacon URL: {e}"),
            })?;

        let result = retry_op_with(
            "beacon.getBlock",
            &self.retry,
            || async {
                let response = self
                    .http
                    .get(url.clone())
                    .header(ACCEPT, "application/octet-stream")
                    .send()
                    .await?;
                let status = response.status();
                let version = response
                    .headers()
                    .get("Eth-Consensus-Version")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_owned);
                let body = response.bytes().await?.to_vec();
                Ok::<_, reqwest::Error>(BeaconResponse { status, version, body })
            },
            |response: &BeaconResponse| {
                response.status == StatusCode::OK || response.status == StatusCode::NOT_FOUND
            },
        )
        .await;

        let outcome = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!(BEACON_FETCHES_TOTAL, LABEL_OUTCOME => outcome).increment(1);

        let response = result.map_err(|err| match err {
            RetryError::Exhausted { attempts, last_error, .. } => ResolverError::BeaconFetchFailed {
                tag: tag.to_string(),
                message: format!("transport failure after {attempts} attempts: {last_error}"),
            },
            RetryError::Rejected { attempts, last, .. } => ResolverError::BeaconFetchFailed {
                tag: tag.to_string(),
                message: format!("status {} after {attempts} attempts", last.status),
            },
        })?;

        if response.status == StatusCode::NOT_FOUND {
            return Err(ResolverError::BeaconBlockMissing { tag: tag.to_string() });
        }

        let version = response.version.ok_or_else(|| ResolverError::UnsupportedFork {
            version: "(no Eth-Consensus-Version header)".to_string(),
        })?;

        let message =
            consensus::decode_signed_beacon_block(&version, &response.body)?.into_message();
        debug!(tag, %version, slot = message.slot(), "fetched beacon block");

        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use ethereum_consensus::deneb;
    use ethereum_consensus::ssz::prelude::serialize;
    use httpmock::prelude::*;

    use super::*;
    use crate::test_utils::{test_block_with_beacon_root, MockEthClient};

    fn fast_retry() -> RetryConfig {
        RetryConfig::default()
            .with_max_attempts(3)
            .with_initial_delay(Duration::from_millis(1))
            .with_max_delay(Duration::from_millis(2))
            .without_jitter()
    }

    fn client_for(server: &MockServer, source: MockEthClient) -> BeaconChainClient {
        let endpoint = Url::parse(&server.base_url()).unwrap();
        BeaconChainClient::new(endpoint, Arc::new(source), fast_retry()).unwrap()
    }

    #[tokio::test]
    async fn test_current_beacon_root() {
        let root = B256::repeat_byte(0xBE);
        let source = MockEthClient::default()
            .with_latest(100)
            .with_block(test_block_with_beacon_root(100, B256::repeat_byte(0x01), root, 1_234));
        let server = MockServer::start();

        let snapshot = client_for(&server, source).current_beacon_root().await.unwrap();
        assert_eq!(snapshot.beacon_root, root);
        assert_eq!(snapshot.reference_timestamp, 1_234);
    }

    #[tokio::test]
    async fn test_current_beacon_root_pre_fork_block() {
        let source = MockEthClient::default()
            .with_latest(100)
            .with_block(crate::test_utils::test_block(100, B256::repeat_byte(0x01)));
        let server = MockServer::start();

        let err = client_for(&server, source).current_beacon_root().await.unwrap_err();
        assert!(matches!(err, ResolverError::BeaconRootUnavailable { block_number: 100 }));
    }

    #[tokio::test]
    async fn test_missing_block_is_terminal_without_retry() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/eth/v2/beacon/blocks/12345");
            then.status(404);
        });

        let client = client_for(&server, MockEthClient::default());
        let err = client.beacon_block("12345").await.unwrap_err();

        assert_eq!(mock.hits(), 1);
        assert!(matches!(err, ResolverError::BeaconBlockMissing { tag } if tag == "12345"));
    }

    #[tokio::test]
    async fn test_server_errors_are_retried_then_fatal() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/eth/v2/beacon/blocks/head");
            then.status(503);
        });

        let client = client_for(&server, MockEthClient::default());
        let err = client.beacon_block("head").await.unwrap_err();

        assert_eq!(mock.hits(), 3);
        assert!(matches!(err, ResolverError::BeaconFetchFailed { .. }));
    }

    #[tokio::test]
    async fn test_fetches_and_decodes_block() {
        let mut block = deneb::mainnet::SignedBeaconBlock::default();
        block.message.slot = 7777;
        let encoded = serialize(&block).unwrap();

        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/eth/v2/beacon/blocks/7777")
                .header(ACCEPT.as_str(), "application/octet-stream");
            then.status(200)
                .header("Eth-Consensus-Version", "deneb")
                .body(encoded);
        });

        let client = client_for(&server, MockEthClient::default());
        let message = client.beacon_block("7777").await.unwrap();
        assert_eq!(message.slot(), 7777);
    }

    #[tokio::test]
    async fn test_unknown_fork_version_rejected() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/eth/v2/beacon/blocks/head");
            then.status(200)
                .header("Eth-Consensus-Version", "osaka")
                .body(vec![0u8; 4]);
        });

        let client = client_for(&server, MockEthClient::default());
        let err = client.beacon_block("head").await.unwrap_err();
        assert!(matches!(err, ResolverError::UnsupportedFork { version } if version == "osaka"));
    }
}
