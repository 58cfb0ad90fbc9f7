//! Execution-layer RPC client implementation.

use std::time::Duration;

use alloy_eips::BlockNumberOrTag;
use alloy_primitives::B256;
use alloy_provider::{Provider, RootProvider};
use alloy_rpc_client::RpcClient;
use alloy_rpc_types_eth::{Block, BlockId};
use alloy_transport_http::{reqwest::Client, Http};
use async_trait::async_trait;
use url::Url;

use super::{
    error::{RpcError, RpcResult},
    HttpProvider,
};
use crate::config::RetryConfig;
use crate::constants::DEFAULT_REQUEST_TIMEOUT;
use crate::retry::{retry_op, retry_op_with, RetryError};

/// Configuration for an execution-layer RPC client.
#[derive(Debug, Clone)]
pub struct EthClientConfig {
    /// RPC endpoint URL.
    pub endpoint: Url,
    /// Request timeout.
    pub timeout: Duration,
    /// Retry configuration.
    pub retry: RetryConfig,
}

impl EthClientConfig {
    /// Creates a new client configuration with defaults.
    pub fn new(endpoint: Url) -> Self {
        Self { endpoint, timeout: DEFAULT_REQUEST_TIMEOUT, retry: RetryConfig::default() }
    }

    /// Sets the request timeout.
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry configuration.
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

/// Minimal execution-layer client interface used by the resolver.
#[async_trait]
pub trait EthClient: Send + Sync {
    /// Gets the latest block number.
    async fn block_number(&self) -> RpcResult<u64>;

    /// Gets a block by number.
    /// If `number` is `None`, returns the latest block.
    async fn block_by_number(&self, number: Option<u64>) -> RpcResult<Block>;

    /// Gets a block by hash.
    ///
    /// A node reporting no block for the hash is treated as transient (stale
    /// or pruned view) and retried; only after the policy is exhausted does
    /// this surface as [`RpcError::BlockNotFound`].
    async fn block_by_hash(&self, hash: B256) -> RpcResult<Block>;
}

/// Execution-layer RPC client implementation using Alloy.
#[derive(Debug)]
pub struct EthClientImpl {
    /// The underlying HTTP provider.
    provider: HttpProvider,
    /// Retry configuration.
    retry: RetryConfig,
}

impl EthClientImpl {
    /// Creates a new client from the given configuration.
    pub fn new(config: EthClientConfig) -> RpcResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RpcError::Connection(format!("failed to build HTTP client: {e}")))?;

        let http = Http::with_client(client, config.endpoint);
        let rpc_client = RpcClient::new(http, false);

        // No fillers: the resolver only performs read operations.
        let provider = RootProvider::new(rpc_client);

        Ok(Self { provider, retry: config.retry })
    }
}

#[async_trait]
impl EthClient for EthClientImpl {
    async fn block_number(&self) -> RpcResult<u64> {
        retry_op("eth_blockNumber", &self.retry, || async {
            self.provider.get_block_number().await
        })
        .await
        .map_err(RpcError::from_retry)
    }

    async fn block_by_number(&self, number: Option<u64>) -> RpcResult<Block> {
        let block_id: BlockId =
            number.map_or(BlockNumberOrTag::Latest, BlockNumberOrTag::Number).into();

        let result = retry_op_with(
            "eth_getBlockByNumber",
            &self.retry,
            || async { self.provider.get_block(block_id).await },
            |block: &Option<Block>| block.is_some(),
        )
        .await;

        match result {
            Ok(Some(block)) => Ok(block),
            Ok(None) | Err(RetryError::Rejected { .. }) => {
                Err(RpcError::BlockNotFound(format!("no block for {block_id:?}")))
            }
            Err(err) => Err(RpcError::from_retry(err)),
        }
    }

    async fn block_by_hash(&self, hash: B256) -> RpcResult<Block> {
        let block_id = BlockId::Hash(hash.into());

        let result = retry_op_with(
            "eth_getBlockByHash",
            &self.retry,
            || async { self.provider.get_block(block_id).await },
            |block: &Option<Block>| block.is_some(),
        )
        .await;

        match result {
            Ok(Some(block)) => Ok(block),
            Ok(None) | Err(RetryError::Rejected { .. }) => {
                Err(RpcError::BlockNotFound(format!("no block for hash {hash}")))
            }
            Err(err) => Err(RpcError::from_retry(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eth_client_config_defaults() {
        let config = EthClientConfig::new(Url::parse("http://localhost:8545").unwrap());
        assert_eq!(config.timeout, DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(config.retry.max_attempts, 5);
    }

    #[test]
    fn test_eth_client_config_builder() {
        let config = EthClientConfig::new(Url::parse("http://localhost:8545").unwrap())
            .with_timeout(Duration::from_secs(60))
            .with_retry_config(RetryConfig::default().with_max_attempts(2));

        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.retry.max_attempts, 2);
    }

    #[test]
    fn test_client_builds_from_config() {
        let config = EthClientConfig::new(Url::parse("http://localhost:8545").unwrap());
        assert!(EthClientImpl::new(config).is_ok());
    }
}
