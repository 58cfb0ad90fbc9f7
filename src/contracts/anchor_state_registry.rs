//! Anchor state registry contract bindings.
//!
//! Provides the latest destination block the settlement layer considers
//! final, keyed by game type.

use alloy_eips::BlockNumberOrTag;
use alloy_primitives::{Address, B256};
use alloy_provider::RootProvider;
use alloy_rpc_types_eth::BlockId;
use alloy_sol_types::sol;
use async_trait::async_trait;

use crate::config::RetryConfig;
use crate::error::{ResolverError, ResolverResult};
use crate::retry::retry_op;
use crate::rpc::RpcError;

sol! {
    /// Anchor state registry contract interface.
    #[sol(rpc)]
    interface IAnchorStateRegistry {
        /// Returns the anchored output root and destination block number for
        /// the given game type.
        function anchors(uint32 gameType) external view returns (bytes32 root, uint256 l2BlockNumber);
    }
}

/// Anchor returned by `IAnchorStateRegistry.anchors()`.
#[derive(Debug, Clone)]
pub struct AnchorRoot {
    /// The output root hash.
    pub root: B256,
    /// The anchored destination block number.
    pub l2_block_number: u64,
}

/// Async trait for reading anchored destination state.
#[async_trait]
pub trait AnchorRegistryClient: Send + Sync {
    /// Returns the anchor for the given game type, optionally pinned to a
    /// settlement-layer block.
    async fn anchor_at(&self, game_type: u32, at_block: Option<u64>) -> ResolverResult<AnchorRoot>;
}

/// Concrete implementation backed by Alloy's sol-generated contract bindings.
#[allow(missing_debug_implementations)]
pub struct AnchorRegistryContractClient {
    contract: IAnchorStateRegistry::IAnchorStateRegistryInstance<RootProvider>,
    retry: RetryConfig,
}

impl AnchorRegistryContractClient {
    /// Creates a new client for the given contract address and settlement RPC
    /// URL.
    pub fn new(address: Address, rpc_url: url::Url, retry: RetryConfig) -> Self {
        let provider = RootProvider::new_http(rpc_url);
        let contract = IAnchorStateRegistry::IAnchorStateRegistryInstance::new(address, provider);
        Self { contract, retry }
    }
}

#[async_trait]
impl AnchorRegistryClient for AnchorRegistryContractClient {
    async fn anchor_at(&self, game_type: u32, at_block: Option<u64>) -> ResolverResult<AnchorRoot> {
        let block_id: BlockId =
            at_block.map_or(BlockNumberOrTag::Latest, BlockNumberOrTag::Number).into();

        let result = retry_op("anchorRegistry.anchors", &self.retry, || async {
            self.contract.anchors(game_type).block(block_id).call().await
        })
        .await
        .map_err(ResolverError::from_retry)?;

        let l2_block_number: u64 = result.l2BlockNumber.try_into().map_err(|_| {
            ResolverError::Rpc(RpcError::InvalidResponse(
                "anchor l2BlockNumber overflows u64".to_string(),
            ))
        })?;

        tracing::debug!(
            root = ?result.root,
            l2_block_number,
            game_type,
            "read anchor from registry"
        );

        Ok(AnchorRoot { root: result.root, l2_block_number })
    }
}
