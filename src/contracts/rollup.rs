//! Rollup registry contract bindings.
//!
//! Provides the latest confirmed assertion hash and the decoder for the
//! assertion-creation event whose post-state carries the destination block
//! hash.

use alloy_eips::BlockNumberOrTag;
use alloy_primitives::{Address, B256};
use alloy_provider::RootProvider;
use alloy_rpc_types_eth::BlockId;
use alloy_sol_types::{sol, SolEvent};
use async_trait::async_trait;

use crate::config::RetryConfig;
use crate::error::{ResolverError, ResolverResult};
use crate::explorer::ExplorerLog;
use crate::retry::retry_op;

sol! {
    /// Optimistic rollup registry contract interface.
    #[sol(rpc)]
    interface IRollup {
        /// A rollup's post-batch machine state; `bytes32Vals[0]` is the block
        /// hash, `bytes32Vals[1]` the send root.
        struct GlobalState {
            bytes32[2] bytes32Vals;
            uint64[2] u64Vals;
        }

        /// Machine status of an assertion state.
        enum MachineStatus {
            RUNNING,
            FINISHED,
            ERRORED
        }

        /// An assertion's execution state.
        struct AssertionState {
            GlobalState globalState;
            MachineStatus machineStatus;
            bytes32 endHistoryRoot;
        }

        /// Config snapshot under which an assertion was created.
        struct ConfigData {
            bytes32 wasmModuleRoot;
            uint256 requiredStake;
            address challengeManager;
            uint64 confirmPeriodBlocks;
            uint64 nextInboxPosition;
        }

        /// Data about the assertion chain before this assertion.
        struct BeforeStateData {
            bytes32 prevPrevAssertionHash;
            bytes32 sequencerBatchAcc;
            ConfigData configData;
        }

        /// Full inputs of a created assertion.
        struct AssertionInputs {
            BeforeStateData beforeStateData;
            AssertionState beforeState;
            AssertionState afterState;
        }

        /// Returns the hash of the latest confirmed assertion.
        function latestConfirmed() external view returns (bytes32);

        /// Emitted when a new assertion is created.
        event AssertionCreated(
            bytes32 indexed assertionHash,
            bytes32 indexed parentAssertionHash,
            AssertionInputs assertion,
            bytes32 afterInboxBatchAcc,
            uint256 inboxMaxCount,
            bytes32 wasmModuleRoot,
            uint256 requiredStake,
            address challengeManager,
            uint64 confirmPeriodBlocks
        );
    }
}

/// Async trait for reading the rollup registry.
#[async_trait]
pub trait RollupRegistryClient: Send + Sync {
    /// Returns the latest confirmed assertion hash, optionally pinned to a
    /// settlement-layer block.
    async fn latest_confirmed(&self, at_block: Option<u64>) -> ResolverResult<B256>;
}

/// Concrete implementation backed by Alloy's sol-generated contract bindings.
#[allow(missing_debug_implementations)]
pub struct RollupRegistryContractClient {
    contract: IRollup::IRollupInstance<RootProvider>,
    retry: RetryConfig,
}

impl RollupRegistryContractClient {
    /// Creates a new client for the given contract address and settlement RPC
    /// URL.
    pub fn new(address: Address, rpc_url: url::Url, retry: RetryConfig) -> Self {
        let provider = RootProvider::new_http(rpc_url);
        let contract = IRollup::IRollupInstance::new(address, provider);
        Self { contract, retry }
    }
}

#[async_trait]
impl RollupRegistryClient for RollupRegistryContractClient {
    async fn latest_confirmed(&self, at_block: Option<u64>) -> ResolverResult<B256> {
        let block_id: BlockId =
            at_block.map_or(BlockNumberOrTag::Latest, BlockNumberOrTag::Number).into();

        retry_op("rollup.latestConfirmed", &self.retry, || async {
            self.contract.latestConfirmed().block(block_id).call().await
        })
        .await
        .map_err(ResolverError::from_retry)
    }
}

/// Decodes an explorer log as an assertion-creation event.
pub fn decode_assertion_created(
    chain_id: u64,
    log: &ExplorerLog,
) -> ResolverResult<IRollup::AssertionCreated> {
    IRollup::AssertionCreated::decode_raw_log(log.topics.iter().copied(), &log.data).map_err(|e| {
        ResolverError::AssertionDecodeFailed {
            chain_id,
            address: log.address,
            signature: IRollup::AssertionCreated::SIGNATURE,
            message: e.to_string(),
        }
    })
}
