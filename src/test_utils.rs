//! Shared test utilities: registry fixtures, block builders, and mock
//! clients for the resolver's trait seams.

use std::collections::HashMap;
use std::sync::Mutex;

use alloy_primitives::{address, b256, Address, B256, U256};
use alloy_rpc_types_eth::{Block, BlockTransactions, Header};
use alloy_sol_types::SolEvent;
use async_trait::async_trait;
use url::Url;

use crate::contracts::{AnchorRegistryClient, AnchorRoot, IRollup, RollupRegistryClient};
use crate::error::ResolverResult;
use crate::explorer::{ExplorerApi, ExplorerLog, LogQuery};
use crate::registry::{
    ActiveChains, ChainDescriptor, ChainRegistry, ChainRole, VerificationStrategy,
};
use crate::rpc::{EthClient, RpcError, RpcResult};

/// Source chain id used in fixtures.
pub(crate) const SOURCE: u64 = 11155420;
/// Optimistic-rollup destination chain id used in fixtures.
pub(crate) const ROLLUP_TESTNET: u64 = 421614;
/// Anchor-registry destination chain id used in fixtures.
pub(crate) const BASE_TESTNET: u64 = 84532;
/// Settlement-layer chain id used in fixtures.
pub(crate) const SETTLEMENT: u64 = 11155111;

pub(crate) const ROLLUP_ORACLE: Address = address!("042b2e6c5e99d4c521bd49beed5e99651d9b0cf4");
pub(crate) const ANCHOR_ORACLE: Address = address!("4c8ba32a5dac2a720bb35cedb51d6b067d104205");

fn url(raw: &str) -> Url {
    Url::parse(raw).unwrap()
}

/// Builds the registry used across tests: one source, two destinations with
/// different strategies, and the settlement layer.
pub(crate) fn test_registry() -> ChainRegistry {
    ChainRegistry::new([
        ChainDescriptor::new(
            SOURCE,
            ChainRole::Source,
            url("http://localhost:8547"),
            VerificationStrategy::AnchorRegistry,
        )
        .with_state_oracle(
            address!("218cd9489199f321e1177b56385d333c5b598629"),
            Some(b256!("a6eef7e35abe7026729641147f7915573c7e97b47efa546f5f6e3230263bcb49")),
        )
        .with_outbox(
            VerificationStrategy::AnchorRegistry,
            address!("85d1097805f1021a99a5cd9d7d0b23fbc8076365"),
        )
        .with_explorer(url("https://api-sepolia-optimistic.example.io"), Some("key".into())),
        ChainDescriptor::new(
            ROLLUP_TESTNET,
            ChainRole::Destination,
            url("http://localhost:8548"),
            VerificationStrategy::OptimisticRollup,
        )
        .with_state_oracle(
            ROLLUP_ORACLE,
            Some(b256!("0000000000000000000000000000000000000000000000000000000000000076")),
        )
        .with_inbox(address!("dc50fdbe95e876f31ea5d4aa01040b095e612ebb"))
        .with_outbox(
            VerificationStrategy::OptimisticRollup,
            address!("de9eb27d46ea852838657d2eca50071927e481a0"),
        )
        .with_explorer(url("https://api-sepolia.example.io"), Some("key".into())),
        ChainDescriptor::new(
            BASE_TESTNET,
            ChainRole::Destination,
            url("http://localhost:8549"),
            VerificationStrategy::AnchorRegistry,
        )
        .with_state_oracle(
            ANCHOR_ORACLE,
            Some(b256!("a6eef7e35abe7026729641147f7915573c7e97b47efa546f5f6e3230263bcb49")),
        )
        .with_inbox(address!("dca0d90ee4ec8014ea3625f361c727720ebc427b"))
        .with_explorer(url("https://api-sepolia.example.org"), None),
        ChainDescriptor::new(
            SETTLEMENT,
            ChainRole::SettlementLayer,
            url("http://localhost:8545"),
            VerificationStrategy::None,
        )
        .with_settlement_flags(false, false)
        .with_explorer(url("https://api-sepolia.example.com"), Some("key".into())),
    ])
    .unwrap()
}

/// The (source, destination, settlement) triple over the test registry.
pub(crate) fn test_active_chains(destination: u64) -> ActiveChains {
    test_registry().active_chains(SOURCE, destination, SETTLEMENT).unwrap()
}

/// Builds a block with the given number and hash.
pub(crate) fn test_block(number: u64, hash: B256) -> Block {
    let mut inner = alloy_consensus::Header::default();
    inner.number = number;
    inner.timestamp = 1_700_000_000 + number;

    Block {
        header: Header { hash, inner, total_difficulty: None, size: None },
        uncles: Vec::new(),
        transactions: BlockTransactions::Hashes(Vec::new()),
        withdrawals: None,
    }
}

/// Builds a block carrying a parent beacon root.
pub(crate) fn test_block_with_beacon_root(
    number: u64,
    hash: B256,
    beacon_root: B256,
    timestamp: u64,
) -> Block {
    let mut block = test_block(number, hash);
    block.header.inner.parent_beacon_block_root = Some(beacon_root);
    block.header.inner.timestamp = timestamp;
    block
}

/// Mock execution-layer client serving a fixed set of blocks.
#[derive(Debug, Default)]
pub(crate) struct MockEthClient {
    latest: u64,
    by_number: HashMap<u64, Block>,
    by_hash: HashMap<B256, Block>,
}

impl MockEthClient {
    pub(crate) fn with_latest(mut self, latest: u64) -> Self {
        self.latest = latest;
        self
    }

    pub(crate) fn with_block(mut self, block: Block) -> Self {
        self.by_number.insert(block.header.number, block.clone());
        self.by_hash.insert(block.header.hash, block);
        self
    }
}

#[async_trait]
impl EthClient for MockEthClient {
    async fn block_number(&self) -> RpcResult<u64> {
        Ok(self.latest)
    }

    async fn block_by_number(&self, number: Option<u64>) -> RpcResult<Block> {
        let number = number.unwrap_or(self.latest);
        self.by_number
            .get(&number)
            .cloned()
            .ok_or_else(|| RpcError::BlockNotFound(format!("no block for number {number}")))
    }

    async fn block_by_hash(&self, hash: B256) -> RpcResult<Block> {
        self.by_hash
            .get(&hash)
            .cloned()
            .ok_or_else(|| RpcError::BlockNotFound(format!("no block for hash {hash}")))
    }
}

/// Mock rollup registry returning a fixed confirmed assertion hash.
#[derive(Debug)]
pub(crate) struct MockRollup {
    latest_confirmed: B256,
    calls: Mutex<Vec<Option<u64>>>,
}

impl MockRollup {
    pub(crate) fn new(latest_confirmed: B256) -> Self {
        Self { latest_confirmed, calls: Mutex::new(Vec::new()) }
    }

    #[allow(dead_code)]
    pub(crate) fn calls(&self) -> Vec<Option<u64>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RollupRegistryClient for MockRollup {
    async fn latest_confirmed(&self, at_block: Option<u64>) -> ResolverResult<B256> {
        self.calls.lock().unwrap().push(at_block);
        Ok(self.latest_confirmed)
    }
}

/// Mock anchor registry returning a fixed anchor.
#[derive(Debug)]
pub(crate) struct MockAnchor {
    root: B256,
    l2_block_number: u64,
    calls: Mutex<Vec<(u32, Option<u64>)>>,
}

impl MockAnchor {
    pub(crate) fn new(root: B256, l2_block_number: u64) -> Self {
        Self { root, l2_block_number, calls: Mutex::new(Vec::new()) }
    }

    pub(crate) fn calls(&self) -> Vec<(u32, Option<u64>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnchorRegistryClient for MockAnchor {
    async fn anchor_at(&self, game_type: u32, at_block: Option<u64>) -> ResolverResult<AnchorRoot> {
        self.calls.lock().unwrap().push((game_type, at_block));
        Ok(AnchorRoot { root: self.root, l2_block_number: self.l2_block_number })
    }
}

/// Mock explorer returning fixed logs and recording queries.
#[derive(Debug)]
pub(crate) struct MockExplorer {
    logs: Vec<ExplorerLog>,
    queries: Mutex<Vec<LogQuery>>,
}

impl MockExplorer {
    pub(crate) fn new(logs: Vec<ExplorerLog>) -> Self {
        Self { logs, queries: Mutex::new(Vec::new()) }
    }

    pub(crate) fn queries(&self) -> Vec<LogQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExplorerApi for MockExplorer {
    async fn fetch_logs(&self, query: LogQuery) -> ResolverResult<Vec<ExplorerLog>> {
        self.queries.lock().unwrap().push(query);
        Ok(self.logs.clone())
    }
}

/// Builds assertion inputs whose post-state block hash is `block_hash`.
pub(crate) fn test_assertion_inputs(block_hash: B256) -> IRollup::AssertionInputs {
    let state = |hash: B256| IRollup::AssertionState {
        globalState: IRollup::GlobalState { bytes32Vals: [hash, B256::ZERO], u64Vals: [0, 0] },
        machineStatus: IRollup::MachineStatus::FINISHED,
        endHistoryRoot: B256::ZERO,
    };

    IRollup::AssertionInputs {
        beforeStateData: IRollup::BeforeStateData {
            prevPrevAssertionHash: B256::ZERO,
            sequencerBatchAcc: B256::ZERO,
            configData: IRollup::ConfigData {
                wasmModuleRoot: B256::ZERO,
                requiredStake: U256::ZERO,
                challengeManager: Address::ZERO,
                confirmPeriodBlocks: 0,
                nextInboxPosition: 0,
            },
        },
        beforeState: state(B256::ZERO),
        afterState: state(block_hash),
    }
}

/// Builds an explorer log encoding an assertion-creation event.
pub(crate) fn assertion_created_log(
    assertion_hash: B256,
    parent_assertion_hash: B256,
    block_hash: B256,
) -> ExplorerLog {
    let event = IRollup::AssertionCreated {
        assertionHash: assertion_hash,
        parentAssertionHash: parent_assertion_hash,
        assertion: test_assertion_inputs(block_hash),
        afterInboxBatchAcc: B256::repeat_byte(0x1B),
        inboxMaxCount: U256::from(1),
        wasmModuleRoot: B256::ZERO,
        requiredStake: U256::ZERO,
        challengeManager: Address::ZERO,
        confirmPeriodBlocks: 0,
    };

    ExplorerLog {
        address: ROLLUP_ORACLE,
        topics: vec![
            IRollup::AssertionCreated::SIGNATURE_HASH,
            assertion_hash,
            parent_assertion_hash,
        ],
        data: event.encode_data().into(),
        block_number: Some(100),
    }
}
