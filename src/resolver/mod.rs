//! Destination-state resolution.
//!
//! A [`DestinationResolver`] is built for one (source, destination,
//! settlement) triple and resolves the destination block that can be treated
//! as finalized, dispatching on the destination's verification strategy.
//! Results are request-scoped; the resolver keeps no cache and no state
//! between calls.

mod anchor;
mod assertion;

use std::sync::Arc;

use alloy_primitives::B256;
use alloy_rpc_types_eth::Block;
use tracing::debug;

use crate::config::RetryConfig;
use crate::constants::DEFAULT_ANCHOR_GAME_TYPE;
use crate::contracts::{
    AnchorRegistryClient, AnchorRegistryContractClient, IRollup, RollupRegistryClient,
    RollupRegistryContractClient,
};
use crate::error::{ResolverError, ResolverResult};
use crate::explorer::{ExplorerApi, ExplorerClient};
use crate::metrics::{LABEL_OUTCOME, LABEL_STRATEGY, RESOLUTIONS_TOTAL};
use crate::registry::{ActiveChains, ChainRegistry, VerificationStrategy};
use crate::rpc::{EthClient, EthClientConfig, EthClientImpl, RpcError};

/// Trust model under which a destination block was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionMode {
    /// Derived from state the settlement layer has confirmed.
    TrustMinimized,
    /// Read from the destination chain (or an oracle) directly; freshness is
    /// trusted out-of-band.
    Direct,
}

/// Assertion material justifying a rollup-path resolution, passed through to
/// downstream proof construction.
#[derive(Debug, Clone)]
pub struct AssertionProof {
    /// Hash of the parent assertion.
    pub parent_assertion_hash: B256,
    /// Inbox batch accumulator after the assertion.
    pub after_inbox_batch_acc: B256,
    /// The assertion's post-state.
    pub after_state: IRollup::AssertionState,
}

/// The destination block a resolution produced, with the material that
/// justified it.
#[derive(Debug, Clone)]
pub struct ResolvedDestinationState {
    /// The finalized destination block (full header).
    pub block: Block,
    /// Trust model the block was resolved under.
    pub mode: ResolutionMode,
    /// Assertion material, present only for the rollup path.
    pub proof: Option<AssertionProof>,
}

/// Resolves finalized destination state for one active chain triple.
#[allow(missing_debug_implementations)]
pub struct DestinationResolver {
    pub(crate) chains: ActiveChains,
    pub(crate) settlement_client: Arc<dyn EthClient>,
    pub(crate) destination_client: Arc<dyn EthClient>,
    pub(crate) rollup: Option<Arc<dyn RollupRegistryClient>>,
    pub(crate) anchor: Option<Arc<dyn AnchorRegistryClient>>,
    pub(crate) explorer: Option<Arc<dyn ExplorerApi>>,
    /// Relaxed trust fallback, derived from the descriptor capability flags:
    /// active when the source cannot read settlement state or the destination
    /// does not commit its state to the settlement layer.
    pub(crate) oracle_fallback: bool,
    pub(crate) anchor_game_type: u32,
}

impl DestinationResolver {
    /// Creates a resolver from explicit parts. Prefer [`Self::from_registry`]
    /// outside tests.
    pub fn new(
        chains: ActiveChains,
        settlement_client: Arc<dyn EthClient>,
        destination_client: Arc<dyn EthClient>,
        rollup: Option<Arc<dyn RollupRegistryClient>>,
        anchor: Option<Arc<dyn AnchorRegistryClient>>,
        explorer: Option<Arc<dyn ExplorerApi>>,
    ) -> Self {
        let oracle_fallback = !chains.source.exposes_settlement_state
            || !chains.destination.shares_state_with_settlement;
        Self {
            chains,
            settlement_client,
            destination_client,
            rollup,
            anchor,
            explorer,
            oracle_fallback,
            anchor_game_type: DEFAULT_ANCHOR_GAME_TYPE,
        }
    }

    /// Builds a resolver for the given chain triple out of the registry,
    /// wiring up RPC, contract, and explorer clients as the destination's
    /// strategy requires.
    pub fn from_registry(
        registry: &ChainRegistry,
        source: u64,
        destination: u64,
        settlement: u64,
        retry: RetryConfig,
    ) -> ResolverResult<Self> {
        let chains = registry.active_chains(source, destination, settlement)?;

        let settlement_client = Arc::new(EthClientImpl::new(
            EthClientConfig::new(chains.settlement.rpc_url.clone()).with_retry_config(retry.clone()),
        )?);
        let destination_client = Arc::new(EthClientImpl::new(
            EthClientConfig::new(chains.destination.rpc_url.clone())
                .with_retry_config(retry.clone()),
        )?);

        let mut rollup: Option<Arc<dyn RollupRegistryClient>> = None;
        let mut anchor: Option<Arc<dyn AnchorRegistryClient>> = None;
        let mut explorer: Option<Arc<dyn ExplorerApi>> = None;

        match chains.destination.strategy {
            VerificationStrategy::OptimisticRollup => {
                let oracle = chains
                    .destination
                    .state_oracle
                    .ok_or(ResolverError::UnverifiableChain { chain_id: destination })?;
                rollup = Some(Arc::new(RollupRegistryContractClient::new(
                    oracle,
                    chains.settlement.rpc_url.clone(),
                    retry.clone(),
                )));
                explorer =
                    Some(Arc::new(ExplorerClient::from_descriptor(&chains.settlement, retry)?));
            }
            VerificationStrategy::AnchorRegistry => {
                let oracle = chains
                    .destination
                    .state_oracle
                    .ok_or(ResolverError::UnverifiableChain { chain_id: destination })?;
                anchor = Some(Arc::new(AnchorRegistryContractClient::new(
                    oracle,
                    chains.settlement.rpc_url.clone(),
                    retry,
                )));
            }
            VerificationStrategy::UniversalOracle => {}
            VerificationStrategy::None => {
                return Err(ResolverError::UnverifiableChain { chain_id: destination });
            }
        }

        Ok(Self::new(chains, settlement_client, destination_client, rollup, anchor, explorer))
    }

    /// Sets the anchor registry game type key (defaults to 0).
    pub const fn with_anchor_game_type(mut self, game_type: u32) -> Self {
        self.anchor_game_type = game_type;
        self
    }

    /// The active chain triple this resolver works over.
    pub const fn chains(&self) -> &ActiveChains {
        &self.chains
    }

    /// Resolves the destination state as of the given settlement-layer block.
    ///
    /// `at_settlement_block` pins settlement-layer reads; it is required for
    /// trust-minimized resolution and ignored in direct mode. Each call is an
    /// independent sequence of network reads; nothing is cached or shared
    /// with concurrent resolutions.
    pub async fn resolve(
        &self,
        at_settlement_block: Option<u64>,
    ) -> ResolverResult<ResolvedDestinationState> {
        let strategy = self.chains.destination.strategy;
        debug!(
            chain_id = self.chains.destination.chain_id,
            %strategy,
            at_settlement_block,
            "resolving destination state"
        );

        let result = match strategy {
            VerificationStrategy::OptimisticRollup => {
                assertion::resolve_via_assertion(self, at_settlement_block).await
            }
            VerificationStrategy::AnchorRegistry | VerificationStrategy::UniversalOracle => {
                anchor::resolve_via_anchor(self, at_settlement_block).await
            }
            VerificationStrategy::None => Err(ResolverError::UnverifiableChain {
                chain_id: self.chains.destination.chain_id,
            }),
        };

        let outcome = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!(
            RESOLUTIONS_TOTAL,
            LABEL_STRATEGY => strategy.to_string(),
            LABEL_OUTCOME => outcome
        )
        .increment(1);

        result
    }

    /// Returns the latest settlement-layer block, for callers assembling
    /// proofs against settlement state.
    pub async fn settlement_block(&self) -> ResolverResult<Block> {
        self.settlement_client.block_by_number(None).await.map_err(Into::into)
    }

    /// Whether resolution will use the relaxed direct/oracle trust model.
    pub fn direct_mode(&self) -> bool {
        self.oracle_fallback
            || self.chains.destination.strategy == VerificationStrategy::UniversalOracle
    }

    pub(crate) fn map_destination_block_err(&self, err: RpcError, reference: String) -> ResolverError {
        match err {
            RpcError::BlockNotFound(_) => ResolverError::DestinationBlockNotFound {
                chain_id: self.chains.destination.chain_id,
                reference,
            },
            other => other.into(),
        }
    }
}
