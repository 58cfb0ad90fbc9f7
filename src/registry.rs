//! Immutable chain registry.
//!
//! A [`ChainRegistry`] is built once at startup from the deployment's
//! configuration and shared as `Arc<ChainRegistry>`; lookups never perform
//! I/O and the registry is never mutated afterwards.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use alloy_primitives::{Address, B256};
use thiserror::Error;
use url::Url;

use crate::error::{ResolverError, ResolverResult};

/// Errors raised while constructing a [`ChainRegistry`].
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two descriptors share a chain id.
    #[error("duplicate descriptor for chain {0}")]
    DuplicateChain(u64),

    /// A proof endpoint was registered without a verification strategy.
    #[error("chain {0} with role {1:?} requires a verification strategy")]
    MissingStrategy(u64, ChainRole),

    /// A registry-backed strategy was registered without an oracle address.
    #[error("chain {0} with strategy {1} requires a state oracle address")]
    MissingStateOracle(u64, VerificationStrategy),
}

/// Role a chain plays in a proof flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainRole {
    /// Origin of cross-chain messages; where proofs are presented.
    Source,
    /// Where messages are fulfilled; the chain whose state is proven.
    Destination,
    /// The layer both sides settle to (e.g. an Ethereum testnet).
    SettlementLayer,
}

/// How a destination chain's state is verified on the origin side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VerificationStrategy {
    /// Optimistic-rollup assertions confirmed on the settlement layer.
    OptimisticRollup,
    /// A settlement-layer registry recording anchored destination blocks.
    AnchorRegistry,
    /// A universal cross-chain state oracle; trusted out-of-band.
    UniversalOracle,
    /// No verification; only valid for the settlement layer itself.
    None,
}

impl fmt::Display for VerificationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OptimisticRollup => "optimistic-rollup",
            Self::AnchorRegistry => "anchor-registry",
            Self::UniversalOracle => "universal-oracle",
            Self::None => "none",
        };
        f.write_str(name)
    }
}

/// Static description of a chain known to the deployment.
#[derive(Debug, Clone)]
pub struct ChainDescriptor {
    /// The chain id.
    pub chain_id: u64,
    /// Role this chain plays in proof flows.
    pub role: ChainRole,
    /// Execution-layer RPC endpoint.
    pub rpc_url: Url,
    /// Rollup registry or anchor registry on the settlement layer.
    pub state_oracle: Option<Address>,
    /// Storage slot of the oracle commitment, for downstream storage proofs.
    pub state_oracle_storage_key: Option<B256>,
    /// Inbox contract on this chain.
    pub inbox: Option<Address>,
    /// ERC-4337 entry point on this chain.
    pub entry_point: Option<Address>,
    /// Paymaster used for sponsored fulfillment.
    pub paymaster: Option<Address>,
    /// Outbox contract per proof flavor.
    pub outboxes: BTreeMap<VerificationStrategy, Address>,
    /// How this chain's state is verified when it is a destination.
    pub strategy: VerificationStrategy,
    /// Whether this chain exposes settlement-layer state (e.g. an L1 block
    /// oracle readable from the chain itself).
    pub exposes_settlement_state: bool,
    /// Whether this chain's state is committed to the settlement layer.
    pub shares_state_with_settlement: bool,
    /// Block-explorer API base URL for historical log queries.
    pub explorer_api_url: Option<Url>,
    /// API key for the explorer endpoint.
    pub explorer_api_key: Option<String>,
}

impl ChainDescriptor {
    /// Creates a descriptor with the given identity; contract addresses and
    /// explorer credentials are filled in with the builder methods.
    pub fn new(chain_id: u64, role: ChainRole, rpc_url: Url, strategy: VerificationStrategy) -> Self {
        Self {
            chain_id,
            role,
            rpc_url,
            state_oracle: None,
            state_oracle_storage_key: None,
            inbox: None,
            entry_point: None,
            paymaster: None,
            outboxes: BTreeMap::new(),
            strategy,
            exposes_settlement_state: true,
            shares_state_with_settlement: true,
            explorer_api_url: None,
            explorer_api_key: None,
        }
    }

    /// Sets the state oracle address and its storage key.
    pub fn with_state_oracle(mut self, address: Address, storage_key: Option<B256>) -> Self {
        self.state_oracle = Some(address);
        self.state_oracle_storage_key = storage_key;
        self
    }

    /// Sets the inbox contract address.
    pub fn with_inbox(mut self, address: Address) -> Self {
        self.inbox = Some(address);
        self
    }

    /// Sets the entry point contract address.
    pub fn with_entry_point(mut self, address: Address) -> Self {
        self.entry_point = Some(address);
        self
    }

    /// Sets the paymaster contract address.
    pub fn with_paymaster(mut self, address: Address) -> Self {
        self.paymaster = Some(address);
        self
    }

    /// Registers an outbox contract for the given proof flavor.
    pub fn with_outbox(mut self, flavor: VerificationStrategy, address: Address) -> Self {
        self.outboxes.insert(flavor, address);
        self
    }

    /// Sets the settlement-state capability flags.
    pub const fn with_settlement_flags(
        mut self,
        exposes_settlement_state: bool,
        shares_state_with_settlement: bool,
    ) -> Self {
        self.exposes_settlement_state = exposes_settlement_state;
        self.shares_state_with_settlement = shares_state_with_settlement;
        self
    }

    /// Sets the explorer API endpoint and key.
    pub fn with_explorer(mut self, api_url: Url, api_key: Option<String>) -> Self {
        self.explorer_api_url = Some(api_url);
        self.explorer_api_key = api_key;
        self
    }
}

/// The active (source, destination, settlement) triple a resolver works over.
#[derive(Debug, Clone)]
pub struct ActiveChains {
    /// The chain messages originate from.
    pub source: ChainDescriptor,
    /// The chain whose finalized state is being resolved.
    pub destination: ChainDescriptor,
    /// The settlement layer both sides anchor to.
    pub settlement: ChainDescriptor,
}

/// Immutable, process-wide mapping from chain id to [`ChainDescriptor`].
#[derive(Debug)]
pub struct ChainRegistry {
    chains: HashMap<u64, ChainDescriptor>,
}

impl ChainRegistry {
    /// Builds a registry from the given descriptors.
    ///
    /// Enforces the descriptor invariants: chain ids are unique, proof
    /// endpoints carry exactly one real verification strategy (`None` is
    /// reserved for the settlement layer), and registry-backed strategies
    /// name their oracle contract.
    pub fn new(
        descriptors: impl IntoIterator<Item = ChainDescriptor>,
    ) -> Result<Self, RegistryError> {
        let mut chains = HashMap::new();
        for descriptor in descriptors {
            let chain_id = descriptor.chain_id;

            if descriptor.strategy == VerificationStrategy::None
                && descriptor.role != ChainRole::SettlementLayer
            {
                return Err(RegistryError::MissingStrategy(chain_id, descriptor.role));
            }
            if matches!(
                descriptor.strategy,
                VerificationStrategy::OptimisticRollup | VerificationStrategy::AnchorRegistry
            ) && descriptor.state_oracle.is_none()
            {
                return Err(RegistryError::MissingStateOracle(chain_id, descriptor.strategy));
            }
            if chains.insert(chain_id, descriptor).is_some() {
                return Err(RegistryError::DuplicateChain(chain_id));
            }
        }
        Ok(Self { chains })
    }

    /// Returns the descriptor for the given chain id.
    pub fn descriptor_for(&self, chain_id: u64) -> ResolverResult<&ChainDescriptor> {
        self.chains.get(&chain_id).ok_or(ResolverError::UnknownChain(chain_id))
    }

    /// Returns the configured chain ids.
    pub fn chain_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.chains.keys().copied()
    }

    /// Selects the active (source, destination, settlement) triple.
    ///
    /// Fails with [`ResolverError::UnknownChain`] for an unregistered id and
    /// [`ResolverError::RoleMismatch`] when a chain is registered under a
    /// different role than its position requires.
    pub fn active_chains(
        &self,
        source: u64,
        destination: u64,
        settlement: u64,
    ) -> ResolverResult<ActiveChains> {
        let expect_role = |chain_id: u64, expected: ChainRole| -> ResolverResult<ChainDescriptor> {
            let descriptor = self.descriptor_for(chain_id)?;
            if descriptor.role != expected {
                return Err(ResolverError::RoleMismatch { chain_id, expected });
            }
            Ok(descriptor.clone())
        };

        Ok(ActiveChains {
            source: expect_role(source, ChainRole::Source)?,
            destination: expect_role(destination, ChainRole::Destination)?,
            settlement: expect_role(settlement, ChainRole::SettlementLayer)?,
        })
    }
}
