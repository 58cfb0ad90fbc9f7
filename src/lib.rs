#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod beacon;
pub use beacon::{BeaconBlockMessage, BeaconChainClient, BeaconRootSnapshot, SignedBeaconBlock};

mod config;
pub use config::{validate_url, ConfigError, RetryConfig};

mod constants;
pub use constants::*;

mod contracts;
pub use contracts::{
    decode_assertion_created, AnchorRegistryClient, AnchorRegistryContractClient, AnchorRoot,
    IAnchorStateRegistry, IRollup, RollupRegistryClient, RollupRegistryContractClient,
};

mod error;
pub use error::{ResolverError, ResolverResult};

mod explorer;
pub use explorer::{ExplorerApi, ExplorerClient, ExplorerLog, LogQuery};

pub mod metrics;

mod outbox;
pub use outbox::OutboxWatcher;

mod registry;
pub use registry::{
    ActiveChains, ChainDescriptor, ChainRegistry, ChainRole, RegistryError, VerificationStrategy,
};

mod resolver;
pub use resolver::{
    AssertionProof, DestinationResolver, ResolutionMode, ResolvedDestinationState,
};

mod retry;
pub use retry::{retry_op, retry_op_with, RetryError};

mod rpc;
pub use rpc::{EthClient, EthClientConfig, EthClientImpl, HttpProvider, RpcError, RpcResult};

#[cfg(test)]
pub(crate) mod test_utils;
