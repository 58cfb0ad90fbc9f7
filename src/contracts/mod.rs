//! Settlement-layer contract bindings.

mod anchor_state_registry;
mod rollup;

pub use anchor_state_registry::{
    AnchorRegistryClient, AnchorRegistryContractClient, AnchorRoot, IAnchorStateRegistry,
};
pub use rollup::{decode_assertion_created, IRollup, RollupRegistryClient, RollupRegistryContractClient};
