//! Execution-layer RPC clients.

use alloy_network::Ethereum;
use alloy_provider::RootProvider;

/// Shared type alias for HTTP providers.
/// Uses `RootProvider` directly since the resolver only performs reads.
pub type HttpProvider = RootProvider<Ethereum>;

mod error;
mod eth_client;

pub use error::{RpcError, RpcResult};
pub use eth_client::{EthClient, EthClientConfig, EthClientImpl};
