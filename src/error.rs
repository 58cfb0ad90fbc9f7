//! Error types for the resolver.

use std::fmt::{Debug, Display};

use alloy_primitives::{Address, B256};
use thiserror::Error;

use crate::registry::ChainRole;
use crate::retry::RetryError;
use crate::rpc::RpcError;

/// Main error type for resolution operations.
///
/// Network-transient failures are absorbed by the retry executor up to policy
/// limits and only then surfaced; structural failures (missing logs, malformed
/// events, unknown forks) propagate immediately and carry enough context to
/// diagnose a configuration or contract-version mismatch.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// The chain id is not present in the registry.
    #[error("unknown chain {0}")]
    UnknownChain(u64),

    /// The chain is registered under a different role than required.
    #[error("chain {chain_id} is not registered as a {expected:?} chain")]
    RoleMismatch {
        /// The chain id that was looked up.
        chain_id: u64,
        /// The role the caller required.
        expected: ChainRole,
    },

    /// The destination has no usable verification strategy or oracle address.
    #[error("chain {chain_id} has no usable verification strategy")]
    UnverifiableChain {
        /// The offending chain id.
        chain_id: u64,
    },

    /// No outbox contract is registered for the requested proof flavor.
    #[error("chain {chain_id} has no outbox configured for the requested proof flavor")]
    OutboxNotConfigured {
        /// The offending chain id.
        chain_id: u64,
    },

    /// The descriptor carries no explorer API endpoint.
    #[error("chain {chain_id} has no explorer API configured")]
    ExplorerNotConfigured {
        /// The offending chain id.
        chain_id: u64,
    },

    /// A settlement-layer block number is required in trust-minimized mode.
    #[error("settlement-layer block number required for trust-minimized resolution")]
    SettlementBlockRequired,

    /// A network operation kept failing until the retry policy was exhausted.
    ///
    /// Safe to retry the whole resolution later.
    #[error("{operation} exhausted {attempts} attempts: {message}")]
    RetryExhausted {
        /// Name of the operation that was retried.
        operation: &'static str,
        /// Number of invocations performed.
        attempts: u32,
        /// The last failure observed.
        message: String,
    },

    /// The explorer API kept returning a non-success response.
    #[error("explorer query failed (last status {status:?}): {message}")]
    ExplorerQueryFailed {
        /// The last HTTP status observed, if a response was received at all.
        status: Option<u16>,
        /// The last failure observed.
        message: String,
    },

    /// The explorer API returned a body that could not be parsed.
    #[error("explorer response malformed: {message}")]
    ExplorerResponseMalformed {
        /// The parse failure.
        message: String,
    },

    /// No assertion-creation log was found for a confirmed assertion hash.
    #[error("no assertion-creation log found for assertion {assertion_hash} of chain {chain_id}")]
    AssertionLogNotFound {
        /// The destination chain id.
        chain_id: u64,
        /// The confirmed assertion hash that was queried.
        assertion_hash: B256,
    },

    /// An assertion-creation log could not be decoded.
    #[error("failed to decode {signature} log from {address} for chain {chain_id}: {message}")]
    AssertionDecodeFailed {
        /// The destination chain id.
        chain_id: u64,
        /// The contract the log was emitted by.
        address: Address,
        /// The expected event signature.
        signature: &'static str,
        /// The decode failure.
        message: String,
    },

    /// The decoded assertion carries no destination block hash.
    #[error("assertion {assertion_hash} of chain {chain_id} has no post-state block hash")]
    AssertionFieldMissing {
        /// The destination chain id.
        chain_id: u64,
        /// The confirmed assertion hash.
        assertion_hash: B256,
    },

    /// The destination RPC reported no such block after exhausted retries.
    #[error("destination block not found on chain {chain_id} ({reference})")]
    DestinationBlockNotFound {
        /// The destination chain id.
        chain_id: u64,
        /// The block reference that was requested (hash or number).
        reference: String,
    },

    /// The beacon API has no block for the requested tag. Terminal, never
    /// retried: the slot does not exist yet or was pruned.
    #[error("beacon block {tag} is missing")]
    BeaconBlockMissing {
        /// The requested slot or tag.
        tag: String,
    },

    /// The beacon API kept failing with a transport error or an unexpected
    /// status.
    #[error("failed to fetch beacon block {tag}: {message}")]
    BeaconFetchFailed {
        /// The requested slot or tag.
        tag: String,
        /// The last failure observed.
        message: String,
    },

    /// The beacon block is encoded for a fork this crate has no decoder for.
    #[error("unsupported consensus fork: {version}")]
    UnsupportedFork {
        /// The fork version reported by the beacon node.
        version: String,
    },

    /// The beacon block bytes could not be SSZ-decoded for a known fork.
    #[error("failed to decode {version} beacon block: {message}")]
    BeaconDecodeFailed {
        /// The fork the payload was decoded as.
        version: String,
        /// The decode failure.
        message: String,
    },

    /// The execution block carries no parent beacon root (pre-fork block).
    #[error("block {block_number} carries no parent beacon root")]
    BeaconRootUnavailable {
        /// The execution block number.
        block_number: u64,
    },

    /// RPC-layer error that has no more specific mapping.
    #[error("rpc error: {0}")]
    Rpc(RpcError),
}

impl ResolverError {
    /// Maps an exhausted retry into the crate-level error.
    pub(crate) fn from_retry<T: Debug, E: Display>(err: RetryError<T, E>) -> Self {
        match err {
            RetryError::Exhausted { operation, attempts, last_error } => {
                Self::RetryExhausted { operation, attempts, message: last_error.to_string() }
            }
            RetryError::Rejected { operation, attempts, .. } => Self::RetryExhausted {
                operation,
                attempts,
                message: "no acceptable result".to_string(),
            },
        }
    }
}

impl From<RpcError> for ResolverError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::RetryExhausted { operation, attempts, message } => {
                Self::RetryExhausted { operation, attempts, message }
            }
            other => Self::Rpc(other),
        }
    }
}

/// Result type alias for resolution operations.
pub type ResolverResult<T> = Result<T, ResolverError>;
