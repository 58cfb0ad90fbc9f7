//! RPC-specific error types.

use std::fmt::{Debug, Display};

use thiserror::Error;

use crate::retry::RetryError;

/// RPC-specific error type.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The transport kept failing until the retry policy was exhausted.
    #[error("{operation} exhausted {attempts} attempts: {message}")]
    RetryExhausted {
        /// Name of the RPC operation.
        operation: &'static str,
        /// Number of invocations performed.
        attempts: u32,
        /// The last transport failure observed.
        message: String,
    },

    /// The node reported no block for the requested reference, even after
    /// exhausted retries.
    #[error("block not found: {0}")]
    BlockNotFound(String),

    /// The node returned a response the client could not interpret.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The HTTP client could not be constructed.
    #[error("connection error: {0}")]
    Connection(String),
}

impl RpcError {
    /// Maps an exhausted retry into an RPC error.
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

/// Result type alias for RPC operations.
pub type RpcResult<T> = Result<T, RpcError>;
