//! Outbox message watcher.
//!
//! Polls a source chain's outbox contract for newly posted cross-chain
//! messages. Returns raw logs only; decoding and the "last seen block"
//! cursor belong to the caller.

use std::sync::Arc;

use alloy_primitives::Address;

use crate::config::RetryConfig;
use crate::constants::MESSAGE_POSTED_TOPIC;
use crate::error::{ResolverError, ResolverResult};
use crate::explorer::{ExplorerApi, ExplorerClient, ExplorerLog, LogQuery};
use crate::registry::{ChainRegistry, VerificationStrategy};

/// Watches one outbox contract for posted messages.
#[allow(missing_debug_implementations)]
pub struct OutboxWatcher {
    explorer: Arc<dyn ExplorerApi>,
    outbox: Address,
}

impl OutboxWatcher {
    /// Creates a watcher over the given explorer client and outbox address.
    pub fn new(explorer: Arc<dyn ExplorerApi>, outbox: Address) -> Self {
        Self { explorer, outbox }
    }

    /// Creates a watcher for a registered chain's outbox of the given proof
    /// flavor, using the chain's own explorer endpoint.
    pub fn for_chain(
        registry: &ChainRegistry,
        chain_id: u64,
        flavor: VerificationStrategy,
        retry: RetryConfig,
    ) -> ResolverResult<Self> {
        let descriptor = registry.descriptor_for(chain_id)?;
        let outbox = descriptor
            .outboxes
            .get(&flavor)
            .copied()
            .ok_or(ResolverError::OutboxNotConfigured { chain_id })?;
        let explorer = ExplorerClient::from_descriptor(descriptor, retry)?;
        Ok(Self::new(Arc::new(explorer), outbox))
    }

    /// The outbox contract address being watched.
    pub const fn outbox(&self) -> Address {
        self.outbox
    }

    /// Returns all message-posted logs from `from_block` onward.
    pub async fn messages_since(&self, from_block: u64) -> ResolverResult<Vec<ExplorerLog>> {
        self.explorer
            .fetch_logs(LogQuery {
                address: self.outbox,
                topic0: MESSAGE_POSTED_TOPIC,
                topic1: None,
                from_block: Some(from_block),
            })
            .await
    }
}
