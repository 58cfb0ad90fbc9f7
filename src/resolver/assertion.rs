//! Optimistic-rollup assertion resolution.
//!
//! Derives the finalized destination block from the latest confirmed
//! assertion on the settlement layer: read the confirmed assertion hash from
//! the rollup registry, locate its creation event via the explorer, and take
//! the block hash from the assertion's post-state global-state vector.

use alloy_primitives::B256;
use tracing::{debug, info};

use super::{AssertionProof, DestinationResolver, ResolutionMode, ResolvedDestinationState};
use crate::constants::ASSERTION_CREATED_TOPIC;
use crate::contracts::decode_assertion_created;
use crate::error::{ResolverError, ResolverResult};
use crate::explorer::LogQuery;

pub(super) async fn resolve_via_assertion(
    resolver: &DestinationResolver,
    at_settlement_block: Option<u64>,
) -> ResolverResult<ResolvedDestinationState> {
    let destination = &resolver.chains.destination;
    let chain_id = destination.chain_id;

    // The pin is mandatory unless the oracle fallback is active, in which
    // case the registry is read at its head state instead.
    if at_settlement_block.is_none() && !resolver.oracle_fallback {
        return Err(ResolverError::SettlementBlockRequired);
    }

    let rollup = resolver
        .rollup
        .as_ref()
        .ok_or(ResolverError::UnverifiableChain { chain_id })?;
    let explorer = resolver.explorer.as_ref().ok_or(ResolverError::ExplorerNotConfigured {
        chain_id: resolver.chains.settlement.chain_id,
    })?;
    let oracle = destination
        .state_oracle
        .ok_or(ResolverError::UnverifiableChain { chain_id })?;

    let assertion_hash = rollup.latest_confirmed(at_settlement_block).await?;
    debug!(chain_id, %assertion_hash, "latest confirmed assertion");

    let logs = explorer
        .fetch_logs(LogQuery {
            address: oracle,
            topic0: ASSERTION_CREATED_TOPIC,
            topic1: Some(assertion_hash),
            from_block: None,
        })
        .await?;
    let Some(log) = logs.first() else {
        return Err(ResolverError::AssertionLogNotFound { chain_id, assertion_hash });
    };

    let event = decode_assertion_created(chain_id, log)?;
    let block_hash = event.assertion.afterState.globalState.bytes32Vals[0];
    if block_hash == B256::ZERO {
        return Err(ResolverError::AssertionFieldMissing { chain_id, assertion_hash });
    }

    let block = resolver
        .destination_client
        .block_by_hash(block_hash)
        .await
        .map_err(|e| resolver.map_destination_block_err(e, format!("hash {block_hash}")))?;

    info!(
        chain_id,
        number = block.header.number,
        %block_hash,
        %assertion_hash,
        "resolved destination block via assertion"
    );

    Ok(ResolvedDestinationState {
        block,
        mode: ResolutionMode::TrustMinimized,
        proof: Some(AssertionProof {
            parent_assertion_hash: event.parentAssertionHash,
            after_inbox_batch_acc: event.afterInboxBatchAcc,
            after_state: event.assertion.afterState,
        }),
    })
}
