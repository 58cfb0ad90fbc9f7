//! Anchor-registry and direct resolution.
//!
//! Trust-minimized mode reads the anchored destination block number from the
//! settlement-layer registry, pinned to a settlement block. Direct mode reads
//! the destination chain's own head; it is only entered when the descriptor
//! flags or strategy demand it, and the relaxed trust model is surfaced on
//! the result.

use tracing::{debug, info};

use super::{DestinationResolver, ResolutionMode, ResolvedDestinationState};
use crate::error::{ResolverError, ResolverResult};

pub(super) async fn resolve_via_anchor(
    resolver: &DestinationResolver,
    at_settlement_block: Option<u64>,
) -> ResolverResult<ResolvedDestinationState> {
    let chain_id = resolver.chains.destination.chain_id;

    let (block_number, mode) = if resolver.direct_mode() {
        let head = resolver.destination_client.block_number().await?;
        debug!(chain_id, head, "using destination head directly");
        (head, ResolutionMode::Direct)
    } else {
        let at = at_settlement_block.ok_or(ResolverError::SettlementBlockRequired)?;
        let anchor_client = resolver
            .anchor
            .as_ref()
            .ok_or(ResolverError::UnverifiableChain { chain_id })?;
        let anchor = anchor_client.anchor_at(resolver.anchor_game_type, Some(at)).await?;
        (anchor.l2_block_number, ResolutionMode::TrustMinimized)
    };

    let block = resolver
        .destination_client
        .block_by_number(Some(block_number))
        .await
        .map_err(|e| resolver.map_destination_block_err(e, format!("number {block_number}")))?;

    info!(chain_id, number = block_number, ?mode, "resolved destination block via anchor");

    Ok(ResolvedDestinationState { block, mode, proof: None })
}
