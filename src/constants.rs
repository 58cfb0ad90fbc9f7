//! Constants used throughout the resolver.

use std::time::Duration;

use alloy_primitives::{b256, B256};

/// Default maximum number of attempts for network operations.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default initial delay for exponential backoff.
pub const DEFAULT_RETRY_INITIAL_DELAY: Duration = Duration::from_millis(100);

/// Default maximum delay between retry attempts.
pub const DEFAULT_RETRY_MAX_DELAY: Duration = Duration::from_secs(10);

/// Default exponential backoff factor.
pub const DEFAULT_RETRY_FACTOR: f32 = 2.0;

/// Default timeout for a single RPC or HTTP request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Topic 0 of the rollup registry's assertion-creation event.
pub const ASSERTION_CREATED_TOPIC: B256 =
    b256!("901c3aee23cf4478825462caaab375c606ab83516060388344f0650340753630");

/// Topic 0 of the outbox's message-posted event.
pub const MESSAGE_POSTED_TOPIC: B256 =
    b256!("8c3e2b6a5f9f3998732307b6e6be96b5c909d7801671bffa843457af80ccc21f");

/// Explorer log queries are not paginated; callers re-poll with a later
/// `fromBlock` instead.
pub const EXPLORER_PAGE: u32 = 1;

/// Anchor registry key for the respected game type.
pub const DEFAULT_ANCHOR_GAME_TYPE: u32 = 0;
