//! Metric names recorded by the resolver.
//!
//! The crate records against the `metrics` facade only; installing an
//! exporter is the embedding process's job.

/// Counter: total network attempts, labelled with `operation`.
pub const RETRY_ATTEMPTS_TOTAL: &str = "chain_resolver_retry_attempts_total";

/// Counter: total explorer log queries, labelled with `outcome`.
pub const EXPLORER_QUERIES_TOTAL: &str = "chain_resolver_explorer_queries_total";

/// Counter: total resolution requests, labelled with `strategy` and `outcome`.
pub const RESOLUTIONS_TOTAL: &str = "chain_resolver_resolutions_total";

/// Counter: total beacon block fetches, labelled with `outcome`.
pub const BEACON_FETCHES_TOTAL: &str = "chain_resolver_beacon_fetches_total";

/// Label key for the operation name.
pub const LABEL_OPERATION: &str = "operation";

/// Label key for the verification strategy.
pub const LABEL_STRATEGY: &str = "strategy";

/// Label key for the outcome (`ok` or `error`).
pub const LABEL_OUTCOME: &str = "outcome";
