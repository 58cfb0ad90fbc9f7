//! Resilient request executor.
//!
//! Every network call in the crate passes through [`retry_op`] or
//! [`retry_op_with`]; call sites never hand-roll their own retry loops. An
//! attempt succeeds only if the operation resolves `Ok` and the acceptance
//! predicate (when supplied) approves the value. Between attempts the task
//! suspends for an exponentially growing delay without blocking concurrent
//! resolutions.

use std::fmt::{self, Debug, Display};
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};

use backon::Retryable;
use thiserror::Error;

use crate::config::RetryConfig;
use crate::metrics::{LABEL_OPERATION, RETRY_ATTEMPTS_TOTAL};

/// Error returned when the retry policy is exhausted.
#[derive(Debug, Error)]
pub enum RetryError<T, E> {
    /// Every attempt resolved to an error; `last_error` is the final one.
    #[error("{operation} exhausted {attempts} attempts: {last_error}")]
    Exhausted {
        /// Name of the operation that was retried.
        operation: &'static str,
        /// Number of invocations performed.
        attempts: u32,
        /// The error from the final attempt.
        last_error: E,
    },
    /// The operation kept resolving values the predicate rejected; `last` is
    /// the final unsatisfying result.
    #[error("{operation} exhausted {attempts} attempts without an acceptable result")]
    Rejected {
        /// Name of the operation that was retried.
        operation: &'static str,
        /// Number of invocations performed.
        attempts: u32,
        /// The value from the final attempt.
        last: T,
    },
}

/// A single failed attempt, either an operation error or a predicate miss.
enum Attempt<T, E> {
    Failed(E),
    Unacceptable(T),
}

impl<T, E: Display> Display for Attempt<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(err) => Display::fmt(err, f),
            Self::Unacceptable(_) => f.write_str("result rejected by predicate"),
        }
    }
}

/// Executes `op` under the given retry policy.
///
/// Shorthand for [`retry_op_with`] with a predicate that accepts everything.
pub async fn retry_op<T, E, F, Fut>(
    operation: &'static str,
    config: &RetryConfig,
    op: F,
) -> Result<T, RetryError<T, E>>
where
    T: Debug,
    E: Debug + Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    retry_op_with(operation, config, op, |_| true).await
}

/// Executes `op` under the given retry policy, accepting a result only when
/// `accept` approves it.
///
/// Performs at most `config.max_attempts` invocations (always at least one).
/// Exhaustion surfaces the last error or last unsatisfying result as a
/// [`RetryError`].
pub async fn retry_op_with<T, E, F, Fut, P>(
    operation: &'static str,
    config: &RetryConfig,
    mut op: F,
    accept: P,
) -> Result<T, RetryError<T, E>>
where
    T: Debug,
    E: Debug + Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&T) -> bool,
{
    let attempts = AtomicU32::new(0);
    let accept = &accept;

    let result = (|| {
        attempts.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(RETRY_ATTEMPTS_TOTAL, LABEL_OPERATION => operation).increment(1);
        let fut = op();
        async move {
            match fut.await {
                Ok(value) if accept(&value) => Ok(value),
                Ok(value) => Err(Attempt::Unacceptable(value)),
                Err(err) => Err(Attempt::Failed(err)),
            }
        }
    })
    .retry(config.to_backoff_builder())
    .notify(|err: &Attempt<T, E>, delay| {
        tracing::debug!(operation, ?delay, error = %err, "retrying operation");
    })
    .await;

    let attempts = attempts.load(Ordering::Relaxed);
    result.map_err(|err| match err {
        Attempt::Failed(error) => RetryError::Exhausted { operation, attempts, last_error: error },
        Attempt::Unacceptable(last) => RetryError::Rejected { operation, attempts, last },
    })
}
