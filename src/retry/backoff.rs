use super::policy::RetryPolicy;
use std::fmt::{Debug, Display};
use std::future::Future;
use thiserror::Error;
use tracing::{debug, warn};

/// Substring that marks an error message as a rate-limit failure.
pub const RATE_LIMIT_MARKER: &str = "Rate limit";

/// Whether a free-form error message reports a rate limit
pub fn message_signals_rate_limit(message: &str) -> bool {
    message.contains(RATE_LIMIT_MARKER)
}

/// Failures that can tell whether they are a transient rate limit
pub trait RateLimited {
    fn is_rate_limited(&self) -> bool;
}

/// Why a wrapped operation finally failed
#[derive(Debug, Error)]
pub enum RetryError<E: Debug + Display> {
    /// Every allowed attempt hit a rate limit; holds the last failure
    #[error("{last} (gave up after {attempts} attempts)")]
    RateLimitExhausted { attempts: u32, last: E },

    /// Any other failure, surfaced on first occurrence
    #[error("{0}")]
    NonRetryable(E),
}

impl<E: Debug + Display> RetryError<E> {
    /// The failure returned by the last attempt
    pub fn into_inner(self) -> E {
        match self {
            RetryError::RateLimitExhausted { last, .. } => last,
            RetryError::NonRetryable(err) => err,
        }
    }

    pub fn inner(&self) -> &E {
        match self {
            RetryError::RateLimitExhausted { last, .. } => last,
            RetryError::NonRetryable(err) => err,
        }
    }

    pub fn is_rate_limit_exhausted(&self) -> bool {
        matches!(self, RetryError::RateLimitExhausted { .. })
    }
}

/// Run `operation`, retrying rate-limited failures with exponential backoff.
pub async fn with_backoff<T, E, F, Fut>(policy: RetryPolicy, operation: F) -> Result<T, RetryError<E>>
where
    E: RateLimited + Debug + Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    with_backoff_when(policy, operation, E::is_rate_limited).await
}

/// Run `operation`, retrying failures accepted by `should_retry`.
///
/// At most `policy.attempts()` invocations. After failed attempt `i` the
/// wrapper sleeps `policy.delay_for(i)` on the tokio timer before trying
/// again. Failures rejected by `should_retry`, or a retryable failure on the
/// final attempt, are returned immediately.
pub async fn with_backoff_when<T, E, F, Fut, P>(
    policy: RetryPolicy,
    mut operation: F,
    should_retry: P,
) -> Result<T, RetryError<E>>
where
    E: Debug + Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let attempts = policy.attempts();
    let mut attempt = 0;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !should_retry(&err) {
            debug!("Attempt {} failed without retry: {}", attempt + 1, err);
            return Err(RetryError::NonRetryable(err));
        }

        if attempt + 1 >= attempts {
            warn!("Rate limit persisted through {} attempts: {}", attempts, err);
            return Err(RetryError::RateLimitExhausted { attempts, last: err });
        }

        let delay = policy.delay_for(attempt);
        warn!(
            "Rate limit hit, retrying in {}ms (attempt {}/{})",
            delay.as_millis(),
            attempt + 1,
            attempts
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
