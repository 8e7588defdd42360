//! Retry with exponential backoff around flaky API calls
//!
//! Only rate-limit failures are retried. Each call to [`with_backoff`] is
//! independent: no shared budget, queue or lock between concurrent callers.

mod backoff;
mod policy;

pub use backoff::{
    message_signals_rate_limit, with_backoff, with_backoff_when, RateLimited, RetryError,
    RATE_LIMIT_MARKER,
};
pub use policy::RetryPolicy;
