// Integration tests for the rate-limit retry wrapper
//
// Run on tokio's paused clock: sleeps complete instantly while virtual time
// still advances, so elapsed waits can be asserted exactly.

use meeting_assistant::openai::ApiError;
use meeting_assistant::retry::{with_backoff, with_backoff_when, RetryError, RetryPolicy};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::time::Instant;

fn rate_limited() -> ApiError {
    ApiError::from_status(429, r#"{"error":{"message":"Too many requests"}}"#.to_string())
}

fn server_error() -> ApiError {
    ApiError::from_status(500, "internal error".to_string())
}

#[tokio::test(start_paused = true)]
async fn test_succeeds_after_two_rate_limits() {
    let policy = RetryPolicy::new(3, 1000);
    let calls = &AtomicU32::new(0);
    let started = Instant::now();

    let result = with_backoff(policy, move || async move {
        let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt < 3 {
            Err(rate_limited())
        } else {
            Ok(format!("attempt {}", attempt))
        }
    })
    .await;

    assert_eq!(result.ok().as_deref(), Some("attempt 3"));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    // baseDelay + 2 * baseDelay
    assert!(started.elapsed() >= Duration::from_millis(3000));
}

#[tokio::test(start_paused = true)]
async fn test_non_rate_limit_failure_is_not_retried() {
    let calls = &AtomicU32::new(0);
    let started = Instant::now();

    let result: Result<(), _> = with_backoff(RetryPolicy::default(), move || async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Err(server_error())
    })
    .await;

    let err = result.unwrap_err();
    assert!(matches!(err, RetryError::NonRetryable(_)));
    assert_eq!(err.inner().status(), Some(500));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_exhaustion_stops_at_max_retries() {
    let policy = RetryPolicy::new(3, 100);
    let calls = &AtomicU32::new(0);
    let started = Instant::now();

    let result: Result<(), _> = with_backoff(policy, move || async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Err(rate_limited())
    })
    .await;

    let err = result.unwrap_err();
    assert!(err.is_rate_limit_exhausted());
    assert!(matches!(
        err,
        RetryError::RateLimitExhausted { attempts: 3, .. }
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    // Two waits (100 + 200); none after the final attempt
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(300));
    assert!(elapsed < Duration::from_millis(700));
    assert!(err.to_string().contains("Rate limit"));
}

#[tokio::test(start_paused = true)]
async fn test_first_success_returns_without_waiting() {
    let started = Instant::now();
    let result = with_backoff(RetryPolicy::default(), || async { Ok::<_, ApiError>(42) }).await;

    assert_eq!(result.ok(), Some(42));
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_message_substring_counts_as_rate_limit() {
    // An upstream that reports rate limiting in the body but not as HTTP 429
    let calls = &AtomicU32::new(0);

    let result = with_backoff(RetryPolicy::new(2, 10), move || async move {
        if calls.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(ApiError::from_status(
                503,
                r#"{"error":{"message":"Rate limit exceeded for model"}}"#.to_string(),
            ))
        } else {
            Ok("done")
        }
    })
    .await;

    assert_eq!(result.ok(), Some("done"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_custom_predicate() {
    let calls = &AtomicU32::new(0);

    let result: Result<(), RetryError<String>> = with_backoff_when(
        RetryPolicy::new(4, 50),
        move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err("busy".to_string())
        },
        |e: &String| e == "busy",
    )
    .await;

    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(result.unwrap_err().into_inner(), "busy");
}

#[tokio::test(start_paused = true)]
async fn test_zero_retries_attempts_once() {
    let calls = &AtomicU32::new(0);

    let result: Result<(), _> = with_backoff(RetryPolicy::new(0, 1000), move || async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Err(rate_limited())
    })
    .await;

    assert!(result.unwrap_err().is_rate_limit_exhausted());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_calls_back_off_independently() {
    let policy = RetryPolicy::new(3, 1000);
    let first_calls = &AtomicU32::new(0);
    let second_calls = &AtomicU32::new(0);
    let started = Instant::now();

    let first = with_backoff(policy, move || async move {
        if first_calls.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(rate_limited())
        } else {
            Ok("first")
        }
    });
    let second = with_backoff(policy, move || async move {
        if second_calls.fetch_add(1, Ordering::SeqCst) == 0 {
            Err(rate_limited())
        } else {
            Ok("second")
        }
    });

    let (first, second) = futures::join!(first, second);

    assert_eq!(first.ok(), Some("first"));
    assert_eq!(second.ok(), Some("second"));
    assert_eq!(first_calls.load(Ordering::SeqCst), 2);
    assert_eq!(second_calls.load(Ordering::SeqCst), 2);
    // Both waits overlap; no shared budget serializes them
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(1000));
    assert!(elapsed < Duration::from_millis(2000));
}
