//! Bounded retry without backoff.

use std::fmt::Display;
use std::future::Future;
use tracing::{debug, warn};

/// The last failure of an operation that ran out of attempts.
#[derive(Debug)]
pub struct Exhausted<E> {
    /// Attempts made, including the first.
    pub attempts: u32,
    pub last_error: E,
}

/// Runs `op` until it succeeds or `max_attempts` attempts have failed.
///
/// `op` receives the 1-based attempt number. At least one attempt is always
/// made. Attempts follow each other immediately.
pub async fn with_attempts<T, E, F, Fut>(
    operation: &str,
    max_attempts: u32,
    op: F,
) -> Result<T, Exhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    with_attempts_while(operation, max_attempts, |_| true, op).await
}

/// Like [`with_attempts`], but stops at the first error for which
/// `retryable` returns false.
pub async fn with_attempts_while<T, E, R, F, Fut>(
    operation: &str,
    max_attempts: u32,
    retryable: R,
    mut op: F,
) -> Result<T, Exhausted<E>>
where
    R: Fn(&E) -> bool,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(operation, attempt, "succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if attempt < max_attempts && retryable(&e) => {
                warn!(operation, attempt, max_attempts, error = %e, "attempt failed, retrying");
                attempt += 1;
            }
            Err(e) => {
                warn!(operation, attempts = attempt, error = %e, "giving up");
                return Err(Exhausted {
                    attempts: attempt,
                    last_error: e,
                });
            }
        }
    }
}
