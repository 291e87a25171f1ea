//! Fixed-interval retry for dataset acquisition
//!
//! The upstream extraction system is rate limited, so a failed attempt waits a fixed
//! interval before the next one instead of backing off exponentially. Every attempt
//! is recorded as a [`RunAttempt`], whether or not acquisition eventually succeeds.
//! A fatal error (see [`Error::is_fatal`]) ends the loop at once.
//!
//! # Example
//!
//! ```no_run
//! use review_orchestrator::clock::SystemClock;
//! use review_orchestrator::config::RetryConfig;
//! use review_orchestrator::retry::acquire_with_retry;
//! use review_orchestrator::types::DatasetRef;
//!
//! # async fn example() {
//! let config = RetryConfig::default();
//! let outcome = acquire_with_retry(
//!     &config,
//!     &SystemClock,
//!     |_attempt| async {
//!         Ok::<_, review_orchestrator::Error>(DatasetRef {
//!             path: "data/export.csv".into(),
//!             row_count: 10,
//!         })
//!     },
//!     |dataset| dataset.clone(),
//!     |_attempt, _will_retry| {},
//! )
//! .await;
//! assert!(outcome.is_ok());
//! # }
//! ```

use crate::clock::Clock;
use crate::config::RetryConfig;
use crate::error::Error;
use crate::types::{AttemptOutcome, DatasetRef, RunAttempt};
use std::future::Future;

/// A successfully acquired value and the attempts it took
#[derive(Debug)]
pub struct Acquired<T> {
    /// The acquired value
    pub value: T,
    /// Every attempt, the last one successful
    pub attempts: Vec<RunAttempt>,
}

/// Terminal failure after every attempt failed
#[derive(Debug, Clone, thiserror::Error)]
#[error("extraction failed after {} attempts: {last_cause}", .attempts.len())]
pub struct ExtractionFailure {
    /// Every attempt, all failed
    pub attempts: Vec<RunAttempt>,
    /// Cause of the final attempt
    pub last_cause: String,
}

/// Why acquisition stopped without a value
#[derive(Debug, thiserror::Error)]
pub enum RetryError {
    /// Every attempt failed with a retryable error
    #[error(transparent)]
    Exhausted(#[from] ExtractionFailure),

    /// An attempt failed with an error retrying cannot fix
    #[error("extraction stopped on attempt {attempt}: {source}")]
    Fatal {
        /// Number of the attempt that failed
        attempt: u32,
        /// The fatal error
        #[source]
        source: Error,
    },
}

/// Run `operation` up to `config.max_attempts` times, sleeping
/// `config.backoff_interval` on `clock` between failed attempts
///
/// Any non-fatal error consumes one attempt; the gateway behind the operation is
/// opaque, so those are all treated as transient. A fatal error is recorded as a
/// final attempt and returned as [`RetryError::Fatal`] without further attempts or
/// sleeps. There is no sleep after the final attempt.
///
/// `describe` turns a success into the dataset reference recorded in the attempt
/// history, and `on_attempt` observes each attempt as it is recorded along with
/// whether another attempt will follow.
pub async fn acquire_with_retry<T, F, Fut, D, O>(
    config: &RetryConfig,
    clock: &dyn Clock,
    mut operation: F,
    describe: D,
    mut on_attempt: O,
) -> Result<Acquired<T>, RetryError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, Error>>,
    D: Fn(&T) -> DatasetRef,
    O: FnMut(&RunAttempt, bool),
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempts = Vec::with_capacity(max_attempts as usize);
    let mut last_cause = String::new();

    for attempt_number in 1..=max_attempts {
        let started_at = clock.now();
        tracing::info!(
            attempt = attempt_number,
            max_attempts,
            started_at = %started_at.format("%Y-%m-%d %H:%M:%S"),
            "extraction attempt"
        );

        match operation(attempt_number).await {
            Ok(value) => {
                let dataset = describe(&value);
                let attempt = RunAttempt {
                    attempt_number,
                    started_at,
                    finished_at: clock.now(),
                    outcome: AttemptOutcome::Success {
                        dataset: dataset.clone(),
                    },
                };
                on_attempt(&attempt, false);
                attempts.push(attempt);

                tracing::info!(
                    attempt = attempt_number,
                    path = ?dataset.path,
                    rows = dataset.row_count,
                    "extraction attempt succeeded"
                );
                return Ok(Acquired { value, attempts });
            }
            Err(e) => {
                let fatal = e.is_fatal();
                let will_retry = !fatal && attempt_number < max_attempts;
                last_cause = e.to_string();
                let attempt = RunAttempt {
                    attempt_number,
                    started_at,
                    finished_at: clock.now(),
                    outcome: AttemptOutcome::Failure {
                        cause: last_cause.clone(),
                    },
                };
                on_attempt(&attempt, will_retry);
                attempts.push(attempt);

                if fatal {
                    tracing::error!(
                        error = %e,
                        code = e.error_code(),
                        attempt = attempt_number,
                        "extraction attempt failed fatally, not retrying"
                    );
                    return Err(RetryError::Fatal {
                        attempt: attempt_number,
                        source: e,
                    });
                }

                tracing::warn!(
                    error = %e,
                    code = e.error_code(),
                    attempt = attempt_number,
                    max_attempts,
                    will_retry,
                    backoff_secs = config.backoff_interval.as_secs(),
                    "extraction attempt failed"
                );

                if will_retry {
                    clock.sleep(config.backoff_interval).await;
                }
            }
        }
    }

    tracing::error!(
        attempts = attempts.len(),
        "dataset extraction failed on every attempt"
    );
    for attempt in &attempts {
        tracing::error!(
            attempt = attempt.attempt_number,
            started_at = %attempt.started_at.format("%Y-%m-%d %H:%M:%S"),
            "failed extraction attempt"
        );
    }

    Err(RetryError::Exhausted(ExtractionFailure {
        attempts,
        last_cause,
    }))
}
