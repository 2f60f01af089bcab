//! Bounded retries under a shared deadline.
//!
//! One implementation serves both call sites: the router re-driving a failed
//! probe/select/forward cycle, and a client re-calling the router. The delay
//! between attempts is fixed; there is no backoff or jitter. The deadline
//! spans all attempts of one logical request and is never reset per attempt.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::time::{self, Instant};

/// Retry parameters for one logical request.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum attempts, including the first.
    pub max_attempts: u32,
    /// Fixed sleep between attempts.
    pub delay: Duration,
    /// Overall deadline shared across all attempts.
    pub deadline: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
            deadline: Duration::from_secs(10),
        }
    }
}

impl From<crate::config::RetryConfig> for RetryPolicy {
    fn from(config: crate::config::RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            delay: Duration::from_millis(config.delay_ms),
            deadline: Duration::from_secs(config.deadline_secs),
        }
    }
}

impl RetryPolicy {
    /// Drive `op` until it succeeds, attempts run out, or the deadline
    /// expires.
    ///
    /// `op` receives the 1-based attempt number. On exhaustion the LAST
    /// attempt's error is surfaced, so the root cause reaches the caller
    /// instead of a generic retries-exhausted message.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let started = Instant::now();
        let mut last = None;

        for attempt in 1..=self.max_attempts {
            let remaining = match self.deadline.checked_sub(started.elapsed()) {
                Some(r) if r > Duration::ZERO => r,
                _ => {
                    return Err(RetryError::DeadlineExceeded {
                        attempts: attempt - 1,
                        last,
                    })
                }
            };

            match time::timeout(remaining, op(attempt)).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(error)) => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %error,
                        "attempt failed"
                    );
                    last = Some(error);
                }
                Err(_) => {
                    return Err(RetryError::DeadlineExceeded {
                        attempts: attempt,
                        last,
                    })
                }
            }

            if attempt < self.max_attempts {
                time::sleep(self.delay).await;
            }
        }

        match last {
            Some(error) => Err(RetryError::Exhausted(error)),
            // max_attempts == 0; nothing ever ran
            None => Err(RetryError::DeadlineExceeded {
                attempts: 0,
                last: None,
            }),
        }
    }
}

/// Terminal failure of a retried operation.
#[derive(Debug)]
pub enum RetryError<E> {
    /// Every attempt failed; holds the last attempt's error.
    Exhausted(E),
    /// The shared deadline expired before an attempt succeeded.
    DeadlineExceeded { attempts: u32, last: Option<E> },
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Surface the underlying error verbatim.
            RetryError::Exhausted(error) => write!(f, "{}", error),
            RetryError::DeadlineExceeded { attempts, last } => {
                write!(f, "deadline exceeded after {} attempt(s)", attempts)?;
                if let Some(error) = last {
                    write!(f, "; last error: {}", error)?;
                }
                Ok(())
            }
        }
    }
}

impl<E: fmt::Display + fmt::Debug> std::error::Error for RetryError<E> {}
