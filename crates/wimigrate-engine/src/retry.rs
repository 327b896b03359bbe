//! Bounded retry for calls against the remote tracking service.
//!
//! Only transient failures ([`ServiceError::is_transient`]) are retried; any
//! other error propagates on first sight without consuming the budget. The
//! delay before attempt `n + 1` is `(n + 1) * base_delay`, blocking the
//! calling thread.

use std::time::Duration;

use wimigrate_types::error::ServiceError;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;
pub const DEFAULT_BASE_DELAY_MS: u64 = 10;

/// Why a retried call produced no value.
///
/// `Exhausted` is deliberately distinct from success: a caller can never
/// mistake "every attempt failed" for an empty result.
#[derive(Debug, thiserror::Error)]
pub enum RetryError {
    /// Every attempt failed with a transient error.
    #[error("{context}: retries failed after {attempts} attempt(s), last error: {last}")]
    Exhausted {
        context: String,
        attempts: u32,
        last: ServiceError,
    },
    /// A non-transient error ended the call immediately.
    #[error("{context}: {source}")]
    Fatal {
        context: String,
        #[source]
        source: ServiceError,
    },
}

impl RetryError {
    /// The service error behind this failure.
    #[must_use]
    pub fn service_error(&self) -> &ServiceError {
        match self {
            Self::Exhausted { last, .. } => last,
            Self::Fatal { source, .. } => source,
        }
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, Duration::from_millis(DEFAULT_BASE_DELAY_MS))
    }
}

impl RetryPolicy {
    /// A policy allowing `max_attempts` calls in total (at least one).
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Policy that never sleeps, for tests and dry runs.
    #[must_use]
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay slept after the failure of the zero-based `attempt_index`.
    #[must_use]
    pub fn backoff(&self, attempt_index: u32) -> Duration {
        self.base_delay.saturating_mul(attempt_index.saturating_add(1))
    }

    /// Run `op` until it succeeds, fails non-transiently, or the attempt
    /// budget is spent.
    ///
    /// # Errors
    ///
    /// [`RetryError::Fatal`] on the first non-transient error,
    /// [`RetryError::Exhausted`] when every attempt failed transiently.
    pub fn execute<T, F>(&self, context: &str, mut op: F) -> Result<T, RetryError>
    where
        F: FnMut() -> Result<T, ServiceError>,
    {
        let mut attempt_index = 0u32;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() => {
                    tracing::error!(
                        context,
                        attempt = attempt_index + 1,
                        max_attempts = self.max_attempts,
                        kind = %err.kind,
                        code = %err.code,
                        "Transient service failure"
                    );
                    if attempt_index + 1 >= self.max_attempts {
                        tracing::error!(context, attempts = self.max_attempts, "Retries failed");
                        return Err(RetryError::Exhausted {
                            context: context.to_string(),
                            attempts: self.max_attempts,
                            last: err,
                        });
                    }
                    let delay = self.backoff(attempt_index);
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                    attempt_index += 1;
                }
                Err(err) => {
                    return Err(RetryError::Fatal {
                        context: context.to_string(),
                        source: err,
                    });
                }
            }
        }
    }

    /// [`execute`](Self::execute) for side-effecting calls with no result.
    ///
    /// # Errors
    ///
    /// Same as [`execute`](Self::execute).
    pub fn execute_unit<F>(&self, context: &str, op: F) -> Result<(), RetryError>
    where
        F: FnMut() -> Result<(), ServiceError>,
    {
        self.execute(context, op)
    }
}
