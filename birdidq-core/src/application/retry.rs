// birdidq-core/src/application/retry.rs

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Whether a failed attempt is worth repeating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDisposition {
    Retry,
    Stop,
}

#[derive(Debug)]
pub enum RetryError<E> {
    /// Classified as not retryable; returned after the attempt that raised it.
    Fatal { attempts: usize, error: E },
    /// Every allowed attempt failed with a retryable error.
    AttemptsExceeded { attempts: usize, error: E },
}

impl<E> RetryError<E> {
    pub fn attempts(&self) -> usize {
        match self {
            RetryError::Fatal { attempts, .. } | RetryError::AttemptsExceeded { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn into_inner(self) -> E {
        match self {
            RetryError::Fatal { error, .. } | RetryError::AttemptsExceeded { error, .. } => error,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: if max_delay.is_zero() {
                base_delay
            } else {
                max_delay
            },
        }
    }

    /// Runs `op` until it succeeds, `classify` says stop, or attempts run out.
    /// Sleeps between attempts only, never after the last one.
    pub async fn run<F, Fut, T, E, Classifier>(
        &self,
        mut op: F,
        classify: Classifier,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        Classifier: Fn(&E) -> RetryDisposition,
        E: std::fmt::Display,
    {
        let mut attempt = 0;

        loop {
            match op().await {
                Ok(result) => return Ok(result),
                Err(error) => {
                    let attempts = attempt + 1;
                    match classify(&error) {
                        RetryDisposition::Stop => return Err(RetryError::Fatal { attempts, error }),
                        RetryDisposition::Retry => {
                            if attempts >= self.max_attempts {
                                return Err(RetryError::AttemptsExceeded { attempts, error });
                            }

                            let delay = self.backoff_delay(attempt);
                            warn!(
                                "Attempt {}/{} failed ({}), retrying in {:?}",
                                attempts, self.max_attempts, error, delay
                            );
                            sleep(delay).await;
                            attempt += 1;
                        }
                    }
                }
            }
        }
    }

    /// `base_delay * 2^attempt`, capped at `max_delay`.
    pub fn backoff_delay(&self, attempt: usize) -> Duration {
        if self.base_delay.is_zero() {
            return Duration::from_millis(0);
        }

        let factor = 1u128 << attempt.min(16);
        let delay_ms = self.base_delay.as_millis().saturating_mul(factor);
        let capped = delay_ms.min(self.max_delay.as_millis());
        Duration::from_millis(capped as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::new(5, Duration::from_secs(2), Duration::from_secs(5));
        assert_eq!(policy.backoff_delay(0), Duration::from_secs(2));
        assert_eq!(policy.backoff_delay(1), Duration::from_secs(4));
        assert_eq!(policy.backoff_delay(2), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_attempts_with_backoff() {
        let calls = Arc::new(AtomicUsize::new(0));
        let policy = RetryPolicy::default();
        let started = tokio::time::Instant::now();

        let result: Result<(), _> = policy
            .run(
                || {
                    let calls = calls.clone();
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Err::<(), _>("502 bad gateway")
                    }
                },
                |_| RetryDisposition::Retry,
            )
            .await;

        let err = result.err().map(|e| e.attempts());
        assert_eq!(err, Some(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 2s + 4s between the three attempts, nothing after the last.
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(6) && elapsed < Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_stops_immediately() {
        let calls = Arc::new(AtomicUsize::new(0));
        let result: Result<(), _> = RetryPolicy::default()
            .run(
                || {
                    let calls = calls.clone();
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Err::<(), _>("401 unauthorized")
                    }
                },
                |_| RetryDisposition::Stop,
            )
            .await;

        assert!(matches!(result, Err(RetryError::Fatal { attempts: 1, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let policy = RetryPolicy::new(3, Duration::ZERO, Duration::ZERO);
        let result = policy
            .run(
                || {
                    let calls = calls.clone();
                    async move {
                        if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                            Err("timeout")
                        } else {
                            Ok(42)
                        }
                    }
                },
                |_| RetryDisposition::Retry,
            )
            .await;
        assert_eq!(result.ok(), Some(42));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
