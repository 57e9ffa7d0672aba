use std::fmt::Display;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::time::sleep;
use tracing::warn;

/// Bounded retry with exponential backoff, applied to a fallible async
/// operation. The policy knows nothing about what it wraps; the generation
/// orchestrator applies it per vocab group.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay slept after the given failed attempt (1-based):
    /// `base * 2^(attempt-1)`.
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        self.base_backoff * 2u32.saturating_pow(attempt.saturating_sub(1))
    }

    /// Invokes `op` up to `attempts` times, sleeping between failures. The
    /// attempt number (1-based) is passed to each invocation. On exhaustion
    /// the last error is returned together with the attempt count.
    pub async fn run<'a, T, E>(
        &self,
        mut op: impl FnMut(u32) -> BoxFuture<'a, Result<T, E>> + 'a,
    ) -> Result<T, (E, u32)>
    where
        E: Display,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt >= self.attempts {
                        return Err((err, attempt));
                    }
                    let delay = self.backoff_after(attempt);
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "attempt failed, backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}
