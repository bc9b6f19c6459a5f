//! Backoff policy for signer HTTP calls.
//!
//! Only transport failures (refused connections, timeouts) are retried. A
//! reply with any status code ends the loop; the caller decides what a
//! non-2xx status means.

use std::future::Future;
use std::time::Duration;

/// How many times, and how patiently, to re-send a signer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Re-sends after the first attempt.
    pub max_retries: u32,
    /// Delay before the first re-send; doubled for each one after.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    /// A policy that sends exactly once.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    fn delay_before(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(1u32 << retry.min(16))
    }

    /// Run `send` until it yields a response or the retry budget is spent.
    pub(crate) async fn send<F, Fut>(
        &self,
        endpoint: &str,
        send: F,
    ) -> Result<reqwest::Response, reqwest::Error>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        let mut retry = 0;
        loop {
            match send().await {
                Ok(resp) => return Ok(resp),
                Err(e) if retry < self.max_retries => {
                    let delay = self.delay_before(retry);
                    retry += 1;
                    tracing::warn!(
                        attempt = retry,
                        max_retries = self.max_retries,
                        endpoint,
                        error = %e,
                        "signer unreachable, retrying in {delay:?}"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
