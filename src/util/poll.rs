//! Wait on long-running remote operations with a growing poll interval.

use std::future::Future;
use std::time::Duration;

use crate::error::BridgeError;

/// Poll interval policy. There is no overall deadline: remote services own
/// their timeouts.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Delay before the second check.
    pub initial_interval: Duration,
    /// Upper bound on the delay between checks.
    pub max_interval: Duration,
    /// Interval growth factor.
    pub multiplier: f64,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(10),
            multiplier: 1.5,
        }
    }
}

impl PollPolicy {
    /// Policy with a fixed interval, mostly useful in tests.
    pub fn fixed(interval: Duration) -> Self {
        Self {
            initial_interval: interval,
            max_interval: interval,
            multiplier: 1.0,
        }
    }

    /// Await `check` until it yields `Some`, sleeping between attempts.
    pub async fn wait_until<F, Fut, T>(&self, mut check: F) -> Result<T, BridgeError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>, BridgeError>>,
    {
        let mut interval = self.initial_interval;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            if let Some(value) = check().await? {
                return Ok(value);
            }

            tracing::trace!(attempt, interval_ms = interval.as_millis() as u64, "Still pending");
            tokio::time::sleep(interval).await;

            interval = Duration::from_secs_f64(
                (interval.as_secs_f64() * self.multiplier).min(self.max_interval.as_secs_f64()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn resolves_once_check_reports_done() {
        let calls = AtomicU32::new(0);
        let policy = PollPolicy::default();

        let value = policy
            .wait_until(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move { Ok((n >= 4).then_some(n)) }
            })
            .await
            .unwrap();

        assert_eq!(value, 4);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn check_errors_stop_the_wait() {
        let policy = PollPolicy::fixed(Duration::from_millis(5));
        let err = policy
            .wait_until(|| async { Err::<Option<()>, _>(BridgeError::NotFound("run".into())) })
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::NotFound(_)));
    }
}
