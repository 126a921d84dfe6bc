//! Delay applied before retrying a rate-limited label creation.

use std::time::Duration;

use async_trait::async_trait;

/// Default pause before the single retry.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Waits before a retry.
#[async_trait]
pub trait BackoffPolicy: Send + Sync {
    /// Suspends until the retry may proceed.
    async fn wait(&self);
}

/// Sleeps for a fixed duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    /// Policy sleeping for `delay` on each wait.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_DELAY)
    }
}

#[async_trait]
impl BackoffPolicy for FixedDelay {
    async fn wait(&self) {
        tracing::debug!(delay_ms = self.delay.as_millis(), "backing off before retry");
        tokio::time::sleep(self.delay).await;
    }
}

/// Returns immediately, counting how often it was asked to wait.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Default)]
pub struct NoDelay {
    waits: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "test-support"))]
impl NoDelay {
    /// Fresh policy with no recorded waits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completed waits.
    #[must_use]
    pub fn waits(&self) -> usize {
        self.waits.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl BackoffPolicy for NoDelay {
    async fn wait(&self) {
        self.waits.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rstest::rstest;

    use super::{BackoffPolicy, FixedDelay};

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn fixed_delay_sleeps_for_the_configured_duration() {
        let policy = FixedDelay::new(Duration::from_secs(60));
        let started = tokio::time::Instant::now();

        policy.wait().await;

        assert!(started.elapsed() >= Duration::from_secs(60));
    }
}
