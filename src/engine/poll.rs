//! Poll-until-ready primitive with a wall-clock budget
//!
//! The widget renders asynchronously, so readiness is only observable by
//! re-probing the DOM. This module provides the single polling loop both
//! waits (initial render, page advance) are built on.

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, sleep};

/// Fixed-interval poller with a total time budget
///
/// Runs an async probe once per tick. The probe reports readiness by
/// returning `Ok(Some(value))` and not-ready with `Ok(None)`; probe errors
/// end the poll immediately.
#[derive(Debug, Clone, Copy)]
pub struct Poller {
    interval: Duration,
    budget: Duration,
}

impl Poller {
    #[must_use]
    pub fn new(interval: Duration, budget: Duration) -> Self {
        Self { interval, budget }
    }

    #[must_use]
    pub fn from_millis(interval_ms: u64, budget_ms: u64) -> Self {
        Self::new(
            Duration::from_millis(interval_ms),
            Duration::from_millis(budget_ms),
        )
    }

    #[must_use]
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Polls `probe` until it is ready or the budget is exhausted
    ///
    /// # Returns
    /// * `Ok(Some(value))` - A tick reported ready
    /// * `Ok(None)` - The budget ran out with every tick still pending
    /// * `Err(e)` - A tick failed; polling stops at the first error
    ///
    /// The probe always runs at least once, even with a zero budget. A poll
    /// that times out consumes at most budget + one interval + one probe of
    /// wall-clock time: the elapsed check runs after each pending tick, and
    /// only a not-yet-exhausted budget buys another sleep.
    pub async fn run<T, E, F, Fut>(&self, mut probe: F) -> Result<Option<T>, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
    {
        let start = Instant::now();

        loop {
            if let Some(value) = probe().await? {
                return Ok(Some(value));
            }

            if start.elapsed() >= self.budget {
                return Ok(None);
            }

            sleep(self.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn ready_on_first_tick_returns_immediately() {
        let poller = Poller::from_millis(100, 5_000);
        let ticks = AtomicU32::new(0);

        let result: Result<Option<u32>, std::io::Error> = poller
            .run(|| {
                ticks.fetch_add(1, Ordering::SeqCst);
                async { Ok(Some(7)) }
            })
            .await;

        assert_eq!(result.unwrap(), Some(7));
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_probe_times_out_within_budget_plus_one_interval() {
        let poller = Poller::from_millis(100, 1_000);
        let start = Instant::now();

        let result: Result<Option<()>, std::io::Error> =
            poller.run(|| async { Ok(None) }).await;

        assert_eq!(result.unwrap(), None);
        assert!(start.elapsed() >= Duration::from_millis(1_000));
        assert!(start.elapsed() <= Duration::from_millis(1_100));
    }

    #[tokio::test(start_paused = true)]
    async fn becomes_ready_after_some_ticks() {
        let poller = Poller::from_millis(100, 5_000);
        let ticks = AtomicU32::new(0);

        let result: Result<Option<u32>, std::io::Error> = poller
            .run(|| {
                let n = ticks.fetch_add(1, Ordering::SeqCst) + 1;
                async move { Ok(if n >= 4 { Some(n) } else { None }) }
            })
            .await;

        assert_eq!(result.unwrap(), Some(4));
        assert_eq!(ticks.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn probe_error_stops_polling() {
        let poller = Poller::from_millis(100, 5_000);

        let result: Result<Option<()>, &str> =
            poller.run(|| async { Err("probe failed") }).await;

        assert_eq!(result.unwrap_err(), "probe failed");
    }

    #[tokio::test]
    async fn zero_budget_still_probes_once() {
        let poller = Poller::from_millis(100, 0);
        let ticks = AtomicU32::new(0);

        let result: Result<Option<()>, std::io::Error> = poller
            .run(|| {
                ticks.fetch_add(1, Ordering::SeqCst);
                async { Ok(None) }
            })
            .await;

        assert_eq!(result.unwrap(), None);
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
    }
}
