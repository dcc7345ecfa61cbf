//! Request throttling for the feed API.
//!
//! The feed's operator imposes a hard ceiling of one request per second.
//! Every outbound call is funneled through [`RateLimiter::schedule`], which
//! admits callers in submission order, keeps at most one call in flight, and
//! spaces call starts by a fixed minimum interval.

use std::future::Future;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovernorLimiter};
use tokio::sync::Mutex;

type DirectLimiter = GovernorLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// FIFO rate limiter: one operation in flight, fixed minimum spacing.
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<DirectLimiter>,
    // Tokio's mutex wakes waiters in FIFO order, which gives submission-order
    // admission; holding the guard across the operation keeps it serial.
    gate: Arc<Mutex<()>>,
}

impl RateLimiter {
    /// Limit call starts to one per `interval`.
    pub fn new(interval: Duration) -> Self {
        let quota = Quota::with_period(interval)
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::new(1).unwrap()));
        Self {
            limiter: Arc::new(GovernorLimiter::direct(quota)),
            gate: Arc::new(Mutex::new(())),
        }
    }

    /// Reference configuration: one request per second.
    pub fn per_second() -> Self {
        Self::new(Duration::from_secs(1))
    }

    /// Run `op` once the limiter admits it. Operations run to completion in
    /// submission order; there is no cancellation once scheduled.
    pub async fn schedule<F, T>(&self, op: F) -> T
    where
        F: Future<Output = T>,
    {
        let _in_flight = self.gate.lock().await;
        self.limiter.until_ready().await;
        op.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Instant;

    #[tokio::test]
    async fn test_schedule_spaces_calls() {
        let limiter = RateLimiter::new(Duration::from_millis(100));
        let start = Instant::now();

        for _ in 0..3 {
            limiter.schedule(async {}).await;
        }

        // Three calls at one per 100ms need at least two full intervals.
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test]
    async fn test_schedule_never_overlaps() {
        let limiter = RateLimiter::new(Duration::from_millis(10));
        let in_flight = Arc::new(AtomicBool::new(false));
        let overlaps = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let limiter = limiter.clone();
            let in_flight = in_flight.clone();
            let overlaps = overlaps.clone();
            handles.push(tokio::spawn(async move {
                limiter
                    .schedule(async {
                        if in_flight.swap(true, Ordering::SeqCst) {
                            overlaps.fetch_add(1, Ordering::SeqCst);
                        }
                        tokio::time::sleep(Duration::from_millis(5)).await;
                        in_flight.store(false, Ordering::SeqCst);
                    })
                    .await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(overlaps.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_schedule_returns_operation_result() {
        let limiter = RateLimiter::new(Duration::from_millis(1));
        let value = limiter.schedule(async { 41 + 1 }).await;
        assert_eq!(value, 42);
    }
}
