use std::{collections::VecDeque, num::NonZeroU32, time::Duration};

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use indexer_observability::record_rpc_rate_limit_wait;
use tokio::{sync::Mutex, time::Instant};

const WINDOW: Duration = Duration::from_secs(1);
const WAIT_LOG_THRESHOLD: Duration = Duration::from_millis(50);

/// Rate limiter for RPC calls to prevent exceeding provider limits.
///
/// Calls are spaced `1 / requests_per_second` apart by `governor`, and a
/// request window caps the total on top of that: no more than
/// `requests_per_second` calls start within one second plus one spacing
/// interval, so `N > requests_per_second` calls take at least
/// `N / requests_per_second` seconds. If no limit is configured, all calls
/// pass through immediately.
pub struct RpcRateLimiter {
    limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    window: Option<RequestWindow>,
}

impl RpcRateLimiter {
    /// Create a new rate limiter.
    ///
    /// - `requests_per_second`: Maximum requests per second. `None` means unlimited.
    pub fn new(requests_per_second: Option<u32>) -> Self {
        let rps = requests_per_second.and_then(NonZeroU32::new);
        let limiter = rps.map(|rps| {
            let quota = Quota::per_second(rps).allow_burst(NonZeroU32::MIN);
            RateLimiter::direct(quota)
        });
        let window = rps.map(|rps| RequestWindow::new(rps.get()));

        Self { limiter, window }
    }

    pub fn is_limited(&self) -> bool {
        self.limiter.is_some()
    }

    /// Wait until a request can be made according to the rate limit.
    ///
    /// If no rate limit is configured, this returns immediately.
    pub async fn acquire(&self) {
        let Some(limiter) = &self.limiter else {
            return;
        };

        let started = Instant::now();
        limiter.until_ready().await;
        if let Some(window) = &self.window {
            window.admit().await;
        }

        let waited = started.elapsed();
        if waited >= WAIT_LOG_THRESHOLD {
            tracing::debug!(
                waited_ms = waited.as_millis() as u64,
                "RPC call delayed by rate limiter"
            );
            record_rpc_rate_limit_wait(waited);
        }
    }
}

/// Hard cap of `capacity` admissions in any span of one second plus one
/// spacing interval.
struct RequestWindow {
    capacity: usize,
    hold: Duration,
    admitted: Mutex<VecDeque<Instant>>,
}

impl RequestWindow {
    fn new(capacity: u32) -> Self {
        Self {
            capacity: capacity as usize,
            hold: WINDOW + WINDOW / capacity,
            admitted: Mutex::new(VecDeque::with_capacity(capacity as usize)),
        }
    }

    async fn admit(&self) {
        loop {
            let wait = {
                let mut admitted = self.admitted.lock().await;
                let now = Instant::now();
                while admitted
                    .front()
                    .is_some_and(|at| now.duration_since(*at) >= self.hold)
                {
                    admitted.pop_front();
                }

                if admitted.len() < self.capacity {
                    admitted.push_back(now);
                    None
                } else {
                    admitted
                        .front()
                        .map(|oldest| self.hold.saturating_sub(now.duration_since(*oldest)))
                }
            };

            match wait {
                None => return,
                Some(delay) => tokio::time::sleep(delay).await,
            }
        }
    }
}
