use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Trailing window over which admissions are counted.
const WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct RateLimiterSnapshot {
    pub requests_per_minute: u32,
    pub burst_capacity: u32,
    /// Admissions currently inside the trailing window.
    pub requests_in_window: usize,
    /// Burst tokens still available.
    pub burst_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Steady-state admissions per trailing 60-second window.
    pub requests_per_minute: u32,
    /// Extra permits usable once the window is exhausted.
    pub burst_capacity: u32,
}

impl RateLimiterConfig {
    pub fn new(requests_per_minute: u32, burst_capacity: u32) -> Self {
        Self {
            requests_per_minute,
            burst_capacity,
        }
    }

    pub fn with_requests_per_minute(mut self, rpm: u32) -> Self {
        self.requests_per_minute = rpm;
        self
    }

    pub fn with_burst_capacity(mut self, burst: u32) -> Self {
        self.burst_capacity = burst;
        self
    }
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 50,
            burst_capacity: 10,
        }
    }
}

#[derive(Debug)]
struct State {
    /// Admission timestamps inside the trailing window, oldest first.
    window: VecDeque<Instant>,
    burst_tokens: u32,
}

/// Sliding-window rate limiter with a manually replenished burst allowance.
///
/// - Admission is a pure boolean decision; `try_acquire` never errors
/// - Burst tokens only decrease on consumption; [`RateLimiter::reset_burst`]
///   is the sole replenishment path
/// - State is scoped to one provider; no cross-provider interaction
pub struct RateLimiter {
    cfg: RateLimiterConfig,
    state: Mutex<State>,
}

impl RateLimiter {
    pub fn new(cfg: RateLimiterConfig) -> Self {
        let burst_tokens = cfg.burst_capacity;
        Self {
            cfg,
            state: Mutex::new(State {
                window: VecDeque::new(),
                burst_tokens,
            }),
        }
    }

    fn prune_locked(st: &mut State, now: Instant) {
        while let Some(&oldest) = st.window.front() {
            if now.duration_since(oldest) >= WINDOW {
                st.window.pop_front();
            } else {
                break;
            }
        }
    }

    /// Try to admit one request without waiting.
    ///
    /// Prunes timestamps older than the window, then admits from the
    /// steady-state budget or, failing that, from the burst pool. A denial
    /// records nothing.
    pub async fn try_acquire(&self) -> bool {
        let mut st = self.state.lock().await;
        let now = Instant::now();
        Self::prune_locked(&mut st, now);

        if (st.window.len() as u32) < self.cfg.requests_per_minute {
            st.window.push_back(now);
            return true;
        }

        if st.burst_tokens > 0 {
            st.burst_tokens -= 1;
            st.window.push_back(now);
            return true;
        }

        false
    }

    /// Restore the burst pool to full capacity.
    ///
    /// Tokens are never refilled on a timer; an external scheduler decides
    /// the replenishment cadence.
    pub async fn reset_burst(&self) {
        let mut st = self.state.lock().await;
        st.burst_tokens = self.cfg.burst_capacity;
    }

    pub async fn snapshot(&self) -> RateLimiterSnapshot {
        let mut st = self.state.lock().await;
        Self::prune_locked(&mut st, Instant::now());
        RateLimiterSnapshot {
            requests_per_minute: self.cfg.requests_per_minute,
            burst_capacity: self.cfg.burst_capacity,
            requests_in_window: st.window.len(),
            burst_tokens: st.burst_tokens,
        }
    }
}
