use dashmap::DashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

// Chance per request that a cleanup pass runs
const SWEEP_PROBABILITY: f64 = 0.01;

// Rate limit entry - one fixed window per client key
pub struct ClientWindow {
    pub count: u32,
    pub reset_at_ms: u64,
}

// Outcome of an admission check
#[derive(Debug, PartialEq, Eq)]
pub enum Decision {
    Admitted { remaining: u32 },
    Limited { retry_after_secs: u64 },
}

pub struct RateLimiter {
    windows: DashMap<String, ClientWindow>,
    quota: u32,
    window_ms: u64,
}

impl RateLimiter {
    pub fn new(quota: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            quota,
            window_ms: window.as_millis() as u64,
        }
    }

    pub fn quota(&self) -> u32 {
        self.quota
    }

    pub fn entries(&self) -> usize {
        self.windows.len()
    }

    pub fn check(&self, key: &str) -> Decision {
        self.check_at(key, now_ms())
    }

    // The entry guard serializes concurrent checks for the same key, so two
    // requests can never both read count = quota - 1 and both increment
    pub fn check_at(&self, key: &str, now: u64) -> Decision {
        let mut window = self
            .windows
            .entry(key.to_string())
            .or_insert(ClientWindow {
                count: 0,
                reset_at_ms: now + self.window_ms,
            });

        // window expired? start a fresh one
        if now > window.reset_at_ms {
            window.count = 0;
            window.reset_at_ms = now + self.window_ms;
        }

        if window.count >= self.quota {
            // clamp so the hint is always positive, even at the exact boundary
            let retry_after_secs = (window.reset_at_ms - now).div_ceil(1000).max(1);
            return Decision::Limited { retry_after_secs };
        }

        window.count += 1;
        Decision::Admitted {
            remaining: self.quota - window.count,
        }
    }

    // Best-effort cleanup so the table does not keep one entry per client forever
    pub fn maybe_sweep(&self) {
        if fastrand::f64() < SWEEP_PROBABILITY {
            self.sweep_at(now_ms());
        }
    }

    pub fn sweep_at(&self, now: u64) {
        self.windows
            .retain(|_, window| now <= window.reset_at_ms + self.window_ms);
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
