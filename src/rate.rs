//! Column-store request rate observer
//!
//! Counts calls and, when logging is enabled, emits the observed
//! calls-per-second once the sampling window has elapsed, then starts a new
//! window. This is a diagnostic only: it does not throttle, delay, or reject
//! anything, and it has no influence on query results. It is not a
//! backpressure or rate-limiting mechanism.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::info;

use crate::config::DEFAULT_RATE_WINDOW_SECS;

#[derive(Debug)]
pub struct RateObserver {
    enabled: bool,
    window: Duration,
    state: Mutex<RateWindow>,
}

#[derive(Debug, Clone, Copy)]
struct RateWindow {
    calls: u64,
    started: Instant,
}

/// Point-in-time view of the current window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateSnapshot {
    pub calls: u64,
    pub elapsed: Duration,
}

impl RateObserver {
    pub fn new(enabled: bool, window: Duration) -> Self {
        Self {
            enabled,
            window,
            state: Mutex::new(RateWindow {
                calls: 0,
                started: Instant::now(),
            }),
        }
    }

    /// Counts calls but never logs
    pub fn disabled() -> Self {
        Self::new(false, Duration::from_secs(DEFAULT_RATE_WINDOW_SECS))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Zero the counter and start a new window now
    pub fn reset(&self) {
        let mut state = self.lock();
        state.calls = 0;
        state.started = Instant::now();
    }

    /// Record one column-store call. Returns the rate when a log line was
    /// emitted.
    pub fn record(&self) -> Option<f64> {
        self.record_at(Instant::now())
    }

    pub(crate) fn record_at(&self, now: Instant) -> Option<f64> {
        let mut state = self.lock();
        state.calls += 1;

        let elapsed = now.saturating_duration_since(state.started);
        if !self.enabled || elapsed <= self.window {
            return None;
        }

        let rate = state.calls as f64 / elapsed.as_secs_f64();
        info!(
            calls = state.calls,
            window_secs = elapsed.as_secs_f64(),
            "HBase req rate: {:.2} r/s",
            rate
        );
        state.calls = 0;
        state.started = now;
        Some(rate)
    }

    pub fn snapshot(&self) -> RateSnapshot {
        let state = self.lock();
        RateSnapshot {
            calls: state.calls,
            elapsed: state.started.elapsed(),
        }
    }

    pub(crate) fn window_start(&self) -> Instant {
        self.lock().started
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RateWindow> {
        // counters only; a poisoned guard is still usable
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for RateObserver {
    fn default() -> Self {
        Self::disabled()
    }
}
