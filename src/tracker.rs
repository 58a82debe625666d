//! Failure tracking for the primary engine.
//!
//! Acts as a heuristic circuit breaker: consecutive rate-limit failures of
//! the primary engine are counted, and once the count crosses a threshold
//! the resolver demotes the primary in favor of configured alternatives.
//! After a cooldown with no new failures the count is forgiven.
//!
//! The tracker is owned by whoever constructs the [`crate::Search`]
//! orchestrator and injected into it, so tests can reset it deterministically.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Thresholds governing primary-engine demotion.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Consecutive failures after which the primary is demoted.
    pub max_failures: u32,
    /// Elapsed time after which accumulated failures are forgiven.
    pub cooldown: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_failures: 5,
            cooldown: Duration::from_secs(30 * 60),
        }
    }
}

#[derive(Debug, Default)]
struct TrackerState {
    consecutive_failures: u32,
    last_failure_at: Option<Instant>,
}

/// Process-local record of consecutive primary-engine failures.
///
/// Updates are tiny and never held across an await; races that lose or
/// duplicate an increment are tolerated.
#[derive(Debug)]
pub struct FailureTracker {
    config: TrackerConfig,
    state: Mutex<TrackerState>,
}

impl FailureTracker {
    /// Creates a tracker with the given thresholds.
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            state: Mutex::new(TrackerState::default()),
        }
    }

    /// Records one primary-engine rate-limit failure.
    pub fn record_failure(&self) {
        let mut state = self.lock();
        state.consecutive_failures += 1;
        state.last_failure_at = Some(Instant::now());
    }

    /// Forgives all accumulated failures.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.consecutive_failures = 0;
        state.last_failure_at = None;
    }

    /// Current consecutive failure count.
    pub fn failures(&self) -> u32 {
        self.lock().consecutive_failures
    }

    /// Applies cooldown recovery: failures are forgiven when the last one
    /// is older than the configured cooldown.
    pub fn maybe_recover(&self) {
        let mut state = self.lock();
        if state.consecutive_failures == 0 {
            return;
        }
        let cooled = state
            .last_failure_at
            .is_none_or(|at| at.elapsed() > self.config.cooldown);
        if cooled {
            state.consecutive_failures = 0;
            state.last_failure_at = None;
        }
    }

    /// Whether the failure count has reached the demotion threshold.
    pub fn is_tripped(&self) -> bool {
        self.lock().consecutive_failures >= self.config.max_failures
    }

    /// The configured thresholds.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TrackerState> {
        // A poisoned lock still holds valid counters.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for FailureTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}
