//! Per-provider circuit breaker
//!
//! Closed until `failure_threshold` consecutive failures, then open for
//! `open_duration`. Once the window elapses the breaker is half-open: a
//! single trial call is let through, a success closes it and a failure
//! re-opens it. A trial that never reports back frees its permit after
//! another `open_duration`.

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Default)]
struct BreakerInner {
    failures: u32,
    opened_at: Option<Instant>,
    trial_started: Option<Instant>,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    failure_threshold: u32,
    open_duration: Duration,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, open_duration: Duration) -> Self {
        Self {
            failure_threshold: failure_threshold.max(1),
            open_duration,
            inner: Mutex::new(BreakerInner::default()),
        }
    }

    pub fn state(&self) -> CircuitState {
        let inner = self.inner.lock();
        self.state_of(&inner)
    }

    fn state_of(&self, inner: &BreakerInner) -> CircuitState {
        match inner.opened_at {
            None => CircuitState::Closed,
            Some(at) if at.elapsed() >= self.open_duration => CircuitState::HalfOpen,
            Some(_) => CircuitState::Open,
        }
    }

    fn trial_pending(&self, inner: &BreakerInner) -> bool {
        inner
            .trial_started
            .is_some_and(|at| at.elapsed() < self.open_duration)
    }

    /// True when a call would be let through; takes no permit
    pub fn is_callable(&self) -> bool {
        let inner = self.inner.lock();
        match self.state_of(&inner) {
            CircuitState::Closed => true,
            CircuitState::Open => false,
            CircuitState::HalfOpen => !self.trial_pending(&inner),
        }
    }

    /// Admit one call. While half-open this takes the single trial permit.
    pub fn allow_request(&self) -> bool {
        let mut inner = self.inner.lock();
        match self.state_of(&inner) {
            CircuitState::Closed => true,
            CircuitState::Open => false,
            CircuitState::HalfOpen if self.trial_pending(&inner) => false,
            CircuitState::HalfOpen => {
                inner.trial_started = Some(Instant::now());
                true
            }
        }
    }

    pub fn failures(&self) -> u32 {
        self.inner.lock().failures
    }

    pub fn record_success(&self) {
        let mut inner = self.inner.lock();
        inner.failures = 0;
        inner.opened_at = None;
        inner.trial_started = None;
    }

    /// Returns true when this failure opened the circuit
    pub fn record_failure(&self) -> bool {
        let mut inner = self.inner.lock();
        inner.failures = inner.failures.saturating_add(1);
        inner.trial_started = None;

        match self.state_of(&inner) {
            CircuitState::HalfOpen => {
                inner.opened_at = Some(Instant::now());
                true
            }
            CircuitState::Closed if inner.failures >= self.failure_threshold => {
                inner.opened_at = Some(Instant::now());
                true
            }
            _ => false,
        }
    }
}
