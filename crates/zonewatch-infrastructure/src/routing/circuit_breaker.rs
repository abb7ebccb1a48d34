//! Circuit breaker
//!
//! One breaker per provider, each behind its own lock. The registry is a
//! concurrent map so zone tasks touching different providers never contend.
//!
//! ```text
//! Closed --N failures in window--> Open --cooldown elapsed--> HalfOpen
//!   ^                                ^                           |
//!   |                                +------ trial failed -------+
//!   +------------------------------- trial succeeded ------------+
//! ```

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use zonewatch_domain::value_objects::{CircuitState, ProviderConfig};

use crate::config::ResilienceConfig;
use crate::constants::METRIC_CIRCUIT_STATE;

/// Internal breaker phase with the data each phase needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerPhase {
    /// Requests flow normally
    Closed,
    /// Requests are rejected until `until`
    Open {
        /// End of the current cooldown
        until: Instant,
    },
    /// One trial request may go through
    HalfOpen {
        /// Whether the trial has been handed out
        trial_in_flight: bool,
    },
}

impl BreakerPhase {
    /// Externally visible state
    pub fn state(&self) -> CircuitState {
        match self {
            Self::Closed => CircuitState::Closed,
            Self::Open { .. } => CircuitState::Open,
            Self::HalfOpen { .. } => CircuitState::HalfOpen,
        }
    }
}

#[derive(Debug)]
struct BreakerCell {
    phase: BreakerPhase,
    consecutive_failures: u32,
    last_failure_at: Option<Instant>,
    last_failure: Option<DateTime<Utc>>,
    cooldown: Duration,
    last_latency: Option<Duration>,
}

/// Point-in-time view of one breaker
#[derive(Debug, Clone, PartialEq)]
pub struct BreakerSnapshot {
    /// Provider identifier
    pub provider: String,
    /// Current state
    pub state: CircuitState,
    /// Failures since the last success
    pub consecutive_failures: u32,
    /// Wall-clock time of the most recent failure
    pub last_failure: Option<DateTime<Utc>>,
    /// Wall-clock end of the cooldown while open
    pub open_until: Option<DateTime<Utc>>,
    /// Cooldown that applies to the next (or current) opening
    pub cooldown: Duration,
    /// Latency of the most recent recorded call
    pub last_latency: Option<Duration>,
}

/// Breaker for a single provider
#[derive(Debug)]
pub struct CircuitBreaker {
    provider: String,
    config: ResilienceConfig,
    cell: Mutex<BreakerCell>,
}

impl CircuitBreaker {
    /// Closed breaker for `provider`
    pub fn new<S: Into<String>>(provider: S, config: ResilienceConfig) -> Self {
        let cooldown = config.base_cooldown();
        let breaker = Self {
            provider: provider.into(),
            config,
            cell: Mutex::new(BreakerCell {
                phase: BreakerPhase::Closed,
                consecutive_failures: 0,
                last_failure_at: None,
                last_failure: None,
                cooldown,
                last_latency: None,
            }),
        };
        breaker.emit_state(CircuitState::Closed);
        breaker
    }

    /// Provider this breaker guards
    pub fn provider(&self) -> &str {
        &self.provider
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BreakerCell> {
        self.cell.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a request may be sent now.
    ///
    /// An expired `Open` phase moves to `HalfOpen` here, and the single
    /// trial is claimed by the caller that receives `true`.
    pub fn allow(&self) -> bool {
        self.admit().is_some()
    }

    /// Like [`allow`](Self::allow), but the claim travels with a permit.
    ///
    /// A permit dropped before [`CallPermit::complete`] hands its half-open
    /// trial back, so a cancelled call cannot keep the circuit half-open.
    pub fn acquire(self: &Arc<Self>) -> Option<CallPermit> {
        self.admit().map(|trial| CallPermit {
            breaker: Arc::clone(self),
            trial,
            completed: false,
        })
    }

    // Some(true) when the caller now holds the half-open trial
    fn admit(&self) -> Option<bool> {
        let mut cell = self.lock();
        match cell.phase {
            BreakerPhase::Closed => Some(false),
            BreakerPhase::Open { until } => {
                if Instant::now() >= until {
                    cell.phase = BreakerPhase::HalfOpen {
                        trial_in_flight: true,
                    };
                    drop(cell);
                    debug!(provider = %self.provider, "Circuit half-open, sending trial request");
                    self.emit_state(CircuitState::HalfOpen);
                    Some(true)
                } else {
                    None
                }
            }
            BreakerPhase::HalfOpen { trial_in_flight } => {
                if trial_in_flight {
                    None
                } else {
                    cell.phase = BreakerPhase::HalfOpen {
                        trial_in_flight: true,
                    };
                    Some(true)
                }
            }
        }
    }

    /// Give back a claimed trial whose call never produced an outcome
    fn release_trial(&self) {
        let mut cell = self.lock();
        if matches!(
            cell.phase,
            BreakerPhase::HalfOpen {
                trial_in_flight: true
            }
        ) {
            cell.phase = BreakerPhase::HalfOpen {
                trial_in_flight: false,
            };
            drop(cell);
            debug!(provider = %self.provider, "Half-open trial abandoned, next caller may probe");
        }
    }

    /// Current state without claiming anything.
    ///
    /// Reports `HalfOpen` for an open circuit whose cooldown has elapsed.
    pub fn state(&self) -> CircuitState {
        let cell = self.lock();
        match cell.phase {
            BreakerPhase::Open { until } if Instant::now() >= until => CircuitState::HalfOpen,
            phase => phase.state(),
        }
    }

    /// Record the outcome of a call that `allow` let through
    pub fn record_outcome(&self, success: bool, latency: Duration) {
        let now = Instant::now();
        let mut cell = self.lock();
        cell.last_latency = Some(latency);

        let transition = if success {
            match cell.phase {
                BreakerPhase::Closed => {
                    cell.consecutive_failures = 0;
                    None
                }
                BreakerPhase::HalfOpen { .. } => {
                    cell.phase = BreakerPhase::Closed;
                    cell.consecutive_failures = 0;
                    cell.cooldown = self.config.base_cooldown();
                    Some(CircuitState::Closed)
                }
                // A late answer from before the circuit opened
                BreakerPhase::Open { .. } => None,
            }
        } else {
            cell.last_failure = Some(Utc::now());
            match cell.phase {
                BreakerPhase::Closed => {
                    let window = self.config.tracking_window();
                    if cell
                        .last_failure_at
                        .is_some_and(|at| now.saturating_duration_since(at) > window)
                    {
                        cell.consecutive_failures = 0;
                    }
                    cell.consecutive_failures = cell.consecutive_failures.saturating_add(1);
                    cell.last_failure_at = Some(now);
                    if cell.consecutive_failures >= self.config.failure_threshold {
                        cell.phase = BreakerPhase::Open {
                            until: now + cell.cooldown,
                        };
                        Some(CircuitState::Open)
                    } else {
                        None
                    }
                }
                BreakerPhase::HalfOpen { .. } => {
                    cell.consecutive_failures = cell.consecutive_failures.saturating_add(1);
                    cell.last_failure_at = Some(now);
                    cell.cooldown = (cell.cooldown * 2).min(self.config.max_cooldown());
                    cell.phase = BreakerPhase::Open {
                        until: now + cell.cooldown,
                    };
                    Some(CircuitState::Open)
                }
                BreakerPhase::Open { .. } => None,
            }
        };

        let failures = cell.consecutive_failures;
        let cooldown = cell.cooldown;
        drop(cell);

        match transition {
            Some(CircuitState::Open) => warn!(
                provider = %self.provider,
                failures,
                cooldown_secs = cooldown.as_secs_f64(),
                "Circuit opened"
            ),
            Some(CircuitState::Closed) => info!(provider = %self.provider, "Circuit closed after successful trial"),
            _ => {}
        }
        if let Some(state) = transition {
            self.emit_state(state);
        }
    }

    /// Point-in-time view
    pub fn snapshot(&self) -> BreakerSnapshot {
        let now = Instant::now();
        let cell = self.lock();
        let (state, open_until) = match cell.phase {
            BreakerPhase::Open { until } if now >= until => (CircuitState::HalfOpen, None),
            BreakerPhase::Open { until } => {
                let remaining = until.saturating_duration_since(now);
                let wall = TimeDelta::from_std(remaining)
                    .ok()
                    .and_then(|delta| Utc::now().checked_add_signed(delta));
                (CircuitState::Open, wall)
            }
            phase => (phase.state(), None),
        };
        BreakerSnapshot {
            provider: self.provider.clone(),
            state,
            consecutive_failures: cell.consecutive_failures,
            last_failure: cell.last_failure,
            open_until,
            cooldown: cell.cooldown,
            last_latency: cell.last_latency,
        }
    }

    fn emit_state(&self, state: CircuitState) {
        let value = match state {
            CircuitState::Closed => 0.0,
            CircuitState::HalfOpen => 1.0,
            CircuitState::Open => 2.0,
        };
        metrics::gauge!(METRIC_CIRCUIT_STATE, "provider" => self.provider.clone()).set(value);
    }
}

/// One admitted call against a [`CircuitBreaker`]
#[derive(Debug)]
#[must_use = "dropping the permit abandons the call"]
pub struct CallPermit {
    breaker: Arc<CircuitBreaker>,
    trial: bool,
    completed: bool,
}

impl CallPermit {
    /// Whether this call is the half-open trial
    pub fn is_trial(&self) -> bool {
        self.trial
    }

    /// Record how the call went
    pub fn complete(mut self, success: bool, latency: Duration) {
        self.completed = true;
        self.breaker.record_outcome(success, latency);
    }
}

impl Drop for CallPermit {
    fn drop(&mut self) {
        if self.trial && !self.completed {
            self.breaker.release_trial();
        }
    }
}

/// Breakers for every configured provider
#[derive(Debug)]
pub struct CircuitBreakerRegistry {
    config: ResilienceConfig,
    breakers: DashMap<String, Arc<CircuitBreaker>>,
}

impl CircuitBreakerRegistry {
    /// Empty registry
    pub fn new(config: ResilienceConfig) -> Self {
        Self {
            config,
            breakers: DashMap::new(),
        }
    }

    /// Breaker for `provider`, created closed on first use
    pub fn breaker(&self, provider: &str) -> Arc<CircuitBreaker> {
        if let Some(existing) = self.breakers.get(provider) {
            return Arc::clone(existing.value());
        }
        Arc::clone(
            self.breakers
                .entry(provider.to_string())
                .or_insert_with(|| {
                    Arc::new(CircuitBreaker::new(provider, self.config.clone()))
                })
                .value(),
        )
    }

    /// Whether `provider` may be called now (claims the half-open trial)
    pub fn allow(&self, provider: &str) -> bool {
        self.breaker(provider).allow()
    }

    /// Admit one call to `provider`, or `None` while its circuit is open
    pub fn acquire(&self, provider: &str) -> Option<CallPermit> {
        self.breaker(provider).acquire()
    }

    /// Record a call outcome for `provider`
    pub fn record_outcome(&self, provider: &str, success: bool, latency: Duration) {
        self.breaker(provider).record_outcome(success, latency);
    }

    /// Current state of `provider`
    pub fn state(&self, provider: &str) -> CircuitState {
        self.breakers
            .get(provider)
            .map_or(CircuitState::Closed, |b| b.state())
    }

    /// Snapshot of `provider`, if it has a breaker
    pub fn snapshot(&self, provider: &str) -> Option<BreakerSnapshot> {
        self.breakers.get(provider).map(|b| b.snapshot())
    }

    /// Align the registry with a new provider list.
    ///
    /// Known providers keep their state, new ones start closed and removed
    /// ones are dropped.
    pub fn reconcile(&self, providers: &[ProviderConfig]) {
        self.breakers
            .retain(|id, _| providers.iter().any(|p| &p.id == id));
        for provider in providers {
            self.breaker(&provider.id);
        }
        debug!(breakers = self.breakers.len(), "Circuit breakers reconciled");
    }

    /// Number of tracked providers
    pub fn len(&self) -> usize {
        self.breakers.len()
    }

    /// Whether no provider is tracked
    pub fn is_empty(&self) -> bool {
        self.breakers.is_empty()
    }
}
