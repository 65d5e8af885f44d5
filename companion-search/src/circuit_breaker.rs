//! Per-engine circuit breaker for adaptive adapter selection.
//!
//! Tracks consecutive failures per engine and temporarily skips engines that
//! keep failing or timing out. After a cooldown period, a tripped engine
//! enters a half-open state where a single probe round determines whether
//! to restore or re-trip the circuit.
//!
//! # State Machine
//!
//! ```text
//! ┌────────┐  N failures   ┌────────┐  cooldown   ┌──────────┐
//! │ Closed ├──────────────►│  Open  ├────────────►│ HalfOpen │
//! └───▲────┘               └────────┘             └────┬─────┘
//!     │                         ▲                      │
//!     │  success                │  failure             │
//!     └─────────────────────────┴──────────────────────┘
//! ```

use std::collections::HashMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::types::EngineId;

/// Circuit breaker state for a single engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Engine is healthy; it takes part in every fan-out round.
    Closed,
    /// Engine failed too often; it is skipped until the cooldown expires.
    Open,
    /// Cooldown elapsed; the next round probes the engine.
    HalfOpen,
}

/// Health tracking data for a single engine.
#[derive(Debug, Clone)]
pub struct EngineHealth {
    /// Current circuit state.
    pub state: CircuitState,
    /// Number of consecutive failures since the last success.
    pub consecutive_failures: u32,
    /// When the last failure occurred (if any).
    pub last_failure_at: Option<Instant>,
}

impl Default for EngineHealth {
    fn default() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            last_failure_at: None,
        }
    }
}

/// Configuration for circuit breaker behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Consecutive failed rounds before an engine is skipped. 0 disables the breaker.
    pub failure_threshold: u32,
    /// Seconds to wait in Open state before probing again.
    pub cooldown_secs: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            cooldown_secs: 60,
        }
    }
}

impl CircuitBreakerConfig {
    /// Whether the breaker should track anything at all.
    pub fn is_enabled(&self) -> bool {
        self.failure_threshold > 0
    }
}

/// Per-engine circuit breaker owned by one aggregator instance.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    engines: HashMap<EngineId, EngineHealth>,
}

impl CircuitBreaker {
    /// Create a new circuit breaker with the given configuration.
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            engines: HashMap::new(),
        }
    }

    /// Record a round in which `engine` answered (even with zero results).
    pub fn record_success(&mut self, engine: EngineId) {
        let health = self.engines.entry(engine).or_default();
        health.state = CircuitState::Closed;
        health.consecutive_failures = 0;
    }

    /// Record a round in which `engine` failed or timed out.
    pub fn record_failure(&mut self, engine: EngineId) {
        if !self.config.is_enabled() {
            return;
        }
        let health = self.engines.entry(engine).or_default();
        health.consecutive_failures = health.consecutive_failures.saturating_add(1);
        health.last_failure_at = Some(Instant::now());

        if health.state == CircuitState::HalfOpen
            || health.consecutive_failures >= self.config.failure_threshold
        {
            if health.state != CircuitState::Open {
                tracing::debug!(%engine, failures = health.consecutive_failures, "circuit opened");
            }
            health.state = CircuitState::Open;
        }
    }

    /// Check whether `engine` should take part in the next round.
    ///
    /// An Open engine whose cooldown has elapsed moves to HalfOpen and is
    /// allowed through once.
    pub fn should_attempt(&mut self, engine: EngineId) -> bool {
        if !self.config.is_enabled() {
            return true;
        }
        let cooldown_secs = self.config.cooldown_secs;
        let health = self.engines.entry(engine).or_default();

        match health.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let cooldown_elapsed = health
                    .last_failure_at
                    .is_none_or(|t| t.elapsed().as_secs() >= cooldown_secs);

                if cooldown_elapsed {
                    health.state = CircuitState::HalfOpen;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Get the current circuit state for a specific engine.
    pub fn engine_status(&self, engine: EngineId) -> CircuitState {
        self.engines
            .get(&engine)
            .map_or(CircuitState::Closed, |h| h.state)
    }

    /// (engine, state, consecutive failures) for every engine seen so far.
    pub fn health_report(&self) -> Vec<(EngineId, CircuitState, u32)> {
        let mut report: Vec<_> = self
            .engines
            .iter()
            .map(|(engine, health)| (*engine, health.state, health.consecutive_failures))
            .collect();
        report.sort_by_key(|(engine, _, _)| *engine);
        report
    }

    /// Reset all engine states to healthy.
    pub fn reset(&mut self) {
        self.engines.clear();
    }
}
