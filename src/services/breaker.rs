use crate::errors::ToolError;
use crate::services::logger::Logger;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug)]
struct BreakerInner {
    state: BreakerState,
    consecutive_failures: u32,
    opened_at_ms: i64,
}

/// Process-wide guard around the external tool. Five consecutive failures
/// open the circuit; while open, calls are rejected without spawning a
/// process. After the recovery window one trial call is let through: success
/// closes the circuit, failure re-opens it.
pub struct CircuitBreaker {
    logger: Logger,
    failure_threshold: u32,
    recovery_timeout_ms: u64,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    pub fn new(logger: Logger, failure_threshold: u32, recovery_timeout_ms: u64) -> Self {
        Self {
            logger: logger.child("breaker"),
            failure_threshold,
            recovery_timeout_ms,
            inner: Mutex::new(BreakerInner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
                opened_at_ms: 0,
            }),
        }
    }

    /// Gate a call. `Ok(())` means the caller may invoke the external tool
    /// and must report the outcome via `record_success`/`record_failure`.
    pub fn before_call(&self) -> Result<(), ToolError> {
        let mut inner = self.inner.lock().unwrap_or_else(|err| err.into_inner());
        match inner.state {
            BreakerState::Closed => Ok(()),
            BreakerState::Open => {
                let elapsed = chrono::Utc::now().timestamp_millis() - inner.opened_at_ms;
                if elapsed > self.recovery_timeout_ms as i64 {
                    inner.state = BreakerState::HalfOpen;
                    self.logger
                        .info("Circuit breaker half-open, allowing one trial call", None);
                    return Ok(());
                }
                Err(ToolError::circuit_open(
                    "WP-CLI is temporarily unavailable (circuit breaker open)",
                ))
            }
            // The single trial call is already in flight.
            BreakerState::HalfOpen => Err(ToolError::circuit_open(
                "WP-CLI is temporarily unavailable (circuit breaker open)",
            )),
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|err| err.into_inner());
        if inner.state != BreakerState::Closed {
            self.logger.info("Circuit breaker closed", None);
        }
        inner.state = BreakerState::Closed;
        inner.consecutive_failures = 0;
    }

    pub fn record_failure(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|err| err.into_inner());
        match inner.state {
            BreakerState::HalfOpen => {
                inner.state = BreakerState::Open;
                inner.opened_at_ms = chrono::Utc::now().timestamp_millis();
                self.logger
                    .warn("Circuit breaker re-opened after failed trial call", None);
            }
            _ => {
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.failure_threshold
                    && inner.state == BreakerState::Closed
                {
                    inner.state = BreakerState::Open;
                    inner.opened_at_ms = chrono::Utc::now().timestamp_millis();
                    self.logger.warn(
                        "Circuit breaker opened",
                        Some(&serde_json::json!({
                            "consecutive_failures": inner.consecutive_failures,
                        })),
                    );
                }
            }
        }
    }

    pub fn state(&self) -> BreakerState {
        self.inner
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .state
    }
}
