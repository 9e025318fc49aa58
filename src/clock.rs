use log::{debug, info};

use crate::error::EngineError;

pub const DEFAULT_SESSION_SECS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ClockState {
    Idle,
    Running,
    Expired,
}

/// Countdown for one session. Driven externally at a one second cadence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClock {
    state: ClockState,
    remaining: u32,
    elapsed: u32,
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionClock {
    pub fn new() -> Self {
        Self {
            state: ClockState::Idle,
            remaining: 0,
            elapsed: 0,
        }
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    pub fn is_expired(&self) -> bool {
        self.state == ClockState::Expired
    }

    /// Start counting down. A zero budget expires immediately.
    pub fn start(&mut self, total_secs: u32) -> Result<(), EngineError> {
        self.expect_state(ClockState::Idle, "start")?;

        self.remaining = total_secs;
        self.elapsed = 0;
        self.state = if total_secs == 0 {
            ClockState::Expired
        } else {
            ClockState::Running
        };
        info!("clock started with {}s", total_secs);

        Ok(())
    }

    pub fn tick(&mut self) -> Result<(), EngineError> {
        self.expect_state(ClockState::Running, "tick")?;

        self.remaining = self.remaining.saturating_sub(1);
        self.elapsed += 1;
        debug!("tick: {}s remaining", self.remaining);

        if self.remaining == 0 {
            self.state = ClockState::Expired;
            info!("clock expired after {}s", self.elapsed);
        }

        Ok(())
    }

    /// Stop early, freezing `remaining` where it is.
    pub fn force_expire(&mut self) -> Result<(), EngineError> {
        self.expect_state(ClockState::Running, "force expire")?;

        self.state = ClockState::Expired;
        info!(
            "clock stopped early after {}s with {}s remaining",
            self.elapsed, self.remaining
        );

        Ok(())
    }

    fn expect_state(&self, wanted: ClockState, operation: &'static str) -> Result<(), EngineError> {
        if self.state == wanted {
            Ok(())
        } else {
            Err(EngineError::InvalidStateTransition {
                from: self.state,
                operation,
            })
        }
    }
}
