//! Discrete-time spool/gate actuation dynamics.
//!
//! Where the closed-form [`LaggedProfile`](crate::signal::LaggedProfile)
//! covers the fixed scenario profiles, this models an opening driven by an
//! arbitrary command sequence one sample at a time, with the rate limit a
//! real pilot stage has.

use crate::error::{ControlError, ControlResult};
use serde::{Deserialize, Serialize};

/// State of a first-order actuator: the current normalized opening.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct ActuatorState {
    pub opening: f64,
}

/// First-order actuator with rate limiting.
///
/// Dynamics: `dx/dt = (cmd - x) / tau`, clamped to the rate limit; the
/// opening itself is clamped to [0, 1].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FirstOrderActuator {
    /// Time constant (seconds), > 0
    pub tau_s: f64,
    /// Maximum opening rate (1/second), > 0
    pub rate_limit_per_s: f64,
}

impl FirstOrderActuator {
    pub fn new(tau_s: f64, rate_limit_per_s: f64) -> ControlResult<Self> {
        if tau_s <= 0.0 {
            return Err(ControlError::InvalidArg {
                what: "tau_s must be positive",
            });
        }
        if rate_limit_per_s <= 0.0 {
            return Err(ControlError::InvalidArg {
                what: "rate_limit_per_s must be positive",
            });
        }
        Ok(Self {
            tau_s,
            rate_limit_per_s,
        })
    }

    /// Opening derivative for the given command, rate-limited.
    pub fn dxdt(&self, opening: f64, command: f64) -> f64 {
        let raw = (command - opening) / self.tau_s;
        raw.clamp(-self.rate_limit_per_s, self.rate_limit_per_s)
    }

    /// Advance the opening by `dt_s` toward `command` (explicit Euler).
    pub fn step(&self, state: &ActuatorState, dt_s: f64, command: f64) -> ActuatorState {
        let next = state.opening + self.dxdt(state.opening, command) * dt_s;
        ActuatorState {
            opening: next.clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_response_approaches_command() {
        let act = FirstOrderActuator::new(0.2, 50.0).unwrap();
        let mut state = ActuatorState::default();
        for _ in 0..200 {
            state = act.step(&state, 0.01, 1.0);
        }
        assert!(state.opening > 0.99);
    }

    #[test]
    fn rate_limit_caps_slew() {
        let act = FirstOrderActuator::new(0.01, 0.5).unwrap();
        assert_eq!(act.dxdt(0.0, 1.0), 0.5);
        assert_eq!(act.dxdt(1.0, 0.0), -0.5);
    }

    #[test]
    fn opening_stays_in_unit_interval() {
        let act = FirstOrderActuator::new(0.01, 1000.0).unwrap();
        let wide_open = act.step(&ActuatorState { opening: 0.9 }, 1.0, 5.0);
        assert_eq!(wide_open.opening, 1.0);
        let shut = act.step(&ActuatorState { opening: 0.1 }, 1.0, -5.0);
        assert_eq!(shut.opening, 0.0);
    }

    #[test]
    fn invalid_parameters_rejected() {
        assert!(FirstOrderActuator::new(0.0, 1.0).is_err());
        assert!(FirstOrderActuator::new(1.0, 0.0).is_err());
    }
}
