//! Opening-command profiles.

use serde::{Deserialize, Serialize};

/// A normalized valve-opening command as a function of time.
///
/// Implementations must be pure: the integrator evaluates the signal at
/// arbitrary times, repeatedly and out of order, during trial steps.
pub trait ControlSignal {
    fn opening(&self, t_s: f64) -> f64;
}

/// Concrete command profiles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandProfile {
    /// Held at `level` for all time.
    Constant { level: f64 },
    /// 0 before `t_step_s`, `level` from `t_step_s` on.
    Step { t_step_s: f64, level: f64 },
    /// `level` on `[t_on_s, t_off_s)`, 0 elsewhere.
    Pulse {
        t_on_s: f64,
        t_off_s: f64,
        level: f64,
    },
}

impl CommandProfile {
    pub fn full_open() -> Self {
        CommandProfile::Constant { level: 1.0 }
    }

    /// Wrap this profile in a first-order opening lag.
    pub fn with_lag(self, tau_s: f64) -> LaggedProfile {
        LaggedProfile {
            profile: self,
            tau_s,
        }
    }
}

impl ControlSignal for CommandProfile {
    fn opening(&self, t_s: f64) -> f64 {
        match *self {
            CommandProfile::Constant { level } => level,
            CommandProfile::Step { t_step_s, level } => {
                if t_s >= t_step_s {
                    level
                } else {
                    0.0
                }
            }
            CommandProfile::Pulse {
                t_on_s,
                t_off_s,
                level,
            } => {
                if t_s >= t_on_s && t_s < t_off_s {
                    level
                } else {
                    0.0
                }
            }
        }
    }
}

/// A command profile filtered through a first-order spool lag.
///
/// The response is evaluated in closed form (no internal state), so the
/// profile stays safe under the integrator's repeated-call contract:
/// a step rises as `level * (1 - exp(-(t - t_step)/tau))`, a pulse rises the
/// same way and then decays exponentially from its value at switch-off.
/// A constant command is taken as already settled. `tau_s <= 0` degenerates
/// to the raw profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LaggedProfile {
    pub profile: CommandProfile,
    pub tau_s: f64,
}

impl ControlSignal for LaggedProfile {
    fn opening(&self, t_s: f64) -> f64 {
        if self.tau_s <= 0.0 {
            return self.profile.opening(t_s);
        }
        let tau = self.tau_s;
        match self.profile {
            CommandProfile::Constant { level } => level,
            CommandProfile::Step { t_step_s, level } => {
                if t_s < t_step_s {
                    0.0
                } else {
                    level * (1.0 - (-(t_s - t_step_s) / tau).exp())
                }
            }
            CommandProfile::Pulse {
                t_on_s,
                t_off_s,
                level,
            } => {
                if t_s < t_on_s {
                    0.0
                } else if t_s < t_off_s {
                    level * (1.0 - (-(t_s - t_on_s) / tau).exp())
                } else {
                    let at_off = level * (1.0 - (-(t_off_s - t_on_s) / tau).exp());
                    at_off * (-(t_s - t_off_s) / tau).exp()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_switches_at_threshold() {
        let cmd = CommandProfile::Step {
            t_step_s: 2.0,
            level: 1.0,
        };
        assert_eq!(cmd.opening(1.999), 0.0);
        assert_eq!(cmd.opening(2.0), 1.0);
        assert_eq!(cmd.opening(100.0), 1.0);
    }

    #[test]
    fn pulse_is_half_open_interval() {
        let cmd = CommandProfile::Pulse {
            t_on_s: 1.0,
            t_off_s: 3.0,
            level: 0.8,
        };
        assert_eq!(cmd.opening(0.5), 0.0);
        assert_eq!(cmd.opening(1.0), 0.8);
        assert_eq!(cmd.opening(2.9), 0.8);
        assert_eq!(cmd.opening(3.0), 0.0);
    }

    #[test]
    fn lagged_step_rises_toward_command() {
        let cmd = CommandProfile::Step {
            t_step_s: 0.0,
            level: 1.0,
        }
        .with_lag(0.15);
        assert_eq!(cmd.opening(-0.1), 0.0);
        let one_tau = cmd.opening(0.15);
        assert!((one_tau - (1.0 - (-1.0f64).exp())).abs() < 1e-12);
        assert!(cmd.opening(2.0) > 0.999);
    }

    #[test]
    fn lagged_pulse_is_continuous_at_switch_off() {
        let cmd = CommandProfile::Pulse {
            t_on_s: 0.0,
            t_off_s: 1.0,
            level: 1.0,
        }
        .with_lag(0.2);
        let just_before = cmd.opening(1.0 - 1e-9);
        let at_off = cmd.opening(1.0);
        assert!((just_before - at_off).abs() < 1e-6);
        assert!(cmd.opening(3.0) < 1e-3);
    }

    #[test]
    fn zero_tau_degenerates_to_raw_profile() {
        let raw = CommandProfile::Step {
            t_step_s: 2.0,
            level: 1.0,
        };
        let lagged = raw.clone().with_lag(0.0);
        assert_eq!(lagged.opening(2.0), raw.opening(2.0));
        assert_eq!(lagged.opening(1.0), raw.opening(1.0));
    }

    #[test]
    fn profiles_round_trip_through_serde() {
        let cmd = CommandProfile::Pulse {
            t_on_s: 1.0,
            t_off_s: 3.0,
            level: 0.8,
        };
        let json = serde_json::to_string(&cmd).unwrap();
        let back: CommandProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmd);
    }
}
