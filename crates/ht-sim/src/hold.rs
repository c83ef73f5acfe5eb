//! Pressurize-and-hold test runner.
//!
//! A hold test pressurizes a volume, isolates it, and watches the decay
//! over a fixed window; the verdict is the percentage drop against the
//! starting pressure.

use crate::error::{SimError, SimResult};
use crate::integrate::{IntegrateOptions, integrate};
use crate::model::TransientModel;

/// Single-node pressure vessel draining through a leak orifice.
///
/// `dP/dt = -(beta / V) * CdA * sqrt(2 * max(P - P_atm, 0) / rho)`. This is
/// the classic leakdown model for a stack-wide hold where the whole test
/// volume acts as one capacitance.
#[derive(Debug, Clone)]
pub struct VesselLeakdown {
    pub beta_pa: f64,
    pub volume_m3: f64,
    pub cda_leak_m2: f64,
    pub p_atm_pa: f64,
    pub rho: f64,
    pub p0_pa: f64,
}

impl VesselLeakdown {
    pub fn new(
        beta_pa: f64,
        volume_m3: f64,
        cda_leak_m2: f64,
        rho: f64,
        p0_pa: f64,
    ) -> SimResult<Self> {
        if beta_pa <= 0.0 || volume_m3 <= 0.0 || rho <= 0.0 {
            return Err(SimError::NonPhysical {
                what: "beta, volume, and rho must be positive",
            });
        }
        if cda_leak_m2 < 0.0 {
            return Err(SimError::NonPhysical {
                what: "cda_leak_m2 must be non-negative",
            });
        }
        if p0_pa <= 0.0 {
            return Err(SimError::NonPhysical {
                what: "p0_pa must be positive",
            });
        }
        Ok(Self {
            beta_pa,
            volume_m3,
            cda_leak_m2,
            p_atm_pa: 1e5,
            rho,
            p0_pa,
        })
    }
}

impl TransientModel for VesselLeakdown {
    type State = f64;

    fn initial_state(&self) -> f64 {
        self.p0_pa
    }

    fn rhs(&self, _t: f64, p: &f64) -> SimResult<f64> {
        let dp = (p - self.p_atm_pa).max(0.0);
        if self.cda_leak_m2 <= 0.0 || dp <= 0.0 {
            return Ok(0.0);
        }
        let q_leak = self.cda_leak_m2 * (2.0 * dp / self.rho).sqrt();
        Ok(-(self.beta_pa / self.volume_m3) * q_leak)
    }

    fn add(&self, a: &f64, b: &f64) -> f64 {
        a + b
    }

    fn scale(&self, a: &f64, k: f64) -> f64 {
        a * k
    }

    fn norm_inf(&self, a: &f64) -> f64 {
        a.abs()
    }
}

/// Options for [`run_hold_test`].
#[derive(Clone, Debug)]
pub struct HoldTestOptions {
    /// Hold duration (minutes)
    pub t_hold_min: f64,
    /// Sample spacing (seconds)
    pub dt_s: f64,
    /// Maximum percentage drop for a pass
    pub pass_drop_percent: f64,
    pub integrate: IntegrateOptions,
}

impl Default for HoldTestOptions {
    fn default() -> Self {
        Self {
            t_hold_min: 5.0,
            dt_s: 0.5,
            pass_drop_percent: 1.0,
            integrate: IntegrateOptions::default(),
        }
    }
}

/// Hold-test outcome: the sampled pressure trace and the drop verdict.
#[derive(Clone, Debug)]
pub struct HoldTestResult {
    pub t_s: Vec<f64>,
    pub p_pa: Vec<f64>,
    pub p0_pa: f64,
    pub p_end_pa: f64,
    pub delta_p_percent: f64,
    /// `delta_p_percent <= pass_drop_percent`
    pub pass: bool,
    /// Whether the underlying integration ran to the end of the window
    pub success: bool,
    pub message: String,
}

/// Integrate a model over the hold window and judge the pressure drop.
///
/// `pressure_of` extracts the monitored pressure from the model state
/// (e.g. the actuator node of a network, or the scalar state of a
/// [`VesselLeakdown`]).
pub fn run_hold_test<M, F>(
    model: &M,
    y0: M::State,
    pressure_of: F,
    opts: &HoldTestOptions,
) -> SimResult<HoldTestResult>
where
    M: TransientModel,
    F: Fn(&M::State) -> f64,
{
    let p0 = pressure_of(&y0);
    if p0 <= 0.0 {
        return Err(SimError::InvalidArg {
            what: "hold test requires a positive starting pressure",
        });
    }
    if opts.t_hold_min <= 0.0 || opts.dt_s <= 0.0 {
        return Err(SimError::InvalidArg {
            what: "hold duration and sample spacing must be positive",
        });
    }

    let t_end = opts.t_hold_min * 60.0;
    let n = (t_end / opts.dt_s).floor() as usize;
    let mut t_eval: Vec<f64> = (0..=n).map(|i| i as f64 * opts.dt_s).collect();
    if *t_eval.last().unwrap() < t_end {
        t_eval.push(t_end);
    }

    let out = integrate(model, y0, (0.0, t_end), &t_eval, &opts.integrate);
    let (p_end, t_s, p_pa) = match out.y.last() {
        Some(last) => {
            let trace: Vec<f64> = out.y.iter().map(&pressure_of).collect();
            (pressure_of(last), out.t, trace)
        }
        None => {
            return Err(SimError::Backend {
                message: format!("hold-test integration produced no samples: {}", out.message),
            });
        }
    };

    let delta_p_percent = (p0 - p_end) / p0 * 100.0;
    Ok(HoldTestResult {
        t_s,
        p_pa,
        p0_pa: p0,
        p_end_pa: p_end,
        delta_p_percent,
        pass: delta_p_percent <= opts.pass_drop_percent,
        success: out.success,
        message: out.message,
    })
}
