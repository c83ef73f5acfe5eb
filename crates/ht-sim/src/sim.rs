//! Fixed-step simulation runner with step-cutback retries.

use crate::error::{SimError, SimResult};
use crate::integrator::{ForwardEuler, Integrator, Rk4};
use crate::model::TransientModel;
use tracing::debug;

/// Integrator selection for fixed-step runs.
#[derive(Clone, Copy, Debug, Default)]
pub enum IntegratorType {
    /// 4th-order Runge-Kutta (default, 4 rhs calls per step).
    #[default]
    Rk4,
    /// Forward Euler (1st-order, 1 rhs call per step).
    ForwardEuler,
}

/// Options for fixed-step simulation runs.
#[derive(Clone, Debug)]
pub struct SimOptions {
    /// Nominal time step (seconds)
    pub dt: f64,
    /// Final simulation time (seconds)
    pub t_end: f64,
    /// Maximum number of accepted steps (safety limit)
    pub max_steps: usize,
    /// Record every N-th step (decimation)
    pub record_every: usize,
    pub integrator: IntegratorType,
    /// Smallest step the cutback logic may try
    pub min_dt: f64,
    /// Retryable-failure budget per step
    pub max_retries: usize,
    /// Step shrink factor on a retryable failure
    pub cutback_factor: f64,
    /// Step growth factor back toward the nominal dt after success
    pub grow_factor: f64,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            dt: 1e-3,
            t_end: 1.0,
            max_steps: 100_000,
            record_every: 10,
            integrator: IntegratorType::default(),
            min_dt: 1e-9,
            max_retries: 8,
            cutback_factor: 0.5,
            grow_factor: 2.0,
        }
    }
}

/// Recorded trajectory of a fixed-step run.
#[derive(Clone, Debug)]
pub struct SimRecord<S> {
    /// Time points (seconds)
    pub t: Vec<f64>,
    /// State snapshots
    pub x: Vec<S>,
}

/// Run a transient simulation with a fixed nominal step.
///
/// A `SimError::Retryable` from the model cuts the step back (down to
/// `min_dt`, at most `max_retries` times per step) instead of aborting;
/// any other model error is fatal.
pub fn run_sim<M: TransientModel>(model: &M, opts: &SimOptions) -> SimResult<SimRecord<M::State>> {
    if opts.dt <= 0.0 {
        return Err(SimError::InvalidArg {
            what: "dt must be positive",
        });
    }
    if opts.t_end < 0.0 {
        return Err(SimError::InvalidArg {
            what: "t_end must be non-negative",
        });
    }
    if opts.max_steps == 0 || opts.record_every == 0 {
        return Err(SimError::InvalidArg {
            what: "max_steps and record_every must be positive",
        });
    }

    let mut t = 0.0;
    let mut x = model.initial_state();
    let mut dt = opts.dt;

    let mut t_record = vec![t];
    let mut x_record = vec![x.clone()];

    let mut step = 0usize;
    while t < opts.t_end && step < opts.max_steps {
        let dt_step = dt.min(opts.t_end - t);

        let attempt = match opts.integrator {
            IntegratorType::Rk4 => try_step(&Rk4, model, t, &x, dt_step, opts),
            IntegratorType::ForwardEuler => try_step(&ForwardEuler, model, t, &x, dt_step, opts),
        };
        let (x_new, dt_taken) = attempt?;

        t += dt_taken;
        x = x_new;
        step += 1;

        // Recover the step size after a cutback
        dt = (dt_taken * opts.grow_factor).min(opts.dt);

        if step % opts.record_every == 0 {
            t_record.push(t);
            x_record.push(x.clone());
        }
    }

    if step % opts.record_every != 0 {
        t_record.push(t);
        x_record.push(x);
    }

    Ok(SimRecord {
        t: t_record,
        x: x_record,
    })
}

/// One step with cutback retries on retryable failures.
fn try_step<I: Integrator, M: TransientModel>(
    integrator: &I,
    model: &M,
    t: f64,
    x: &M::State,
    dt: f64,
    opts: &SimOptions,
) -> SimResult<(M::State, f64)> {
    let mut dt_try = dt;
    let mut retries = 0usize;
    loop {
        match integrator.step(model, t, x, dt_try) {
            Ok(x_new) => return Ok((x_new, dt_try)),
            Err(SimError::Retryable { message }) => {
                retries += 1;
                let dt_next = dt_try * opts.cutback_factor;
                if retries > opts.max_retries || dt_next < opts.min_dt {
                    return Err(SimError::Backend {
                        message: format!(
                            "step at t={t} failed after {retries} cutbacks: {message}"
                        ),
                    });
                }
                debug!(t, dt_try, dt_next, "retryable step failure, cutting back");
                dt_try = dt_next;
            }
            Err(e) => return Err(e),
        }
    }
}
