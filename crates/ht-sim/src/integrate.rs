//! Trajectory integration over a requested sample grid.
//!
//! This is the capability the twin consumes: hand it a model, an initial
//! state, a span, and the sample times you want back, and it returns the
//! sampled trajectory plus a success flag. A `success = false` output is a
//! recoverable signal carrying whatever was integrated before the failure,
//! never a panic; callers decide disposition.

use crate::error::{SimError, SimResult};
use crate::integrator::{ForwardEuler, Integrator, Rk4};
use crate::model::TransientModel;
use tracing::debug;

/// Time-stepping method.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OdeMethod {
    /// RK4 with step-doubling error control (default).
    #[default]
    AdaptiveRk4,
    /// RK4 at a fixed step (`initial_dt_s` or span/1000).
    FixedRk4,
    /// Forward Euler at a fixed step.
    ForwardEuler,
}

/// Options for [`integrate`].
#[derive(Clone, Debug)]
pub struct IntegrateOptions {
    pub method: OdeMethod,
    /// Relative tolerance for the adaptive error control
    pub rtol: f64,
    /// Absolute tolerance for the adaptive error control
    pub atol: f64,
    /// Budget of attempted steps (accepted and rejected)
    pub max_steps: usize,
    /// Smallest step the controller may take
    pub min_dt_s: f64,
    /// Starting step; defaults to span/100 (adaptive) or span/1000 (fixed)
    pub initial_dt_s: Option<f64>,
    /// Retryable-failure budget per step
    pub max_retries: usize,
}

impl Default for IntegrateOptions {
    fn default() -> Self {
        Self {
            method: OdeMethod::default(),
            rtol: 1e-6,
            atol: 1e-9,
            max_steps: 1_000_000,
            min_dt_s: 1e-9,
            initial_dt_s: None,
            max_retries: 8,
        }
    }
}

/// Sampled trajectory.
///
/// Sample values between accepted steps are linearly interpolated, which
/// preserves the monotonicity of the underlying step sequence.
#[derive(Clone, Debug)]
pub struct IntegrationOutput<S> {
    pub t: Vec<f64>,
    pub y: Vec<S>,
    pub success: bool,
    pub message: String,
}

/// Tolerance for matching requested sample times against the span.
const T_EVAL_FUZZ: f64 = 1e-12;

/// Requested sample times, filtered into the span, sorted, deduplicated.
/// An empty request falls back to a 1000-point uniform grid.
fn sanitize_t_eval(t_eval: &[f64], t0: f64, t1: f64) -> Vec<f64> {
    let mut samples: Vec<f64> = if t_eval.is_empty() {
        let n = 1000usize;
        (0..n)
            .map(|i| t0 + (t1 - t0) * i as f64 / (n - 1) as f64)
            .collect()
    } else {
        t_eval
            .iter()
            .copied()
            .filter(|ts| ts.is_finite() && *ts >= t0 - T_EVAL_FUZZ && *ts <= t1 + T_EVAL_FUZZ)
            .map(|ts| ts.clamp(t0, t1))
            .collect()
    };
    samples.sort_by(|a, b| a.partial_cmp(b).expect("sample times are finite"));
    samples.dedup_by(|a, b| (*a - *b).abs() <= T_EVAL_FUZZ);
    samples
}

/// Integrate `model` from `y0` across `t_span`, sampling at `t_eval`.
pub fn integrate<M: TransientModel>(
    model: &M,
    y0: M::State,
    t_span: (f64, f64),
    t_eval: &[f64],
    opts: &IntegrateOptions,
) -> IntegrationOutput<M::State> {
    let (t0, t1) = t_span;
    if !t0.is_finite() || !t1.is_finite() || t1 < t0 {
        return IntegrationOutput {
            t: Vec::new(),
            y: Vec::new(),
            success: false,
            message: "invalid t_span".to_string(),
        };
    }

    let samples = sanitize_t_eval(t_eval, t0, t1);
    let mut t_out: Vec<f64> = Vec::with_capacity(samples.len());
    let mut y_out: Vec<M::State> = Vec::with_capacity(samples.len());
    let mut next = 0usize;

    // Samples at the span start are the initial state verbatim.
    while next < samples.len() && samples[next] <= t0 + T_EVAL_FUZZ {
        t_out.push(samples[next]);
        y_out.push(y0.clone());
        next += 1;
    }

    let adaptive = opts.method == OdeMethod::AdaptiveRk4;
    let span = t1 - t0;
    let mut dt = opts
        .initial_dt_s
        .unwrap_or(if adaptive { span / 100.0 } else { span / 1000.0 })
        .max(opts.min_dt_s);

    let mut t = t0;
    let mut y = y0;
    let mut attempts = 0usize;
    let mut retries = 0usize;

    let fail = |t_out: Vec<f64>, y_out: Vec<M::State>, message: String| IntegrationOutput {
        t: t_out,
        y: y_out,
        success: false,
        message,
    };

    while t < t1 {
        attempts += 1;
        if attempts > opts.max_steps {
            return fail(
                t_out,
                y_out,
                format!("maximum step count exceeded at t = {t}"),
            );
        }

        let dt_step = dt.min(t1 - t);
        let stepped = advance(model, t, &y, dt_step, opts.method);
        let (y_new, err) = match stepped {
            Ok(pair) => {
                retries = 0;
                pair
            }
            Err(SimError::Retryable { message }) => {
                retries += 1;
                let dt_next = dt_step * 0.5;
                if retries > opts.max_retries || dt_next < opts.min_dt_s {
                    return fail(
                        t_out,
                        y_out,
                        format!("step at t = {t} failed after {retries} cutbacks: {message}"),
                    );
                }
                debug!(t, dt_step, dt_next, "retryable step failure, cutting back");
                dt = dt_next;
                continue;
            }
            Err(e) => return fail(t_out, y_out, format!("model error at t = {t}: {e}")),
        };

        if adaptive {
            let scale = opts.atol + opts.rtol * model.norm_inf(&y).max(model.norm_inf(&y_new));
            let err_norm = err / scale;

            if err_norm > 1.0 && dt_step > opts.min_dt_s {
                // Reject and shrink
                let factor = (0.9 * err_norm.powf(-0.2)).clamp(0.1, 0.5);
                dt = (dt_step * factor).max(opts.min_dt_s);
                continue;
            }
            // Accept; grow toward the next step
            let factor = if err_norm > 0.0 {
                (0.9 * err_norm.powf(-0.2)).clamp(0.2, 5.0)
            } else {
                5.0
            };
            dt = (dt_step * factor).max(opts.min_dt_s);
        }

        let t_new = t + dt_step;
        while next < samples.len() && samples[next] <= t_new + T_EVAL_FUZZ {
            let ts = samples[next];
            let theta = if dt_step > 0.0 {
                ((ts - t) / dt_step).clamp(0.0, 1.0)
            } else {
                1.0
            };
            let yi = model.add(&model.scale(&y, 1.0 - theta), &model.scale(&y_new, theta));
            t_out.push(ts);
            y_out.push(yi);
            next += 1;
        }

        t = t_new;
        y = y_new;
    }

    // Numeric fuzz can leave a final sample pending at t1.
    while next < samples.len() {
        t_out.push(samples[next]);
        y_out.push(y.clone());
        next += 1;
    }

    IntegrationOutput {
        t: t_out,
        y: y_out,
        success: true,
        message: "integration completed".to_string(),
    }
}

/// One trial step. Adaptive mode returns the two-half-steps solution and
/// the sup-norm gap against the full step; fixed modes return a zero error.
fn advance<M: TransientModel>(
    model: &M,
    t: f64,
    y: &M::State,
    dt: f64,
    method: OdeMethod,
) -> SimResult<(M::State, f64)> {
    match method {
        OdeMethod::AdaptiveRk4 => {
            let full = Rk4.step(model, t, y, dt)?;
            let mid = Rk4.step(model, t, y, 0.5 * dt)?;
            let halves = Rk4.step(model, t + 0.5 * dt, &mid, 0.5 * dt)?;
            let gap = model.norm_inf(&model.add(&halves, &model.scale(&full, -1.0)));
            Ok((halves, gap))
        }
        OdeMethod::FixedRk4 => Ok((Rk4.step(model, t, y, dt)?, 0.0)),
        OdeMethod::ForwardEuler => Ok((ForwardEuler.step(model, t, y, dt)?, 0.0)),
    }
}
