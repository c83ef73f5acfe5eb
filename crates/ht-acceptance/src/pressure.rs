//! Pressurization hold-test acceptance (low and high modes).
//!
//! Stability is judged over the trailing observation window of a smoothed
//! trace, with robust window start/end means. The low test must sit inside
//! the 250-350 psi band; the high test must stay at or above the designated
//! pressure. Drop limits come from the stability table: 10 psi (low),
//! 40 psi (high).

use crate::error::{AcceptanceError, AcceptanceResult};
use crate::reason::Reason;
use crate::series::{
    PressureUnit, robust_start_end_mean, rolling_median, sort_by_time, to_psi, window_indices,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestMode {
    Low,
    High,
}

/// Acceptance thresholds for a pressure test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PressureTestSpec {
    pub mode: TestMode,
    /// Trailing observation window (minutes)
    pub observation_min: f64,

    // Low-test constraints
    pub low_min_psi: f64,
    pub low_max_psi: f64,
    /// Exceeding this during pressurization forces a drain-to-zero redo
    pub low_drain_upper_psi: f64,
    /// Maximum allowed rise during the observation window
    pub low_max_rise_psi: f64,

    // Stability table limits
    pub max_drop_low_psi: f64,
    pub max_drop_high_psi: f64,

    /// Minimum designated pressure for a high test, unless justified
    pub min_high_test_psi: f64,
    pub enforce_min_high_test: bool,

    /// Optional rule: end pressure must stabilize at or above
    /// `max(designated, min_rwp_fraction * RWP)`
    pub require_rwp_stabilization_rule: bool,
    pub min_rwp_fraction: f64,

    /// Optional depth correction: P_measured = P_test + k * rho_rel * LDA
    pub check_measured_bop_pressure: bool,
    pub measured_bop_constant_psi_per_m_sg: f64,
}

impl PressureTestSpec {
    pub fn low() -> Self {
        Self::with_mode(TestMode::Low)
    }

    pub fn high() -> Self {
        Self::with_mode(TestMode::High)
    }

    pub fn with_mode(mode: TestMode) -> Self {
        Self {
            mode,
            observation_min: 5.0,
            low_min_psi: 250.0,
            low_max_psi: 350.0,
            low_drain_upper_psi: 500.0,
            low_max_rise_psi: 10.0,
            max_drop_low_psi: 10.0,
            max_drop_high_psi: 40.0,
            min_high_test_psi: 2000.0,
            enforce_min_high_test: true,
            require_rwp_stabilization_rule: false,
            min_rwp_fraction: 0.97,
            check_measured_bop_pressure: false,
            measured_bop_constant_psi_per_m_sg: 0.1704,
        }
    }
}

/// Optional inputs accompanying the recorded series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PressureTestInputs {
    pub designated_pressure_psi: Option<f64>,
    /// Rated working pressure of the weakest tested component
    pub rwp_psi: Option<f64>,
    pub pressure_unit: PressureUnit,
    /// Rolling-median window (samples, odd)
    pub smooth_window: usize,
    /// A high test below the minimum designated pressure is acceptable only
    /// with an explicit engineering justification
    pub high_test_justified_below_min: bool,
    pub bop_nominal_pressure_psi: Option<f64>,
    pub fluid_density_kg_m3: Option<f64>,
    /// Water depth (m) for the hydrostatic correction
    pub lda_m: Option<f64>,
}

impl Default for PressureTestInputs {
    fn default() -> Self {
        Self {
            designated_pressure_psi: None,
            rwp_psi: None,
            pressure_unit: PressureUnit::Psi,
            smooth_window: 11,
            high_test_justified_below_min: false,
            bop_nominal_pressure_psi: None,
            fluid_density_kg_m3: None,
            lda_m: None,
        }
    }
}

/// Numeric context for a verdict; only the fields the taken branch
/// populated are present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PressureTestDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation_s: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_obs: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p_start_psi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p_end_psi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drop_psi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rise_psi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pmin_obs_psi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pmax_obs_psi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_drop_psi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_rise_psi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_low_psi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_high_psi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_upper_psi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designated_psi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_required_psi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub justified_below_min: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pmax_psi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rwp_psi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_max_psi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stabilization_limit_psi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rwp_fraction: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ptest_surface_psi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p_measured_bop_psi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bop_nominal_psi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fluid_density_kg_m3: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lda_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula_constant_psi_per_m_sg: Option<f64>,
}

/// Pressure-test verdict; constructed once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PressureTestResult {
    pub ok: bool,
    pub reason: Reason,
    pub details: PressureTestDetails,
}

impl PressureTestResult {
    fn fail(reason: Reason, details: PressureTestDetails) -> Self {
        Self {
            ok: false,
            reason,
            details,
        }
    }

    fn pass(details: PressureTestDetails) -> Self {
        Self {
            ok: true,
            reason: Reason::Ok,
            details,
        }
    }
}

/// Maximum overpressure above RWP: `min(5 % of RWP, 500 psi)`.
fn max_overpressure_allowed_psi(rwp_psi: f64) -> f64 {
    (0.05 * rwp_psi).min(500.0)
}

/// Depth-corrected BOP-measured pressure from a surface reading.
fn bop_measured_pressure_psi(
    ptest_psi: f64,
    fluid_density_kg_m3: f64,
    lda_m: f64,
    constant_psi_per_m_sg: f64,
) -> f64 {
    // rho_rel is specific gravity (1.0 at 1000 kg/m^3)
    let rho_rel = fluid_density_kg_m3 / 1000.0;
    ptest_psi + constant_psi_per_m_sg * rho_rel * lda_m
}

/// Evaluate a recorded (or simulated) pressure test against the spec.
///
/// Rule violations come back as `ok = false` verdicts; only malformed
/// input is an error.
pub fn evaluate_pressure_test(
    time_s: &[f64],
    pressure: &[f64],
    spec: &PressureTestSpec,
    inputs: &PressureTestInputs,
) -> AcceptanceResult<PressureTestResult> {
    if time_s.len() != pressure.len() {
        return Err(AcceptanceError::InputShape {
            what: "time and pressure series must have the same length",
        });
    }
    if time_s.len() < 20 {
        return Ok(PressureTestResult::fail(
            Reason::SeriesTooShort,
            PressureTestDetails {
                n: Some(time_s.len()),
                ..Default::default()
            },
        ));
    }

    let (t, p_raw) = sort_by_time(time_s, pressure);

    // Written criteria are quoted in psi; convert once and stay there.
    let p_raw = to_psi(&p_raw, inputs.pressure_unit);

    // Median smoothing suppresses the valley/spike transients
    let p = rolling_median(&p_raw, inputs.smooth_window);

    let observation_s = spec.observation_min * 60.0;
    let t_end = *t.last().expect("series checked non-empty");
    let idx = window_indices(&t, t_end, observation_s);
    if idx.len() < 10 {
        return Ok(PressureTestResult::fail(
            Reason::InsufficientSamplesInObservationWindow,
            PressureTestDetails {
                observation_s: Some(observation_s),
                n_obs: Some(idx.len()),
                ..Default::default()
            },
        ));
    }

    let p_obs: Vec<f64> = idx.iter().map(|&i| p[i]).collect();
    let (p_start, p_end) = robust_start_end_mean(&p_obs);
    let drop = p_start - p_end;
    let rise = p_end - p_start;

    // Depth-corrected measured-BOP-pressure check
    if spec.check_measured_bop_pressure {
        if let (Some(nominal), Some(rho), Some(lda)) = (
            inputs.bop_nominal_pressure_psi,
            inputs.fluid_density_kg_m3,
            inputs.lda_m,
        ) {
            let ptest = p.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let measured = bop_measured_pressure_psi(
                ptest,
                rho,
                lda,
                spec.measured_bop_constant_psi_per_m_sg,
            );
            if measured > nominal {
                return Ok(PressureTestResult::fail(
                    Reason::BopMeasuredPressureAboveNominalLimit,
                    PressureTestDetails {
                        ptest_surface_psi: Some(ptest),
                        p_measured_bop_psi: Some(measured),
                        bop_nominal_psi: Some(nominal),
                        fluid_density_kg_m3: Some(rho),
                        lda_m: Some(lda),
                        formula_constant_psi_per_m_sg: Some(
                            spec.measured_bop_constant_psi_per_m_sg,
                        ),
                        ..Default::default()
                    },
                ));
            }
        }
    }

    // Overpressure check against RWP
    if let Some(rwp) = inputs.rwp_psi {
        let pmax = p.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let allowed = rwp + max_overpressure_allowed_psi(rwp);
        if pmax > allowed {
            return Ok(PressureTestResult::fail(
                Reason::OverpressureAboveRwpLimit,
                PressureTestDetails {
                    pmax_psi: Some(pmax),
                    rwp_psi: Some(rwp),
                    allowed_max_psi: Some(allowed),
                    ..Default::default()
                },
            ));
        }
    }

    match spec.mode {
        TestMode::Low => {
            let pmin_obs = p_obs.iter().cloned().fold(f64::INFINITY, f64::min);
            let pmax_obs = p_obs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

            // Must stay inside the band throughout the observation window
            if pmin_obs < spec.low_min_psi || pmax_obs > spec.low_max_psi {
                // Exceeding the drain threshold anywhere in the record means
                // the test must be bled to zero and redone
                let ever_above_drain = p.iter().any(|&v| v > spec.low_drain_upper_psi);
                if ever_above_drain {
                    return Ok(PressureTestResult::fail(
                        Reason::LowTestExceeded500PsiRequiresRedo,
                        PressureTestDetails {
                            pmin_obs_psi: Some(pmin_obs),
                            pmax_obs_psi: Some(pmax_obs),
                            limit_upper_psi: Some(spec.low_drain_upper_psi),
                            ..Default::default()
                        },
                    ));
                }
                return Ok(PressureTestResult::fail(
                    Reason::LowTestOutside250To350DuringObservation,
                    PressureTestDetails {
                        pmin_obs_psi: Some(pmin_obs),
                        pmax_obs_psi: Some(pmax_obs),
                        range_low_psi: Some(spec.low_min_psi),
                        range_high_psi: Some(spec.low_max_psi),
                        ..Default::default()
                    },
                ));
            }

            if drop > spec.max_drop_low_psi {
                return Ok(PressureTestResult::fail(
                    Reason::LowTestDropExceedsLimit,
                    PressureTestDetails {
                        drop_psi: Some(drop),
                        limit_drop_psi: Some(spec.max_drop_low_psi),
                        p_start_psi: Some(p_start),
                        p_end_psi: Some(p_end),
                        ..Default::default()
                    },
                ));
            }

            if rise > spec.low_max_rise_psi {
                return Ok(PressureTestResult::fail(
                    Reason::LowTestRiseExceedsLimit,
                    PressureTestDetails {
                        rise_psi: Some(rise),
                        limit_rise_psi: Some(spec.low_max_rise_psi),
                        p_start_psi: Some(p_start),
                        p_end_psi: Some(p_end),
                        ..Default::default()
                    },
                ));
            }

            Ok(PressureTestResult::pass(PressureTestDetails {
                p_start_psi: Some(p_start),
                p_end_psi: Some(p_end),
                drop_psi: Some(drop),
                rise_psi: Some(rise),
                ..Default::default()
            }))
        }

        TestMode::High => {
            let Some(designated) = inputs.designated_pressure_psi else {
                return Ok(PressureTestResult::fail(
                    Reason::MissingDesignatedPressureForHighTest,
                    PressureTestDetails::default(),
                ));
            };

            if spec.enforce_min_high_test
                && designated < spec.min_high_test_psi
                && !inputs.high_test_justified_below_min
            {
                return Ok(PressureTestResult::fail(
                    Reason::HighTestDesignatedPressureBelowMinimum2000Psi,
                    PressureTestDetails {
                        designated_psi: Some(designated),
                        minimum_required_psi: Some(spec.min_high_test_psi),
                        justified_below_min: Some(inputs.high_test_justified_below_min),
                        ..Default::default()
                    },
                ));
            }

            let pmin_obs = p_obs.iter().cloned().fold(f64::INFINITY, f64::min);
            if pmin_obs < designated {
                return Ok(PressureTestResult::fail(
                    Reason::HighTestBelowDesignatedRequiresRepressurizeRestartWindow,
                    PressureTestDetails {
                        pmin_obs_psi: Some(pmin_obs),
                        designated_psi: Some(designated),
                        ..Default::default()
                    },
                ));
            }

            if drop > spec.max_drop_high_psi {
                return Ok(PressureTestResult::fail(
                    Reason::HighTestDropExceedsLimit,
                    PressureTestDetails {
                        drop_psi: Some(drop),
                        limit_drop_psi: Some(spec.max_drop_high_psi),
                        p_start_psi: Some(p_start),
                        p_end_psi: Some(p_end),
                        ..Default::default()
                    },
                ));
            }

            if spec.require_rwp_stabilization_rule {
                if let Some(rwp) = inputs.rwp_psi {
                    let stabilization_limit = designated.max(spec.min_rwp_fraction * rwp);
                    if p_end < stabilization_limit {
                        return Ok(PressureTestResult::fail(
                            Reason::HighTestStabilizationBelowRequiredLimit,
                            PressureTestDetails {
                                p_end_psi: Some(p_end),
                                stabilization_limit_psi: Some(stabilization_limit),
                                designated_psi: Some(designated),
                                rwp_psi: Some(rwp),
                                min_rwp_fraction: Some(spec.min_rwp_fraction),
                                ..Default::default()
                            },
                        ));
                    }
                }
            }

            Ok(PressureTestResult::pass(PressureTestDetails {
                p_start_psi: Some(p_start),
                p_end_psi: Some(p_end),
                drop_psi: Some(drop),
                ..Default::default()
            }))
        }
    }
}
