//! Function-test acceptance: closing times and regulator calibration.

use crate::reason::Reason;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActuatorKind {
    Annular,
    Ram,
    Valve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TestEnvironment {
    #[default]
    Subsea,
    Surface,
}

/// One timed actuation record from a function test.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosingTimeRecord {
    pub name: String,
    pub kind: ActuatorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_time_s: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_time_s: Option<f64>,
    #[serde(default)]
    pub environment: TestEnvironment,
    /// Line service for valve records (kill/choke/kiv/civ)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bore_in: Option<f64>,
}

/// One regulator calibration point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RegulatorRecord {
    pub setpoint_psi: f64,
    pub measured_psi: f64,
}

/// Closing-time limits and regulator coverage requirements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionTestSpec {
    pub max_close_annular_s: f64,
    pub max_close_ram_s: f64,
    pub max_close_annular_surface_small_s: f64,
    pub max_close_annular_surface_large_s: f64,
    pub max_close_ram_surface_s: f64,
    /// Open/close limit for subsea kill/choke line valves
    pub max_subsea_kill_choke_valve_time_s: f64,
    /// Bore at and above which a surface annular counts as large (inches)
    pub surface_large_bore_in: f64,
    pub validate_regulators: bool,
    pub regulator_setpoints_psi: Vec<f64>,
    pub regulator_setpoint_tolerance_psi: f64,
    /// Ceiling for the measured pressure at the lowest setpoint
    pub regulator_min_allowed_psi: f64,
    /// Floor for the measured pressure at the highest setpoint
    pub regulator_max_allowed_psi: f64,
}

impl Default for FunctionTestSpec {
    fn default() -> Self {
        Self {
            max_close_annular_s: 60.0,
            max_close_ram_s: 45.0,
            max_close_annular_surface_small_s: 30.0,
            max_close_annular_surface_large_s: 45.0,
            max_close_ram_surface_s: 30.0,
            max_subsea_kill_choke_valve_time_s: 45.0,
            surface_large_bore_in: 18.75,
            validate_regulators: false,
            regulator_setpoints_psi: vec![500.0, 1000.0, 1500.0, 3000.0],
            regulator_setpoint_tolerance_psi: 25.0,
            regulator_min_allowed_psi: 700.0,
            regulator_max_allowed_psi: 2800.0,
        }
    }
}

/// One failed closing-time check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosingTimeFail {
    pub name: String,
    pub kind: ActuatorKind,
    pub reason: Reason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    /// Which operation exceeded: "close_time_s" or "open_time_s"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_s: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_s: Option<f64>,
}

/// One failed regulator check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegulatorFail {
    pub reason: Reason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setpoint_psi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance_psi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measured_psi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_psi: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegulatorEval {
    pub ok: bool,
    pub fails: Vec<RegulatorFail>,
    pub covered_setpoints_psi: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionTestDetails {
    pub fails: Vec<ClosingTimeFail>,
    pub regulator: RegulatorEval,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionTestResult {
    pub ok: bool,
    pub reason: Reason,
    pub details: FunctionTestDetails,
}

fn annular_limit_s(record: &ClosingTimeRecord, spec: &FunctionTestSpec) -> f64 {
    match record.environment {
        TestEnvironment::Surface => {
            let bore = record.bore_in.unwrap_or(spec.surface_large_bore_in);
            if bore >= spec.surface_large_bore_in {
                spec.max_close_annular_surface_large_s
            } else {
                spec.max_close_annular_surface_small_s
            }
        }
        TestEnvironment::Subsea => spec.max_close_annular_s,
    }
}

fn ram_limit_s(record: &ClosingTimeRecord, spec: &FunctionTestSpec) -> f64 {
    match record.environment {
        TestEnvironment::Surface => spec.max_close_ram_surface_s,
        TestEnvironment::Subsea => spec.max_close_ram_s,
    }
}

fn is_kill_choke_service(service: Option<&str>) -> bool {
    matches!(
        service.map(|s| s.to_ascii_lowercase()).as_deref(),
        Some("kill" | "choke" | "kiv" | "civ")
    )
}

fn evaluate_regulators(records: &[RegulatorRecord], spec: &FunctionTestSpec) -> RegulatorEval {
    if records.is_empty() {
        return RegulatorEval {
            ok: true,
            ..Default::default()
        };
    }

    let tol = spec.regulator_setpoint_tolerance_psi;
    let mut fails = Vec::new();
    let mut covered = Vec::new();

    for &target in &spec.regulator_setpoints_psi {
        if records
            .iter()
            .any(|r| (r.setpoint_psi - target).abs() <= tol)
        {
            covered.push(target);
        } else {
            fails.push(RegulatorFail {
                reason: Reason::MissingRegulatorSetpoint,
                setpoint_psi: Some(target),
                tolerance_psi: Some(tol),
                measured_psi: None,
                limit_psi: None,
            });
        }
    }

    let lowest = spec
        .regulator_setpoints_psi
        .iter()
        .cloned()
        .fold(f64::INFINITY, f64::min);
    let highest = spec
        .regulator_setpoints_psi
        .iter()
        .cloned()
        .fold(f64::NEG_INFINITY, f64::max);

    // At the lowest setpoint the regulator must be able to get down far
    // enough; at the highest it must reach high enough.
    let low_measured = records
        .iter()
        .filter(|r| (r.setpoint_psi - lowest).abs() <= tol)
        .map(|r| r.measured_psi)
        .fold(f64::INFINITY, f64::min);
    if low_measured.is_finite() && low_measured > spec.regulator_min_allowed_psi {
        fails.push(RegulatorFail {
            reason: Reason::RegulatorMinPressureTooHigh,
            setpoint_psi: None,
            tolerance_psi: None,
            measured_psi: Some(low_measured),
            limit_psi: Some(spec.regulator_min_allowed_psi),
        });
    }

    let high_measured = records
        .iter()
        .filter(|r| (r.setpoint_psi - highest).abs() <= tol)
        .map(|r| r.measured_psi)
        .fold(f64::NEG_INFINITY, f64::max);
    if high_measured.is_finite() && high_measured < spec.regulator_max_allowed_psi {
        fails.push(RegulatorFail {
            reason: Reason::RegulatorMaxPressureTooLow,
            setpoint_psi: None,
            tolerance_psi: None,
            measured_psi: Some(high_measured),
            limit_psi: Some(spec.regulator_max_allowed_psi),
        });
    }

    RegulatorEval {
        ok: fails.is_empty(),
        fails,
        covered_setpoints_psi: covered,
    }
}

/// Judge a batch of closing-time records, optionally with regulator
/// calibration coverage.
pub fn evaluate_closing_times(
    records: &[ClosingTimeRecord],
    spec: &FunctionTestSpec,
    regulator_records: Option<&[RegulatorRecord]>,
) -> FunctionTestResult {
    let mut fails: Vec<ClosingTimeFail> = Vec::new();

    for record in records {
        match record.kind {
            ActuatorKind::Annular | ActuatorKind::Ram => {
                let Some(t_close) = record.close_time_s else {
                    fails.push(ClosingTimeFail {
                        name: record.name.clone(),
                        kind: record.kind,
                        reason: Reason::MissingCloseTimeS,
                        service: None,
                        metric: None,
                        time_s: None,
                        limit_s: None,
                    });
                    continue;
                };
                let limit = match record.kind {
                    ActuatorKind::Annular => annular_limit_s(record, spec),
                    _ => ram_limit_s(record, spec),
                };
                if t_close > limit {
                    fails.push(ClosingTimeFail {
                        name: record.name.clone(),
                        kind: record.kind,
                        reason: Reason::ClosingTimeExceedsLimit,
                        service: None,
                        metric: Some("close_time_s".to_string()),
                        time_s: Some(t_close),
                        limit_s: Some(limit),
                    });
                }
            }
            ActuatorKind::Valve => {
                // Kill/choke line valves must open and close within the ram
                // closing-time budget; only the subsea services are bound.
                if record.environment != TestEnvironment::Subsea
                    || !is_kill_choke_service(record.service.as_deref())
                {
                    continue;
                }
                let limit = spec.max_subsea_kill_choke_valve_time_s;
                for (metric, time) in [
                    ("close_time_s", record.close_time_s),
                    ("open_time_s", record.open_time_s),
                ] {
                    let Some(t_op) = time else { continue };
                    if t_op > limit {
                        fails.push(ClosingTimeFail {
                            name: record.name.clone(),
                            kind: record.kind,
                            reason: Reason::ClosingTimeExceedsLimit,
                            service: record.service.clone(),
                            metric: Some(metric.to_string()),
                            time_s: Some(t_op),
                            limit_s: Some(limit),
                        });
                    }
                }
            }
        }
    }

    let must_validate_regulators = spec.validate_regulators || regulator_records.is_some();
    let regulator = if must_validate_regulators {
        evaluate_regulators(regulator_records.unwrap_or(&[]), spec)
    } else {
        RegulatorEval {
            ok: true,
            ..Default::default()
        }
    };

    let ok = fails.is_empty() && regulator.ok;
    let reason = match (fails.is_empty(), regulator.ok) {
        (true, true) => Reason::Ok,
        (false, true) => Reason::ClosingTimeExceedsLimit,
        (true, false) => Reason::RegulatorCriteriaNotMet,
        (false, false) => Reason::ClosingTimeAndRegulatorCriteriaNotMet,
    };

    FunctionTestResult {
        ok,
        reason,
        details: FunctionTestDetails { fails, regulator },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annular(name: &str, close_time_s: Option<f64>) -> ClosingTimeRecord {
        ClosingTimeRecord {
            name: name.to_string(),
            kind: ActuatorKind::Annular,
            close_time_s,
            open_time_s: None,
            environment: TestEnvironment::Subsea,
            service: None,
            bore_in: None,
        }
    }

    #[test]
    fn subsea_annular_boundary_at_60s() {
        let result = evaluate_closing_times(
            &[annular("UA", Some(60.0))],
            &FunctionTestSpec::default(),
            None,
        );
        assert!(result.ok, "60 s is exactly at the limit and passes");

        let result = evaluate_closing_times(
            &[annular("UA", Some(61.0))],
            &FunctionTestSpec::default(),
            None,
        );
        assert!(!result.ok);
        assert_eq!(result.reason, Reason::ClosingTimeExceedsLimit);
        assert_eq!(result.details.fails[0].limit_s, Some(60.0));
    }

    #[test]
    fn missing_close_time_is_a_failure() {
        let result =
            evaluate_closing_times(&[annular("LA", None)], &FunctionTestSpec::default(), None);
        assert!(!result.ok);
        assert_eq!(result.details.fails[0].reason, Reason::MissingCloseTimeS);
    }

    #[test]
    fn surface_annular_limits_split_by_bore() {
        let mut small = annular("SA", Some(40.0));
        small.environment = TestEnvironment::Surface;
        small.bore_in = Some(13.625);
        let result =
            evaluate_closing_times(&[small.clone()], &FunctionTestSpec::default(), None);
        // Small-bore surface annular limit is 30 s
        assert!(!result.ok);

        let mut large = small;
        large.bore_in = Some(21.25);
        let result = evaluate_closing_times(&[large], &FunctionTestSpec::default(), None);
        // Large-bore limit is 45 s
        assert!(result.ok);
    }

    #[test]
    fn ram_limits_by_environment() {
        let mut ram = ClosingTimeRecord {
            name: "UPR".to_string(),
            kind: ActuatorKind::Ram,
            close_time_s: Some(40.0),
            open_time_s: None,
            environment: TestEnvironment::Subsea,
            service: None,
            bore_in: None,
        };
        assert!(evaluate_closing_times(&[ram.clone()], &FunctionTestSpec::default(), None).ok);

        ram.environment = TestEnvironment::Surface;
        let result = evaluate_closing_times(&[ram], &FunctionTestSpec::default(), None);
        assert!(!result.ok, "40 s exceeds the 30 s surface ram limit");
    }

    #[test]
    fn subsea_kill_choke_valves_check_both_directions() {
        let valve = ClosingTimeRecord {
            name: "LIK".to_string(),
            kind: ActuatorKind::Valve,
            close_time_s: Some(30.0),
            open_time_s: Some(50.0),
            environment: TestEnvironment::Subsea,
            service: Some("kill".to_string()),
            bore_in: None,
        };
        let result = evaluate_closing_times(&[valve], &FunctionTestSpec::default(), None);
        assert!(!result.ok);
        assert_eq!(result.details.fails[0].metric.as_deref(), Some("open_time_s"));
    }

    #[test]
    fn non_kill_choke_valves_are_unbounded() {
        let valve = ClosingTimeRecord {
            name: "AUX".to_string(),
            kind: ActuatorKind::Valve,
            close_time_s: Some(120.0),
            open_time_s: Some(120.0),
            environment: TestEnvironment::Subsea,
            service: Some("utility".to_string()),
            bore_in: None,
        };
        let result = evaluate_closing_times(&[valve], &FunctionTestSpec::default(), None);
        assert!(result.ok);
    }

    fn full_regulator_sweep() -> Vec<RegulatorRecord> {
        vec![
            RegulatorRecord {
                setpoint_psi: 500.0,
                measured_psi: 505.0,
            },
            RegulatorRecord {
                setpoint_psi: 1000.0,
                measured_psi: 1002.0,
            },
            RegulatorRecord {
                setpoint_psi: 1500.0,
                measured_psi: 1498.0,
            },
            RegulatorRecord {
                setpoint_psi: 3000.0,
                measured_psi: 2990.0,
            },
        ]
    }

    #[test]
    fn regulator_sweep_passes_with_full_coverage() {
        let result = evaluate_closing_times(
            &[annular("UA", Some(50.0))],
            &FunctionTestSpec::default(),
            Some(&full_regulator_sweep()),
        );
        assert!(result.ok, "reason: {}", result.reason);
        assert_eq!(result.details.regulator.covered_setpoints_psi.len(), 4);
    }

    #[test]
    fn missing_setpoint_fails_regulator_criteria() {
        let mut sweep = full_regulator_sweep();
        sweep.remove(2); // drop the 1500 psi point
        let result = evaluate_closing_times(
            &[annular("UA", Some(50.0))],
            &FunctionTestSpec::default(),
            Some(&sweep),
        );
        assert!(!result.ok);
        assert_eq!(result.reason, Reason::RegulatorCriteriaNotMet);
        assert_eq!(
            result.details.regulator.fails[0].reason,
            Reason::MissingRegulatorSetpoint
        );
    }

    #[test]
    fn regulator_range_limits() {
        let mut sweep = full_regulator_sweep();
        // Cannot regulate below 750 psi at the 500 psi setpoint
        sweep[0].measured_psi = 750.0;
        let result = evaluate_closing_times(&[], &FunctionTestSpec::default(), Some(&sweep));
        assert!(!result.ok);
        assert_eq!(
            result.details.regulator.fails[0].reason,
            Reason::RegulatorMinPressureTooHigh
        );

        let mut sweep = full_regulator_sweep();
        // Tops out at 2500 psi at the 3000 psi setpoint
        sweep[3].measured_psi = 2500.0;
        let result = evaluate_closing_times(&[], &FunctionTestSpec::default(), Some(&sweep));
        assert!(!result.ok);
        assert_eq!(
            result.details.regulator.fails[0].reason,
            Reason::RegulatorMaxPressureTooLow
        );
    }

    #[test]
    fn composite_reason_when_both_fail() {
        let mut sweep = full_regulator_sweep();
        sweep.remove(0);
        let result = evaluate_closing_times(
            &[annular("UA", Some(90.0))],
            &FunctionTestSpec::default(),
            Some(&sweep),
        );
        assert!(!result.ok);
        assert_eq!(
            result.reason,
            Reason::ClosingTimeAndRegulatorCriteriaNotMet
        );
    }

    #[test]
    fn regulator_validation_with_no_records_is_vacuously_ok() {
        let mut spec = FunctionTestSpec::default();
        spec.validate_regulators = true;
        // Coverage can only be judged against supplied calibration records
        let result = evaluate_closing_times(&[annular("UA", Some(50.0))], &spec, None);
        assert!(result.ok);
    }

    #[test]
    fn empty_regulator_record_list_also_passes_vacuously() {
        let records: Vec<RegulatorRecord> = Vec::new();
        let result = evaluate_closing_times(
            &[annular("UA", Some(50.0))],
            &FunctionTestSpec::default(),
            Some(&records),
        );
        assert!(result.ok);
    }
}
