//! Stable verdict reason codes.
//!
//! These strings are an external contract: audit tooling and historical
//! test archives key on them, so the spelling is frozen. Add codes, never
//! rename them.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reason {
    #[serde(rename = "ok")]
    Ok,

    // Shared input sufficiency
    #[serde(rename = "series_too_short")]
    SeriesTooShort,
    #[serde(rename = "insufficient_samples_in_observation_window")]
    InsufficientSamplesInObservationWindow,

    // Pressure test, both modes
    #[serde(rename = "bop_measured_pressure_above_nominal_limit")]
    BopMeasuredPressureAboveNominalLimit,
    #[serde(rename = "overpressure_above_rwp_limit")]
    OverpressureAboveRwpLimit,

    // Pressure test, low mode
    #[serde(rename = "low_test_exceeded_500psi_requires_redo")]
    LowTestExceeded500PsiRequiresRedo,
    #[serde(rename = "low_test_outside_250_350_during_observation")]
    LowTestOutside250To350DuringObservation,
    #[serde(rename = "low_test_drop_exceeds_limit")]
    LowTestDropExceedsLimit,
    #[serde(rename = "low_test_rise_exceeds_limit")]
    LowTestRiseExceedsLimit,

    // Pressure test, high mode
    #[serde(rename = "missing_designated_pressure_for_high_test")]
    MissingDesignatedPressureForHighTest,
    #[serde(rename = "high_test_designated_pressure_below_minimum_2000psi")]
    HighTestDesignatedPressureBelowMinimum2000Psi,
    #[serde(rename = "high_test_below_designated_requires_repressurize_restart_window")]
    HighTestBelowDesignatedRequiresRepressurizeRestartWindow,
    #[serde(rename = "high_test_drop_exceeds_limit")]
    HighTestDropExceedsLimit,
    #[serde(rename = "high_test_stabilization_below_required_limit")]
    HighTestStabilizationBelowRequiredLimit,

    // Soak test
    #[serde(rename = "insufficient_duration")]
    InsufficientDuration,
    #[serde(rename = "insufficient_samples_in_block")]
    InsufficientSamplesInBlock,
    #[serde(rename = "drop_exceeds_limit")]
    DropExceedsLimit,
    #[serde(rename = "requires_extended_observation_until_pump_interval_above_4h")]
    RequiresExtendedObservationUntilPumpIntervalAbove4h,

    // Function test
    #[serde(rename = "closing_time_exceeds_limit")]
    ClosingTimeExceedsLimit,
    #[serde(rename = "missing_close_time_s")]
    MissingCloseTimeS,
    #[serde(rename = "missing_regulator_setpoint")]
    MissingRegulatorSetpoint,
    #[serde(rename = "regulator_min_pressure_too_high")]
    RegulatorMinPressureTooHigh,
    #[serde(rename = "regulator_max_pressure_too_low")]
    RegulatorMaxPressureTooLow,
    #[serde(rename = "regulator_criteria_not_met")]
    RegulatorCriteriaNotMet,
    #[serde(rename = "closing_time_and_regulator_criteria_not_met")]
    ClosingTimeAndRegulatorCriteriaNotMet,
}

impl Reason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Reason::Ok => "ok",
            Reason::SeriesTooShort => "series_too_short",
            Reason::InsufficientSamplesInObservationWindow => {
                "insufficient_samples_in_observation_window"
            }
            Reason::BopMeasuredPressureAboveNominalLimit => {
                "bop_measured_pressure_above_nominal_limit"
            }
            Reason::OverpressureAboveRwpLimit => "overpressure_above_rwp_limit",
            Reason::LowTestExceeded500PsiRequiresRedo => "low_test_exceeded_500psi_requires_redo",
            Reason::LowTestOutside250To350DuringObservation => {
                "low_test_outside_250_350_during_observation"
            }
            Reason::LowTestDropExceedsLimit => "low_test_drop_exceeds_limit",
            Reason::LowTestRiseExceedsLimit => "low_test_rise_exceeds_limit",
            Reason::MissingDesignatedPressureForHighTest => {
                "missing_designated_pressure_for_high_test"
            }
            Reason::HighTestDesignatedPressureBelowMinimum2000Psi => {
                "high_test_designated_pressure_below_minimum_2000psi"
            }
            Reason::HighTestBelowDesignatedRequiresRepressurizeRestartWindow => {
                "high_test_below_designated_requires_repressurize_restart_window"
            }
            Reason::HighTestDropExceedsLimit => "high_test_drop_exceeds_limit",
            Reason::HighTestStabilizationBelowRequiredLimit => {
                "high_test_stabilization_below_required_limit"
            }
            Reason::InsufficientDuration => "insufficient_duration",
            Reason::InsufficientSamplesInBlock => "insufficient_samples_in_block",
            Reason::DropExceedsLimit => "drop_exceeds_limit",
            Reason::RequiresExtendedObservationUntilPumpIntervalAbove4h => {
                "requires_extended_observation_until_pump_interval_above_4h"
            }
            Reason::ClosingTimeExceedsLimit => "closing_time_exceeds_limit",
            Reason::MissingCloseTimeS => "missing_close_time_s",
            Reason::MissingRegulatorSetpoint => "missing_regulator_setpoint",
            Reason::RegulatorMinPressureTooHigh => "regulator_min_pressure_too_high",
            Reason::RegulatorMaxPressureTooLow => "regulator_max_pressure_too_low",
            Reason::RegulatorCriteriaNotMet => "regulator_criteria_not_met",
            Reason::ClosingTimeAndRegulatorCriteriaNotMet => {
                "closing_time_and_regulator_criteria_not_met"
            }
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_matches_display() {
        for reason in [
            Reason::Ok,
            Reason::SeriesTooShort,
            Reason::LowTestExceeded500PsiRequiresRedo,
            Reason::LowTestOutside250To350DuringObservation,
            Reason::HighTestDesignatedPressureBelowMinimum2000Psi,
            Reason::RequiresExtendedObservationUntilPumpIntervalAbove4h,
            Reason::ClosingTimeAndRegulatorCriteriaNotMet,
        ] {
            let json = serde_json::to_string(&reason).unwrap();
            assert_eq!(json, format!("\"{reason}\""));
        }
    }

    #[test]
    fn audit_vocabulary_is_verbatim() {
        assert_eq!(
            Reason::LowTestExceeded500PsiRequiresRedo.as_str(),
            "low_test_exceeded_500psi_requires_redo"
        );
        assert_eq!(
            Reason::HighTestBelowDesignatedRequiresRepressurizeRestartWindow.as_str(),
            "high_test_below_designated_requires_repressurize_restart_window"
        );
        assert_eq!(
            Reason::RequiresExtendedObservationUntilPumpIntervalAbove4h.as_str(),
            "requires_extended_observation_until_pump_interval_above_4h"
        );
    }
}
