//! Acceptance-rule evaluation for recorded or simulated well-control tests.
//!
//! Three independent evaluators implement the written acceptance criteria:
//! pressurization hold tests (low/high), accumulator soak/decay tests, and
//! function closing-time tests with regulator-setpoint coverage. Each is a
//! pure function from (series, spec) to a structured verdict.
//!
//! Rule violations are verdicts (`ok = false` plus a stable reason code),
//! never errors: downstream tooling and audits key on the reason-code
//! strings, so they are preserved verbatim by [`reason::Reason`]. Errors
//! are reserved for malformed input such as mismatched series lengths.

pub mod error;
pub mod function;
pub mod hold;
pub mod pressure;
pub mod reason;
pub mod series;
pub mod soak;

pub use error::{AcceptanceError, AcceptanceResult};
pub use function::{
    ActuatorKind, ClosingTimeRecord, FunctionTestResult, FunctionTestSpec, RegulatorRecord,
    TestEnvironment, evaluate_closing_times,
};
pub use hold::{HoldDropCheck, acceptance_hold_drop, drop_percent};
pub use pressure::{
    PressureTestInputs, PressureTestResult, PressureTestSpec, TestMode, evaluate_pressure_test,
};
pub use reason::Reason;
pub use series::PressureUnit;
pub use soak::{SoakTestResult, SoakTestSpec, allowed_drop_per_step_psi, evaluate_soak_test};
