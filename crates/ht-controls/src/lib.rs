//! Valve-opening command signals and actuation dynamics.
//!
//! The time-varying opening command is a strategy object rather than an
//! anonymous closure: concrete, serializable profile variants keep scenario
//! construction testable and storable alongside the rest of a config.

pub mod actuator;
pub mod error;
pub mod signal;

pub use actuator::{ActuatorState, FirstOrderActuator};
pub use error::{ControlError, ControlResult};
pub use signal::{CommandProfile, ControlSignal, LaggedProfile};
