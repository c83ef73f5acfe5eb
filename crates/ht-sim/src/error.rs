//! Error types for simulation operations.

use thiserror::Error;

/// Errors encountered while building or advancing a transient model.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Non-physical condition: {what}")]
    NonPhysical { what: &'static str },

    #[error("Not found: {what}")]
    Missing { what: String },

    #[error("Retryable step failure: {message}")]
    Retryable { message: String },

    #[error("Backend error: {message}")]
    Backend { message: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<ht_components::ComponentError> for SimError {
    fn from(e: ht_components::ComponentError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}

impl From<ht_controls::ControlError> for SimError {
    fn from(e: ht_controls::ControlError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}

impl From<ht_core::CoreError> for SimError {
    fn from(e: ht_core::CoreError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}
