//! Error types for component construction and evaluation.

use ht_core::CoreError;
use thiserror::Error;

/// Errors raised while constructing or evaluating a component.
#[derive(Error, Debug, Clone)]
pub enum ComponentError {
    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub type ComponentResult<T> = Result<T, ComponentError>;

impl From<CoreError> for ComponentError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::NonFinite { what, .. } => ComponentError::NonPhysical { what },
            CoreError::InvalidArg { what } => ComponentError::InvalidArg { what },
            CoreError::Invariant { what } => ComponentError::InvalidArg { what },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ComponentError::NonPhysical { what: "density" };
        assert!(err.to_string().contains("density"));
    }
}
