use thiserror::Error;

/// Malformed-input errors. Rule violations are never errors: they come
/// back as verdicts with `ok = false`.
#[derive(Error, Debug, Clone)]
pub enum AcceptanceError {
    #[error("Input shape error: {what}")]
    InputShape { what: &'static str },
}

pub type AcceptanceResult<T> = Result<T, AcceptanceError>;
