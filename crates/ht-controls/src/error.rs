use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ControlError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub type ControlResult<T> = Result<T, ControlError>;
