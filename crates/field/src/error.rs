use simcore::ControllerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FieldError {
    #[error("controller query failed: {0}")]
    Controller(#[from] ControllerError),
}
