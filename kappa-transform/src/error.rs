use thiserror::Error;

/// Error raised by the PROJ C API.
#[derive(Debug, Error)]
#[error("PROJ error ({context}): {code} {message}")]
pub struct ProjError {
    pub code: i32,
    pub message: String,
    pub context: &'static str,
}
