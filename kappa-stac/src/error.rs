use thiserror::Error;

use kappa_core::direction::DirectionError;
use kappa_extract::ExtractError;
use kappa_transform::ProjError;

use crate::validate::ValidationError;

#[derive(Debug, Error)]
pub enum StacError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Direction(#[from] DirectionError),

    #[error(transparent)]
    Projection(#[from] ProjError),

    #[error("catalog validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
