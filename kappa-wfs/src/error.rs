use thiserror::Error;

use kappa_transform::ProjError;

#[derive(Debug, Error)]
pub enum WfsError {
    /// Remote fetch failure. Not retried; the transport timeout is the only
    /// protection.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed WFS response: {0}")]
    Malformed(String),

    #[error(transparent)]
    Projection(#[from] ProjError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),

    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),
}
