use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("name {0:?} does not match the expected pattern")]
    Parse(String),

    #[error("image references unknown trajectory id {0}")]
    MissingTrajectory(u64),

    #[error("path is not valid unicode: {0:?}")]
    InvalidPath(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Pattern(#[from] glob::PatternError),

    #[error(transparent)]
    Glob(#[from] glob::GlobError),

    #[error(transparent)]
    Las(#[from] las::Error),
}
