use std::path::PathBuf;
use thiserror::Error;
use treeweb_core::MarkupError;

#[derive(Debug, Error)]
pub enum WebError {
    #[error(transparent)]
    Markup(#[from] MarkupError),

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("step size must be a number between 0 and 10, got {0:?}")]
    InvalidStepSize(String),

    #[error("build source {} does not exist", .0.display())]
    MissingSource(PathBuf),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
