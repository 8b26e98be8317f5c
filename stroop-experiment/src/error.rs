//! Experiment error model
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExperimentError {
    #[error("IO/{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CONFIG/{0}")]
    Config(String),

    #[error("SERIALIZE/{0}")]
    Serialize(#[from] serde_json::Error),

    #[error("PRESENTATION/{0}")]
    Presentation(String),

    /// The operator stopped the session (escape key or closed window).
    #[error("ABORTED/{0}")]
    Aborted(String),
}

impl ExperimentError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExperimentError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExperimentError>;
