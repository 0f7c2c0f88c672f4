use primelab_core::AssetError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error("invalid design: {0}")]
    InvalidDesign(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read design config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse design config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Misuse of the next/submit protocol
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SequenceError {
    #[error("an outcome must be submitted before the next trial is requested")]
    OutcomePending,

    #[error("no trial is awaiting an outcome")]
    NoTrialPending,
}
