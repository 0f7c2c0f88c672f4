use std::path::PathBuf;
use thiserror::Error;

/// Failures raised while building or drawing from asset pools
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("pool '{pool}' cannot supply {requested} asset(s): only {available} available")]
    InsufficientAssets {
        pool: String,
        requested: usize,
        available: usize,
    },

    #[error("asset directory not found: {}", path.display())]
    MissingDirectory { path: PathBuf },

    #[error("pool '{pool}' contains no usable assets")]
    EmptyPool { pool: String },

    #[error("pool '{pool}' lists asset '{asset}' more than once")]
    DuplicateAsset { pool: String, asset: String },

    #[error("no pool named '{0}' is loaded")]
    UnknownPool(String),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
