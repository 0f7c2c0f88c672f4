use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(
        "stratum '{stratum}' cannot be analysed: {present} signal-present and {absent} signal-absent trials"
    )]
    EmptyStratum {
        stratum: String,
        present: usize,
        absent: usize,
    },

    #[error("input directory not found: {}", path.display())]
    MissingDirectory { path: PathBuf },

    #[error("no CSV files found in {}", path.display())]
    NoInputFiles { path: PathBuf },

    #[error("no usable detection outcomes found in {}", path.display())]
    NoUsableRows { path: PathBuf },

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("distribution error: {0}")]
    Distribution(String),
}

/// Why a single input row was dropped
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedInputRow {
    #[error("line {line}: missing required column '{column}'")]
    MissingColumn { line: usize, column: &'static str },

    #[error("line {line}: unrecognized trial outcome '{label}'")]
    UnknownOutcome { line: usize, label: String },
}
