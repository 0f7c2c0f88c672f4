use clap::Parser;
use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Parser, Debug)]
#[command(name = "primelab")]
#[command(version)]
#[command(about = "Per-stratum d-prime analysis of detection session outcomes", long_about = None)]
pub struct Cli {
    /// Directory holding per-session outcome CSV files
    #[arg(short, long, value_name = "DIR", default_value = DEFAULT_DATA_DIR)]
    pub input: PathBuf,

    /// Directory for the results table and summary (defaults to the input directory)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

impl Cli {
    pub fn output_dir(&self) -> &Path {
        self.output.as_deref().unwrap_or(self.input.as_path())
    }
}
