use crate::cli::Cli;
use anyhow::{Context, Result};
use chrono::Local;
use primelab_analysis::{
    ReportWriter, SignalDetectionAnalyzer, SignificanceScheme, load_outcome_dir, render_console,
};
use tracing::{info, warn};

pub struct App {
    cli: Cli,
    scheme: SignificanceScheme,
}

impl App {
    pub fn new(cli: Cli) -> Self {
        Self {
            cli,
            scheme: SignificanceScheme::default(),
        }
    }

    /// Loads every session file, analyses it, and writes the report
    pub fn run(&self) -> Result<()> {
        let input = &self.cli.input;
        info!(input = %input.display(), "loading outcome files");
        let table = load_outcome_dir(input)
            .with_context(|| format!("could not load outcomes from {}", input.display()))?;
        if !table.malformed_rows.is_empty() {
            warn!(rows = table.malformed_rows.len(), "malformed rows were skipped");
        }

        let results = SignalDetectionAnalyzer::new(self.scheme)
            .analyze(&table.observations)
            .context("signal detection analysis failed")?;

        println!("{}", render_console(&results, self.scheme));

        let output = self.cli.output_dir();
        let paths = ReportWriter::new(output, self.scheme)
            .write(&results, &Local::now().naive_local())
            .with_context(|| format!("could not write report to {}", output.display()))?;

        println!("Results saved to: {}", paths.table.display());
        println!("Summary saved to: {}", paths.summary.display());
        Ok(())
    }
}
