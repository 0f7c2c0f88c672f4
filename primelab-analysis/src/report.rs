//! Machine- and human-readable artifacts for analysis results.

use crate::analyzer::StratumResult;
use crate::error::AnalysisError;
use crate::significance::SignificanceScheme;
use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const SUMMARY_FILE: &str = "dprime_summary.txt";
pub const TABLE_COLUMNS: [&str; 8] = [
    "compression_rate",
    "d_prime",
    "d_prime_raw",
    "hit_rate",
    "fa_rate",
    "chi2",
    "p",
    "n_trials",
];
const SUMMARY_COLUMNS: [&str; 7] = [
    "compression_rate",
    "d_prime",
    "hit_rate",
    "fa_rate",
    "chi2",
    "p",
    "n_trials",
];
const RULE_WIDTH: usize = 70;

/// Formatted cells of one result row, keyed like [`TABLE_COLUMNS`]
fn cells(result: &StratumResult) -> [String; 8] {
    [
        result.stratum.to_string(),
        result.d_prime_label(),
        result.d_prime.to_string(),
        format!("{:.3}", result.hit_rate),
        format!("{:.3}", result.false_alarm_rate),
        format!("{:.2}", result.chi_square),
        format!("{:.3}", result.p_value),
        result.n_trials.to_string(),
    ]
}

fn csv_cell(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}

pub fn table_file_name(generated_at: &NaiveDateTime) -> String {
    format!("dprime_results_{}.csv", generated_at.format("%Y%m%d_%H%M%S"))
}

/// CSV text of the full results table
pub fn render_csv(results: &[StratumResult]) -> String {
    let mut out = TABLE_COLUMNS.join(",");
    out.push('\n');
    for result in results {
        let row: Vec<String> = cells(result).iter().map(|c| csv_cell(c)).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// Right-aligned plain-text table over the selected columns
pub fn render_table(results: &[StratumResult], columns: &[&str]) -> String {
    let selected: Vec<usize> = columns
        .iter()
        .filter_map(|c| TABLE_COLUMNS.iter().position(|t| t == c))
        .collect();
    let rows: Vec<[String; 8]> = results.iter().map(cells).collect();

    let widths: Vec<usize> = selected
        .iter()
        .map(|&i| {
            rows.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(TABLE_COLUMNS[i].len()))
                .max()
                .unwrap_or_default()
        })
        .collect();

    let mut out = String::new();
    let line = |out: &mut String, values: Vec<&str>| {
        let padded: Vec<String> = values
            .iter()
            .zip(&widths)
            .map(|(v, &w)| format!("{v:>w$}"))
            .collect();
        out.push_str(padded.join("  ").trim_end());
        out.push('\n');
    };
    line(&mut out, selected.iter().map(|&i| TABLE_COLUMNS[i]).collect());
    for row in &rows {
        line(&mut out, selected.iter().map(|&i| row[i].as_str()).collect());
    }
    out
}

/// Text of `dprime_summary.txt`
pub fn render_summary(
    results: &[StratumResult],
    scheme: SignificanceScheme,
    generated_at: &NaiveDateTime,
) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let legend: String = scheme
        .legend()
        .iter()
        .map(|entry| format!("  {entry}\n"))
        .collect();
    format!(
        "{rule}\nD-Prime Analysis Summary\nGenerated: {}\n{rule}\n\n\
         {}\n{rule}\nSignificance markers:\n{legend}{rule}\n",
        generated_at.format("%Y-%m-%d %H:%M:%S"),
        render_table(results, &SUMMARY_COLUMNS),
    )
}

/// Console rendering of the results
pub fn render_console(results: &[StratumResult], scheme: SignificanceScheme) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    format!(
        "{rule}\nD-PRIME ANALYSIS RESULTS\n{rule}\n{}{rule}\nSignificance: {}\n",
        render_table(results, &SUMMARY_COLUMNS),
        scheme.legend().join(", "),
    )
}

/// Files produced by one report run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub table: PathBuf,
    pub summary: PathBuf,
}

pub struct ReportWriter {
    output_dir: PathBuf,
    scheme: SignificanceScheme,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>, scheme: SignificanceScheme) -> Self {
        Self {
            output_dir: output_dir.into(),
            scheme,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Writes the results table and the summary, creating the output directory if needed
    pub fn write(
        &self,
        results: &[StratumResult],
        generated_at: &NaiveDateTime,
    ) -> Result<ReportPaths, AnalysisError> {
        fs::create_dir_all(&self.output_dir).map_err(|source| AnalysisError::Io {
            path: self.output_dir.clone(),
            source,
        })?;

        let paths = ReportPaths {
            table: self.output_dir.join(table_file_name(generated_at)),
            summary: self.output_dir.join(SUMMARY_FILE),
        };
        write_file(&paths.table, &render_csv(results))?;
        write_file(
            &paths.summary,
            &render_summary(results, self.scheme, generated_at),
        )?;

        info!(
            table = %paths.table.display(),
            summary = %paths.summary.display(),
            rows = results.len(),
            "report written"
        );
        Ok(paths)
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), AnalysisError> {
    fs::write(path, contents).map_err(|source| AnalysisError::Io {
        path: path.to_path_buf(),
        source,
    })
}
