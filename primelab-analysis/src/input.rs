//! Loading per-trial outcome tables written by experiment sessions.
//!
//! Only `compression_level` and `trial_outcome` are required; every other column is ignored
//! except `phase`, which is used to drop practice rows when present.

use crate::error::{AnalysisError, MalformedInputRow};
use primelab_core::{Outcome, StratumKey};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const STRATUM_COLUMN: &str = "compression_level";
pub const OUTCOME_COLUMN: &str = "trial_outcome";
pub const PHASE_COLUMN: &str = "phase";

/// One classified trial read back from disk
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub stratum: StratumKey,
    pub outcome: Outcome,
}

impl Observation {
    pub fn new(stratum: impl Into<StratumKey>, outcome: Outcome) -> Self {
        Self {
            stratum: stratum.into(),
            outcome,
        }
    }
}

/// Observations from one or more files plus bookkeeping about dropped rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutcomeTable {
    pub observations: Vec<Observation>,
    pub files_loaded: usize,
    pub files_skipped: usize,
    pub missing_rows: usize,
    pub practice_rows: usize,
    pub malformed_rows: Vec<MalformedInputRow>,
}

impl OutcomeTable {
    fn merge(&mut self, other: OutcomeTable) {
        self.observations.extend(other.observations);
        self.files_loaded += other.files_loaded;
        self.files_skipped += other.files_skipped;
        self.missing_rows += other.missing_rows;
        self.practice_rows += other.practice_rows;
        self.malformed_rows.extend(other.malformed_rows);
    }
}

struct Columns {
    stratum: usize,
    outcome: usize,
    phase: Option<usize>,
}

impl Columns {
    fn locate(header: &[String]) -> Result<Self, &'static str> {
        let find = |name: &str| header.iter().position(|h| h == name);
        Ok(Self {
            stratum: find(STRATUM_COLUMN).ok_or(STRATUM_COLUMN)?,
            outcome: find(OUTCOME_COLUMN).ok_or(OUTCOME_COLUMN)?,
            phase: find(PHASE_COLUMN),
        })
    }
}

/// Splits one CSV record, honouring double-quoted fields and `""` escapes.
pub fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

/// Numeric levels group by value, so `0.30` and `0.3` are one stratum
fn stratum_key(raw: &str) -> StratumKey {
    match raw.parse::<f64>() {
        Ok(level) if level.is_finite() => StratumKey::new(level.to_string()),
        _ => StratumKey::new(raw),
    }
}

fn is_missing(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "" | "na" | "nan" | "none" | "null"
    )
}

/// Parses the text of one outcome file.
///
/// Returns `None` when the header lacks a required column, so the caller can skip the file.
pub fn parse_outcomes(source: &str, text: &str) -> Option<OutcomeTable> {
    let mut lines = text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());

    let header: Vec<String> = match lines.next() {
        Some((_, line)) => split_record(line.trim_start_matches('\u{feff}'))
            .into_iter()
            .map(|h| h.trim().to_owned())
            .collect(),
        None => {
            warn!(source, "outcome file is empty");
            return None;
        }
    };
    let columns = match Columns::locate(&header) {
        Ok(columns) => columns,
        Err(column) => {
            warn!(source, column, "outcome file lacks a required column, skipping");
            return None;
        }
    };

    let mut table = OutcomeTable {
        files_loaded: 1,
        ..OutcomeTable::default()
    };

    for (idx, line) in lines {
        let line_no = idx + 1;
        let fields = split_record(line);
        let cell = |i: usize| fields.get(i).map(|s| s.trim());

        let Some(label) = cell(columns.outcome) else {
            let row = MalformedInputRow::MissingColumn {
                line: line_no,
                column: OUTCOME_COLUMN,
            };
            warn!(source, "{row}");
            table.malformed_rows.push(row);
            continue;
        };
        if is_missing(label) {
            table.missing_rows += 1;
            continue;
        }
        if let Some(phase) = columns.phase.and_then(|i| cell(i)) {
            if phase.eq_ignore_ascii_case("practice") {
                table.practice_rows += 1;
                continue;
            }
        }

        let stratum = match cell(columns.stratum) {
            Some(s) if !is_missing(s) => s,
            _ => {
                let row = MalformedInputRow::MissingColumn {
                    line: line_no,
                    column: STRATUM_COLUMN,
                };
                warn!(source, "{row}");
                table.malformed_rows.push(row);
                continue;
            }
        };
        let Some(outcome) = Outcome::from_sdt_label(label) else {
            let row = MalformedInputRow::UnknownOutcome {
                line: line_no,
                label: label.to_owned(),
            };
            warn!(source, "{row}");
            table.malformed_rows.push(row);
            continue;
        };

        table.observations.push(Observation::new(stratum_key(stratum), outcome));
    }

    debug!(
        source,
        observations = table.observations.len(),
        missing = table.missing_rows,
        practice = table.practice_rows,
        malformed = table.malformed_rows.len(),
        "parsed outcome file"
    );
    Some(table)
}

/// Reads every `*.csv` file in `dir`, in file-name order.
pub fn load_outcome_dir(dir: impl AsRef<Path>) -> Result<OutcomeTable, AnalysisError> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(AnalysisError::MissingDirectory {
            path: dir.to_path_buf(),
        });
    }

    let io_err = |source| AnalysisError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if is_csv && path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(AnalysisError::NoInputFiles {
            path: dir.to_path_buf(),
        });
    }

    let mut table = OutcomeTable::default();
    for path in &files {
        let text = fs::read_to_string(path).map_err(|source| AnalysisError::Io {
            path: path.clone(),
            source,
        })?;
        match parse_outcomes(&path.display().to_string(), &text) {
            Some(parsed) => table.merge(parsed),
            None => table.files_skipped += 1,
        }
    }

    if table.observations.is_empty() {
        return Err(AnalysisError::NoUsableRows {
            path: dir.to_path_buf(),
        });
    }

    info!(
        dir = %dir.display(),
        files = table.files_loaded,
        skipped_files = table.files_skipped,
        observations = table.observations.len(),
        malformed_rows = table.malformed_rows.len(),
        "loaded outcome tables"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_quoted_fields() {
        assert_eq!(
            split_record(r#"a,"b,c","say ""hi""",,d"#),
            vec!["a", "b,c", r#"say "hi""#, "", "d"]
        );
    }

    #[test]
    fn reads_required_columns_and_ignores_extras() {
        let text = "participant,compression_level,response,trial_outcome\n\
                    p1,0.3,m,Hit\n\
                    p1,0.3,z,Correct Rejection\n\
                    p1,0.5,m,False Alarm\n";
        let table = parse_outcomes("t.csv", text).unwrap();
        assert_eq!(
            table.observations,
            vec![
                Observation::new("0.3", Outcome::Hit),
                Observation::new("0.3", Outcome::CorrectRejection),
                Observation::new("0.5", Outcome::FalseAlarm),
            ]
        );
    }

    #[test]
    fn missing_outcomes_are_not_malformed() {
        let text = "compression_level,trial_outcome\n0.3,\n0.3,NA\n,None\n0.3,Miss\n";
        let table = parse_outcomes("t.csv", text).unwrap();
        assert_eq!(table.missing_rows, 3);
        assert!(table.malformed_rows.is_empty());
        assert_eq!(table.observations.len(), 1);
    }

    #[test]
    fn malformed_rows_are_counted_and_skipped() {
        let text = "compression_level,x,trial_outcome\n0.3,1,Hit\n0.3\n,1,Hit\n0.3,1,Maybe\n";
        let table = parse_outcomes("t.csv", text).unwrap();
        assert_eq!(table.observations.len(), 1);
        assert_eq!(
            table.malformed_rows,
            vec![
                MalformedInputRow::MissingColumn {
                    line: 3,
                    column: OUTCOME_COLUMN
                },
                MalformedInputRow::MissingColumn {
                    line: 4,
                    column: STRATUM_COLUMN
                },
                MalformedInputRow::UnknownOutcome {
                    line: 5,
                    label: "Maybe".to_owned()
                },
            ]
        );
    }

    #[test]
    fn practice_rows_are_excluded_when_phase_is_known() {
        let text = "phase,compression_level,trial_outcome\npractice,0.3,Hit\nmain,0.3,Miss\n";
        let table = parse_outcomes("t.csv", text).unwrap();
        assert_eq!(table.practice_rows, 1);
        assert_eq!(table.observations, vec![Observation::new("0.3", Outcome::Miss)]);
    }

    #[test]
    fn numeric_levels_are_grouped_by_value() {
        let text = "compression_level,trial_outcome\n0.3,Hit\n0.30,Miss\n.3,Hit\npositive,Hit\n";
        let table = parse_outcomes("t.csv", text).unwrap();
        let keys: Vec<&str> = table.observations.iter().map(|o| o.stratum.as_str()).collect();
        assert_eq!(keys, vec!["0.3", "0.3", "0.3", "positive"]);
    }

    #[test]
    fn header_without_required_column_is_rejected() {
        assert!(parse_outcomes("t.csv", "level,trial_outcome\n0.3,Hit\n").is_none());
        assert!(parse_outcomes("t.csv", "").is_none());
    }
}
