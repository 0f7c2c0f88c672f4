use crate::trial::{ExecutedTrial, TrialRow};
use std::io::{self, Write};

/// Writes executed trials as CSV. The header is the union of all row
/// columns in first-seen order; cells a row lacks are left empty.
pub fn write_csv<W: Write>(executed: &[ExecutedTrial], mut out: W) -> io::Result<()> {
    let rows: Vec<TrialRow> = executed.iter().map(ExecutedTrial::row).collect();

    let mut header: Vec<&'static str> = Vec::new();
    for row in &rows {
        for (name, _) in &row.columns {
            if !header.contains(name) {
                header.push(*name);
            }
        }
    }

    writeln!(out, "{}", header.join(","))?;
    for row in &rows {
        let cells: Vec<String> = header
            .iter()
            .map(|column| escape(row.get(column).unwrap_or("")))
            .collect();
        writeln!(out, "{}", cells.join(","))?;
    }
    out.flush()
}

pub fn write_json<W: Write>(executed: &[ExecutedTrial], out: W) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(out, executed)
}

fn escape(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_owned()
    }
}
