//! Yates-corrected chi-square test of detection against chance.

use crate::error::AnalysisError;
use statrs::distribution::{ChiSquared, ContinuousCDF};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChiSquareTest {
    pub statistic: f64,
    pub p_value: f64,
}

impl ChiSquareTest {
    /// Result reported for a table whose expected frequencies contain a zero
    pub const DEGENERATE: ChiSquareTest = ChiSquareTest {
        statistic: 0.0,
        p_value: 1.0,
    };
}

/// Yates-corrected Pearson test on a 2x2 table of (possibly fractional) counts.
///
/// Each observed cell is moved toward its expected value by at most 0.5 before squaring.
pub fn yates_2x2(observed: [[f64; 2]; 2]) -> Result<ChiSquareTest, AnalysisError> {
    let rows = [observed[0][0] + observed[0][1], observed[1][0] + observed[1][1]];
    let cols = [observed[0][0] + observed[1][0], observed[0][1] + observed[1][1]];
    let total = rows[0] + rows[1];

    if rows.iter().chain(&cols).any(|&sum| sum <= 0.0) {
        warn!(
            ?observed,
            "contingency table has an empty row or column, chi-square undefined"
        );
        return Ok(ChiSquareTest::DEGENERATE);
    }

    let mut statistic = 0.0;
    for (r, row) in observed.iter().enumerate() {
        for (c, &o) in row.iter().enumerate() {
            let expected = rows[r] * cols[c] / total;
            let diff = expected - o;
            let corrected = o + diff.signum() * diff.abs().min(0.5);
            statistic += (corrected - expected).powi(2) / expected;
        }
    }

    let dist = ChiSquared::new(1.0).map_err(|e| AnalysisError::Distribution(e.to_string()))?;
    Ok(ChiSquareTest {
        statistic,
        p_value: dist.sf(statistic),
    })
}

/// Builds the detection table from rates, with `n_trials / 2` trials per row.
///
/// Rows are signal and noise, columns are detected and not detected.
pub fn chi_square_from_rates(
    hit_rate: f64,
    false_alarm_rate: f64,
    n_trials: usize,
) -> Result<ChiSquareTest, AnalysisError> {
    let per_row = n_trials as f64 / 2.0;
    yates_2x2([
        [hit_rate * per_row, (1.0 - hit_rate) * per_row],
        [false_alarm_rate * per_row, (1.0 - false_alarm_rate) * per_row],
    ])
}
