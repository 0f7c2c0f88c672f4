pub mod analyzer;
pub mod chi_square;
pub mod error;
pub mod input;
pub mod report;
pub mod sdt;
pub mod significance;

pub use analyzer::{SignalDetectionAnalyzer, StratumResult};
pub use chi_square::{ChiSquareTest, chi_square_from_rates, yates_2x2};
pub use error::{AnalysisError, MalformedInputRow};
pub use input::{Observation, OutcomeTable, load_outcome_dir, parse_outcomes};
pub use report::{ReportPaths, ReportWriter, render_console, render_csv, render_summary};
pub use sdt::{StratumTally, d_prime, edge_correct};
pub use significance::SignificanceScheme;
