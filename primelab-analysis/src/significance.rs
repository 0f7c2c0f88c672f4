use serde::{Deserialize, Serialize};

/// Marker scheme appended to d′ values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignificanceScheme {
    /// `***` p < 0.001, `**` p < 0.01, `*` p < 0.05
    #[default]
    ThreeTier,
    /// `**` p < 0.001, `*` p < 0.05
    TwoTier,
}

impl SignificanceScheme {
    pub fn marker(&self, p: f64) -> &'static str {
        match self {
            SignificanceScheme::ThreeTier if p < 0.001 => "***",
            SignificanceScheme::ThreeTier if p < 0.01 => "**",
            SignificanceScheme::TwoTier if p < 0.001 => "**",
            _ if p < 0.05 => "*",
            _ => "",
        }
    }

    /// Legend lines printed under the summary table
    pub fn legend(&self) -> &'static [&'static str] {
        match self {
            SignificanceScheme::ThreeTier => &["*** p < 0.001", "**  p < 0.01", "*   p < 0.05"],
            SignificanceScheme::TwoTier => &["**  p < 0.001", "*   p < 0.05"],
        }
    }
}
