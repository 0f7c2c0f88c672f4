use crate::asset::AssetId;
use crate::phase::SessionPhase;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Experiment design a trial belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Design {
    /// Yes/no detection of a word embedded in babble
    Detection,
    /// Free-text report of the embedded word
    Identification,
    /// Two-alternative forced choice between the prime word and a distractor
    ForcedChoice,
    /// 1..7 rating of a face preceded by a valenced prime (or silence)
    Rating,
}

impl Design {
    /// Column the stratum key is persisted under
    pub fn stratum_column(&self) -> &'static str {
        match self {
            Design::Detection | Design::Identification => "compression_level",
            Design::ForcedChoice | Design::Rating => "prime_valence",
        }
    }
}

/// Stratification key such as a compression level (`0.3`) or a valence (`positive`).
///
/// Numeric keys order numerically and sort before non-numeric keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StratumKey(String);

impl StratumKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into().trim().to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn numeric(&self) -> Option<f64> {
        self.0.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

impl Ord for StratumKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.total_cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for StratumKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<&str> for StratumKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for StratumKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Present,
    Absent,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Present => "present",
            Signal::Absent => "absent",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    pub fn opposite(&self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Role an auxiliary asset plays within a trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuxRole {
    Babble,
    Mask1,
    Mask2,
    Face,
}

impl AuxRole {
    pub fn column(&self) -> &'static str {
        match self {
            AuxRole::Babble => "babbling_file",
            AuxRole::Mask1 => "mask1_file",
            AuxRole::Mask2 => "mask2_file",
            AuxRole::Face => "face_file",
        }
    }
}

/// Design-specific part of a trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "design", rename_all = "snake_case")]
pub enum TrialKind {
    /// `prime` is `None` exactly when the signal is absent
    Detection {
        signal: Signal,
        prime: Option<AssetId>,
    },
    Identification {
        prime: AssetId,
    },
    ForcedChoice {
        prime: AssetId,
        distractor: String,
    },
    /// `prime` is `None` for no-prime (silence) conditions
    Rating {
        prime: Option<AssetId>,
    },
}

/// One generated trial. Trials are never mutated after generation; outcomes
/// are recorded alongside them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    pub ordinal: usize,
    pub phase: SessionPhase,
    pub stratum: StratumKey,
    pub auxiliary: BTreeMap<AuxRole, AssetId>,
    #[serde(flatten)]
    pub kind: TrialKind,
}

impl Trial {
    pub fn design(&self) -> Design {
        match self.kind {
            TrialKind::Detection { .. } => Design::Detection,
            TrialKind::Identification { .. } => Design::Identification,
            TrialKind::ForcedChoice { .. } => Design::ForcedChoice,
            TrialKind::Rating { .. } => Design::Rating,
        }
    }

    pub fn signal(&self) -> Option<Signal> {
        match self.kind {
            TrialKind::Detection { signal, .. } => Some(signal),
            _ => None,
        }
    }

    pub fn prime(&self) -> Option<&AssetId> {
        match &self.kind {
            TrialKind::Detection { prime, .. } | TrialKind::Rating { prime } => prime.as_ref(),
            TrialKind::Identification { prime } | TrialKind::ForcedChoice { prime, .. } => {
                Some(prime)
            }
        }
    }

    /// Word encoded by the prime, for designs that ask about it
    pub fn correct_answer(&self) -> Option<&str> {
        match &self.kind {
            TrialKind::Rating { .. } => None,
            _ => self.prime().map(AssetId::word),
        }
    }

    pub fn distractor_answer(&self) -> Option<&str> {
        match &self.kind {
            TrialKind::ForcedChoice { distractor, .. } => Some(distractor),
            _ => None,
        }
    }

    pub fn aux(&self, role: AuxRole) -> Option<&AssetId> {
        self.auxiliary.get(&role)
    }
}
