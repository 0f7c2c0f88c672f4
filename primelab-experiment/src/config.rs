use crate::error::{ConfigError, GenerationError};
use primelab_core::{Design, Replacement, Response, SessionPhase, Side, StratumKey};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

/// Trial quota for one stratum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionSpec {
    pub key: StratumKey,
    /// Pool the stratum's primes come from; `None` means silence
    pub prime_pool: Option<String>,
    pub practice_trials: usize,
    pub main_trials: usize,
}

impl ConditionSpec {
    pub fn new(
        key: impl Into<String>,
        prime_pool: Option<String>,
        practice_trials: usize,
        main_trials: usize,
    ) -> Self {
        Self {
            key: StratumKey::new(key),
            prime_pool,
            practice_trials,
            main_trials,
        }
    }

    pub fn trials(&self, phase: SessionPhase) -> usize {
        match phase {
            SessionPhase::Practice => self.practice_trials,
            SessionPhase::Main => self.main_trials,
            SessionPhase::Finished => 0,
        }
    }
}

/// What a raw key press means for the running design
#[derive(Debug, Clone, PartialEq)]
pub enum KeyAction {
    Respond(Response),
    Submit,
    Quit,
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyBindings {
    pub yes: String,
    pub no: String,
    pub quit: String,
    pub submit: String,
    pub left: String,
    pub right: String,
    pub rating_min: u8,
    pub rating_max: u8,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            yes: "m".into(),
            no: "z".into(),
            quit: "escape".into(),
            submit: "return".into(),
            left: "left".into(),
            right: "right".into(),
            rating_min: 1,
            rating_max: 7,
        }
    }
}

impl KeyBindings {
    pub fn interpret(&self, design: Design, key: &str) -> KeyAction {
        if key == self.quit {
            return KeyAction::Quit;
        }
        match design {
            Design::Detection if key == self.yes => KeyAction::Respond(Response::Yes),
            Design::Detection if key == self.no => KeyAction::Respond(Response::No),
            Design::ForcedChoice if key == self.left => {
                KeyAction::Respond(Response::Choice(Side::Left))
            }
            Design::ForcedChoice if key == self.right => {
                KeyAction::Respond(Response::Choice(Side::Right))
            }
            Design::Rating => match key.parse::<u8>() {
                Ok(v) if (self.rating_min..=self.rating_max).contains(&v) => {
                    KeyAction::Respond(Response::Rating(v))
                }
                _ => KeyAction::Ignore,
            },
            Design::Identification if key == self.submit => KeyAction::Submit,
            _ => KeyAction::Ignore,
        }
    }
}

/// Complete, immutable description of one experiment variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignConfig {
    pub design: Design,
    pub conditions: Vec<ConditionSpec>,
    pub babble_pool: String,
    pub mask_pool: String,
    #[serde(default)]
    pub face_pool: Option<String>,
    #[serde(default)]
    pub prime_draws: Replacement,
    /// Zero-based indices within the main phase after which a break is offered
    #[serde(default)]
    pub break_points: BTreeSet<usize>,
    #[serde(default)]
    pub keys: KeyBindings,
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self::detection()
    }
}

fn levels(levels: &[&str], practice: usize, main: usize) -> Vec<ConditionSpec> {
    levels
        .iter()
        .map(|level| ConditionSpec::new(*level, Some(format!("audio/{level}")), practice, main))
        .collect()
}

impl DesignConfig {
    /// Yes/no detection: 1 present + 1 absent practice trial and 7 + 7 main
    /// trials per compression level
    pub fn detection() -> Self {
        Self {
            design: Design::Detection,
            conditions: levels(&["0.1", "0.2", "0.3", "0.4", "0.5", "0.6", "0.7"], 2, 14),
            babble_pool: "babbling".into(),
            mask_pool: "masks".into(),
            face_pool: None,
            prime_draws: Replacement::WithoutReplacement,
            break_points: [29, 59, 89, 119, 149].into_iter().collect(),
            keys: KeyBindings::default(),
        }
    }

    pub fn identification() -> Self {
        Self {
            design: Design::Identification,
            conditions: levels(
                &["0.1", "0.2", "0.3", "0.4", "0.5", "0.6", "0.7", "0.8"],
                1,
                1,
            ),
            break_points: BTreeSet::new(),
            ..Self::detection()
        }
    }

    pub fn forced_choice() -> Self {
        Self {
            design: Design::ForcedChoice,
            conditions: vec![
                ConditionSpec::new("positive", Some("primes/positive".into()), 1, 3),
                ConditionSpec::new("negative", Some("primes/negative".into()), 1, 2),
                ConditionSpec::new("neutral", Some("primes/neutrale".into()), 0, 3),
            ],
            prime_draws: Replacement::WithReplacement,
            break_points: BTreeSet::new(),
            ..Self::detection()
        }
    }

    pub fn rating() -> Self {
        Self {
            design: Design::Rating,
            conditions: vec![
                ConditionSpec::new("positive", Some("primes/positive".into()), 1, 2),
                ConditionSpec::new("negative", Some("primes/negative".into()), 0, 3),
                ConditionSpec::new("neutral", Some("primes/neutrale".into()), 1, 1),
                ConditionSpec::new("no-prime", None, 0, 2),
            ],
            face_pool: Some("faces".into()),
            prime_draws: Replacement::WithReplacement,
            break_points: [3].into_iter().collect(),
            ..Self::detection()
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn total_trials(&self, phase: SessionPhase) -> usize {
        self.conditions.iter().map(|c| c.trials(phase)).sum()
    }

    /// Every pool the design draws from, without duplicates
    pub fn pool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .conditions
            .iter()
            .filter_map(|c| c.prime_pool.clone())
            .collect();
        names.push(self.babble_pool.clone());
        names.push(self.mask_pool.clone());
        names.extend(self.face_pool.clone());

        let mut seen = HashSet::new();
        names.retain(|name| seen.insert(name.clone()));
        names
    }

    pub fn validate(&self) -> Result<(), GenerationError> {
        let invalid = |msg: String| Err(GenerationError::InvalidDesign(msg));

        if self.conditions.is_empty() {
            return invalid("no conditions declared".into());
        }

        let mut keys = HashSet::new();
        for condition in &self.conditions {
            if !keys.insert(&condition.key) {
                return invalid(format!("stratum '{}' is declared twice", condition.key));
            }
            if condition.prime_pool.is_none() && self.design != Design::Rating {
                return invalid(format!(
                    "stratum '{}' has no prime pool but {:?} trials require one",
                    condition.key, self.design
                ));
            }
        }

        if self.design == Design::Rating && self.face_pool.is_none() {
            return invalid("rating design requires a face pool".into());
        }
        if self.keys.rating_min > self.keys.rating_max {
            return invalid("rating scale minimum exceeds maximum".into());
        }
        Ok(())
    }
}
