use crate::trial::{Side, Signal};
use serde::{Deserialize, Serialize};

/// Participant response after key interpretation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    Yes,
    No,
    Text(String),
    Choice(Side),
    Rating(u8),
}

impl Response {
    /// Value written to the `response` column
    pub fn label(&self) -> String {
        match self {
            Response::Yes => "yes".to_owned(),
            Response::No => "no".to_owned(),
            Response::Text(text) => text.clone(),
            Response::Choice(side) => side.as_str().to_owned(),
            Response::Rating(value) => value.to_string(),
        }
    }
}

/// Classified result of one trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Hit,
    Miss,
    FalseAlarm,
    CorrectRejection,
    Accuracy(bool),
    Rating(u8),
}

impl Outcome {
    /// Label used in the persisted `trial_outcome` column
    pub fn label(&self) -> String {
        match self {
            Outcome::Hit => "Hit".to_owned(),
            Outcome::Miss => "Miss".to_owned(),
            Outcome::FalseAlarm => "False Alarm".to_owned(),
            Outcome::CorrectRejection => "Correct Rejection".to_owned(),
            Outcome::Accuracy(correct) => u8::from(*correct).to_string(),
            Outcome::Rating(value) => value.to_string(),
        }
    }

    /// Parses a detection outcome label, tolerant of case and separators
    pub fn from_sdt_label(label: &str) -> Option<Outcome> {
        let normalized: String = label
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "hit" => Some(Outcome::Hit),
            "miss" => Some(Outcome::Miss),
            "falsealarm" | "fa" => Some(Outcome::FalseAlarm),
            "correctrejection" | "cr" => Some(Outcome::CorrectRejection),
            _ => None,
        }
    }

    /// Which trial type a detection outcome was scored on
    pub fn signal(&self) -> Option<Signal> {
        match self {
            Outcome::Hit | Outcome::Miss => Some(Signal::Present),
            Outcome::FalseAlarm | Outcome::CorrectRejection => Some(Signal::Absent),
            _ => None,
        }
    }
}

/// Outcome data recorded for one executed trial
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub response: Option<Response>,
    pub reaction_time_s: Option<f64>,
    pub outcome: Option<Outcome>,
    pub quit_requested: bool,
}

impl OutcomeRecord {
    pub fn new(response: Option<Response>, reaction_time_s: Option<f64>) -> Self {
        Self {
            response,
            reaction_time_s,
            outcome: None,
            quit_requested: false,
        }
    }

    /// Record for a trial the participant aborted
    pub fn quit() -> Self {
        Self {
            quit_requested: true,
            ..Self::default()
        }
    }

    pub fn with_outcome(mut self, outcome: Option<Outcome>) -> Self {
        self.outcome = outcome;
        self
    }
}
