use primelab_core::{AuxRole, OutcomeRecord, SessionPhase, StratumKey, Trial};
use serde::{Deserialize, Serialize};

/// The two disjoint, independently shuffled trial lists of a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrialLists {
    pub practice: Vec<Trial>,
    pub main: Vec<Trial>,
}

impl TrialLists {
    pub fn phase(&self, phase: SessionPhase) -> &[Trial] {
        match phase {
            SessionPhase::Practice => &self.practice,
            SessionPhase::Main => &self.main,
            SessionPhase::Finished => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.practice.len() + self.main.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trial> {
        self.practice.iter().chain(self.main.iter())
    }

    pub fn count(&self, phase: SessionPhase, stratum: &StratumKey) -> usize {
        self.phase(phase)
            .iter()
            .filter(|t| &t.stratum == stratum)
            .count()
    }
}

/// A trial paired with what happened when it ran
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutedTrial {
    pub trial: Trial,
    pub outcome: OutcomeRecord,
}

/// Flat per-trial record; columns vary by design
#[derive(Debug, Clone, PartialEq)]
pub struct TrialRow {
    pub columns: Vec<(&'static str, String)>,
}

const NA: &str = "NA";
const SILENCE: &str = "SILENCE";

impl ExecutedTrial {
    pub fn row(&self) -> TrialRow {
        let trial = &self.trial;
        let outcome = &self.outcome;
        let mut columns = vec![
            ("phase", trial.phase.to_string()),
            ("trial_index", trial.ordinal.to_string()),
            (trial.design().stratum_column(), trial.stratum.to_string()),
        ];
        if let Some(signal) = trial.signal() {
            columns.push(("signal_type", signal.as_str().to_owned()));
        }
        columns.push((
            "prime_file",
            trial.prime().map_or(SILENCE.to_owned(), ToString::to_string),
        ));
        columns.push((
            "correct_word",
            trial.correct_answer().unwrap_or(NA).to_owned(),
        ));
        if let Some(distractor) = trial.distractor_answer() {
            columns.push(("distractor_word", distractor.to_owned()));
        }
        for role in [AuxRole::Babble, AuxRole::Mask1, AuxRole::Mask2, AuxRole::Face] {
            if let Some(id) = trial.aux(role) {
                columns.push((role.column(), id.to_string()));
            }
        }
        columns.push((
            "response",
            outcome.response.as_ref().map_or(NA.to_owned(), |r| r.label()),
        ));
        columns.push((
            "rt",
            outcome
                .reaction_time_s
                .map_or(NA.to_owned(), |rt| rt.to_string()),
        ));
        columns.push((
            "trial_outcome",
            outcome.outcome.map_or(NA.to_owned(), |o| o.label()),
        ));
        columns.push(("quit_requested", outcome.quit_requested.to_string()));
        TrialRow { columns }
    }
}

impl TrialRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value.as_str())
    }
}
