use primelab_core::{Outcome, Response, Side, Signal, Trial, TrialKind};
use rand::Rng;

/// What a correct response looks like for one trial, independent of design
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expectation<'a> {
    Signal(Signal),
    Word(&'a str),
    Side(Side),
    Rating,
}

/// Maps an expectation and a response to an outcome.
///
/// A missing response, or one that does not fit the expectation, yields
/// `None` so it is treated as missing rather than coerced into a category.
pub fn classify(expectation: Expectation<'_>, response: Option<&Response>) -> Option<Outcome> {
    let response = response?;
    match (expectation, response) {
        (Expectation::Signal(Signal::Present), Response::Yes) => Some(Outcome::Hit),
        (Expectation::Signal(Signal::Present), Response::No) => Some(Outcome::Miss),
        (Expectation::Signal(Signal::Absent), Response::Yes) => Some(Outcome::FalseAlarm),
        (Expectation::Signal(Signal::Absent), Response::No) => Some(Outcome::CorrectRejection),
        (Expectation::Word(correct), Response::Text(typed)) => {
            Some(Outcome::Accuracy(normalize(typed) == normalize(correct)))
        }
        (Expectation::Side(correct), Response::Choice(chosen)) => {
            Some(Outcome::Accuracy(*chosen == correct))
        }
        (Expectation::Rating, Response::Rating(value)) => Some(Outcome::Rating(*value)),
        _ => None,
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Left/right placement of the correct and distractor words on a 2AFC trial
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoicePlacement {
    pub left: String,
    pub right: String,
    pub correct_side: Side,
}

impl ChoicePlacement {
    /// Places the correct word on either side with probability 1/2
    pub fn random<R: Rng + ?Sized>(trial: &Trial, rng: &mut R) -> Option<Self> {
        let correct = trial.correct_answer()?.to_owned();
        let distractor = trial.distractor_answer()?.to_owned();
        Some(if rng.random_bool(0.5) {
            Self {
                left: correct,
                right: distractor,
                correct_side: Side::Left,
            }
        } else {
            Self {
                left: distractor,
                right: correct,
                correct_side: Side::Right,
            }
        })
    }
}

/// Expectation for a generated trial; 2AFC trials need their placement
pub fn expectation<'a>(
    trial: &'a Trial,
    placement: Option<&ChoicePlacement>,
) -> Option<Expectation<'a>> {
    match &trial.kind {
        TrialKind::Detection { signal, .. } => Some(Expectation::Signal(*signal)),
        TrialKind::Identification { .. } => trial.correct_answer().map(Expectation::Word),
        TrialKind::ForcedChoice { .. } => placement.map(|p| Expectation::Side(p.correct_side)),
        TrialKind::Rating { .. } => Some(Expectation::Rating),
    }
}

pub fn classify_trial(
    trial: &Trial,
    response: Option<&Response>,
    placement: Option<&ChoicePlacement>,
) -> Option<Outcome> {
    classify(expectation(trial, placement)?, response)
}
