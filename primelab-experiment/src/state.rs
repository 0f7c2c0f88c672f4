use crate::config::DesignConfig;
use crate::error::SequenceError;
use crate::trial::{ExecutedTrial, TrialLists};
use primelab_core::{OutcomeRecord, Phase, SessionPhase, Trial};
use std::collections::BTreeSet;
use tracing::info;

/// What the executor should do next
#[derive(Debug, PartialEq)]
pub enum SequencerStep<'a, P> {
    Present {
        phase: P,
        index: usize,
        trial: &'a Trial,
    },
    Finished,
    Aborted,
}

/// Signal returned after an outcome is submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitSignal {
    Continue,
    /// Show the break screen before requesting the next trial
    BreakRequested {
        completed: usize,
        total: usize,
    },
    Abort,
}

/// Drives practice and main trials one at a time through an external executor.
///
/// The executor alternates `next()` and `submit()`. Quitting is cooperative:
/// a quit flag in a submitted outcome is observed at the following `next()`.
pub struct TrialSequencer<P: Phase = SessionPhase> {
    phase: P,
    cursor: usize,
    practice: Vec<Trial>,
    main: Vec<Trial>,
    break_points: BTreeSet<usize>,
    quit_requested: bool,
    pending: Option<usize>,
    completed: Vec<ExecutedTrial>,
}

impl<P: Phase> TrialSequencer<P> {
    pub fn new(lists: TrialLists, break_points: BTreeSet<usize>) -> Self {
        let mut sequencer = Self {
            phase: P::default(),
            cursor: 0,
            practice: lists.practice,
            main: lists.main,
            break_points,
            quit_requested: false,
            pending: None,
            completed: Vec::new(),
        };
        sequencer.settle();
        sequencer
    }

    pub fn from_config(lists: TrialLists, config: &DesignConfig) -> Self {
        Self::new(lists, config.break_points.clone())
    }

    fn phase_trials(&self) -> &[Trial] {
        if self.phase.is_practice() {
            &self.practice
        } else if self.phase.is_main() {
            &self.main
        } else {
            &[]
        }
    }

    fn advance_phase(&mut self) -> bool {
        if let Some(next) = self.phase.next() {
            info!(from = ?self.phase, to = ?next, "phase complete");
            self.phase = next;
            self.cursor = 0;
            true
        } else {
            false
        }
    }

    /// Moves past exhausted or empty phases so `phase()` is current between trials
    fn settle(&mut self) {
        while !self.phase.is_finished() && self.cursor >= self.phase_trials().len() {
            if !self.advance_phase() {
                break;
            }
        }
    }

    pub fn next(&mut self) -> Result<SequencerStep<'_, P>, SequenceError> {
        if self.quit_requested {
            return Ok(SequencerStep::Aborted);
        }
        if self.pending.is_some() {
            return Err(SequenceError::OutcomePending);
        }

        self.settle();
        if self.cursor >= self.phase_trials().len() {
            return Ok(SequencerStep::Finished);
        }

        let index = self.cursor;
        self.cursor += 1;
        self.pending = Some(index);
        Ok(SequencerStep::Present {
            phase: self.phase,
            index,
            trial: &self.phase_trials()[index],
        })
    }

    pub fn submit(&mut self, outcome: OutcomeRecord) -> Result<SubmitSignal, SequenceError> {
        let index = self.pending.take().ok_or(SequenceError::NoTrialPending)?;
        let trials = self.phase_trials();
        let total = trials.len();
        let trial = trials[index].clone();
        let quit = outcome.quit_requested;
        self.completed.push(ExecutedTrial { trial, outcome });

        if quit {
            info!(phase = ?self.phase, index, "quit requested");
            self.quit_requested = true;
            return Ok(SubmitSignal::Abort);
        }

        let signal = if self.phase.allows_breaks() && self.break_points.contains(&index) {
            SubmitSignal::BreakRequested {
                completed: index + 1,
                total,
            }
        } else {
            SubmitSignal::Continue
        };
        self.settle();
        Ok(signal)
    }

    /// Raises the quit flag from outside the outcome stream
    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    pub fn phase(&self) -> P {
        self.phase
    }

    pub fn is_quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_terminal(&self) -> bool {
        self.quit_requested || self.phase.is_finished()
    }

    /// Trials completed in the current phase and the phase size.
    ///
    /// A trial that has been presented but not yet submitted does not count.
    pub fn progress(&self) -> Option<(usize, usize)> {
        if self.phase.is_practice() || self.phase.is_main() {
            let completed = self.cursor - usize::from(self.pending.is_some());
            Some((completed, self.phase_trials().len()))
        } else {
            None
        }
    }

    pub fn completed(&self) -> &[ExecutedTrial] {
        &self.completed
    }

    pub fn into_completed(self) -> Vec<ExecutedTrial> {
        self.completed
    }
}
