pub mod classify;
pub mod config;
pub mod error;
pub mod export;
pub mod generator;
pub mod state;
pub mod trial;

pub use classify::{ChoicePlacement, Expectation, classify, classify_trial};
pub use config::{ConditionSpec, DesignConfig, KeyAction, KeyBindings};
pub use error::{ConfigError, GenerationError, SequenceError};
pub use generator::TrialListGenerator;
pub use state::{SequencerStep, SubmitSignal, TrialSequencer};
pub use trial::{ExecutedTrial, TrialLists, TrialRow};
