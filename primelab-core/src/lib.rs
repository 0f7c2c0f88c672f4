pub mod asset;
pub mod error;
pub mod outcome;
pub mod phase;
pub mod trial;

pub use asset::{
    AssetId, AssetLibrary, AssetPool, Replacement, is_asset_filename, word_from_filename,
};
pub use error::AssetError;
pub use outcome::{Outcome, OutcomeRecord, Response};
pub use phase::{Phase, SessionPhase};
pub use trial::{AuxRole, Design, Side, Signal, StratumKey, Trial, TrialKind};
