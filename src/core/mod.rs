// Core algorithm exports
pub mod baseline;
pub mod detector;
pub mod error;
pub mod matching;
pub mod preferences;
pub mod repair;
pub mod stability;
pub mod updater;

pub use baseline::deferred_acceptance;
pub use detector::BlockingPairDetector;
pub use error::{ListDefect, MatchingDefect, MatchingError};
pub use matching::Matching;
pub use preferences::{PreferenceList, PreferenceModel, PreferenceSnapshot};
pub use repair::{AdmissionReport, StabilityRepair};
pub use stability::{blocking_pairs, is_stable};
pub use updater::{IncrementalUpdater, RoundContext, RoundOutcome};
