//! Stable Rematch - incremental stable matching service
//!
//! Keeps a stable one-to-one matching between two equal-size populations
//! current as their ranked preferences change, repairing only the pairs a
//! change actually breaks instead of recomputing from scratch.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    deferred_acceptance, is_stable, BlockingPairDetector, IncrementalUpdater, Matching, MatchingError,
    PreferenceSnapshot, RoundContext, RoundOutcome, StabilityRepair,
};
pub use crate::models::{BrokenPair, Participant, ParticipantId, Role};
