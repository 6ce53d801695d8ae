use thiserror::Error;

use crate::models::{ParticipantId, Role};

/// What is wrong with a single preference list
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListDefect {
    #[error("omits {0}")]
    Missing(ParticipantId),

    #[error("lists {0} more than once")]
    Duplicate(ParticipantId),

    #[error("refers to {0}, who is not in the opposite population")]
    Unknown(ParticipantId),
}

/// What is wrong with a supplied matching
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchingDefect {
    #[error("{role} {id} is not part of the population")]
    UnknownParticipant { role: Role, id: ParticipantId },

    #[error("{role} {id} is paired more than once")]
    PairedTwice { role: Role, id: ParticipantId },

    #[error("{role} {id} has no partner")]
    Unpaired { role: Role, id: ParticipantId },
}

/// Errors produced while validating or running a round
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchingError {
    #[error("malformed preference list for {participant}: {defect}")]
    MalformedPreferenceList {
        participant: ParticipantId,
        defect: ListDefect,
    },

    #[error("population mismatch: {men} men and {women} women")]
    PopulationMismatch { men: usize, women: usize },

    #[error("{0} appears in both roles")]
    OverlappingRoles(ParticipantId),

    #[error("participants differ between the previous and current preferences")]
    PopulationChanged,

    #[error("population of {size} exceeds the configured limit of {limit}")]
    PopulationTooLarge { size: usize, limit: usize },

    #[error("malformed matching: {0}")]
    MalformedMatching(#[from] MatchingDefect),

    #[error("baseline matching is not stable: ({man}, {woman}) blocks it")]
    UnstableBaseline {
        man: ParticipantId,
        woman: ParticipantId,
    },

    #[error("unknown participant: {0}")]
    UnknownParticipant(ParticipantId),

    #[error("no partner recorded for {0}")]
    UnmatchedLookup(ParticipantId),

    #[error("repair exceeded {proposals} proposals without settling")]
    NonTerminatingRepair { proposals: usize },

    #[error("internal consistency fault: {0}")]
    Inconsistent(String),
}

impl MatchingError {
    /// Faults that mean the algorithm's own bookkeeping diverged, as opposed
    /// to rejected input
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MatchingError::UnmatchedLookup(_)
                | MatchingError::NonTerminatingRepair { .. }
                | MatchingError::Inconsistent(_)
        )
    }
}
