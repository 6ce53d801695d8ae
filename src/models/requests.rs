use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::{Validate, ValidationErrors};

use crate::core::{Matching, MatchingError, PreferenceSnapshot};
use crate::models::domain::ParticipantId;

/// Both roles' preference lists, most preferred first
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SnapshotPayload {
    #[validate(length(min = 1))]
    pub men: BTreeMap<ParticipantId, Vec<ParticipantId>>,
    #[validate(length(min = 1))]
    pub women: BTreeMap<ParticipantId, Vec<ParticipantId>>,
}

impl SnapshotPayload {
    pub fn into_snapshot(self) -> Result<PreferenceSnapshot, MatchingError> {
        PreferenceSnapshot::new(self.men, self.women)
    }
}

/// Stateless round: everything the core needs in one body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub previous: SnapshotPayload,
    pub current: SnapshotPayload,
    /// man -> woman, stable under `previous`
    pub matching: BTreeMap<ParticipantId, ParticipantId>,
}

impl UpdateRequest {
    pub fn validate_payloads(&self) -> Result<(), ValidationErrors> {
        self.previous.validate()?;
        self.current.validate()
    }

    pub fn into_parts(self) -> Result<(PreferenceSnapshot, PreferenceSnapshot, Matching), MatchingError> {
        Ok((
            self.previous.into_snapshot()?,
            self.current.into_snapshot()?,
            Matching::from_map(self.matching)?,
        ))
    }
}

/// Open a session from a baseline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub preferences: SnapshotPayload,
    /// Omit to seed with men-proposing deferred acceptance
    #[serde(default)]
    pub matching: Option<BTreeMap<ParticipantId, ParticipantId>>,
}

/// Next round's preferences for an open session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRoundRequest {
    pub current: SnapshotPayload,
}
