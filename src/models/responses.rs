use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::core::{RoundContext, RoundOutcome};
use crate::models::domain::{BrokenPair, ParticipantId};

/// Result of one round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundResponse {
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
    pub round: u64,
    pub matching: BTreeMap<ParticipantId, ParticipantId>,
    #[serde(rename = "brokenPairs")]
    pub broken_pairs: Vec<BrokenPair>,
    pub proposals: usize,
}

impl RoundResponse {
    pub fn from_outcome(session_id: Option<Uuid>, round: u64, outcome: RoundOutcome) -> Self {
        Self {
            session_id,
            round,
            matching: outcome.matching.to_map(),
            broken_pairs: outcome.broken_pairs,
            proposals: outcome.proposals,
        }
    }
}

/// Current state of a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    #[serde(rename = "sessionId")]
    pub session_id: Uuid,
    pub round: u64,
    pub population: usize,
    pub matching: BTreeMap<ParticipantId, ParticipantId>,
}

impl SessionResponse {
    pub fn from_context(session_id: Uuid, context: &RoundContext) -> Self {
        Self {
            session_id,
            round: context.round,
            population: context.previous.population(),
            matching: context.matching.to_map(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "activeSessions")]
    pub active_sessions: u64,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
