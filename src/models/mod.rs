// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{BrokenPair, Participant, ParticipantId, Role};
pub use requests::{CreateSessionRequest, SnapshotPayload, SubmitRoundRequest, UpdateRequest};
pub use responses::{ErrorResponse, HealthResponse, RoundResponse, SessionResponse};
