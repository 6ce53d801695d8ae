use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a participant, stable across rounds
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        ParticipantId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        ParticipantId(s.to_string())
    }
}

impl From<String> for ParticipantId {
    fn from(s: String) -> Self {
        ParticipantId(s)
    }
}

/// One of the two disjoint sides of the market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Man,
    Woman,
}

impl Role {
    pub fn opposite(self) -> Self {
        match self {
            Role::Man => Role::Woman,
            Role::Woman => Role::Man,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Man => write!(f, "man"),
            Role::Woman => write!(f, "woman"),
        }
    }
}

/// A participant id tagged with its role
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Participant {
    pub role: Role,
    pub id: ParticipantId,
}

impl Participant {
    pub fn new(role: Role, id: impl Into<ParticipantId>) -> Self {
        Self { role, id: id.into() }
    }

    pub fn man(id: impl Into<ParticipantId>) -> Self {
        Self::new(Role::Man, id)
    }

    pub fn woman(id: impl Into<ParticipantId>) -> Self {
        Self::new(Role::Woman, id)
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.role, self.id)
    }
}

/// An existing pair dissolved because one of its members now forms a
/// blocking pair with `witness`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokenPair {
    pub man: ParticipantId,
    pub woman: ParticipantId,
    /// Side whose changed list surfaced the instability
    #[serde(rename = "detectedBy")]
    pub detected_by: Role,
    pub witness: ParticipantId,
}

impl BrokenPair {
    /// Members of the pair in the order they are re-admitted during repair
    pub fn members(&self) -> [Participant; 2] {
        [
            Participant::man(self.man.clone()),
            Participant::woman(self.woman.clone()),
        ]
    }
}
