use std::collections::BTreeMap;

use crate::core::error::{MatchingDefect, MatchingError};
use crate::core::preferences::PreferenceSnapshot;
use crate::models::{Participant, ParticipantId, Role};

/// One-to-one assignment between men and women
///
/// Both directions are indexed, so a partner lookup from either side is a
/// map lookup rather than a scan. A participant without an entry is
/// unmatched, which is a normal transient state during repair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matching {
    by_man: BTreeMap<ParticipantId, ParticipantId>,
    by_woman: BTreeMap<ParticipantId, ParticipantId>,
}

impl Matching {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a man -> woman map, rejecting a woman paired twice
    pub fn from_map(pairs: BTreeMap<ParticipantId, ParticipantId>) -> Result<Self, MatchingError> {
        let mut matching = Self::new();
        for (man, woman) in pairs {
            if matching.by_woman.contains_key(&woman) {
                return Err(MatchingDefect::PairedTwice {
                    role: Role::Woman,
                    id: woman,
                }
                .into());
            }
            matching.by_woman.insert(woman.clone(), man.clone());
            matching.by_man.insert(man, woman);
        }
        Ok(matching)
    }

    /// Check that this is a bijection over the snapshot's population
    pub fn validate_against(&self, preferences: &PreferenceSnapshot) -> Result<(), MatchingError> {
        for (man, woman) in &self.by_man {
            if !preferences.men().contains(man) {
                return Err(MatchingDefect::UnknownParticipant {
                    role: Role::Man,
                    id: man.clone(),
                }
                .into());
            }
            if !preferences.women().contains(woman) {
                return Err(MatchingDefect::UnknownParticipant {
                    role: Role::Woman,
                    id: woman.clone(),
                }
                .into());
            }
        }

        for participant in preferences.all_participants() {
            if !self.is_matched(&participant) {
                return Err(MatchingDefect::Unpaired {
                    role: participant.role,
                    id: participant.id,
                }
                .into());
            }
        }

        Ok(())
    }

    /// Partner of `participant`, or `None` if it currently holds no partner
    #[inline]
    pub fn partner_of(&self, participant: &Participant) -> Option<&ParticipantId> {
        match participant.role {
            Role::Man => self.by_man.get(&participant.id),
            Role::Woman => self.by_woman.get(&participant.id),
        }
    }

    pub fn woman_of(&self, man: &ParticipantId) -> Option<&ParticipantId> {
        self.by_man.get(man)
    }

    pub fn man_of(&self, woman: &ParticipantId) -> Option<&ParticipantId> {
        self.by_woman.get(woman)
    }

    pub fn is_matched(&self, participant: &Participant) -> bool {
        self.partner_of(participant).is_some()
    }

    /// Pair two currently unmatched participants
    pub fn engage(&mut self, man: ParticipantId, woman: ParticipantId) -> Result<(), MatchingError> {
        if let Some(existing) = self.by_man.get(&man) {
            return Err(MatchingError::Inconsistent(format!(
                "man {} is already paired with {}",
                man, existing
            )));
        }
        if let Some(existing) = self.by_woman.get(&woman) {
            return Err(MatchingError::Inconsistent(format!(
                "woman {} is already paired with {}",
                woman, existing
            )));
        }

        self.by_woman.insert(woman.clone(), man.clone());
        self.by_man.insert(man, woman);
        Ok(())
    }

    /// Dissolve the pair containing `participant`, returning it as
    /// (man, woman)
    pub fn remove(&mut self, participant: &Participant) -> Option<(ParticipantId, ParticipantId)> {
        let (man, woman) = match participant.role {
            Role::Man => {
                let woman = self.by_man.remove(&participant.id)?;
                (participant.id.clone(), woman)
            }
            Role::Woman => {
                let man = self.by_woman.remove(&participant.id)?;
                (man, participant.id.clone())
            }
        };
        self.by_man.remove(&man);
        self.by_woman.remove(&woman);
        Some((man, woman))
    }

    /// Pairs as (man, woman), ordered by man
    pub fn pairs(&self) -> impl Iterator<Item = (&ParticipantId, &ParticipantId)> {
        self.by_man.iter()
    }

    pub fn to_map(&self) -> BTreeMap<ParticipantId, ParticipantId> {
        self.by_man.clone()
    }

    pub fn len(&self) -> usize {
        self.by_man.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_man.is_empty()
    }
}
