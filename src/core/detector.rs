use std::collections::HashSet;

use tracing::{debug, trace};

use crate::core::error::MatchingError;
use crate::core::matching::Matching;
use crate::core::preferences::PreferenceSnapshot;
use crate::models::{BrokenPair, Participant, ParticipantId, Role};

/// Finds existing pairs that stopped being stable between two snapshots
///
/// Only participants whose list changed drive a scan. For a changed
/// participant `a` matched to `b`, the candidates are those `a` used to rank
/// below `b`; `a`'s current list is then walked down to `b`, and a candidate
/// met on the way breaks the pair if it now ranks `a` above its own partner.
/// The walk never passes `b`: nobody `a` ranks below `b` can block with `a`.
#[derive(Debug, Clone, Copy)]
pub struct BlockingPairDetector<'a> {
    previous: &'a PreferenceSnapshot,
    current: &'a PreferenceSnapshot,
}

impl<'a> BlockingPairDetector<'a> {
    pub fn new(previous: &'a PreferenceSnapshot, current: &'a PreferenceSnapshot) -> Self {
        Self { previous, current }
    }

    /// Broken pairs in discovery order, men's pass first
    ///
    /// `matching` must be complete; a participant with no partner here is a
    /// consistency fault.
    pub fn detect(&self, matching: &Matching) -> Result<Vec<BrokenPair>, MatchingError> {
        let mut broken = Vec::new();
        let mut seen: HashSet<(ParticipantId, ParticipantId)> = HashSet::new();

        for driver_role in [Role::Man, Role::Woman] {
            for (man, woman) in matching.pairs() {
                let (driver, partner) = match driver_role {
                    Role::Man => (Participant::man(man.clone()), woman),
                    Role::Woman => (Participant::woman(woman.clone()), man),
                };

                let Some(witness) = self.scan(&driver, partner, matching)? else {
                    continue;
                };

                if !seen.insert((man.clone(), woman.clone())) {
                    trace!("Pair ({}, {}) already broken, skipping", man, woman);
                    continue;
                }

                debug!(
                    "Broken pair ({}, {}): {} now blocks with {}",
                    man, woman, driver, witness
                );
                broken.push(BrokenPair {
                    man: man.clone(),
                    woman: woman.clone(),
                    detected_by: driver_role,
                    witness,
                });
            }
        }

        Ok(broken)
    }

    /// Returns the participant that blocks with `driver`, if any
    fn scan(
        &self,
        driver: &Participant,
        partner: &ParticipantId,
        matching: &Matching,
    ) -> Result<Option<ParticipantId>, MatchingError> {
        let previous = self.previous.model(driver.role);
        let current = self.current.model(driver.role);

        if !current.changed_since(previous, &driver.id) {
            return Ok(None);
        }

        let (Some(previous_list), Some(current_list)) =
            (previous.list(&driver.id), current.list(&driver.id))
        else {
            return Err(MatchingError::UnknownParticipant(driver.id.clone()));
        };

        // Scoped to this driver: a candidate only has standing against the
        // partner it was previously rejected in favour of.
        let candidates: HashSet<&ParticipantId> = previous_list.ranked_below(partner).iter().collect();

        let other_role = driver.role.opposite();
        for candidate in current_list.iter() {
            if candidate == partner {
                break;
            }
            if !candidates.contains(candidate) {
                continue;
            }

            let candidate = Participant::new(other_role, candidate.clone());
            let candidate_partner = matching
                .partner_of(&candidate)
                .ok_or_else(|| MatchingError::UnmatchedLookup(candidate.id.clone()))?;

            if self.current.prefers(&candidate, &driver.id, candidate_partner)? {
                return Ok(Some(candidate.id));
            }
        }

        Ok(None)
    }
}
