use std::collections::{HashSet, VecDeque};

use tracing::{debug, trace};

use crate::core::error::MatchingError;
use crate::core::matching::Matching;
use crate::core::preferences::PreferenceSnapshot;
use crate::models::{Participant, ParticipantId, Role};

/// How a proposal target responds
#[derive(Debug, Clone, PartialEq, Eq)]
enum TargetStatus {
    /// Freed this round and not yet admitted: skipped until its own turn
    Deferred,
    /// Admitted and holding no partner: accepts unconditionally
    Unconstrained,
    /// Admitted and matched to the given partner
    Held(ParticipantId),
}

/// Summary of one admission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdmissionReport {
    pub proposals: usize,
    /// Participants bumped out of a pair, in queue order
    pub displaced: Vec<Participant>,
    /// Proposer left without a partner when the queue emptied
    pub unmatched: Option<Participant>,
}

/// Restricted deferred acceptance over the room
///
/// The room starts as every participant matched in the working matching.
/// Freed participants are admitted one at a time; each admission runs a
/// proposal chain in which only participants of the newcomer's role propose,
/// each walking its current list from the top. Targets outside the room are
/// ignored. The matching restricted to the room stays stable after every
/// admission, so once everyone is admitted the whole matching is stable.
#[derive(Debug)]
pub struct StabilityRepair<'a> {
    preferences: &'a PreferenceSnapshot,
    room: HashSet<Participant>,
    proposal_budget: usize,
}

impl<'a> StabilityRepair<'a> {
    pub fn new(preferences: &'a PreferenceSnapshot, matching: &Matching) -> Self {
        let room = matching
            .pairs()
            .flat_map(|(man, woman)| {
                [
                    Participant::man(man.clone()),
                    Participant::woman(woman.clone()),
                ]
            })
            .collect();

        // Each displacement strictly improves someone's partner (n^2 steps at
        // most) and each displaced proposer makes at most n proposals.
        let n = preferences.population();
        let proposal_budget = n
            .saturating_mul(n)
            .saturating_mul(n + 1)
            .max(1);

        Self {
            preferences,
            room,
            proposal_budget,
        }
    }

    #[cfg(test)]
    fn with_budget(mut self, proposal_budget: usize) -> Self {
        self.proposal_budget = proposal_budget;
        self
    }

    pub fn is_room_member(&self, participant: &Participant) -> bool {
        self.room.contains(participant)
    }

    pub fn room_size(&self) -> usize {
        self.room.len()
    }

    /// Admit a freed participant and run its proposal chain to completion
    pub fn admit(
        &mut self,
        matching: &mut Matching,
        newcomer: Participant,
    ) -> Result<AdmissionReport, MatchingError> {
        if !self.preferences.contains(&newcomer) {
            return Err(MatchingError::UnknownParticipant(newcomer.id));
        }
        if let Some(partner) = matching.partner_of(&newcomer) {
            return Err(MatchingError::Inconsistent(format!(
                "{} admitted while paired with {}",
                newcomer, partner
            )));
        }
        if !self.room.insert(newcomer.clone()) {
            return Err(MatchingError::Inconsistent(format!(
                "{} admitted twice in one round",
                newcomer
            )));
        }

        let mut report = AdmissionReport::default();
        let mut free_queue = VecDeque::from([newcomer]);

        while let Some(proposer) = free_queue.pop_front() {
            match self.propose(matching, &proposer, &mut report)? {
                Some(displaced) => {
                    debug!("{} displaced {}", proposer, displaced);
                    report.displaced.push(displaced.clone());
                    free_queue.push_back(displaced);
                }
                None if !matching.is_matched(&proposer) => {
                    debug!("{} exhausted the room and waits unmatched", proposer);
                    report.unmatched = Some(proposer);
                }
                None => {}
            }
        }

        Ok(report)
    }

    /// Walk `proposer`'s list until someone accepts; returns whoever it
    /// displaced
    fn propose(
        &self,
        matching: &mut Matching,
        proposer: &Participant,
        report: &mut AdmissionReport,
    ) -> Result<Option<Participant>, MatchingError> {
        let list = self
            .preferences
            .model(proposer.role)
            .list(&proposer.id)
            .ok_or_else(|| MatchingError::UnknownParticipant(proposer.id.clone()))?;
        let target_role = proposer.role.opposite();

        for target_id in list.iter() {
            let target = Participant::new(target_role, target_id.clone());

            let incumbent = match self.status_of(&target, matching) {
                TargetStatus::Deferred => continue,
                TargetStatus::Unconstrained => None,
                TargetStatus::Held(incumbent) => Some(incumbent),
            };

            report.proposals += 1;
            if report.proposals > self.proposal_budget {
                return Err(MatchingError::NonTerminatingRepair {
                    proposals: report.proposals,
                });
            }

            match incumbent {
                None => {
                    trace!("{} accepts {} unconditionally", target, proposer);
                    pair(matching, proposer, &target)?;
                    return Ok(None);
                }
                Some(incumbent) => {
                    if !self.preferences.prefers(&target, &proposer.id, &incumbent)? {
                        trace!("{} rejects {} in favour of {}", target, proposer, incumbent);
                        continue;
                    }

                    matching.remove(&target).ok_or_else(|| {
                        MatchingError::UnmatchedLookup(target.id.clone())
                    })?;
                    pair(matching, proposer, &target)?;
                    return Ok(Some(Participant::new(proposer.role, incumbent)));
                }
            }
        }

        Ok(None)
    }

    fn status_of(&self, target: &Participant, matching: &Matching) -> TargetStatus {
        if !self.room.contains(target) {
            return TargetStatus::Deferred;
        }
        match matching.partner_of(target) {
            Some(partner) => TargetStatus::Held(partner.clone()),
            None => TargetStatus::Unconstrained,
        }
    }
}

fn pair(matching: &mut Matching, a: &Participant, b: &Participant) -> Result<(), MatchingError> {
    match a.role {
        Role::Man => matching.engage(a.id.clone(), b.id.clone()),
        Role::Woman => matching.engage(b.id.clone(), a.id.clone()),
    }
}
