use std::collections::{HashMap, VecDeque};

use crate::core::error::MatchingError;
use crate::core::matching::Matching;
use crate::core::preferences::PreferenceSnapshot;
use crate::models::{Participant, ParticipantId, Role};

/// Classical one-shot deferred acceptance from scratch
///
/// Produces the stable matching optimal for `proposing`. Used to seed a
/// session without a supplied matching and as the full-recomputation
/// reference for the incremental path.
pub fn deferred_acceptance(
    preferences: &PreferenceSnapshot,
    proposing: Role,
) -> Result<Matching, MatchingError> {
    let proposers = preferences.model(proposing);
    let receivers = preferences.model(proposing.opposite());

    let mut matching = Matching::new();
    let mut next_choice: HashMap<ParticipantId, usize> = HashMap::new();
    let mut free: VecDeque<ParticipantId> = proposers.participants().cloned().collect();

    while let Some(proposer) = free.pop_front() {
        let list = proposers
            .list(&proposer)
            .ok_or_else(|| MatchingError::UnknownParticipant(proposer.clone()))?;
        let cursor = next_choice.entry(proposer.clone()).or_insert(0);
        let Some(target) = list.as_slice().get(*cursor) else {
            return Err(MatchingError::Inconsistent(format!(
                "{} was rejected by every candidate",
                proposer
            )));
        };
        *cursor += 1;

        let target_p = Participant::new(proposing.opposite(), target.clone());
        match matching.partner_of(&target_p).cloned() {
            None => engage(&mut matching, proposing, &proposer, target)?,
            Some(incumbent) if receivers.prefers(target, &proposer, &incumbent)? => {
                matching.remove(&target_p);
                engage(&mut matching, proposing, &proposer, target)?;
                free.push_back(incumbent);
            }
            Some(_) => free.push_back(proposer),
        }
    }

    Ok(matching)
}

fn engage(
    matching: &mut Matching,
    proposing: Role,
    proposer: &ParticipantId,
    target: &ParticipantId,
) -> Result<(), MatchingError> {
    match proposing {
        Role::Man => matching.engage(proposer.clone(), target.clone()),
        Role::Woman => matching.engage(target.clone(), proposer.clone()),
    }
}
