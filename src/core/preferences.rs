use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::core::error::{ListDefect, MatchingError};
use crate::models::{Participant, ParticipantId, Role};

/// A strict total order over the opposite population, most preferred first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceList {
    order: Vec<ParticipantId>,
    positions: HashMap<ParticipantId, usize>,
}

impl PreferenceList {
    pub fn new(order: Vec<ParticipantId>) -> Self {
        let mut positions = HashMap::with_capacity(order.len());
        for (index, id) in order.iter().enumerate() {
            positions.entry(id.clone()).or_insert(index);
        }
        Self { order, positions }
    }

    /// Position of `target` (0 = most preferred)
    #[inline]
    pub fn rank(&self, target: &ParticipantId) -> Option<usize> {
        self.positions.get(target).copied()
    }

    /// Whether `x` is ranked strictly ahead of `y`
    #[inline]
    pub fn prefers(&self, x: &ParticipantId, y: &ParticipantId) -> Option<bool> {
        Some(self.rank(x)? < self.rank(y)?)
    }

    /// Everyone ranked strictly below `target`
    pub fn ranked_below(&self, target: &ParticipantId) -> &[ParticipantId] {
        match self.rank(target) {
            Some(index) => &self.order[index + 1..],
            None => &[],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParticipantId> {
        self.order.iter()
    }

    pub fn as_slice(&self) -> &[ParticipantId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn check_against(&self, opposite: &BTreeSet<ParticipantId>) -> Result<(), ListDefect> {
        let mut seen = BTreeSet::new();
        for id in &self.order {
            if !opposite.contains(id) {
                return Err(ListDefect::Unknown(id.clone()));
            }
            if !seen.insert(id) {
                return Err(ListDefect::Duplicate(id.clone()));
            }
        }
        match opposite.iter().find(|id| !seen.contains(id)) {
            Some(missing) => Err(ListDefect::Missing(missing.clone())),
            None => Ok(()),
        }
    }
}

/// One role's preference lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceModel {
    role: Role,
    lists: BTreeMap<ParticipantId, PreferenceList>,
}

impl PreferenceModel {
    /// Build and validate one role's lists against the opposite population
    pub fn from_lists(
        role: Role,
        lists: BTreeMap<ParticipantId, Vec<ParticipantId>>,
        opposite: &BTreeSet<ParticipantId>,
    ) -> Result<Self, MatchingError> {
        let mut validated = BTreeMap::new();
        for (participant, order) in lists {
            let list = PreferenceList::new(order);
            if let Err(defect) = list.check_against(opposite) {
                return Err(MatchingError::MalformedPreferenceList {
                    participant,
                    defect,
                });
            }
            validated.insert(participant, list);
        }

        Ok(Self {
            role,
            lists: validated,
        })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn participants(&self) -> impl Iterator<Item = &ParticipantId> {
        self.lists.keys()
    }

    pub fn contains(&self, participant: &ParticipantId) -> bool {
        self.lists.contains_key(participant)
    }

    pub fn list(&self, participant: &ParticipantId) -> Option<&PreferenceList> {
        self.lists.get(participant)
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Position of `target` in `participant`'s list
    pub fn rank(&self, participant: &ParticipantId, target: &ParticipantId) -> Option<usize> {
        self.lists.get(participant)?.rank(target)
    }

    /// Does `participant` rank `x` ahead of `over`?
    pub fn prefers(
        &self,
        participant: &ParticipantId,
        x: &ParticipantId,
        over: &ParticipantId,
    ) -> Result<bool, MatchingError> {
        let list = self
            .lists
            .get(participant)
            .ok_or_else(|| MatchingError::UnknownParticipant(participant.clone()))?;
        let x_rank = list
            .rank(x)
            .ok_or_else(|| MatchingError::UnknownParticipant(x.clone()))?;
        let over_rank = list
            .rank(over)
            .ok_or_else(|| MatchingError::UnknownParticipant(over.clone()))?;
        Ok(x_rank < over_rank)
    }

    /// Whether `participant`'s list differs from the one in `previous`
    pub fn changed_since(&self, previous: &PreferenceModel, participant: &ParticipantId) -> bool {
        self.list(participant) != previous.list(participant)
    }
}

/// Both roles' lists for one round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceSnapshot {
    men: PreferenceModel,
    women: PreferenceModel,
}

impl PreferenceSnapshot {
    /// Validate and build a snapshot
    ///
    /// Rejects unequal populations, ids that appear in both roles, and any
    /// list that is not a permutation of the opposite role.
    pub fn new(
        men: BTreeMap<ParticipantId, Vec<ParticipantId>>,
        women: BTreeMap<ParticipantId, Vec<ParticipantId>>,
    ) -> Result<Self, MatchingError> {
        if men.len() != women.len() {
            return Err(MatchingError::PopulationMismatch {
                men: men.len(),
                women: women.len(),
            });
        }

        let man_ids: BTreeSet<ParticipantId> = men.keys().cloned().collect();
        let woman_ids: BTreeSet<ParticipantId> = women.keys().cloned().collect();
        if let Some(shared) = man_ids.intersection(&woman_ids).next() {
            return Err(MatchingError::OverlappingRoles(shared.clone()));
        }

        Ok(Self {
            men: PreferenceModel::from_lists(Role::Man, men, &woman_ids)?,
            women: PreferenceModel::from_lists(Role::Woman, women, &man_ids)?,
        })
    }

    pub fn men(&self) -> &PreferenceModel {
        &self.men
    }

    pub fn women(&self) -> &PreferenceModel {
        &self.women
    }

    pub fn model(&self, role: Role) -> &PreferenceModel {
        match role {
            Role::Man => &self.men,
            Role::Woman => &self.women,
        }
    }

    /// Number of participants per role
    pub fn population(&self) -> usize {
        self.men.len()
    }

    pub fn role_of(&self, id: &ParticipantId) -> Option<Role> {
        if self.men.contains(id) {
            Some(Role::Man)
        } else if self.women.contains(id) {
            Some(Role::Woman)
        } else {
            None
        }
    }

    pub fn contains(&self, participant: &Participant) -> bool {
        self.model(participant.role).contains(&participant.id)
    }

    /// The same ids on the same sides
    pub fn same_population(&self, other: &PreferenceSnapshot) -> bool {
        self.men.participants().eq(other.men.participants())
            && self.women.participants().eq(other.women.participants())
    }

    /// Does `participant` rank `x` ahead of `over`?
    pub fn prefers(
        &self,
        participant: &Participant,
        x: &ParticipantId,
        over: &ParticipantId,
    ) -> Result<bool, MatchingError> {
        self.model(participant.role).prefers(&participant.id, x, over)
    }

    /// Ids of every participant, men first
    pub fn all_participants(&self) -> impl Iterator<Item = Participant> + '_ {
        self.men
            .participants()
            .map(|id| Participant::man(id.clone()))
            .chain(self.women.participants().map(|id| Participant::woman(id.clone())))
    }
}
