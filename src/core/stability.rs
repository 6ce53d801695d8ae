use crate::core::error::MatchingError;
use crate::core::matching::Matching;
use crate::core::preferences::PreferenceSnapshot;
use crate::models::{Participant, ParticipantId};

/// Every (man, woman) pair that blocks `matching` under `preferences`
///
/// Brute force over all men and the women each ranks above his partner.
/// Unmatched participants prefer anyone to being alone.
pub fn blocking_pairs(
    matching: &Matching,
    preferences: &PreferenceSnapshot,
) -> Result<Vec<(ParticipantId, ParticipantId)>, MatchingError> {
    let mut blocking = Vec::new();

    for man in preferences.men().participants() {
        let list = preferences
            .men()
            .list(man)
            .ok_or_else(|| MatchingError::UnknownParticipant(man.clone()))?;
        let partner = matching.woman_of(man);

        for woman in list.iter() {
            if Some(woman) == partner {
                break;
            }

            let woman_prefers_him = match matching.man_of(woman) {
                Some(husband) => preferences.prefers(&Participant::woman(woman.clone()), man, husband)?,
                None => true,
            };
            if woman_prefers_him {
                blocking.push((man.clone(), woman.clone()));
            }
        }
    }

    Ok(blocking)
}

pub fn is_stable(matching: &Matching, preferences: &PreferenceSnapshot) -> Result<bool, MatchingError> {
    Ok(blocking_pairs(matching, preferences)?.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn lists(raw: &[(&str, &[&str])]) -> BTreeMap<ParticipantId, Vec<ParticipantId>> {
        raw.iter()
            .map(|(k, v)| {
                let order: Vec<ParticipantId> = v.iter().map(|s| ParticipantId::from(*s)).collect();
                (ParticipantId::from(*k), order)
            })
            .collect()
    }

    fn matching(pairs: &[(&str, &str)]) -> Matching {
        let map = pairs
            .iter()
            .map(|(m, w)| (ParticipantId::from(*m), ParticipantId::from(*w)))
            .collect();
        Matching::from_map(map).unwrap()
    }

    fn snapshot() -> PreferenceSnapshot {
        PreferenceSnapshot::new(
            lists(&[("m1", &["w1", "w2"]), ("m2", &["w1", "w2"])]),
            lists(&[("w1", &["m2", "m1"]), ("w2", &["m2", "m1"])]),
        )
        .unwrap()
    }

    #[test]
    fn test_stable_matching_has_no_blocking_pairs() {
        let prefs = snapshot();

        assert!(is_stable(&matching(&[("m1", "w2"), ("m2", "w1")]), &prefs).unwrap());
    }

    #[test]
    fn test_blocking_pair_reported() {
        let prefs = snapshot();

        let blocking = blocking_pairs(&matching(&[("m1", "w1"), ("m2", "w2")]), &prefs).unwrap();

        assert_eq!(blocking, vec![("m2".into(), "w1".into())]);
    }

    #[test]
    fn test_unmatched_woman_blocks() {
        let prefs = snapshot();

        let blocking = blocking_pairs(&matching(&[("m2", "w1")]), &prefs).unwrap();

        assert_eq!(blocking, vec![("m1".into(), "w2".into())]);
    }
}
