// Integration tests for Stable Rematch

use stable_rematch::core::{
    blocking_pairs, deferred_acceptance, is_stable, IncrementalUpdater, ListDefect, Matching, MatchingError,
    PreferenceSnapshot, RoundContext, StabilityRepair,
};
use stable_rematch::models::{Participant, ParticipantId, Role};
use std::collections::BTreeMap;

type Lists = BTreeMap<ParticipantId, Vec<ParticipantId>>;

fn lists(raw: &[(&str, [&str; 4])]) -> Lists {
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

fn identity() -> Matching {
    matching(&[("m1", "w1"), ("m2", "w2"), ("m3", "w3"), ("m4", "w4")])
}

/// Every man holds his first choice; w2 would rather have m1
fn reciprocal_women() -> Lists {
    lists(&[
        ("w1", ["m1", "m2", "m3", "m4"]),
        ("w2", ["m1", "m2", "m3", "m4"]),
        ("w3", ["m3", "m4", "m1", "m2"]),
        ("w4", ["m4", "m3", "m1", "m2"]),
    ])
}

fn reciprocal_men() -> Lists {
    lists(&[
        ("m1", ["w1", "w2", "w3", "w4"]),
        ("m2", ["w2", "w1", "w3", "w4"]),
        ("m3", ["w3", "w4", "w1", "w2"]),
        ("m4", ["w4", "w3", "w1", "w2"]),
    ])
}

/// Baseline where a displacement has to travel through two pairs
fn cascade_previous() -> PreferenceSnapshot {
    PreferenceSnapshot::new(
        lists(&[
            ("m1", ["w1", "w2", "w3", "w4"]),
            ("m2", ["w2", "w3", "w1", "w4"]),
            ("m3", ["w3", "w1", "w2", "w4"]),
            ("m4", ["w4", "w1", "w2", "w3"]),
        ]),
        lists(&[
            ("w1", ["m1", "m3", "m2", "m4"]),
            ("w2", ["m1", "m2", "m3", "m4"]),
            ("w3", ["m2", "m3", "m1", "m4"]),
            ("w4", ["m4", "m1", "m2", "m3"]),
        ]),
    )
    .unwrap()
}

fn cascade_current() -> PreferenceSnapshot {
    PreferenceSnapshot::new(
        lists(&[
            ("m1", ["w2", "w1", "w3", "w4"]),
            ("m2", ["w2", "w3", "w1", "w4"]),
            ("m3", ["w3", "w1", "w2", "w4"]),
            ("m4", ["w4", "w1", "w2", "w3"]),
        ]),
        lists(&[
            ("w1", ["m1", "m3", "m2", "m4"]),
            ("w2", ["m1", "m2", "m3", "m4"]),
            ("w3", ["m2", "m3", "m1", "m4"]),
            ("w4", ["m4", "m1", "m2", "m3"]),
        ]),
    )
    .unwrap()
}

#[test]
fn test_unchanged_preferences_keep_matching() {
    let prefs = PreferenceSnapshot::new(reciprocal_men(), reciprocal_women()).unwrap();
    let baseline = identity();

    let outcome = IncrementalUpdater::new()
        .update(&prefs, &prefs, &baseline)
        .unwrap();

    assert_eq!(outcome.matching, baseline);
    assert!(outcome.broken_pairs.is_empty());
}

#[test]
fn test_single_reciprocated_change_breaks_one_pair() {
    let previous = PreferenceSnapshot::new(reciprocal_men(), reciprocal_women()).unwrap();
    let mut men = reciprocal_men();
    men.insert(
        "m1".into(),
        ["w2", "w1", "w3", "w4"].iter().map(|s| ParticipantId::from(*s)).collect(),
    );
    let current = PreferenceSnapshot::new(men, reciprocal_women()).unwrap();

    let outcome = IncrementalUpdater::new()
        .with_stability_check(true)
        .update(&previous, &current, &identity())
        .unwrap();

    assert_eq!(outcome.broken_pairs.len(), 1);
    assert_eq!(outcome.broken_pairs[0].man, ParticipantId::from("m1"));
    assert_eq!(outcome.broken_pairs[0].woman, ParticipantId::from("w1"));
    assert_eq!(outcome.broken_pairs[0].witness, ParticipantId::from("w2"));

    assert_eq!(outcome.matching.len(), 4);
    assert_eq!(
        outcome.matching,
        matching(&[("m1", "w2"), ("m2", "w1"), ("m3", "w3"), ("m4", "w4")])
    );
    assert!(blocking_pairs(&outcome.matching, &current).unwrap().is_empty());
}

#[test]
fn test_cascading_displacement_settles() {
    let previous = cascade_previous();
    let current = cascade_current();
    let baseline = identity();
    assert!(is_stable(&baseline, &previous).unwrap());

    let outcome = IncrementalUpdater::new()
        .update(&previous, &current, &baseline)
        .unwrap();

    assert_eq!(outcome.broken_pairs.len(), 1);
    assert_eq!(
        outcome.matching,
        matching(&[("m1", "w2"), ("m2", "w3"), ("m3", "w1"), ("m4", "w4")])
    );
    assert!(is_stable(&outcome.matching, &current).unwrap());
    assert_eq!(outcome.matching, deferred_acceptance(&current, Role::Man).unwrap());
}

#[test]
fn test_cascade_passes_through_queue() {
    // Replay the repair step by step to see the chain m1 -> m2 -> m3
    let current = cascade_current();
    let mut working = matching(&[("m2", "w2"), ("m3", "w3"), ("m4", "w4")]);
    let mut repair = StabilityRepair::new(&current, &working);

    let report = repair.admit(&mut working, Participant::man("m1")).unwrap();
    assert_eq!(
        report.displaced,
        vec![Participant::man("m2"), Participant::man("m3")]
    );
    assert_eq!(report.unmatched, Some(Participant::man("m3")));

    let report = repair.admit(&mut working, Participant::woman("w1")).unwrap();
    assert!(report.displaced.is_empty());
    assert_eq!(report.unmatched, None);
    assert_eq!(working.woman_of(&"m3".into()), Some(&"w1".into()));
}

#[test]
fn test_malformed_round_leaves_context_untouched() {
    let previous = PreferenceSnapshot::new(reciprocal_men(), reciprocal_women()).unwrap();
    let mut context = RoundContext::new(previous.clone(), identity()).unwrap();

    // w3 lists m1 twice and never m2
    let mut women = reciprocal_women();
    women.insert(
        "w3".into(),
        ["m3", "m4", "m1", "m1"].iter().map(|s| ParticipantId::from(*s)).collect(),
    );
    let err = PreferenceSnapshot::new(reciprocal_men(), women).unwrap_err();
    assert_eq!(
        err,
        MatchingError::MalformedPreferenceList {
            participant: "w3".into(),
            defect: ListDefect::Duplicate("m1".into()),
        }
    );

    // m4 omits w2
    let mut men = reciprocal_men();
    men.insert(
        "m4".into(),
        ["w4", "w3", "w1"].iter().map(|s| ParticipantId::from(*s)).collect(),
    );
    let err = PreferenceSnapshot::new(men, reciprocal_women()).unwrap_err();
    assert!(matches!(
        err,
        MatchingError::MalformedPreferenceList { defect: ListDefect::Missing(_), .. }
    ));

    assert_eq!(context.round, 0);
    assert_eq!(context.matching, identity());
    assert_eq!(context.previous, previous);

    // a well-formed round with a changed population is rejected the same way
    let stranger = PreferenceSnapshot::new(
        BTreeMap::from([(ParticipantId::from("m9"), vec![ParticipantId::from("w9")])]),
        BTreeMap::from([(ParticipantId::from("w9"), vec![ParticipantId::from("m9")])]),
    )
    .unwrap();
    let err = context.advance(stranger, &IncrementalUpdater::new()).unwrap_err();
    assert!(!err.is_fatal());
    assert_eq!(context.round, 0);
    assert_eq!(context.matching, identity());
}

#[test]
fn test_successive_rounds() {
    let mut context = RoundContext::new(cascade_previous(), identity()).unwrap();
    let updater = IncrementalUpdater::new().with_stability_check(true);

    context.advance(cascade_current(), &updater).unwrap();
    assert_eq!(context.round, 1);

    // Reverting the change is just another round
    let outcome = context.advance(cascade_previous(), &updater).unwrap();
    assert_eq!(context.round, 2);
    assert!(is_stable(&outcome.matching, &cascade_previous()).unwrap());
    assert_eq!(context.previous, cascade_previous());
}
