use std::time::Instant;

use tracing::{debug, error, info};

use crate::core::detector::BlockingPairDetector;
use crate::core::error::MatchingError;
use crate::core::matching::Matching;
use crate::core::preferences::PreferenceSnapshot;
use crate::core::repair::StabilityRepair;
use crate::core::stability::blocking_pairs;
use crate::models::BrokenPair;

/// Result of one round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundOutcome {
    pub matching: Matching,
    pub broken_pairs: Vec<BrokenPair>,
    /// Proposals made during repair, across all admissions
    pub proposals: usize,
}

/// Runs detection then repair for one round of preference changes
///
/// # Round
/// 1. Validate the current snapshot and the carried-forward matching
/// 2. Detect pairs broken by the change
/// 3. Dissolve them in a working copy
/// 4. Re-admit the freed members, man then woman per pair, in discovery order
#[derive(Debug, Clone, Default)]
pub struct IncrementalUpdater {
    max_population: Option<usize>,
    verify_stability: bool,
}

impl IncrementalUpdater {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_population(mut self, limit: usize) -> Self {
        self.max_population = Some(limit);
        self
    }

    pub fn max_population(&self) -> Option<usize> {
        self.max_population
    }

    /// Re-check the repaired matching with a full blocking-pair scan
    pub fn with_stability_check(mut self, enabled: bool) -> Self {
        self.verify_stability = enabled;
        self
    }

    /// Validate a snapshot against the configured limits
    pub fn admit_population(&self, preferences: &PreferenceSnapshot) -> Result<(), MatchingError> {
        match self.max_population {
            Some(limit) if preferences.population() > limit => Err(MatchingError::PopulationTooLarge {
                size: preferences.population(),
                limit,
            }),
            _ => Ok(()),
        }
    }

    /// Repair `matching`, stable under `previous`, for `current`
    ///
    /// `matching` is never modified; on error nothing carries forward.
    pub fn update(
        &self,
        previous: &PreferenceSnapshot,
        current: &PreferenceSnapshot,
        matching: &Matching,
    ) -> Result<RoundOutcome, MatchingError> {
        let started = Instant::now();

        self.admit_population(current)?;
        if !current.same_population(previous) {
            return Err(MatchingError::PopulationChanged);
        }
        matching.validate_against(current)?;

        let broken_pairs = BlockingPairDetector::new(previous, current).detect(matching)?;
        if broken_pairs.is_empty() {
            debug!("No pairs broken, matching carried forward unchanged");
            return Ok(RoundOutcome {
                matching: matching.clone(),
                broken_pairs,
                proposals: 0,
            });
        }

        let mut working = matching.clone();
        for pair in &broken_pairs {
            let [man, _] = pair.members();
            working.remove(&man).ok_or_else(|| {
                MatchingError::Inconsistent(format!("broken pair ({}, {}) already dissolved", pair.man, pair.woman))
            })?;
        }

        let mut repair = StabilityRepair::new(current, &working);
        let mut proposals = 0;
        for pair in &broken_pairs {
            for member in pair.members() {
                let report = repair.admit(&mut working, member)?;
                proposals += report.proposals;
            }
        }

        if working.len() != current.population() {
            return Err(MatchingError::Inconsistent(format!(
                "repair left {} of {} pairs",
                working.len(),
                current.population()
            )));
        }

        if self.verify_stability {
            let blocking = blocking_pairs(&working, current)?;
            if let Some((man, woman)) = blocking.first() {
                error!("Repaired matching is unstable: {} blocking pairs", blocking.len());
                return Err(MatchingError::Inconsistent(format!(
                    "repaired matching blocked by ({}, {})",
                    man, woman
                )));
            }
        }

        info!(
            "Round repaired: {} broken pairs, {} proposals in {:?}",
            broken_pairs.len(),
            proposals,
            started.elapsed()
        );

        Ok(RoundOutcome {
            matching: working,
            broken_pairs,
            proposals,
        })
    }
}

/// State carried between rounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundContext {
    pub previous: PreferenceSnapshot,
    pub matching: Matching,
    pub round: u64,
}

impl RoundContext {
    /// Start from a baseline supplied by the caller
    ///
    /// Detection only sees instability introduced by a change, so the
    /// baseline must be a complete matching that is stable under `previous`.
    pub fn new(previous: PreferenceSnapshot, matching: Matching) -> Result<Self, MatchingError> {
        matching.validate_against(&previous)?;
        if let Some((man, woman)) = blocking_pairs(&matching, &previous)?.into_iter().next() {
            return Err(MatchingError::UnstableBaseline { man, woman });
        }
        Ok(Self {
            previous,
            matching,
            round: 0,
        })
    }

    /// Run one round; only a successful round replaces the baseline
    pub fn advance(
        &mut self,
        current: PreferenceSnapshot,
        updater: &IncrementalUpdater,
    ) -> Result<RoundOutcome, MatchingError> {
        let outcome = updater.update(&self.previous, &current, &self.matching)?;

        self.matching = outcome.matching.clone();
        self.previous = current;
        self.round += 1;

        Ok(outcome)
    }
}
