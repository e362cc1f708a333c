//! Greedy timetable construction.
//!
//! # Algorithm
//!
//! **Initial timetable**: start from the mandatory courses, then take the
//! pattern's resolved courses in scored order, accepting each one that
//! keeps total credits within `max_credits` and adds no conflict.
//!
//! **Credit fill** (two passes):
//!
//! 1. *Strict*: every valid course not yet included, ordered by
//!    [`CandidateOrdering`]. Courses meeting on an off day or in an
//!    unavailable slot are skipped; the rest are accepted when they fit
//!    the budget and add no conflict. Each time the total lands inside
//!    `[min_credits, max_credits]` the timetable is snapshotted as a
//!    variation (the starting point counts too).
//! 2. *Relaxed*: runs only when the strict pass produced no variation.
//!    Continues from the strict pass's final timetable, ignoring
//!    unavailable slots. Off days stay hard.
//!
//! # Complexity
//! O(n * k) per pass where n = catalog size, k = timetable size.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Catalog, ConstraintSet, Course, Timetable};
use crate::scoring::{CandidateOrdering, RandomSource, ScoredPattern, Scorer};

/// When the credit fill stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillMode {
    /// Run each pass to the end of its candidate list, snapshotting every
    /// in-band state.
    #[default]
    CollectVariations,
    /// Return at the first in-band snapshot.
    FirstSatisfying,
}

/// Result of [`CandidateBuilder::fill_remaining_credits`].
#[derive(Debug, Clone)]
pub struct FillOutcome {
    /// In-band snapshots, in the order they were produced.
    pub variations: Vec<Timetable>,
    /// State after the last pass (possibly under-filled).
    pub final_timetable: Timetable,
    /// Whether the variations came from the relaxed pass.
    pub relaxed: bool,
}

impl FillOutcome {
    /// Whether any snapshot reached the credit band.
    pub fn is_satisfied(&self) -> bool {
        !self.variations.is_empty()
    }
}

/// Builds timetables for one run's catalog and constraints.
#[derive(Debug, Clone, Copy)]
pub struct CandidateBuilder<'a> {
    catalog: &'a Catalog,
    constraints: &'a ConstraintSet,
    scorer: &'a Scorer,
    ordering: &'a CandidateOrdering,
    mode: FillMode,
}

impl<'a> CandidateBuilder<'a> {
    pub fn new(
        catalog: &'a Catalog,
        constraints: &'a ConstraintSet,
        scorer: &'a Scorer,
        ordering: &'a CandidateOrdering,
    ) -> Self {
        Self {
            catalog,
            constraints,
            scorer,
            ordering,
            mode: FillMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: FillMode) -> Self {
        self.mode = mode;
        self
    }

    /// Mandatory courses plus the pattern courses that fit.
    pub fn build_initial_timetable(
        &self,
        mandatory: &[Arc<Course>],
        pattern: &ScoredPattern,
    ) -> Timetable {
        let mut timetable = Timetable::from_courses(mandatory.to_vec());
        let mut credits = timetable.total_credits();
        for course in &pattern.courses {
            if timetable.contains(course.id()) {
                continue;
            }
            let Some(total) = self.constraints.within_budget(credits, course.credits) else {
                continue;
            };
            if timetable.conflicts_with(course) {
                continue;
            }
            credits = total;
            timetable.push(Arc::clone(course));
        }
        timetable
    }

    /// Extends a timetable toward the credit band.
    pub fn fill_remaining_credits<R: RandomSource + ?Sized>(
        &self,
        start: Timetable,
        rng: &mut R,
    ) -> FillOutcome {
        let mut variations = Vec::new();
        let strict = self.fill_pass(start, false, &mut variations, rng);
        if !variations.is_empty() {
            return FillOutcome {
                variations,
                final_timetable: strict,
                relaxed: false,
            };
        }

        debug!(
            credits = strict.total_credits(),
            min = self.constraints.min_credits,
            "strict fill fell short, relaxing unavailable slots"
        );
        let relaxed = self.fill_pass(strict, true, &mut variations, rng);
        let satisfied = !variations.is_empty();
        FillOutcome {
            variations,
            final_timetable: relaxed,
            relaxed: satisfied,
        }
    }

    fn fill_pass<R: RandomSource + ?Sized>(
        &self,
        mut timetable: Timetable,
        ignore_unavailable: bool,
        variations: &mut Vec<Timetable>,
        rng: &mut R,
    ) -> Timetable {
        let mut credits = timetable.total_credits();
        if self.constraints.credits_in_band(credits) {
            variations.push(timetable.clone());
            if self.mode == FillMode::FirstSatisfying {
                return timetable;
            }
        }

        let candidates = self.ordering.prepare(self.open_courses(&timetable), self.scorer, rng);

        for course in candidates {
            if !self
                .constraints
                .slots_allowed(course.occupied(), ignore_unavailable)
            {
                continue;
            }
            let Some(total) = self.constraints.within_budget(credits, course.credits) else {
                continue;
            };
            if timetable.conflicts_with(&course) {
                continue;
            }
            credits = total;
            timetable.push(course);
            if self.constraints.credits_in_band(credits) {
                variations.push(timetable.clone());
                if self.mode == FillMode::FirstSatisfying {
                    break;
                }
            }
        }
        timetable
    }

    /// Valid catalog courses not yet in `timetable`, in catalog order.
    fn open_courses(&self, timetable: &Timetable) -> Vec<Arc<Course>> {
        let included: HashSet<&str> = timetable.course_ids().into_iter().collect();
        self.catalog
            .iter()
            .filter(|c| !included.contains(c.id()) && self.constraints.is_valid(c))
            .cloned()
            .collect()
    }
}
