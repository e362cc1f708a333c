//! Pattern scoring.
//!
//! # Algorithm
//!
//! 1. Resolve each course id of the pattern against the catalog,
//!    skipping ids that are unknown or fail the validity filter.
//! 2. Order the survivors with [`CandidateOrdering::prepare`].
//! 3. Greedily accept each course that shares no slot with an already
//!    accepted one.
//! 4. The pattern score is the sum of the accepted courses' scores.
//!
//! Patterns are scored independently; the only shared state is the
//! random source.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use super::{CandidateOrdering, RandomSource, Scorer};
use crate::models::{Catalog, ConstraintSet, Course, Pattern, Slot};

/// A pattern with its greedily resolved, conflict-free course list.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPattern {
    /// Pattern key.
    pub key: String,
    /// Parsed slot set of the pattern.
    pub slots: BTreeSet<Slot>,
    /// Sum of the accepted courses' scores.
    pub score: i32,
    /// Accepted courses, in acceptance order.
    pub courses: Vec<Arc<Course>>,
    /// Pattern course ids absent from the catalog.
    pub unknown_ids: Vec<String>,
}

/// Scores patterns against a catalog and constraint set.
#[derive(Debug, Clone, Copy)]
pub struct PatternScorer<'a> {
    catalog: &'a Catalog,
    constraints: &'a ConstraintSet,
    scorer: &'a Scorer,
    ordering: &'a CandidateOrdering,
}

impl<'a> PatternScorer<'a> {
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
        }
    }

    /// Scores one pattern.
    pub fn score<R: RandomSource + ?Sized>(&self, pattern: &Pattern, rng: &mut R) -> ScoredPattern {
        let mut unknown_ids = Vec::new();
        let mut candidates: Vec<Arc<Course>> = Vec::with_capacity(pattern.course_ids.len());
        for id in &pattern.course_ids {
            match self.catalog.get(id) {
                None => unknown_ids.push(id.clone()),
                Some(course) if self.constraints.is_valid(course) => {
                    candidates.push(Arc::clone(course))
                }
                Some(_) => {}
            }
        }
        if !unknown_ids.is_empty() {
            debug!(
                pattern = %pattern.key,
                unknown = unknown_ids.len(),
                "skipping unknown course ids"
            );
        }

        let ordered = self.ordering.prepare(candidates, self.scorer, rng);

        let mut accepted: Vec<Arc<Course>> = Vec::new();
        for course in ordered {
            let duplicate = accepted.iter().any(|c| c.id() == course.id());
            if duplicate || accepted.iter().any(|c| c.conflicts_with(&course)) {
                continue;
            }
            accepted.push(course);
        }

        let score = accepted.iter().map(|c| self.scorer.score(c)).sum();
        ScoredPattern {
            key: pattern.key.clone(),
            slots: pattern.slot_set(),
            score,
            courses: accepted,
            unknown_ids,
        }
    }

    /// Scores every pattern, in library order.
    pub fn score_all<'p, R: RandomSource + ?Sized>(
        &self,
        patterns: impl IntoIterator<Item = &'p Pattern>,
        rng: &mut R,
    ) -> Vec<ScoredPattern> {
        patterns
            .into_iter()
            .map(|pattern| self.score(pattern, rng))
            .collect()
    }
}
