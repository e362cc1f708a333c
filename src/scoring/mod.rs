//! Preference scoring and candidate ordering.
//!
//! Scores courses against the student's subject and level priorities,
//! orders candidates under a temperature knob, and scores whole slot
//! patterns by the conflict-free subset of their courses.
//!
//! # Course Score
//!
//! | Condition | Points |
//! |-----------|--------|
//! | Base | 1 |
//! | Subject is prioritized | +10 |
//! | Level equals the subject's target level | +5 |
//! | Level within 100 of the target (not equal) | +2 |
//!
//! # Usage
//!
//! ```
//! use u_timetable::models::Course;
//! use u_timetable::scoring::{ScorePolicy, Scorer};
//!
//! let scorer = Scorer::new(
//!     ScorePolicy::new()
//!         .with_priority_subjects(["CS"])
//!         .with_level_priority("CS", 200),
//! );
//! assert_eq!(scorer.score(&Course::new("CS201")), 16);
//! assert_eq!(scorer.score(&Course::new("CS101")), 13);
//! assert_eq!(scorer.score(&Course::new("ART100")), 1);
//! ```

mod ordering;
mod patterns;
pub mod random;

pub use ordering::CandidateOrdering;
pub use patterns::{PatternScorer, ScoredPattern};
pub use random::{FixedSequence, RandomSource, StdRandom};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::models::Course;

const BASE_SCORE: i32 = 1;
const PRIORITY_SUBJECT_BONUS: i32 = 10;
const EXACT_LEVEL_BONUS: i32 = 5;
const NEAR_LEVEL_BONUS: i32 = 2;
const NEAR_LEVEL_DISTANCE: u32 = 100;

/// Subject and level preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorePolicy {
    /// Subjects earning the priority bonus.
    pub priority_subjects: BTreeSet<String>,
    /// Target level per subject.
    pub level_priorities: BTreeMap<String, u32>,
}

impl ScorePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_priority_subjects<I, S>(mut self, subjects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.priority_subjects
            .extend(subjects.into_iter().map(Into::into));
        self
    }

    pub fn with_level_priority(mut self, subject: impl Into<String>, level: u32) -> Self {
        self.level_priorities.insert(subject.into(), level);
        self
    }
}

/// Deterministic course scorer.
#[derive(Debug, Clone, Default)]
pub struct Scorer {
    policy: ScorePolicy,
}

impl Scorer {
    pub fn new(policy: ScorePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ScorePolicy {
        &self.policy
    }

    /// Preference score of a course.
    pub fn score(&self, course: &Course) -> i32 {
        let mut score = BASE_SCORE;
        if self.policy.priority_subjects.contains(course.subject()) {
            score += PRIORITY_SUBJECT_BONUS;
        }
        if let Some(&target) = self.policy.level_priorities.get(course.subject()) {
            if course.level() == target {
                score += EXACT_LEVEL_BONUS;
            } else if course.level().abs_diff(target) <= NEAR_LEVEL_DISTANCE {
                score += NEAR_LEVEL_BONUS;
            }
        }
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_score() {
        let scorer = Scorer::default();
        assert_eq!(scorer.score(&Course::new("ANY100")), 1);
    }

    #[test]
    fn test_priority_and_levels() {
        let scorer = Scorer::new(
            ScorePolicy::new()
                .with_priority_subjects(["PHY"])
                .with_level_priority("PHY", 200)
                .with_level_priority("MAT", 300),
        );
        assert_eq!(scorer.score(&Course::new("PHY261")), 16);
        assert_eq!(scorer.score(&Course::new("PHY110")), 13);
        assert_eq!(scorer.score(&Course::new("PHY301")), 13);
        assert_eq!(scorer.score(&Course::new("PHY401")), 11);
        assert_eq!(scorer.score(&Course::new("MAT300")), 6);
        assert_eq!(scorer.score(&Course::new("MAT100")), 1);
    }

    #[test]
    fn test_score_is_deterministic() {
        let scorer = Scorer::new(ScorePolicy::new().with_priority_subjects(["GEC"]));
        let course = Course::new("GEC101");
        assert_eq!(scorer.score(&course), scorer.score(&course));
    }
}
