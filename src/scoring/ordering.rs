//! Temperature-controlled candidate ordering.
//!
//! Decides which courses the greedy steps consider first. The sort key
//! blends the preference score with uniform noise:
//!
//! ```text
//! key = score + (1 - r) * (100 if desired else 0) + r * U * 20
//! ```
//!
//! where `r = temperature / 100` and `U ~ Uniform[0, 1)` is drawn per
//! course per call.
//!
//! | Temperature | Behavior |
//! |-------------|----------|
//! | 0 | Deterministic. With desired courses set, only those are kept. |
//! | 1..=99 | Preference-weighted with random perturbation |
//! | 100 | Pure shuffle, no scoring term |

use std::collections::BTreeSet;
use std::sync::Arc;

use super::random::{shuffle, RandomSource};
use super::Scorer;
use crate::models::Course;

/// Bonus key for desired courses at temperature 0.
const DESIRED_BONUS: f64 = 100.0;
/// Noise amplitude at temperature 100.
const NOISE_SPAN: f64 = 20.0;

/// Orders candidate courses by preference and temperature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateOrdering {
    temperature: u8,
    desired: BTreeSet<String>,
}

impl CandidateOrdering {
    /// Temperature is clamped to `0..=100`.
    pub fn new(temperature: u8, desired: BTreeSet<String>) -> Self {
        Self {
            temperature: temperature.min(100),
            desired,
        }
    }

    pub fn temperature(&self) -> u8 {
        self.temperature
    }

    /// Temperature as a ratio in `[0, 1]`.
    pub fn ratio(&self) -> f64 {
        f64::from(self.temperature) / 100.0
    }

    /// Whether ordering consumes no randomness.
    pub fn is_deterministic(&self) -> bool {
        self.temperature == 0
    }

    /// Orders courses for greedy consideration, best first.
    ///
    /// Equal keys keep input order.
    pub fn prepare<R: RandomSource + ?Sized>(
        &self,
        mut courses: Vec<Arc<Course>>,
        scorer: &Scorer,
        rng: &mut R,
    ) -> Vec<Arc<Course>> {
        if self.temperature == 0 && !self.desired.is_empty() {
            courses.retain(|c| self.desired.contains(c.id()));
        }
        if self.temperature == 100 {
            shuffle(&mut courses, rng);
            return courses;
        }

        let ratio = self.ratio();
        let mut keyed: Vec<(f64, Arc<Course>)> = courses
            .into_iter()
            .map(|course| {
                let preference = if self.desired.contains(course.id()) {
                    DESIRED_BONUS
                } else {
                    0.0
                };
                let noise = if ratio > 0.0 {
                    ratio * rng.next_unit() * NOISE_SPAN
                } else {
                    0.0
                };
                let key = f64::from(scorer.score(&course)) + (1.0 - ratio) * preference + noise;
                (key, course)
            })
            .collect();

        keyed.sort_by(|a, b| b.0.total_cmp(&a.0));
        keyed.into_iter().map(|(_, course)| course).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::random::{FixedSequence, StdRandom};
    use crate::scoring::ScorePolicy;

    fn courses() -> Vec<Arc<Course>> {
        ["ART100", "CS200", "MAT100", "CS300"]
            .into_iter()
            .map(|id| Arc::new(Course::new(id)))
            .collect()
    }

    fn ids(list: &[Arc<Course>]) -> Vec<&str> {
        list.iter().map(|c| c.id()).collect()
    }

    fn scorer() -> Scorer {
        Scorer::new(ScorePolicy::new().with_priority_subjects(["CS"]))
    }

    #[test]
    fn test_zero_temperature_sorts_by_score_stably() {
        let ordering = CandidateOrdering::new(0, BTreeSet::new());
        let mut rng = FixedSequence::zeros();
        let ordered = ordering.prepare(courses(), &scorer(), &mut rng);
        assert_eq!(ids(&ordered), vec!["CS200", "CS300", "ART100", "MAT100"]);
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn test_zero_temperature_restricts_to_desired() {
        let desired: BTreeSet<String> = ["MAT100".to_string(), "ART100".to_string()].into();
        let ordering = CandidateOrdering::new(0, desired);
        let ordered = ordering.prepare(courses(), &scorer(), &mut FixedSequence::zeros());
        assert_eq!(ids(&ordered), vec!["ART100", "MAT100"]);
    }

    #[test]
    fn test_desired_bonus_at_mid_temperature() {
        let desired: BTreeSet<String> = ["MAT100".to_string()].into();
        let ordering = CandidateOrdering::new(50, desired);
        let ordered = ordering.prepare(courses(), &scorer(), &mut FixedSequence::zeros());
        // 1 + 0.5 * 100 beats 11 for the prioritized subject.
        assert_eq!(ordered[0].id(), "MAT100");
        assert_eq!(ordered.len(), 4);
    }

    #[test]
    fn test_noise_can_reorder() {
        let ordering = CandidateOrdering::new(99, BTreeSet::new());
        // ART100, CS200, MAT100, CS300 draw 0.9, 0.0, 0.0, 0.0
        let mut rng = FixedSequence::new([0.9, 0.0, 0.0, 0.0]);
        let ordered = ordering.prepare(courses(), &scorer(), &mut rng);
        // ART100: 1 + 0.99 * 0.9 * 20 = 18.82 > CS200 11
        assert_eq!(ordered[0].id(), "ART100");
    }

    #[test]
    fn test_full_temperature_shuffles_everything() {
        let desired: BTreeSet<String> = ["MAT100".to_string()].into();
        let ordering = CandidateOrdering::new(100, desired);
        let mut rng = StdRandom::seeded(3);
        let ordered = ordering.prepare(courses(), &scorer(), &mut rng);
        let mut sorted = ids(&ordered);
        sorted.sort();
        assert_eq!(sorted, vec!["ART100", "CS200", "CS300", "MAT100"]);
    }

    #[test]
    fn test_temperature_clamped() {
        assert_eq!(CandidateOrdering::new(250, BTreeSet::new()).temperature(), 100);
    }
}
