//! Pattern eligibility, ranking, and result deduplication.
//!
//! # Eligibility
//!
//! A pattern is eligible iff none of its slots
//! - falls on an off day,
//! - is an unavailable slot (skipped under [`PatternRelaxation::MirrorFill`]
//!   when nothing is eligible strictly),
//! - is occupied by a mandatory course.
//!
//! Eligible patterns are ranked by descending score; ties keep library
//! order. Every eligible pattern is carried forward; the candidate cap is
//! applied by [`SignatureFilter`] after deduplication.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::{ConstraintSet, DisplayWindow, Slot, Timetable};
use crate::scoring::ScoredPattern;

/// Whether pattern eligibility may relax unavailable slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternRelaxation {
    /// Unavailable slots always disqualify a pattern.
    #[default]
    Strict,
    /// When no pattern is eligible, retry ignoring unavailable slots,
    /// as the credit fill does.
    MirrorFill,
}

/// Ranked eligible patterns.
#[derive(Debug, Clone)]
pub struct PatternSelection {
    pub patterns: Vec<ScoredPattern>,
    /// Whether eligibility ignored unavailable slots.
    pub relaxed: bool,
}

/// Whether a pattern's slots pass the eligibility rules.
pub fn is_eligible(
    slots: &BTreeSet<Slot>,
    constraints: &ConstraintSet,
    mandatory_slots: &BTreeSet<Slot>,
    ignore_unavailable: bool,
) -> bool {
    constraints.slots_allowed(slots, ignore_unavailable) && slots.is_disjoint(mandatory_slots)
}

/// Filters and ranks scored patterns.
pub fn select_patterns(
    scored: Vec<ScoredPattern>,
    constraints: &ConstraintSet,
    mandatory_slots: &BTreeSet<Slot>,
    relaxation: PatternRelaxation,
) -> PatternSelection {
    let total = scored.len();
    let (mut eligible, rest): (Vec<ScoredPattern>, Vec<ScoredPattern>) = scored
        .into_iter()
        .partition(|p| is_eligible(&p.slots, constraints, mandatory_slots, false));

    let mut relaxed = false;
    if eligible.is_empty() && relaxation == PatternRelaxation::MirrorFill {
        eligible = rest
            .into_iter()
            .filter(|p| is_eligible(&p.slots, constraints, mandatory_slots, true))
            .collect();
        relaxed = !eligible.is_empty();
        if relaxed {
            info!(
                count = eligible.len(),
                "no pattern eligible strictly, relaxed unavailable slots"
            );
        }
    }

    eligible.sort_by(|a, b| b.score.cmp(&a.score));
    info!(total, eligible = eligible.len(), "selected patterns");
    PatternSelection {
        patterns: eligible,
        relaxed,
    }
}

/// Accepts timetables with unseen visual signatures, up to a limit.
#[derive(Debug, Clone)]
pub struct SignatureFilter {
    window: DisplayWindow,
    limit: usize,
    seen: HashSet<BTreeSet<Slot>>,
}

impl SignatureFilter {
    pub fn new(window: DisplayWindow, limit: usize) -> Self {
        Self {
            window,
            limit,
            seen: HashSet::new(),
        }
    }

    /// Records the timetable's signature; `false` if already seen or full.
    pub fn admit(&mut self, timetable: &Timetable) -> bool {
        if self.is_full() {
            return false;
        }
        let signature = timetable.visual_signature(&self.window);
        if self.seen.insert(signature) {
            true
        } else {
            debug!(courses = ?timetable.course_ids(), "dropping duplicate signature");
            false
        }
    }

    pub fn accepted(&self) -> usize {
        self.seen.len()
    }

    pub fn is_full(&self) -> bool {
        self.seen.len() >= self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Course, Weekday};
    use std::sync::Arc;

    fn scored(key: &str, score: i32, slots: &[(Weekday, u8)]) -> ScoredPattern {
        ScoredPattern {
            key: key.into(),
            slots: slots.iter().map(|&(d, p)| Slot::new(d, p)).collect(),
            score,
            courses: Vec::new(),
            unknown_ids: Vec::new(),
        }
    }

    #[test]
    fn test_eligibility_rules() {
        let constraints = ConstraintSet::new(0, 10)
            .with_off_days([Weekday::Friday])
            .with_unavailable([Slot::new(Weekday::Monday, 1)]);
        let mandatory: BTreeSet<Slot> = [Slot::new(Weekday::Tuesday, 2)].into();

        let patterns = vec![
            scored("ok", 1, &[(Weekday::Wednesday, 1)]),
            scored("off", 9, &[(Weekday::Friday, 1)]),
            scored("unavailable", 9, &[(Weekday::Monday, 1)]),
            scored("mandatory", 9, &[(Weekday::Tuesday, 2)]),
        ];
        let selection =
            select_patterns(patterns, &constraints, &mandatory, PatternRelaxation::Strict);
        let keys: Vec<&str> = selection.patterns.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["ok"]);
        assert!(!selection.relaxed);
    }

    #[test]
    fn test_stable_descending_sort() {
        let constraints = ConstraintSet::new(0, 10);
        let patterns = vec![
            scored("a", 3, &[]),
            scored("b", 5, &[]),
            scored("c", 3, &[]),
            scored("d", 5, &[]),
        ];
        let selection = select_patterns(
            patterns,
            &constraints,
            &BTreeSet::new(),
            PatternRelaxation::Strict,
        );
        let keys: Vec<&str> = selection.patterns.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_mirror_fill_relaxation() {
        let constraints = ConstraintSet::new(0, 10)
            .with_off_days([Weekday::Friday])
            .with_unavailable([Slot::new(Weekday::Monday, 1)]);
        let patterns = || {
            vec![
                scored("unavailable", 2, &[(Weekday::Monday, 1)]),
                scored("off", 5, &[(Weekday::Friday, 1)]),
            ]
        };

        let strict = select_patterns(
            patterns(),
            &constraints,
            &BTreeSet::new(),
            PatternRelaxation::Strict,
        );
        assert!(strict.patterns.is_empty());

        let mirrored = select_patterns(
            patterns(),
            &constraints,
            &BTreeSet::new(),
            PatternRelaxation::MirrorFill,
        );
        assert!(mirrored.relaxed);
        assert_eq!(mirrored.patterns.len(), 1);
        assert_eq!(mirrored.patterns[0].key, "unavailable");
    }

    #[test]
    fn test_signature_filter() {
        let a = Timetable::from_courses(vec![Arc::new(Course::new("A100").with_schedule("1/M"))]);
        let b = Timetable::from_courses(vec![Arc::new(Course::new("B100").with_schedule("1/M"))]);
        let c = Timetable::from_courses(vec![Arc::new(Course::new("C100").with_schedule("2/M"))]);

        let mut filter = SignatureFilter::new(DisplayWindow::default(), 2);
        assert!(filter.admit(&a));
        assert!(!filter.admit(&b));
        assert!(filter.admit(&c));
        assert!(filter.is_full());
        assert_eq!(filter.accepted(), 2);
    }
}
