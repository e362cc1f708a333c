//! Timetable search.
//!
//! Scores patterns, ranks the eligible ones, grows each into timetables
//! with a greedy credit fill, and keeps the visually distinct results.
//!
//! # Algorithm
//!
//! 1. Resolve the mandatory courses; an infeasible mandatory set aborts.
//! 2. Score every pattern ([`PatternScorer`]).
//! 3. Keep eligible patterns, highest score first ([`select_patterns`]).
//! 4. For each pattern: mandatory + pattern courses, then the two-pass
//!    credit fill ([`CandidateBuilder`]).
//! 5. Emit each in-band variation whose visual signature is new, until
//!    `max_candidates` are collected ([`SignatureFilter`]).
//!
//! The search is a heuristic. It does not guarantee an optimal timetable.
//!
//! # Reference
//! Schaerf (1999), "A Survey of Automated Timetabling", Sec. 3: Course Timetabling

mod alternatives;
mod builder;
mod edit;
mod selection;
mod summary;

pub use alternatives::{AlternativeFinder, AlternativeReport, SwapOption};
pub use builder::{CandidateBuilder, FillMode, FillOutcome};
pub use edit::{EditAction, TimetableEditor};
pub use selection::{
    is_eligible, select_patterns, PatternRelaxation, PatternSelection, SignatureFilter,
};
pub use summary::{TimetableGrid, TimetableSummary};

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::SolveError;
use crate::models::{Catalog, ConstraintSet, DisplayWindow, PatternLibrary, Slot, Timetable};
use crate::scoring::{CandidateOrdering, PatternScorer, RandomSource, ScorePolicy, Scorer};

/// Upper bound on `max_candidates`.
pub const MAX_CANDIDATES_LIMIT: usize = 10;

/// Search knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSettings {
    pub scoring: ScorePolicy,
    /// 0 (preference only) to 100 (pure shuffle).
    pub temperature: u8,
    /// Number of distinct candidates to return, 1..=10.
    pub max_candidates: usize,
    pub pattern_relaxation: PatternRelaxation,
    pub display_window: DisplayWindow,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            scoring: ScorePolicy::default(),
            temperature: 50,
            max_candidates: MAX_CANDIDATES_LIMIT,
            pattern_relaxation: PatternRelaxation::default(),
            display_window: DisplayWindow::default(),
        }
    }
}

impl SearchSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scoring(mut self, scoring: ScorePolicy) -> Self {
        self.scoring = scoring;
        self
    }

    /// Clamped to `0..=100`.
    pub fn with_temperature(mut self, temperature: u8) -> Self {
        self.temperature = temperature.min(100);
        self
    }

    /// Clamped to `1..=10`.
    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates.clamp(1, MAX_CANDIDATES_LIMIT);
        self
    }

    pub fn with_pattern_relaxation(mut self, relaxation: PatternRelaxation) -> Self {
        self.pattern_relaxation = relaxation;
        self
    }

    pub fn with_display_window(mut self, window: DisplayWindow) -> Self {
        self.display_window = window;
        self
    }
}

/// One ranked search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimetableCandidate {
    /// Key of the pattern the timetable grew from.
    pub pattern_key: String,
    pub pattern_score: i32,
    pub timetable: Timetable,
    /// Whether unavailable slots were relaxed to reach the credit band.
    pub relaxed: bool,
}

impl TimetableCandidate {
    pub fn total_credits(&self) -> u32 {
        self.timetable.total_credits()
    }
}

/// Pattern-based timetable solver.
///
/// # Example
///
/// ```
/// use u_timetable::models::{Catalog, ConstraintSet, Course, PatternLibrary};
/// use u_timetable::scheduler::{SearchSettings, TimetableSolver};
/// use u_timetable::scoring::FixedSequence;
///
/// let catalog = Catalog::new(vec![
///     Course::new("A100").with_schedule("1/M").with_credits(2),
///     Course::new("B100").with_schedule("1/M").with_credits(2),
///     Course::new("C100").with_schedule("1/TU").with_credits(3),
/// ]);
/// let patterns = PatternLibrary::discover(&catalog);
/// let solver = TimetableSolver::new(
///     ConstraintSet::new(3, 5),
///     SearchSettings::new().with_temperature(0),
/// );
///
/// let candidates = solver
///     .solve(&catalog, &patterns, &mut FixedSequence::zeros())
///     .unwrap();
/// assert_eq!(candidates[0].total_credits(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct TimetableSolver {
    constraints: ConstraintSet,
    settings: SearchSettings,
    scorer: Scorer,
    ordering: CandidateOrdering,
}

impl TimetableSolver {
    /// Builds a solver. Out-of-range settings are clamped as by the `with_*` setters.
    pub fn new(constraints: ConstraintSet, mut settings: SearchSettings) -> Self {
        settings.temperature = settings.temperature.min(100);
        settings.max_candidates = settings.max_candidates.clamp(1, MAX_CANDIDATES_LIMIT);
        let scorer = Scorer::new(settings.scoring.clone());
        let ordering =
            CandidateOrdering::new(settings.temperature, constraints.desired_course_ids.clone());
        Self {
            constraints,
            settings,
            scorer,
            ordering,
        }
    }

    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    /// Runs the search.
    ///
    /// # Errors
    /// - [`SolveError::Config`]: invalid credit band or infeasible mandatory set.
    /// - [`SolveError::NoEligiblePatterns`]: every pattern was filtered out.
    /// - [`SolveError::Unsatisfiable`]: no timetable reached the credit band.
    pub fn solve<R: RandomSource + ?Sized>(
        &self,
        catalog: &Catalog,
        patterns: &PatternLibrary,
        rng: &mut R,
    ) -> Result<Vec<TimetableCandidate>, SolveError> {
        self.constraints.validate()?;
        let mandatory = self.constraints.resolve_mandatory(catalog)?;
        let mandatory_slots: BTreeSet<Slot> = mandatory
            .iter()
            .flat_map(|c| c.occupied().iter().copied())
            .collect();

        let pattern_scorer =
            PatternScorer::new(catalog, &self.constraints, &self.scorer, &self.ordering);
        let scored = pattern_scorer.score_all(patterns.iter(), rng);
        let unknown: usize = scored.iter().map(|p| p.unknown_ids.len()).sum();
        if unknown > 0 {
            warn!(unknown, "patterns reference course ids missing from the catalog");
        }
        info!(patterns = scored.len(), "scored patterns");

        let selection = select_patterns(
            scored,
            &self.constraints,
            &mandatory_slots,
            self.settings.pattern_relaxation,
        );
        if selection.patterns.is_empty() {
            return Err(SolveError::NoEligiblePatterns);
        }

        let builder =
            CandidateBuilder::new(catalog, &self.constraints, &self.scorer, &self.ordering);
        let mut filter = SignatureFilter::new(
            self.settings.display_window.clone(),
            self.settings.max_candidates,
        );
        let mut candidates = Vec::new();
        let mut patterns_tried = 0;

        for pattern in &selection.patterns {
            if filter.is_full() {
                break;
            }
            patterns_tried += 1;
            let initial = builder.build_initial_timetable(&mandatory, pattern);
            let outcome = builder.fill_remaining_credits(initial, rng);
            debug!(
                pattern = %pattern.key,
                score = pattern.score,
                variations = outcome.variations.len(),
                relaxed = outcome.relaxed,
                "built pattern"
            );
            for timetable in outcome.variations {
                if filter.is_full() {
                    break;
                }
                if filter.admit(&timetable) {
                    candidates.push(TimetableCandidate {
                        pattern_key: pattern.key.clone(),
                        pattern_score: pattern.score,
                        timetable,
                        relaxed: selection.relaxed || outcome.relaxed,
                    });
                }
            }
        }

        if candidates.is_empty() {
            warn!(patterns_tried, "no timetable reached the credit band");
            return Err(SolveError::Unsatisfiable { patterns_tried });
        }
        info!(candidates = candidates.len(), patterns_tried, "search finished");
        Ok(candidates)
    }

    /// Swap and addition report for a candidate.
    pub fn alternatives(&self, catalog: &Catalog, timetable: &Timetable) -> AlternativeReport {
        AlternativeFinder::new(catalog, &self.constraints).report(timetable)
    }

    /// Summary of a timetable under this solver's constraints and window.
    pub fn summarize(&self, timetable: &Timetable) -> TimetableSummary {
        TimetableSummary::calculate(timetable, &self.constraints, &self.settings.display_window)
    }

    /// Editor bound to this solver's constraints.
    pub fn editor<'a>(&'a self, catalog: &'a Catalog) -> TimetableEditor<'a> {
        TimetableEditor::new(catalog, &self.constraints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::models::{Course, Pattern, Weekday};
    use crate::scoring::{FixedSequence, StdRandom};

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Course::new("CS100").with_schedule("1/M").with_credits(2),
            Course::new("CS200").with_schedule("2/M").with_credits(2),
            Course::new("MAT100").with_schedule("1/TU").with_credits(2),
            Course::new("ART100").with_schedule("3/W").with_credits(2),
            Course::new("PE100").with_schedule("1/F").with_credits(1),
        ])
    }

    fn settings() -> SearchSettings {
        SearchSettings::new()
            .with_temperature(0)
            .with_scoring(ScorePolicy::new().with_priority_subjects(["CS"]))
    }

    #[test]
    fn test_solve_produces_distinct_in_band_candidates() {
        let catalog = catalog();
        let patterns = PatternLibrary::discover(&catalog);
        let solver = TimetableSolver::new(ConstraintSet::new(4, 6), settings());

        let candidates = solver
            .solve(&catalog, &patterns, &mut FixedSequence::zeros())
            .unwrap();
        assert!(!candidates.is_empty());
        assert!(candidates.len() <= 10);

        let mut seen = std::collections::HashSet::new();
        for c in &candidates {
            assert!((4..=6).contains(&c.total_credits()));
            assert!(!c.timetable.has_internal_conflict());
            assert!(seen.insert(c.timetable.visual_signature(&DisplayWindow::default())));
        }
    }

    #[test]
    fn test_mandatory_always_included() {
        let catalog = catalog();
        let patterns = PatternLibrary::discover(&catalog);
        let solver = TimetableSolver::new(
            ConstraintSet::new(4, 6).with_mandatory(["PE100"]),
            settings(),
        );
        let candidates = solver
            .solve(&catalog, &patterns, &mut StdRandom::seeded(11))
            .unwrap();
        assert!(candidates.iter().all(|c| c.timetable.contains("PE100")));
        // The pattern occupying PE100's slot is never eligible.
        assert!(candidates.iter().all(|c| c.pattern_key != "1/F"));
    }

    #[test]
    fn test_infeasible_mandatory_is_fatal() {
        let catalog = Catalog::new(vec![
            Course::new("A100").with_schedule("1/M").with_credits(2),
            Course::new("B100").with_schedule("1/M").with_credits(2),
        ]);
        let patterns = PatternLibrary::discover(&catalog);
        let solver = TimetableSolver::new(
            ConstraintSet::new(2, 6).with_mandatory(["A100", "B100"]),
            settings(),
        );
        let err = solver
            .solve(&catalog, &patterns, &mut FixedSequence::zeros())
            .unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(
            err,
            SolveError::Config(ConfigError::MandatoryConflict { .. })
        ));
    }

    #[test]
    fn test_credit_range_is_fatal() {
        let catalog = catalog();
        let solver = TimetableSolver::new(ConstraintSet::new(8, 4), settings());
        let err = solver
            .solve(&catalog, &PatternLibrary::new(), &mut FixedSequence::zeros())
            .unwrap_err();
        assert!(matches!(err, SolveError::Config(ConfigError::CreditRange { .. })));
    }

    #[test]
    fn test_no_eligible_patterns() {
        let catalog = catalog();
        let patterns = PatternLibrary::new().with_pattern(Pattern::new(
            "1/SA",
            vec![Slot::new(Weekday::Saturday, 1)],
            vec![],
        ));
        let solver = TimetableSolver::new(
            ConstraintSet::new(2, 6).with_off_days([Weekday::Saturday]),
            settings(),
        );
        let err = solver
            .solve(&catalog, &patterns, &mut FixedSequence::zeros())
            .unwrap_err();
        assert!(matches!(err, SolveError::NoEligiblePatterns));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_unsatisfiable() {
        let catalog = catalog();
        let patterns = PatternLibrary::discover(&catalog);
        let solver = TimetableSolver::new(ConstraintSet::new(50, 60), settings());
        let err = solver
            .solve(&catalog, &patterns, &mut FixedSequence::zeros())
            .unwrap_err();
        assert!(matches!(err, SolveError::Unsatisfiable { patterns_tried: 5 }));
    }

    #[test]
    fn test_max_candidates_caps_output() {
        let catalog = catalog();
        let patterns = PatternLibrary::discover(&catalog);
        let solver = TimetableSolver::new(
            ConstraintSet::new(2, 9),
            settings().with_max_candidates(2),
        );
        let candidates = solver
            .solve(&catalog, &patterns, &mut FixedSequence::zeros())
            .unwrap();
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn test_settings_clamps() {
        let s = SearchSettings::new().with_temperature(180).with_max_candidates(0);
        assert_eq!(s.temperature, 100);
        assert_eq!(s.max_candidates, 1);
        assert_eq!(SearchSettings::new().with_max_candidates(50).max_candidates, 10);
    }

    #[test]
    fn test_solver_clamps_deserialized_settings() {
        let mut raw = serde_json::to_value(settings()).unwrap();
        raw["max_candidates"] = serde_json::json!(0);
        raw["temperature"] = serde_json::json!(250);
        let loaded: SearchSettings = serde_json::from_value(raw).unwrap();
        assert_eq!(loaded.max_candidates, 0);

        let catalog = catalog();
        let patterns = PatternLibrary::discover(&catalog);
        let solver = TimetableSolver::new(ConstraintSet::new(2, 9), loaded);
        assert_eq!(solver.settings().max_candidates, 1);
        assert_eq!(solver.settings().temperature, 100);

        let candidates = solver
            .solve(&catalog, &patterns, &mut StdRandom::seeded(7))
            .unwrap();
        assert_eq!(candidates.len(), 1);

        let mut wide = settings();
        wide.max_candidates = 50;
        let solver = TimetableSolver::new(ConstraintSet::new(2, 9), wide);
        assert_eq!(solver.settings().max_candidates, MAX_CANDIDATES_LIMIT);
    }

    #[test]
    fn test_alternatives_and_summary() {
        let catalog = catalog();
        let patterns = PatternLibrary::discover(&catalog);
        let solver = TimetableSolver::new(ConstraintSet::new(4, 6), settings());
        let candidates = solver
            .solve(&catalog, &patterns, &mut FixedSequence::zeros())
            .unwrap();
        let top = &candidates[0].timetable;

        let report = solver.alternatives(&catalog, top);
        for (id, options) in &report.swaps {
            for option in options {
                let swapped = top.replacing(id, option.course.clone());
                assert!(!swapped.has_internal_conflict());
            }
        }
        let summary = solver.summarize(top);
        assert!(summary.credit_band_met);
    }
}
