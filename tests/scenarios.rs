//! End-to-end search scenarios on small hand-built catalogs.

use u_timetable::error::SolveError;
use u_timetable::models::{Catalog, ConstraintSet, Course, Pattern, PatternLibrary, Slot, Weekday};
use u_timetable::scheduler::{PatternRelaxation, SearchSettings, TimetableSolver};
use u_timetable::scoring::{FixedSequence, ScorePolicy, StdRandom};

fn ids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_greedy_fill_takes_one_of_two_conflicting_courses() {
    let catalog = Catalog::new(vec![
        Course::new("A100").with_schedule("1/M").with_credits(2),
        Course::new("B100").with_schedule("1/M").with_credits(2),
        Course::new("C100").with_schedule("1/TU").with_credits(3),
    ]);
    let patterns = PatternLibrary::new().with_pattern(Pattern::new(
        "1/M,1/TU",
        vec![Slot::new(Weekday::Monday, 1), Slot::new(Weekday::Tuesday, 1)],
        ids(&["A100", "B100", "C100"]),
    ));

    for seed in 0..20 {
        let solver = TimetableSolver::new(
            ConstraintSet::new(3, 5),
            SearchSettings::new().with_temperature(60),
        );
        let candidates = solver
            .solve(&catalog, &patterns, &mut StdRandom::seeded(seed))
            .unwrap();
        assert_eq!(candidates.len(), 1);

        let top = &candidates[0];
        assert_eq!(top.total_credits(), 5);
        assert!(top.timetable.contains("C100"));
        assert!(top.timetable.contains("A100") ^ top.timetable.contains("B100"));
        assert!(!top.relaxed);
    }
}

#[test]
fn test_relaxed_fill_uses_unavailable_slot() {
    let catalog = Catalog::new(vec![Course::new("A100").with_schedule("1/M").with_credits(2)]);
    // An empty pattern elsewhere keeps pattern selection strict.
    let patterns = PatternLibrary::new().with_pattern(Pattern::new(
        "2/TU",
        vec![Slot::new(Weekday::Tuesday, 2)],
        Vec::new(),
    ));
    let solver = TimetableSolver::new(
        ConstraintSet::new(2, 4).with_unavailable([Slot::new(Weekday::Monday, 1)]),
        SearchSettings::new().with_temperature(0),
    );

    let candidates = solver
        .solve(&catalog, &patterns, &mut FixedSequence::zeros())
        .unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].timetable.course_ids(), vec!["A100"]);
    assert!(candidates[0].relaxed);
}

#[test]
fn test_pattern_relaxation_policy() {
    let catalog = Catalog::new(vec![Course::new("A100").with_schedule("1/M").with_credits(2)]);
    let patterns = PatternLibrary::discover(&catalog);
    let constraints =
        ConstraintSet::new(2, 4).with_unavailable([Slot::new(Weekday::Monday, 1)]);

    let strict = TimetableSolver::new(constraints.clone(), SearchSettings::new());
    assert!(matches!(
        strict.solve(&catalog, &patterns, &mut FixedSequence::zeros()),
        Err(SolveError::NoEligiblePatterns)
    ));

    let mirrored = TimetableSolver::new(
        constraints,
        SearchSettings::new().with_pattern_relaxation(PatternRelaxation::MirrorFill),
    );
    let candidates = mirrored
        .solve(&catalog, &patterns, &mut FixedSequence::zeros())
        .unwrap();
    assert_eq!(candidates.len(), 1);
    assert!(candidates[0].relaxed);
}

#[test]
fn test_duplicate_signature_keeps_higher_scored_pattern() {
    let catalog = Catalog::new(vec![
        Course::new("CS100").with_schedule("1/M,2/W").with_credits(2),
        Course::new("ART100").with_schedule("*1/M,2/W").with_credits(2),
    ]);
    let slots = vec![Slot::new(Weekday::Monday, 1), Slot::new(Weekday::Wednesday, 2)];
    let patterns = PatternLibrary::new()
        .with_pattern(Pattern::new("*1/M,2/W", slots.clone(), ids(&["ART100"])))
        .with_pattern(Pattern::new("1/M,2/W", slots, ids(&["CS100"])));

    let solver = TimetableSolver::new(
        ConstraintSet::new(2, 2),
        SearchSettings::new()
            .with_temperature(0)
            .with_scoring(ScorePolicy::new().with_priority_subjects(["CS"])),
    );
    let candidates = solver
        .solve(&catalog, &patterns, &mut FixedSequence::zeros())
        .unwrap();

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].pattern_key, "1/M,2/W");
    assert_eq!(candidates[0].timetable.course_ids(), vec!["CS100"]);
}

#[test]
fn test_loaded_catalog_with_huge_credits() {
    let catalog = Catalog::from_json_str(
        r#"[
            {"CourseNo": "A100", "Schedule": "1/M", "Credits": 4294967295},
            {"CourseNo": "B100", "Schedule": "1/TU", "Credits": 2}
        ]"#,
    )
    .unwrap();
    let patterns = PatternLibrary::discover(&catalog);
    let solver = TimetableSolver::new(
        ConstraintSet::new(0, u32::MAX),
        SearchSettings::new().with_temperature(0),
    );

    let candidates = solver
        .solve(&catalog, &patterns, &mut FixedSequence::zeros())
        .unwrap();
    assert!(!candidates.is_empty());
    for candidate in &candidates {
        assert!(!(candidate.timetable.contains("A100") && candidate.timetable.contains("B100")));
    }
    assert!(candidates.iter().any(|c| c.total_credits() == u32::MAX));
}
