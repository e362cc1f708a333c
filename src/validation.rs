//! Input validation for course catalogs and pattern libraries.
//!
//! Checks the integrity of the loaded data before a search. Detects:
//! - Duplicate or empty course ids
//! - Schedule strings with unparsable tokens
//! - Patterns referencing course ids absent from the catalog
//! - Patterns without slots
//! - Pattern members whose own slots differ from the pattern's
//!
//! None of these stop a run: the search skips unknown ids and treats
//! unparsed slots as free. Callers log the issues with [`log_issues`].

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::warn;

use crate::models::{Course, PatternLibrary, Slot};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationIssue>>;

/// A data-integrity issue.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    /// Issue category.
    pub kind: ValidationIssueKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationIssueKind {
    /// Two courses share the same id.
    DuplicateId,
    /// A course has a blank id.
    EmptyId,
    /// A schedule string has tokens that could not be parsed.
    MalformedSchedule,
    /// A pattern references a course id not in the catalog.
    UnknownPatternCourse,
    /// A pattern has no slots.
    EmptyPattern,
    /// A pattern member occupies different slots than the pattern.
    PatternMismatch,
}

impl ValidationIssue {
    fn new(kind: ValidationIssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a course list and the patterns built over it.
///
/// Checks:
/// 1. No duplicate or blank course ids
/// 2. Every schedule string parses completely
/// 3. Every pattern has slots
/// 4. Every pattern course id exists
/// 5. Every pattern course occupies exactly the pattern's slots
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(issues)` with all detected issues.
pub fn validate_input(courses: &[Course], patterns: &PatternLibrary) -> ValidationResult {
    let mut issues = Vec::new();

    let mut by_id: HashMap<&str, &Course> = HashMap::new();
    let mut seen = HashSet::new();
    for course in courses {
        if course.id().trim().is_empty() {
            issues.push(ValidationIssue::new(
                ValidationIssueKind::EmptyId,
                "Course with blank id",
            ));
            continue;
        }
        if !seen.insert(course.id()) {
            issues.push(ValidationIssue::new(
                ValidationIssueKind::DuplicateId,
                format!("Duplicate course ID: {}", course.id()),
            ));
        } else {
            by_id.insert(course.id(), course);
        }
        if course.malformed_tokens() > 0 {
            issues.push(ValidationIssue::new(
                ValidationIssueKind::MalformedSchedule,
                format!(
                    "Course '{}' schedule '{}' has {} unparsable token(s)",
                    course.id(),
                    course.schedule(),
                    course.malformed_tokens()
                ),
            ));
        }
    }

    for pattern in patterns.iter() {
        if pattern.slots.is_empty() {
            issues.push(ValidationIssue::new(
                ValidationIssueKind::EmptyPattern,
                format!("Pattern '{}' has no slots", pattern.key),
            ));
        }
        let slots: BTreeSet<Slot> = pattern.slot_set();
        for id in &pattern.course_ids {
            match by_id.get(id.as_str()) {
                None => issues.push(ValidationIssue::new(
                    ValidationIssueKind::UnknownPatternCourse,
                    format!("Pattern '{}' references unknown course '{}'", pattern.key, id),
                )),
                Some(course) if course.occupied() != &slots => {
                    issues.push(ValidationIssue::new(
                        ValidationIssueKind::PatternMismatch,
                        format!(
                            "Course '{}' does not occupy exactly the slots of pattern '{}'",
                            id, pattern.key
                        ),
                    ))
                }
                Some(_) => {}
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

/// Logs each issue as a warning. Returns the count.
pub fn log_issues(result: &ValidationResult) -> usize {
    match result {
        Ok(()) => 0,
        Err(issues) => {
            for issue in issues {
                warn!(kind = ?issue.kind, "{}", issue.message);
            }
            issues.len()
        }
    }
}
