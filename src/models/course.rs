//! Course model.
//!
//! A course is one catalog offering: identifier, titles, weekly meeting
//! slots and credit count. Subject and level are derived from the
//! identifier once, at construction.
//!
//! # Identifier Convention
//! `GEC101` → subject `GEC`, level `100` (numeric code rounded down to
//! the nearest hundred). Identifiers that do not start with uppercase
//! letters followed by digits get an empty subject and level 0.

use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use super::slot::{parse_schedule, OccupiedSlot, Slot, Weekday};

static COURSE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z]+)(\d+)").expect("course id pattern is valid"));

/// A course offering.
///
/// The slot set is derived from the schedule string and cannot change
/// afterwards; use the builder methods before the course is shared.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Course {
    id: String,
    subject: String,
    level: u32,
    /// Instruction language.
    pub language: String,
    /// English title.
    pub title_en: String,
    /// Japanese title.
    pub title_ja: String,
    /// Classroom(s).
    pub classroom: String,
    /// Delivery mode (in person, online, ...).
    pub mode: String,
    /// Instructor name(s).
    pub instructor: String,
    /// Syllabus links.
    pub link: String,
    /// Credit count.
    pub credits: u32,
    schedule: String,
    slots: BTreeSet<OccupiedSlot>,
    #[serde(skip)]
    occupied: BTreeSet<Slot>,
    malformed_tokens: usize,
}

impl Course {
    /// Creates a course with no schedule and zero credits.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let (subject, level) = derive_subject_level(&id);
        Self {
            id,
            subject,
            level,
            language: String::new(),
            title_en: String::new(),
            title_ja: String::new(),
            classroom: String::new(),
            mode: String::new(),
            instructor: String::new(),
            link: String::new(),
            credits: 0,
            schedule: String::new(),
            slots: BTreeSet::new(),
            occupied: BTreeSet::new(),
            malformed_tokens: 0,
        }
    }

    /// Sets the raw schedule string and derives the slot set from it.
    pub fn with_schedule(mut self, raw: impl Into<String>) -> Self {
        self.schedule = raw.into();
        let parsed = parse_schedule(&self.schedule);
        self.occupied = parsed.slots.iter().map(|s| s.slot).collect();
        self.slots = parsed.slots;
        self.malformed_tokens = parsed.malformed_tokens;
        self
    }

    /// Sets the credit count.
    pub fn with_credits(mut self, credits: u32) -> Self {
        self.credits = credits;
        self
    }

    /// Sets English and Japanese titles.
    pub fn with_titles(mut self, en: impl Into<String>, ja: impl Into<String>) -> Self {
        self.title_en = en.into();
        self.title_ja = ja.into();
        self
    }

    /// Sets the instruction language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Sets the classroom.
    pub fn with_classroom(mut self, classroom: impl Into<String>) -> Self {
        self.classroom = classroom.into();
        self
    }

    /// Sets the instructor.
    pub fn with_instructor(mut self, instructor: impl Into<String>) -> Self {
        self.instructor = instructor.into();
        self
    }

    /// Sets the delivery mode.
    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }

    /// Sets the syllabus link(s).
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Leading uppercase letters of the identifier.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Numeric code rounded down to the nearest hundred.
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Raw schedule string as given by the catalog.
    pub fn schedule(&self) -> &str {
        &self.schedule
    }

    /// Occupied slots with exception flags.
    pub fn slots(&self) -> &BTreeSet<OccupiedSlot> {
        &self.slots
    }

    /// Occupied (weekday, period) pairs, exception flags dropped.
    pub fn occupied(&self) -> &BTreeSet<Slot> {
        &self.occupied
    }

    /// Schedule tokens skipped by the lenient parser.
    pub fn malformed_tokens(&self) -> usize {
        self.malformed_tokens
    }

    /// Whether the course has no known meeting time.
    pub fn is_unscheduled(&self) -> bool {
        self.occupied.is_empty()
    }

    /// Whether the two courses share a (weekday, period) slot.
    ///
    /// Symmetric; exception flags are ignored.
    pub fn conflicts_with(&self, other: &Course) -> bool {
        !self.occupied.is_disjoint(&other.occupied)
    }

    /// Whether any occupied slot falls on one of the given days.
    pub fn meets_on_any(&self, days: &BTreeSet<Weekday>) -> bool {
        self.occupied.iter().any(|s| days.contains(&s.weekday))
    }

    /// Display title: Japanese if present, English otherwise.
    pub fn display_title(&self) -> &str {
        if self.title_ja.is_empty() {
            &self.title_en
        } else {
            &self.title_ja
        }
    }
}

fn derive_subject_level(id: &str) -> (String, u32) {
    match COURSE_ID.captures(id) {
        Some(caps) => {
            let level = caps[2]
                .parse::<u64>()
                .map(|code| (code / 100 * 100).min(u64::from(u32::MAX)) as u32)
                .unwrap_or(0);
            (caps[1].to_string(), level)
        }
        None => (String::new(), 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_builder() {
        let course = Course::new("GEC101")
            .with_titles("Intro", "入門")
            .with_schedule("3/TU,2/TH")
            .with_credits(3)
            .with_classroom("H-101")
            .with_instructor("Sato")
            .with_mode("Face-to-face")
            .with_language("E");

        assert_eq!(course.id(), "GEC101");
        assert_eq!(course.subject(), "GEC");
        assert_eq!(course.level(), 100);
        assert_eq!(course.credits, 3);
        assert_eq!(course.occupied().len(), 2);
        assert_eq!(course.display_title(), "入門");
    }

    #[test]
    fn test_level_rounding() {
        assert_eq!(Course::new("ELA060").level(), 0);
        assert_eq!(Course::new("PHY261").level(), 200);
        assert_eq!(Course::new("MAT399").level(), 300);
    }

    #[test]
    fn test_unrecognized_identifier() {
        let course = Course::new("xyz-1");
        assert_eq!(course.subject(), "");
        assert_eq!(course.level(), 0);
    }

    #[test]
    fn test_conflict_ignores_exception_flag() {
        let a = Course::new("A100").with_schedule("4/M");
        let b = Course::new("B100").with_schedule("*4/M");
        let c = Course::new("C100").with_schedule("4/TU");
        assert!(a.conflicts_with(&b));
        assert!(b.conflicts_with(&a));
        assert!(!a.conflicts_with(&c));
    }

    #[test]
    fn test_unscheduled_never_conflicts() {
        let online = Course::new("ONL100").with_schedule("");
        let a = Course::new("A100").with_schedule("1/M");
        assert!(online.is_unscheduled());
        assert!(!online.conflicts_with(&a));
        assert!(!online.conflicts_with(&online.clone()));
    }

    #[test]
    fn test_malformed_tokens_counted() {
        let course = Course::new("A100").with_schedule("1/M, TBA");
        assert_eq!(course.occupied().len(), 1);
        assert_eq!(course.malformed_tokens(), 1);
    }

    #[test]
    fn test_meets_on_any() {
        let course = Course::new("A100").with_schedule("1/SA");
        let weekend: BTreeSet<Weekday> = [Weekday::Saturday, Weekday::Sunday].into();
        assert!(course.meets_on_any(&weekend));
        let weekday: BTreeSet<Weekday> = [Weekday::Monday].into();
        assert!(!course.meets_on_any(&weekday));
    }
}
