//! Timetable (candidate solution) model.
//!
//! A timetable is an ordered list of courses whose slot sets are
//! pairwise disjoint. Members are shared `Arc<Course>` handles, so
//! copying a timetable to snapshot or edit it is cheap.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

use super::slot::{Slot, Weekday};
use super::Course;

/// The weekdays and period range shown in a timetable grid.
///
/// Two timetables occupying the same slots inside the window look the
/// same to the user, whichever courses fill those slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayWindow {
    pub weekdays: BTreeSet<Weekday>,
    pub first_period: u8,
    pub last_period: u8,
}

impl DisplayWindow {
    pub fn new(
        weekdays: impl IntoIterator<Item = Weekday>,
        first_period: u8,
        last_period: u8,
    ) -> Self {
        Self {
            weekdays: weekdays.into_iter().collect(),
            first_period,
            last_period,
        }
    }

    #[inline]
    pub fn contains(&self, slot: &Slot) -> bool {
        self.weekdays.contains(&slot.weekday)
            && self.first_period <= slot.period
            && slot.period <= self.last_period
    }

    /// Periods shown, in order.
    pub fn periods(&self) -> impl Iterator<Item = u8> {
        self.first_period..=self.last_period
    }
}

impl Default for DisplayWindow {
    /// Monday to Saturday, periods 1 to 7.
    fn default() -> Self {
        Self::new(
            [
                Weekday::Monday,
                Weekday::Tuesday,
                Weekday::Wednesday,
                Weekday::Thursday,
                Weekday::Friday,
                Weekday::Saturday,
            ],
            1,
            7,
        )
    }
}

/// A set of courses taken together.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Timetable {
    courses: Vec<Arc<Course>>,
}

impl Timetable {
    /// Creates an empty timetable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps courses as-is. Callers are responsible for conflict-freedom;
    /// see [`Timetable::has_internal_conflict`].
    pub fn from_courses(courses: Vec<Arc<Course>>) -> Self {
        Self { courses }
    }

    /// Members in insertion order.
    pub fn courses(&self) -> &[Arc<Course>] {
        &self.courses
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.courses.iter().any(|c| c.id() == id)
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Course>> {
        self.courses.iter().find(|c| c.id() == id)
    }

    /// Member ids in insertion order.
    pub fn course_ids(&self) -> Vec<&str> {
        self.courses.iter().map(|c| c.id()).collect()
    }

    /// Sum of member credits, saturating at `u32::MAX`.
    pub fn total_credits(&self) -> u32 {
        self.courses
            .iter()
            .fold(0, |sum, c| sum.saturating_add(c.credits))
    }

    /// Union of member slots (exception flags dropped).
    pub fn occupied_slots(&self) -> BTreeSet<Slot> {
        self.courses
            .iter()
            .flat_map(|c| c.occupied().iter().copied())
            .collect()
    }

    /// First member sharing a slot with `course`, if any.
    pub fn conflicting_member(&self, course: &Course) -> Option<&Arc<Course>> {
        self.courses
            .iter()
            .find(|member| member.id() != course.id() && member.conflicts_with(course))
    }

    /// Whether `course` shares a slot with any member.
    pub fn conflicts_with(&self, course: &Course) -> bool {
        self.conflicting_member(course).is_some()
    }

    /// Whether any two members share a slot.
    pub fn has_internal_conflict(&self) -> bool {
        self.courses
            .iter()
            .enumerate()
            .any(|(i, a)| self.courses[i + 1..].iter().any(|b| a.conflicts_with(b)))
    }

    /// Occupied slots restricted to a display window.
    pub fn visual_signature(&self, window: &DisplayWindow) -> BTreeSet<Slot> {
        self.occupied_slots()
            .into_iter()
            .filter(|slot| window.contains(slot))
            .collect()
    }

    /// Members sorted by (subject, id).
    pub fn sorted_by_subject(&self) -> Vec<&Arc<Course>> {
        let mut sorted: Vec<&Arc<Course>> = self.courses.iter().collect();
        sorted.sort_by(|a, b| (a.subject(), a.id()).cmp(&(b.subject(), b.id())));
        sorted
    }

    /// Appends a member.
    pub(crate) fn push(&mut self, course: Arc<Course>) {
        self.courses.push(course);
    }

    /// Copy with `course` appended.
    pub fn with_course(&self, course: Arc<Course>) -> Self {
        let mut next = self.clone();
        next.push(course);
        next
    }

    /// Copy without the member `id`.
    pub fn without(&self, id: &str) -> Self {
        Self {
            courses: self
                .courses
                .iter()
                .filter(|c| c.id() != id)
                .cloned()
                .collect(),
        }
    }

    /// Copy with member `old_id` replaced by `course` at the same position.
    pub fn replacing(&self, old_id: &str, course: Arc<Course>) -> Self {
        Self {
            courses: self
                .courses
                .iter()
                .map(|c| {
                    if c.id() == old_id {
                        Arc::clone(&course)
                    } else {
                        Arc::clone(c)
                    }
                })
                .collect(),
        }
    }
}
