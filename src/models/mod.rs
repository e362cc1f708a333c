//! Timetabling domain models.
//!
//! Provides the core data types for representing a student's
//! timetabling problem and its candidate solutions.
//!
//! # Domain Mappings
//!
//! | u-timetable | Meaning |
//! |-------------|---------|
//! | Slot | One weekly meeting time (weekday × period) |
//! | Course | A catalog offering occupying a fixed set of slots |
//! | Catalog | Every course offered this term |
//! | Pattern | A slot combination shared by several courses |
//! | ConstraintSet | The student's credit band, requirements and availability |
//! | Timetable | A conflict-free selection of courses |

mod catalog;
mod constraints;
mod course;
mod pattern;
mod slot;
mod timetable;

pub use catalog::{Catalog, CourseRecord};
pub use constraints::{ConstraintSet, LevelBand, MajorSubjects, MAX_LEVEL};
pub use course::Course;
pub use pattern::{Pattern, PatternLibrary};
pub use slot::{
    parse_schedule, parse_schedule_strict, OccupiedSlot, ParseWeekdayError, ParsedSchedule, Slot,
    Weekday,
};
pub use timetable::{DisplayWindow, Timetable};
