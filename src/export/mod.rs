//! Calendar export.
//!
//! Turns a chosen timetable into an iCalendar file. Period numbers map
//! to clock times through a [`PeriodTable`], either loaded from a period
//! definition file or the built-in standard day.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use u_timetable::export::{write_ics, PeriodTable, DEFAULT_TERM_WEEKS};
//! use u_timetable::models::Course;
//!
//! let course = Course::new("MATH101").with_schedule("2/TU").with_credits(2);
//! let start = NaiveDate::from_ymd_opt(2025, 4, 7).unwrap();
//! let ics = write_ics([&course], &PeriodTable::standard(), start, DEFAULT_TERM_WEEKS);
//! assert!(ics.contains("DTSTART:20250408T101000"));
//! ```

mod ics;
mod periods;

pub use ics::{timetable_to_ics, write_ics, DEFAULT_TERM_WEEKS};
pub use periods::{
    PeriodDefinitions, PeriodTable, PeriodTime, ScheduleType, TimeRange, Variation,
    VariationKind,
};
