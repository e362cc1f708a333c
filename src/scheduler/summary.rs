//! Timetable summary metrics and grid rendering.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total credits | Sum of member credits |
//! | Slot count | Distinct occupied (weekday, period) pairs |
//! | Days used | Weekdays with at least one slot |
//! | Free weekdays | Display-window weekdays with no slot |
//! | Load by day | Occupied periods per weekday |
//! | Earliest / latest period | Period range over the week |
//! | Credit band met | `min_credits <= total <= max_credits` |

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::models::{ConstraintSet, DisplayWindow, Slot, Timetable, Weekday};

/// Timetable indicators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimetableSummary {
    pub total_credits: u32,
    pub course_count: usize,
    pub slot_count: usize,
    pub days_used: BTreeSet<Weekday>,
    /// Window weekdays without any class.
    pub free_weekdays: BTreeSet<Weekday>,
    pub load_by_day: BTreeMap<Weekday, usize>,
    pub earliest_period: Option<u8>,
    pub latest_period: Option<u8>,
    pub credit_band_met: bool,
}

impl TimetableSummary {
    /// Computes the summary of a timetable.
    pub fn calculate(
        timetable: &Timetable,
        constraints: &ConstraintSet,
        window: &DisplayWindow,
    ) -> Self {
        let slots = timetable.occupied_slots();
        let mut load_by_day: BTreeMap<Weekday, usize> = BTreeMap::new();
        for slot in &slots {
            *load_by_day.entry(slot.weekday).or_default() += 1;
        }
        let days_used: BTreeSet<Weekday> = load_by_day.keys().copied().collect();
        let free_weekdays = window
            .weekdays
            .iter()
            .filter(|day| !days_used.contains(*day))
            .copied()
            .collect();
        let total_credits = timetable.total_credits();

        Self {
            total_credits,
            course_count: timetable.len(),
            slot_count: slots.len(),
            days_used,
            free_weekdays,
            load_by_day,
            earliest_period: slots.iter().map(|s| s.period).min(),
            latest_period: slots.iter().map(|s| s.period).max(),
            credit_band_met: constraints.credits_in_band(total_credits),
        }
    }

    /// Whether the timetable leaves at least `days` window weekdays free.
    pub fn has_free_days(&self, days: usize) -> bool {
        self.free_weekdays.len() >= days
    }
}

/// Period x weekday grid of subject codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimetableGrid {
    window: DisplayWindow,
    cells: BTreeMap<Slot, String>,
}

impl TimetableGrid {
    /// Builds the grid over a display window. Slots outside it are dropped.
    pub fn build(timetable: &Timetable, window: &DisplayWindow) -> Self {
        let mut cells = BTreeMap::new();
        for course in timetable.courses() {
            for slot in course.occupied() {
                if window.contains(slot) {
                    cells.insert(*slot, course.subject().to_string());
                }
            }
        }
        Self {
            window: window.clone(),
            cells,
        }
    }

    pub fn cell(&self, weekday: Weekday, period: u8) -> Option<&str> {
        self.cells.get(&Slot::new(weekday, period)).map(String::as_str)
    }
}

impl fmt::Display for TimetableGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const WIDTH: usize = 8;
        write!(f, "   ")?;
        for day in &self.window.weekdays {
            write!(f, "| {:<WIDTH$}", day.schedule_code())?;
        }
        writeln!(f)?;
        let rule = 3 + self.window.weekdays.len() * (WIDTH + 2);
        writeln!(f, "{}", "-".repeat(rule))?;
        for period in self.window.periods() {
            write!(f, "{period:>2} ")?;
            for day in &self.window.weekdays {
                let cell = self
                    .cells
                    .get(&Slot::new(*day, period))
                    .map(|subject| format!("[{subject}]"))
                    .unwrap_or_default();
                write!(f, "| {cell:<WIDTH$}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
