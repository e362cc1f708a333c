//! Weekday/period slots and schedule-string parsing.
//!
//! A course meets in one or more weekly slots, each identified by a
//! weekday and a numbered teaching period. Catalog schedule strings list
//! them as comma-separated `<period>/<day>` tokens:
//!
//! ```text
//! 3/TU,2/TH,*4/M
//! ```
//!
//! A token prefixed with `*` (or wrapped in parentheses) marks an
//! exception slot, which follows the alternative period timetable when
//! exported. Exception flags never affect conflict detection.
//!
//! # Lenient Parsing
//! Malformed tokens are skipped and counted, never raised. A course with
//! an unparsable schedule simply occupies fewer (or no) slots.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

static SLOT_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,3})\s*/\s*([A-Za-z]{1,2})$").expect("slot token pattern is valid")
});

/// Day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// All weekdays, Monday first.
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Code used in catalog schedule strings (`M`, `TU`, `W`, `TH`, `F`, `SA`, `SU`).
    pub fn schedule_code(self) -> &'static str {
        match self {
            Weekday::Monday => "M",
            Weekday::Tuesday => "TU",
            Weekday::Wednesday => "W",
            Weekday::Thursday => "TH",
            Weekday::Friday => "F",
            Weekday::Saturday => "SA",
            Weekday::Sunday => "SU",
        }
    }

    /// Two-letter iCalendar day code (`MO` .. `SU`).
    pub fn ical_code(self) -> &'static str {
        match self {
            Weekday::Monday => "MO",
            Weekday::Tuesday => "TU",
            Weekday::Wednesday => "WE",
            Weekday::Thursday => "TH",
            Weekday::Friday => "FR",
            Weekday::Saturday => "SA",
            Weekday::Sunday => "SU",
        }
    }

    /// Days since Monday (0..=6).
    #[inline]
    pub fn days_from_monday(self) -> u32 {
        self as u32
    }

    /// Strict lookup by schedule-string code only.
    pub fn from_schedule_code(code: &str) -> Option<Self> {
        match code.to_ascii_uppercase().as_str() {
            "M" => Some(Weekday::Monday),
            "TU" => Some(Weekday::Tuesday),
            "W" => Some(Weekday::Wednesday),
            "TH" => Some(Weekday::Thursday),
            "F" => Some(Weekday::Friday),
            "SA" => Some(Weekday::Saturday),
            "SU" => Some(Weekday::Sunday),
            _ => None,
        }
    }
}

/// Error returned when a weekday name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized weekday '{0}'")]
pub struct ParseWeekdayError(pub String);

impl FromStr for Weekday {
    type Err = ParseWeekdayError;

    /// Accepts schedule codes, iCalendar codes, three-letter and full
    /// English names (any case), and single-kanji Japanese day names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        let day = match token {
            "月" => Some(Weekday::Monday),
            "火" => Some(Weekday::Tuesday),
            "水" => Some(Weekday::Wednesday),
            "木" => Some(Weekday::Thursday),
            "金" => Some(Weekday::Friday),
            "土" => Some(Weekday::Saturday),
            "日" => Some(Weekday::Sunday),
            _ => match token.to_ascii_uppercase().as_str() {
                "M" | "MO" | "MON" | "MONDAY" => Some(Weekday::Monday),
                "TU" | "TUE" | "TUESDAY" => Some(Weekday::Tuesday),
                "W" | "WE" | "WED" | "WEDNESDAY" => Some(Weekday::Wednesday),
                "TH" | "THU" | "THURSDAY" => Some(Weekday::Thursday),
                "F" | "FR" | "FRI" | "FRIDAY" => Some(Weekday::Friday),
                "SA" | "SAT" | "SATURDAY" => Some(Weekday::Saturday),
                "SU" | "SUN" | "SUNDAY" => Some(Weekday::Sunday),
                _ => None,
            },
        };
        day.ok_or_else(|| ParseWeekdayError(token.to_string()))
    }
}

impl TryFrom<String> for Weekday {
    type Error = ParseWeekdayError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Weekday> for String {
    fn from(day: Weekday) -> Self {
        day.schedule_code().to_string()
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.schedule_code())
    }
}

/// A weekly meeting time: (weekday, period).
///
/// Serialized as a `[day, period]` pair, the shape used by pattern files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(Weekday, u8)", into = "(Weekday, u8)")]
pub struct Slot {
    pub weekday: Weekday,
    pub period: u8,
}

impl Slot {
    pub fn new(weekday: Weekday, period: u8) -> Self {
        Self { weekday, period }
    }
}

impl From<(Weekday, u8)> for Slot {
    fn from((weekday, period): (Weekday, u8)) -> Self {
        Self { weekday, period }
    }
}

impl From<Slot> for (Weekday, u8) {
    fn from(slot: Slot) -> Self {
        (slot.weekday, slot.period)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.period, self.weekday)
    }
}

/// A slot occupied by a course, with its exception flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OccupiedSlot {
    pub slot: Slot,
    /// Follows the exception period timetable.
    pub exception: bool,
}

impl OccupiedSlot {
    pub fn new(weekday: Weekday, period: u8, exception: bool) -> Self {
        Self {
            slot: Slot::new(weekday, period),
            exception,
        }
    }

    /// The condition token used by period definitions (`*4/M`).
    pub fn condition_token(&self) -> String {
        format!("*{}", self.slot)
    }
}

/// Result of leniently parsing a schedule string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSchedule {
    /// Slots that parsed successfully.
    pub slots: BTreeSet<OccupiedSlot>,
    /// Number of non-empty tokens that could not be parsed.
    pub malformed_tokens: usize,
}

/// Parses a schedule string, skipping and counting malformed tokens.
///
/// Tokens are separated by `,` or `;`. Backslashes are ignored.
pub fn parse_schedule(raw: &str) -> ParsedSchedule {
    let mut parsed = ParsedSchedule::default();
    for token in tokens(raw) {
        match parse_token(token) {
            Some(slot) => {
                parsed.slots.insert(slot);
            }
            None => parsed.malformed_tokens += 1,
        }
    }
    parsed
}

/// Parses a schedule string only if every token is well formed.
///
/// Returns `None` for empty strings or if any token is malformed.
/// Used when a schedule string has to act as a pattern signature.
pub fn parse_schedule_strict(raw: &str) -> Option<Vec<Slot>> {
    let mut slots = Vec::new();
    for token in tokens(raw) {
        slots.push(parse_token(token)?.slot);
    }
    if slots.is_empty() {
        None
    } else {
        Some(slots)
    }
}

fn tokens(raw: &str) -> impl Iterator<Item = &str> {
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|t| !t.is_empty() && *t != "\\")
}

fn parse_token(token: &str) -> Option<OccupiedSlot> {
    let cleaned: String = token.chars().filter(|&c| c != '\\').collect();
    let cleaned = cleaned.trim();
    let exception = cleaned.starts_with('*') || cleaned.starts_with('(');
    let core = cleaned
        .trim_matches(|c| c == '*' || c == '(' || c == ')')
        .trim();

    let caps = SLOT_TOKEN.captures(core)?;
    let period: u8 = caps[1].parse().ok()?;
    if period == 0 {
        return None;
    }
    let weekday = Weekday::from_schedule_code(&caps[2])?;
    Some(OccupiedSlot::new(weekday, period, exception))
}
