//! iCalendar (RFC 5545) rendering of a timetable.
//!
//! Each (course, slot) pair becomes one weekly recurring event starting
//! on the first matching weekday on or after the term start. Times are
//! floating local times, including the recurrence end. Lines end in CRLF
//! and are folded at 75 octets.

use chrono::{Datelike, Duration, NaiveDate};
use tracing::{debug, warn};

use super::periods::PeriodTable;
use crate::models::{Course, OccupiedSlot, Timetable};

/// Term length used when none is given.
pub const DEFAULT_TERM_WEEKS: u32 = 10;

const PRODID: &str = "-//u-timetable//Course Scheduler//EN";
const MAX_LINE_OCTETS: usize = 75;

/// Renders `courses` as an iCalendar document.
///
/// Slots whose period has no defined times are skipped with a warning.
pub fn write_ics<'a>(
    courses: impl IntoIterator<Item = &'a Course>,
    periods: &PeriodTable,
    term_start: NaiveDate,
    weeks: u32,
) -> String {
    let until = term_start + Duration::weeks(i64::from(weeks));
    // UNTIL must match the floating DTSTART form, so no UTC suffix.
    let until = format!("{}T235959", until.format("%Y%m%d"));
    let stamp = format!("{}T000000Z", term_start.format("%Y%m%d"));

    let prodid = format!("PRODID:{PRODID}");
    let mut out = String::new();
    for line in [
        "BEGIN:VCALENDAR",
        "VERSION:2.0",
        prodid.as_str(),
        "CALSCALE:GREGORIAN",
        "METHOD:PUBLISH",
    ] {
        push_line(&mut out, line);
    }

    let mut events = 0usize;
    for course in courses {
        for slot in course.slots() {
            let Some(times) = periods.times_for(slot) else {
                warn!(
                    course = course.id(),
                    slot = %slot.slot,
                    "no times for period, slot skipped"
                );
                continue;
            };
            let date = first_meeting(term_start, slot);
            let start = date.and_time(times.start);
            let end = date.and_time(times.end);

            push_line(&mut out, "BEGIN:VEVENT");
            push_line(&mut out, &format!("UID:{}", event_uid(course, slot)));
            push_line(&mut out, &format!("DTSTAMP:{stamp}"));
            push_line(&mut out, &format!("SUMMARY:{}", escape_text(&summary(course))));
            push_line(&mut out, &format!("DTSTART:{}", start.format("%Y%m%dT%H%M%S")));
            push_line(&mut out, &format!("DTEND:{}", end.format("%Y%m%dT%H%M%S")));
            push_line(
                &mut out,
                &format!(
                    "RRULE:FREQ=WEEKLY;BYDAY={};UNTIL={until}",
                    slot.slot.weekday.ical_code()
                ),
            );
            if !course.classroom.trim().is_empty() {
                push_line(&mut out, &format!("LOCATION:{}", escape_text(&course.classroom)));
            }
            let description = format!(
                "Course No: {}\nInstructor: {}\nSchedule: {}",
                course.id(),
                course.instructor,
                course.schedule()
            );
            push_line(&mut out, &format!("DESCRIPTION:{}", escape_text(&description)));
            push_line(&mut out, "END:VEVENT");
            events += 1;
        }
    }
    push_line(&mut out, "END:VCALENDAR");
    debug!(events, %term_start, weeks, "calendar rendered");
    out
}

/// Renders every course of a timetable.
pub fn timetable_to_ics(
    timetable: &Timetable,
    periods: &PeriodTable,
    term_start: NaiveDate,
    weeks: u32,
) -> String {
    write_ics(
        timetable.courses().iter().map(|c| c.as_ref()),
        periods,
        term_start,
        weeks,
    )
}

/// First date on or after `term_start` falling on the slot's weekday.
fn first_meeting(term_start: NaiveDate, slot: &OccupiedSlot) -> NaiveDate {
    let base = term_start.weekday().num_days_from_monday();
    let target = slot.slot.weekday.days_from_monday();
    let offset = (target + 7 - base) % 7;
    term_start + Duration::days(i64::from(offset))
}

fn summary(course: &Course) -> String {
    let joined = format!("{} {}", course.title_en, course.title_ja);
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        course.id().to_string()
    } else {
        trimmed.to_string()
    }
}

fn event_uid(course: &Course, slot: &OccupiedSlot) -> String {
    format!(
        "{}-{}{}@u-timetable",
        course.id(),
        slot.slot.weekday.ical_code(),
        slot.slot.period
    )
}

fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Appends a content line, folding it so no physical line exceeds 75 octets.
fn push_line(out: &mut String, line: &str) {
    let mut used = 0;
    for c in line.chars() {
        let len = c.len_utf8();
        if used + len > MAX_LINE_OCTETS {
            out.push_str("\r\n ");
            used = 1;
        }
        out.push(c);
        used += len;
    }
    out.push_str("\r\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Weekday;

    fn course() -> Course {
        Course::new("CS101")
            .with_titles("Intro to CS", "情報科学入門")
            .with_schedule("1/M,*4/TH")
            .with_classroom("H-101")
            .with_instructor("Sato, K.")
            .with_credits(3)
    }

    fn term_start() -> NaiveDate {
        // A Wednesday.
        NaiveDate::from_ymd_opt(2025, 4, 9).unwrap()
    }

    #[test]
    fn test_calendar_structure() {
        let ics = write_ics([&course()], &PeriodTable::standard(), term_start(), 10);
        assert!(ics.starts_with("BEGIN:VCALENDAR\r\nVERSION:2.0\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 2);
        assert!(!ics.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn test_first_meeting_and_recurrence() {
        let ics = write_ics([&course()], &PeriodTable::standard(), term_start(), 10);
        // Monday after a Wednesday start: 2025-04-14.
        assert!(ics.contains("DTSTART:20250414T085000\r\n"));
        assert!(ics.contains("DTEND:20250414T100000\r\n"));
        // Thursday of the same week.
        assert!(ics.contains("DTSTART:20250410T135000\r\n"));
        assert!(ics.contains("RRULE:FREQ=WEEKLY;BYDAY=MO;UNTIL=20250618T235959\r\n"));
    }

    #[test]
    fn test_until_matches_floating_start() {
        let ics = write_ics([&course()], &PeriodTable::standard(), term_start(), 10);
        let unfolded = ics.replace("\r\n ", "");
        let rrules: Vec<&str> = unfolded
            .split("\r\n")
            .filter(|line| line.starts_with("RRULE:"))
            .collect();
        assert_eq!(rrules.len(), 2);
        for rrule in rrules {
            let until = rrule.split("UNTIL=").nth(1).unwrap();
            assert_eq!(until.len(), "20250618T235959".len());
            assert!(!until.ends_with('Z'));
        }
        for line in unfolded.split("\r\n").filter(|l| l.starts_with("DTSTART:")) {
            assert!(!line.ends_with('Z'));
        }
    }

    #[test]
    fn test_same_weekday_starts_on_term_start() {
        let slot = OccupiedSlot::new(Weekday::Wednesday, 2, false);
        assert_eq!(first_meeting(term_start(), &slot), term_start());
    }

    #[test]
    fn test_text_fields_escaped() {
        let ics = write_ics([&course()], &PeriodTable::standard(), term_start(), 10);
        assert!(ics.contains("SUMMARY:Intro to CS 情報科学入門\r\n"));
        assert!(ics.contains("LOCATION:H-101\r\n"));
        let unfolded = ics.replace("\r\n ", "");
        assert!(unfolded.contains(
            "DESCRIPTION:Course No: CS101\\nInstructor: Sato\\, K.\\nSchedule: 1/M\\,*4/TH"
        ));
    }

    #[test]
    fn test_unknown_period_skipped() {
        let late = Course::new("X1").with_schedule("9/F,1/F");
        let ics = write_ics([&late], &PeriodTable::standard(), term_start(), 10);
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
        assert!(ics.contains("SUMMARY:X1\r\n"));
    }

    #[test]
    fn test_long_lines_folded() {
        let wordy = Course::new("W1")
            .with_titles("A".repeat(200), "")
            .with_schedule("1/M");
        let ics = write_ics([&wordy], &PeriodTable::standard(), term_start(), 10);
        for line in ics.split("\r\n") {
            assert!(line.len() <= MAX_LINE_OCTETS);
        }
        assert!(ics.contains("\r\n A"));
    }

    #[test]
    fn test_timetable_export() {
        let timetable = Timetable::from_courses(vec![std::sync::Arc::new(course())]);
        let ics = timetable_to_ics(
            &timetable,
            &PeriodTable::standard(),
            term_start(),
            DEFAULT_TERM_WEEKS,
        );
        assert_eq!(ics.matches("END:VEVENT").count(), 2);
    }
}
