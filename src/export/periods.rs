//! Clock times of teaching periods.
//!
//! A period definition file groups variations under named schedule
//! types. The `standard` variation gives the usual times; `exception`
//! variations apply only to slots whose condition token (`*4/M`) they
//! list.
//!
//! ```json
//! {"schedule_types": {"regular": {"name": "Regular", "variations": [
//!   {"type": "standard", "conditions": null,
//!    "periods": {"1": {"start": "08:45", "end": "10:00"},
//!                "lunch": {"start": "12:40", "end": "13:50"}}},
//!   {"type": "exception", "conditions": ["*4/M"],
//!    "periods": {"4": {"start": "14:00", "end": "15:10"}}}
//! ]}}}
//! ```
//!
//! Keys that are not period numbers (`lunch`) are ignored.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ExportError, LoadError};
use crate::models::OccupiedSlot;

/// Raw period definition file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodDefinitions {
    #[serde(default)]
    pub schedule_types: BTreeMap<String, ScheduleType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleType {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub variations: Vec<Variation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariationKind {
    Standard,
    Exception,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variation {
    #[serde(rename = "type")]
    pub kind: VariationKind,
    /// Condition tokens an exception applies to. `null` for standard.
    #[serde(default)]
    pub conditions: Option<Vec<String>>,
    #[serde(default)]
    pub periods: BTreeMap<String, TimeRange>,
}

/// Start and end as written in the file (`"08:45"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
}

impl PeriodDefinitions {
    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        serde_json::from_str(json).map_err(|source| LoadError::Json {
            what: "period definitions",
            source,
        })
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let text = LoadError::read(path.as_ref())?;
        Self::from_json_str(&text)
    }
}

/// Parsed start and end of one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodTime {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl PeriodTime {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ExceptionTimes {
    conditions: BTreeSet<String>,
    periods: BTreeMap<u8, PeriodTime>,
}

/// Period number to clock time lookup for one schedule type.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodTable {
    standard: BTreeMap<u8, PeriodTime>,
    exceptions: Vec<ExceptionTimes>,
}

const STANDARD_TIMES: [(u32, u32, u32, u32); 7] = [
    (8, 50, 10, 0),
    (10, 10, 11, 20),
    (11, 30, 12, 40),
    (13, 50, 15, 0),
    (15, 10, 16, 20),
    (16, 30, 17, 40),
    (17, 50, 19, 0),
];

impl PeriodTable {
    /// Built-in seven-period day, used when no definition file is given.
    pub fn standard() -> Self {
        let standard = STANDARD_TIMES
            .iter()
            .zip(1u8..)
            .filter_map(|(&(sh, sm, eh, em), period)| {
                let start = NaiveTime::from_hms_opt(sh, sm, 0)?;
                let end = NaiveTime::from_hms_opt(eh, em, 0)?;
                Some((period, PeriodTime::new(start, end)))
            })
            .collect();
        Self {
            standard,
            exceptions: Vec::new(),
        }
    }

    /// Builds the table for `schedule_type` from a definition file.
    pub fn from_definitions(
        definitions: &PeriodDefinitions,
        schedule_type: &str,
    ) -> Result<Self, ExportError> {
        let ty = definitions
            .schedule_types
            .get(schedule_type)
            .ok_or_else(|| ExportError::UnknownScheduleType(schedule_type.to_string()))?;

        let mut standard = BTreeMap::new();
        let mut exceptions = Vec::new();
        for variation in &ty.variations {
            let periods = parse_periods(&variation.periods)?;
            match variation.kind {
                VariationKind::Standard => standard.extend(periods),
                VariationKind::Exception => exceptions.push(ExceptionTimes {
                    conditions: variation.conditions.iter().flatten().cloned().collect(),
                    periods,
                }),
            }
        }
        debug!(
            schedule_type,
            periods = standard.len(),
            exceptions = exceptions.len(),
            "period table loaded"
        );
        Ok(Self {
            standard,
            exceptions,
        })
    }

    /// Standard times of `period`.
    pub fn standard_times(&self, period: u8) -> Option<PeriodTime> {
        self.standard.get(&period).copied()
    }

    /// Times for an occupied slot.
    ///
    /// Exception slots use the first exception variation listing their
    /// condition token and defining their period; otherwise the standard
    /// times apply.
    pub fn times_for(&self, slot: &OccupiedSlot) -> Option<PeriodTime> {
        if slot.exception {
            let token = slot.condition_token();
            let exceptional = self
                .exceptions
                .iter()
                .filter(|e| e.conditions.contains(&token))
                .find_map(|e| e.periods.get(&slot.slot.period).copied());
            if exceptional.is_some() {
                return exceptional;
            }
        }
        self.standard_times(slot.slot.period)
    }
}

impl Default for PeriodTable {
    fn default() -> Self {
        Self::standard()
    }
}

fn parse_periods(
    raw: &BTreeMap<String, TimeRange>,
) -> Result<BTreeMap<u8, PeriodTime>, ExportError> {
    let mut periods = BTreeMap::new();
    for (key, range) in raw {
        let Ok(period) = key.trim().parse::<u8>() else {
            continue;
        };
        let start = parse_time(key, &range.start)?;
        let end = parse_time(key, &range.end)?;
        periods.insert(period, PeriodTime::new(start, end));
    }
    Ok(periods)
}

fn parse_time(period: &str, value: &str) -> Result<NaiveTime, ExportError> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| ExportError::InvalidTime {
            period: period.to_string(),
            value: value.to_string(),
        })
}
