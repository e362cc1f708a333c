//! Run configuration.
//!
//! Settings come from two immutable values: a fully populated
//! [`DefaultConfig`] and a sparse [`UserConfig`] read from
//! `user_settings.json`. [`DefaultConfig::merge`] combines them leaf by
//! leaf (a user value wins wherever present), coerces numbers, and
//! validates the result into a [`SolverConfig`].
//!
//! # File Shape
//!
//! ```json
//! {
//!   "file_paths": { "courses": "courses.json", "patterns": "schedule_patterns.json" },
//!   "constraints": {
//!     "min_credits": 16, "max_credits": "18",
//!     "mandatory_nos": ["GEC101"], "excluded_nos": ["PHY", "MAT301"],
//!     "desired_nos": [], "off_days": ["SA", "SU"],
//!     "unavailable_slots": [{ "day": "M", "period": 1 }, ["TU", 2]]
//!   },
//!   "optimizer_settings": {
//!     "priority_subjects": ["CS"], "level_priorities": { "CS": 200 },
//!     "temperature": 30, "max_candidates": 5,
//!     "course_level_constraints": {
//!       "major_subjects": { "codes": ["CS"], "min_level": 200, "max_level": 400 },
//!       "other_subjects": { "min_level": 0, "max_level": 300 }
//!     },
//!     "pattern_relaxation": "strict",
//!     "display_window": {
//!       "weekdays": ["M", "TU", "W", "TH", "F"], "first_period": 1, "last_period": 7
//!     }
//!   }
//! }
//! ```
//!
//! Unknown keys are ignored. Numeric fields accept numbers or numeric
//! strings. Temperature is clamped to `0..=100`, `max_candidates` to
//! `1..=10`.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{ConfigError, LoadError};
use crate::models::{ConstraintSet, DisplayWindow, LevelBand, Slot, Weekday};
use crate::scheduler::{
    PatternRelaxation, SearchSettings, TimetableSolver, MAX_CANDIDATES_LIMIT,
};
use crate::scoring::ScorePolicy;

/// Input file locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePaths {
    pub courses: PathBuf,
    pub patterns: PathBuf,
    /// Period time definitions, used only by calendar export.
    pub periods: Option<PathBuf>,
}

impl Default for FilePaths {
    fn default() -> Self {
        Self {
            courses: PathBuf::from("courses.json"),
            patterns: PathBuf::from("schedule_patterns.json"),
            periods: None,
        }
    }
}

/// Built-in settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultConfig {
    pub paths: FilePaths,
    pub min_credits: u32,
    pub max_credits: u32,
    pub off_days: BTreeSet<Weekday>,
    pub temperature: u8,
    pub max_candidates: usize,
    pub major_band: LevelBand,
    pub other_band: LevelBand,
    pub pattern_relaxation: PatternRelaxation,
    pub display_window: DisplayWindow,
}

impl Default for DefaultConfig {
    fn default() -> Self {
        Self {
            paths: FilePaths::default(),
            min_credits: 16,
            max_credits: 18,
            off_days: [Weekday::Saturday, Weekday::Sunday].into(),
            temperature: 50,
            max_candidates: MAX_CANDIDATES_LIMIT,
            major_band: LevelBand::unrestricted(),
            other_band: LevelBand::unrestricted(),
            pattern_relaxation: PatternRelaxation::default(),
            display_window: DisplayWindow::default(),
        }
    }
}

/// Validated settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    pub constraints: ConstraintSet,
    pub search: SearchSettings,
    pub paths: FilePaths,
}

impl SolverConfig {
    /// Solver over these constraints and settings.
    pub fn solver(&self) -> TimetableSolver {
        TimetableSolver::new(self.constraints.clone(), self.search.clone())
    }
}

/// A JSON number or numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberLike {
    Integer(i64),
    Float(f64),
    Text(String),
    Other(serde_json::Value),
}

impl NumberLike {
    /// Integer value, truncating fractions.
    fn to_i64(&self, key: &'static str) -> Result<i64, ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key,
            value: self.describe(),
        };
        match self {
            NumberLike::Integer(n) => Ok(*n),
            NumberLike::Float(f) if f.is_finite() => Ok(f.trunc() as i64),
            NumberLike::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| {
                        s.parse::<f64>()
                            .ok()
                            .filter(|f| f.is_finite())
                            .map(|f| f.trunc() as i64)
                    })
                    .ok_or_else(invalid)
            }
            NumberLike::Float(_) | NumberLike::Other(_) => Err(invalid()),
        }
    }

    fn to_u32(&self, key: &'static str) -> Result<u32, ConfigError> {
        u32::try_from(self.to_i64(key)?).map_err(|_| ConfigError::InvalidValue {
            key,
            value: self.describe(),
        })
    }

    fn to_u8(&self, key: &'static str) -> Result<u8, ConfigError> {
        u8::try_from(self.to_i64(key)?).map_err(|_| ConfigError::InvalidValue {
            key,
            value: self.describe(),
        })
    }

    fn describe(&self) -> String {
        match self {
            NumberLike::Integer(n) => n.to_string(),
            NumberLike::Float(f) => f.to_string(),
            NumberLike::Text(s) => format!("{s:?}"),
            NumberLike::Other(v) => v.to_string(),
        }
    }
}

impl From<i64> for NumberLike {
    fn from(n: i64) -> Self {
        NumberLike::Integer(n)
    }
}

/// An unavailable-slot entry: `{ "day": .., "period": .. }` or `[day, period]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SlotEntry {
    Object { day: String, period: NumberLike },
    Pair(String, NumberLike),
}

impl SlotEntry {
    fn to_slot(&self) -> Result<Slot, ConfigError> {
        let (day, period) = match self {
            SlotEntry::Object { day, period } | SlotEntry::Pair(day, period) => (day, period),
        };
        Ok(Slot::new(
            parse_weekday("unavailable_slots", day)?,
            period.to_u8("unavailable_slots")?,
        ))
    }
}

/// User overrides. Every leaf is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub file_paths: UserFilePaths,
    pub constraints: UserConstraints,
    pub optimizer_settings: UserOptimizerSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UserFilePaths {
    #[serde(alias = "courses_json", alias = "courses_csv")]
    pub courses: Option<PathBuf>,
    #[serde(alias = "patterns_json")]
    pub patterns: Option<PathBuf>,
    #[serde(alias = "periods_json")]
    pub periods: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UserConstraints {
    pub min_credits: Option<NumberLike>,
    pub max_credits: Option<NumberLike>,
    pub mandatory_nos: Option<Vec<String>>,
    pub excluded_nos: Option<Vec<String>>,
    pub desired_nos: Option<Vec<String>>,
    pub off_days: Option<Vec<String>>,
    pub unavailable_slots: Option<Vec<SlotEntry>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UserOptimizerSettings {
    pub priority_subjects: Option<Vec<String>>,
    pub level_priorities: Option<BTreeMap<String, NumberLike>>,
    pub temperature: Option<NumberLike>,
    pub max_candidates: Option<NumberLike>,
    pub course_level_constraints: UserLevelConstraints,
    pub pattern_relaxation: Option<PatternRelaxation>,
    pub display_window: UserDisplayWindow,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UserLevelConstraints {
    pub major_subjects: UserMajorSubjects,
    pub other_subjects: UserLevelBand,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UserMajorSubjects {
    pub codes: Option<Vec<String>>,
    pub min_level: Option<NumberLike>,
    pub max_level: Option<NumberLike>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UserLevelBand {
    pub min_level: Option<NumberLike>,
    pub max_level: Option<NumberLike>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UserDisplayWindow {
    pub weekdays: Option<Vec<String>>,
    pub first_period: Option<NumberLike>,
    pub last_period: Option<NumberLike>,
}

impl UserConfig {
    /// Parses a settings document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|source| {
            ConfigError::Load(LoadError::Json {
                what: "user settings",
                source,
            })
        })
    }
}

/// Reads user settings. A missing file yields empty overrides.
pub fn load_user_config(path: impl AsRef<Path>) -> Result<UserConfig, ConfigError> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(raw) => {
            let config = UserConfig::from_json_str(&raw)?;
            info!(path = %path.display(), "loaded user settings");
            Ok(config)
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "user settings not found, using defaults");
            Ok(UserConfig::default())
        }
        Err(source) => Err(ConfigError::Load(LoadError::Io {
            path: path.to_path_buf(),
            source,
        })),
    }
}

/// Reads user settings and merges them over the defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<SolverConfig, ConfigError> {
    DefaultConfig::default().merge(&load_user_config(path)?)
}

impl DefaultConfig {
    /// Combines defaults with user overrides and validates the result.
    ///
    /// # Errors
    /// - a numeric field that is not a number or numeric string, or out of range
    /// - an unrecognized weekday
    /// - `min_credits > max_credits`, or an empty display window
    pub fn merge(&self, user: &UserConfig) -> Result<SolverConfig, ConfigError> {
        let c = &user.constraints;
        let o = &user.optimizer_settings;
        let levels = &o.course_level_constraints;

        let min_credits = leaf_u32(&c.min_credits, "min_credits", self.min_credits)?;
        let max_credits = leaf_u32(&c.max_credits, "max_credits", self.max_credits)?;

        let off_days = match &c.off_days {
            Some(days) => parse_weekdays("off_days", days)?,
            None => self.off_days.clone(),
        };
        let unavailable = c
            .unavailable_slots
            .iter()
            .flatten()
            .map(SlotEntry::to_slot)
            .collect::<Result<Vec<_>, _>>()?;

        let major = &levels.major_subjects;
        let major_band = LevelBand::new(
            leaf_u32(&major.min_level, "major_subjects.min_level", self.major_band.min_level)?,
            leaf_u32(&major.max_level, "major_subjects.max_level", self.major_band.max_level)?,
        );
        let other = &levels.other_subjects;
        let other_band = LevelBand::new(
            leaf_u32(&other.min_level, "other_subjects.min_level", self.other_band.min_level)?,
            leaf_u32(&other.max_level, "other_subjects.max_level", self.other_band.max_level)?,
        );

        let constraints = ConstraintSet::new(min_credits, max_credits)
            .with_mandatory(c.mandatory_nos.iter().flatten().cloned())
            .with_excluded(c.excluded_nos.iter().flatten().cloned())
            .with_desired(c.desired_nos.iter().flatten().cloned())
            .with_off_days(off_days)
            .with_unavailable(unavailable)
            .with_major_subjects(
                levels.major_subjects.codes.iter().flatten().cloned(),
                major_band,
            )
            .with_other_subjects(other_band);
        constraints.validate()?;

        let mut scoring = ScorePolicy::new()
            .with_priority_subjects(o.priority_subjects.iter().flatten().cloned());
        for (subject, level) in o.level_priorities.iter().flatten() {
            let level = level.to_u32("level_priorities")?;
            scoring = scoring.with_level_priority(subject.clone(), level);
        }

        let temperature = match &o.temperature {
            Some(t) => t.to_i64("temperature")?.clamp(0, 100) as u8,
            None => self.temperature,
        };
        let max_candidates = match &o.max_candidates {
            Some(n) => n.to_i64("max_candidates")?.clamp(1, MAX_CANDIDATES_LIMIT as i64) as usize,
            None => self.max_candidates,
        };

        let search = SearchSettings::new()
            .with_scoring(scoring)
            .with_temperature(temperature)
            .with_max_candidates(max_candidates)
            .with_pattern_relaxation(o.pattern_relaxation.unwrap_or(self.pattern_relaxation))
            .with_display_window(self.merge_window(&o.display_window)?);

        let paths = FilePaths {
            courses: user
                .file_paths
                .courses
                .clone()
                .unwrap_or_else(|| self.paths.courses.clone()),
            patterns: user
                .file_paths
                .patterns
                .clone()
                .unwrap_or_else(|| self.paths.patterns.clone()),
            periods: user.file_paths.periods.clone().or_else(|| self.paths.periods.clone()),
        };

        Ok(SolverConfig {
            constraints,
            search,
            paths,
        })
    }

    fn merge_window(&self, user: &UserDisplayWindow) -> Result<DisplayWindow, ConfigError> {
        let defaults = &self.display_window;
        let weekdays = match &user.weekdays {
            Some(days) => parse_weekdays("display_window.weekdays", days)?,
            None => defaults.weekdays.clone(),
        };
        let first = match &user.first_period {
            Some(p) => p.to_u8("display_window.first_period")?,
            None => defaults.first_period,
        };
        let last = match &user.last_period {
            Some(p) => p.to_u8("display_window.last_period")?,
            None => defaults.last_period,
        };
        if first == 0 || first > last {
            return Err(ConfigError::InvalidValue {
                key: "display_window",
                value: format!("periods {first}..={last}"),
            });
        }
        Ok(DisplayWindow::new(weekdays, first, last))
    }
}

fn leaf_u32(
    value: &Option<NumberLike>,
    key: &'static str,
    default: u32,
) -> Result<u32, ConfigError> {
    value.as_ref().map_or(Ok(default), |v| v.to_u32(key))
}

fn parse_weekday(key: &'static str, value: &str) -> Result<Weekday, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidWeekday {
        key,
        value: value.to_string(),
    })
}

fn parse_weekdays(key: &'static str, values: &[String]) -> Result<BTreeSet<Weekday>, ConfigError> {
    values.iter().map(|v| parse_weekday(key, v)).collect()
}
