//! Error types.
//!
//! - [`LoadError`]: reading or decoding an input file.
//! - [`ConfigError`]: invalid or infeasible configuration. Aborts a run.
//! - [`SolveError`]: why a run produced no candidates.
//! - [`EditError`]: why an edit to a timetable was refused.
//! - [`SessionError`]: an edit-session transition that is not allowed.
//! - [`ExportError`]: period definitions unusable for calendar export.
//!
//! Conflicts and exclusions met during the search are filtering
//! decisions, not errors. Data-integrity problems (unknown course ids in
//! patterns, malformed schedule strings) are reported by
//! [`crate::validation`] and logged, never raised.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure to read or decode an input file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed {what}: {source}")]
    Json {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    pub(crate) fn read(path: &Path) -> Result<String, LoadError> {
        std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Invalid or infeasible configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for '{key}': {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("invalid weekday in '{key}': {value}")]
    InvalidWeekday { key: &'static str, value: String },
    #[error("min_credits ({min}) exceeds max_credits ({max})")]
    CreditRange { min: u32, max: u32 },
    #[error("mandatory course '{0}' is not in the catalog")]
    UnknownMandatoryCourse(String),
    #[error("mandatory courses '{first}' and '{second}' conflict")]
    MandatoryConflict { first: String, second: String },
    #[error("mandatory courses alone total {credits} credits, above max_credits ({max})")]
    MandatoryOverCreditLimit { credits: u32, max: u32 },
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Outcome of a search that produced no timetable.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("no pattern avoids the off days, unavailable slots and mandatory slots")]
    NoEligiblePatterns,
    #[error("no candidate reached the credit band ({patterns_tried} patterns tried)")]
    Unsatisfiable { patterns_tried: usize },
}

impl SolveError {
    /// Whether the run should abort. "No candidates" outcomes are not fatal.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SolveError::Config(_))
    }
}

/// Refusal of a timetable edit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("course '{0}' is not in the catalog")]
    UnknownCourse(String),
    #[error("course '{0}' is already in the timetable")]
    AlreadyPresent(String),
    #[error("course '{0}' is not in the timetable")]
    NotPresent(String),
    #[error("course '{0}' is mandatory and cannot be removed")]
    MandatoryCourse(String),
    #[error("course '{0}' is excluded by the current constraints")]
    Excluded(String),
    #[error("course '{course}' conflicts with '{with}'")]
    Conflict { course: String, with: String },
    #[error("adding the course would total {credits} credits, above max_credits ({max})")]
    OverCreditLimit { credits: u32, max: u32 },
}

/// Invalid edit-session transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
    #[error("no candidate #{index} ({count} available)")]
    NoSuchCandidate { index: usize, count: usize },
    #[error(transparent)]
    Edit(#[from] EditError),
}

/// Period definitions unusable for calendar export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("unknown schedule type '{0}'")]
    UnknownScheduleType(String),
    #[error("invalid time '{value}' for period {period}")]
    InvalidTime { period: String, value: String },
    #[error(transparent)]
    Load(#[from] LoadError),
}
