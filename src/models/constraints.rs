//! Student constraint set.
//!
//! Hard and soft restrictions on which courses may be taken:
//! credit band, mandatory/excluded/desired courses, off days,
//! unavailable slots, and per-subject-group level bands.
//!
//! # Validity
//! A course is *valid* (selectable) iff its id is not excluded, its
//! subject is not an excluded prefix, and its level lies inside the band
//! of its subject group (major subjects vs. everything else). Validity
//! is evaluated per call and never cached.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

use super::slot::{Slot, Weekday};
use super::{Catalog, Course};
use crate::error::ConfigError;

/// Default upper level bound ("no limit").
pub const MAX_LEVEL: u32 = 9999;

/// Inclusive course-level range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelBand {
    pub min_level: u32,
    pub max_level: u32,
}

impl LevelBand {
    pub fn new(min_level: u32, max_level: u32) -> Self {
        Self {
            min_level,
            max_level,
        }
    }

    /// The unrestricted band `0..=9999`.
    pub fn unrestricted() -> Self {
        Self::new(0, MAX_LEVEL)
    }

    #[inline]
    pub fn contains(&self, level: u32) -> bool {
        self.min_level <= level && level <= self.max_level
    }
}

impl Default for LevelBand {
    fn default() -> Self {
        Self::unrestricted()
    }
}

/// Explicit set of major subject codes with their level band.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MajorSubjects {
    pub codes: BTreeSet<String>,
    pub band: LevelBand,
}

/// Validated constraint set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintSet {
    /// Minimum total credits (inclusive).
    pub min_credits: u32,
    /// Maximum total credits (inclusive).
    pub max_credits: u32,
    /// Courses every timetable must contain, in configured order.
    pub mandatory_course_ids: Vec<String>,
    /// Exactly excluded course ids.
    pub excluded_course_ids: BTreeSet<String>,
    /// Excluded subject codes.
    pub excluded_subject_prefixes: BTreeSet<String>,
    /// Preferred courses (soft).
    pub desired_course_ids: BTreeSet<String>,
    /// Weekdays on which no course may meet.
    pub off_days: BTreeSet<Weekday>,
    /// Slots to avoid unless the fill has to relax them.
    pub unavailable_slots: BTreeSet<Slot>,
    /// Level band for major subjects.
    pub major_subjects: MajorSubjects,
    /// Level band for every other subject.
    pub other_subjects: LevelBand,
}

impl ConstraintSet {
    /// Creates a constraint set with the given credit band and nothing else.
    pub fn new(min_credits: u32, max_credits: u32) -> Self {
        Self {
            min_credits,
            max_credits,
            mandatory_course_ids: Vec::new(),
            excluded_course_ids: BTreeSet::new(),
            excluded_subject_prefixes: BTreeSet::new(),
            desired_course_ids: BTreeSet::new(),
            off_days: BTreeSet::new(),
            unavailable_slots: BTreeSet::new(),
            major_subjects: MajorSubjects::default(),
            other_subjects: LevelBand::unrestricted(),
        }
    }

    /// Sets mandatory course ids.
    pub fn with_mandatory<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mandatory_course_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Adds exclusion tokens.
    ///
    /// A token made only of uppercase ASCII letters excludes a whole
    /// subject (`"PHY"`); anything else excludes one course id.
    pub fn with_excluded<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for token in tokens {
            let token = token.into();
            if is_subject_prefix(&token) {
                self.excluded_subject_prefixes.insert(token);
            } else {
                self.excluded_course_ids.insert(token);
            }
        }
        self
    }

    /// Sets desired course ids.
    pub fn with_desired<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.desired_course_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Sets off days.
    pub fn with_off_days(mut self, days: impl IntoIterator<Item = Weekday>) -> Self {
        self.off_days = days.into_iter().collect();
        self
    }

    /// Sets unavailable slots.
    pub fn with_unavailable(mut self, slots: impl IntoIterator<Item = Slot>) -> Self {
        self.unavailable_slots = slots.into_iter().collect();
        self
    }

    /// Sets the major subject codes and their level band.
    pub fn with_major_subjects<I, S>(mut self, codes: I, band: LevelBand) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.major_subjects = MajorSubjects {
            codes: codes.into_iter().map(Into::into).collect(),
            band,
        };
        self
    }

    /// Sets the level band for non-major subjects.
    pub fn with_other_subjects(mut self, band: LevelBand) -> Self {
        self.other_subjects = band;
        self
    }

    /// Checks internal consistency (credit band ordering).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_credits > self.max_credits {
            return Err(ConfigError::CreditRange {
                min: self.min_credits,
                max: self.max_credits,
            });
        }
        Ok(())
    }

    /// Level band applying to a subject.
    pub fn level_band_for(&self, subject: &str) -> LevelBand {
        if self.major_subjects.codes.contains(subject) {
            self.major_subjects.band
        } else {
            self.other_subjects
        }
    }

    /// Whether a course may be selected at all.
    pub fn is_valid(&self, course: &Course) -> bool {
        if self.excluded_course_ids.contains(course.id())
            || self.excluded_subject_prefixes.contains(course.subject())
        {
            return false;
        }
        self.level_band_for(course.subject()).contains(course.level())
    }

    pub fn is_mandatory(&self, id: &str) -> bool {
        self.mandatory_course_ids.iter().any(|m| m == id)
    }

    pub fn is_desired(&self, id: &str) -> bool {
        self.desired_course_ids.contains(id)
    }

    /// Whether every slot avoids off days and, unless ignored, unavailable slots.
    pub fn slots_allowed<'a>(
        &self,
        slots: impl IntoIterator<Item = &'a Slot>,
        ignore_unavailable: bool,
    ) -> bool {
        slots.into_iter().all(|slot| {
            !self.off_days.contains(&slot.weekday)
                && (ignore_unavailable || !self.unavailable_slots.contains(slot))
        })
    }

    /// Total after adding `extra` credits, if it stays within `max_credits`.
    ///
    /// A sum that overflows `u32` is over the limit.
    #[inline]
    pub fn within_budget(&self, credits: u32, extra: u32) -> Option<u32> {
        credits
            .checked_add(extra)
            .filter(|total| *total <= self.max_credits)
    }

    /// Whether a credit total lies inside `[min_credits, max_credits]`.
    #[inline]
    pub fn credits_in_band(&self, credits: u32) -> bool {
        self.min_credits <= credits && credits <= self.max_credits
    }

    /// Looks up the mandatory courses and checks they are feasible alone.
    ///
    /// # Errors
    /// - an id is not in the catalog
    /// - two mandatory courses conflict
    /// - their credits exceed `max_credits`
    pub fn resolve_mandatory(&self, catalog: &Catalog) -> Result<Vec<Arc<Course>>, ConfigError> {
        let mut courses: Vec<Arc<Course>> = Vec::with_capacity(self.mandatory_course_ids.len());
        for id in &self.mandatory_course_ids {
            let course = catalog
                .get(id)
                .ok_or_else(|| ConfigError::UnknownMandatoryCourse(id.clone()))?;
            if courses.iter().any(|c| c.id() == course.id()) {
                continue;
            }
            if let Some(other) = courses.iter().find(|c| c.conflicts_with(course)) {
                return Err(ConfigError::MandatoryConflict {
                    first: other.id().to_string(),
                    second: course.id().to_string(),
                });
            }
            courses.push(Arc::clone(course));
        }

        let credits = courses
            .iter()
            .fold(0u32, |sum, c| sum.saturating_add(c.credits));
        if credits > self.max_credits {
            return Err(ConfigError::MandatoryOverCreditLimit {
                credits,
                max: self.max_credits,
            });
        }
        Ok(courses)
    }
}

fn is_subject_prefix(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_uppercase())
}
