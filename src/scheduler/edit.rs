//! Pure timetable edits.
//!
//! [`TimetableEditor::apply_edit`] never mutates its input: it returns a
//! new timetable or the reason the edit was refused.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EditError;
use crate::models::{Catalog, ConstraintSet, Timetable};

/// An edit to a selected timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "id", rename_all = "snake_case")]
pub enum EditAction {
    /// Add a catalog course by id.
    Add(String),
    /// Remove a member by id.
    Remove(String),
}

/// Applies edits under one catalog and constraint set.
#[derive(Debug, Clone, Copy)]
pub struct TimetableEditor<'a> {
    catalog: &'a Catalog,
    constraints: &'a ConstraintSet,
}

impl<'a> TimetableEditor<'a> {
    pub fn new(catalog: &'a Catalog, constraints: &'a ConstraintSet) -> Self {
        Self {
            catalog,
            constraints,
        }
    }

    /// Returns the edited copy of `timetable`.
    ///
    /// # Errors
    /// - `Add`: unknown id, already a member, excluded or out of level
    ///   band, conflicting with a member, or over `max_credits`.
    /// - `Remove`: not a member, or a mandatory course.
    pub fn apply_edit(
        &self,
        timetable: &Timetable,
        action: &EditAction,
    ) -> Result<Timetable, EditError> {
        match action {
            EditAction::Add(id) => {
                let course = self
                    .catalog
                    .get(id)
                    .ok_or_else(|| EditError::UnknownCourse(id.clone()))?;
                if timetable.contains(id) {
                    return Err(EditError::AlreadyPresent(id.clone()));
                }
                if !self.constraints.is_valid(course) {
                    return Err(EditError::Excluded(id.clone()));
                }
                if let Some(member) = timetable.conflicting_member(course) {
                    return Err(EditError::Conflict {
                        course: id.clone(),
                        with: member.id().to_string(),
                    });
                }
                let current = timetable.total_credits();
                let Some(credits) = self.constraints.within_budget(current, course.credits) else {
                    return Err(EditError::OverCreditLimit {
                        credits: current.saturating_add(course.credits),
                        max: self.constraints.max_credits,
                    });
                };
                debug!(course = %id, credits, "added course");
                Ok(timetable.with_course(Arc::clone(course)))
            }
            EditAction::Remove(id) => {
                if !timetable.contains(id) {
                    return Err(EditError::NotPresent(id.clone()));
                }
                if self.constraints.is_mandatory(id) {
                    return Err(EditError::MandatoryCourse(id.clone()));
                }
                debug!(course = %id, "removed course");
                Ok(timetable.without(id))
            }
        }
    }
}
