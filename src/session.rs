//! Interactive edit session as an explicit state machine.
//!
//! The session holds the ranked candidates and a private working copy of
//! the one being edited. It performs no I/O; a front end maps user input
//! to transitions and renders the state.
//!
//! # States
//!
//! | State | Transitions |
//! |-------|-------------|
//! | Browsing | `select` -> Editing, `finish` -> Done |
//! | Editing | `apply` -> Editing, `discard` -> Browsing, `finish` -> Done |
//! | Done | none |

use crate::error::SessionError;
use crate::models::Timetable;
use crate::scheduler::{EditAction, TimetableCandidate, TimetableEditor};

/// Current session state.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Browsing,
    Editing {
        /// Index into the candidate list.
        candidate: usize,
        /// Private copy receiving edits.
        working: Timetable,
    },
    Done {
        /// The edited timetable, if the session ended while editing.
        timetable: Option<Timetable>,
    },
}

impl SessionState {
    fn name(&self) -> &'static str {
        match self {
            SessionState::Browsing => "browsing",
            SessionState::Editing { .. } => "editing",
            SessionState::Done { .. } => "done",
        }
    }
}

/// Edit session over a set of candidates.
#[derive(Debug, Clone)]
pub struct EditSession<'a> {
    editor: TimetableEditor<'a>,
    candidates: Vec<TimetableCandidate>,
    state: SessionState,
}

impl<'a> EditSession<'a> {
    pub fn new(editor: TimetableEditor<'a>, candidates: Vec<TimetableCandidate>) -> Self {
        Self {
            editor,
            candidates,
            state: SessionState::Browsing,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn candidates(&self) -> &[TimetableCandidate] {
        &self.candidates
    }

    /// The timetable being edited, if any.
    pub fn working(&self) -> Option<&Timetable> {
        match &self.state {
            SessionState::Editing { working, .. } => Some(working),
            _ => None,
        }
    }

    /// Starts editing a copy of candidate `index`.
    pub fn select(&mut self, index: usize) -> Result<(), SessionError> {
        self.expect_state("select", |s| matches!(s, SessionState::Browsing))?;
        let working = self
            .candidates
            .get(index)
            .ok_or(SessionError::NoSuchCandidate {
                index,
                count: self.candidates.len(),
            })?
            .timetable
            .clone();
        self.state = SessionState::Editing {
            candidate: index,
            working,
        };
        Ok(())
    }

    /// Applies an edit to the working copy. A refused edit leaves it unchanged.
    pub fn apply(&mut self, action: &EditAction) -> Result<&Timetable, SessionError> {
        let state = self.state.name();
        let SessionState::Editing { working, .. } = &mut self.state else {
            return Err(SessionError::InvalidTransition {
                action: "apply an edit",
                state,
            });
        };
        *working = self.editor.apply_edit(working, action)?;
        Ok(working)
    }

    /// Drops the working copy and returns to browsing.
    pub fn discard(&mut self) -> Result<(), SessionError> {
        self.expect_state("discard", |s| matches!(s, SessionState::Editing { .. }))?;
        self.state = SessionState::Browsing;
        Ok(())
    }

    /// Ends the session, returning the working copy if editing.
    pub fn finish(&mut self) -> Result<Option<Timetable>, SessionError> {
        let timetable = match &self.state {
            SessionState::Browsing => None,
            SessionState::Editing { working, .. } => Some(working.clone()),
            SessionState::Done { .. } => {
                return Err(SessionError::InvalidTransition {
                    action: "finish",
                    state: "done",
                })
            }
        };
        self.state = SessionState::Done {
            timetable: timetable.clone(),
        };
        Ok(timetable)
    }

    fn expect_state(
        &self,
        action: &'static str,
        allowed: impl Fn(&SessionState) -> bool,
    ) -> Result<(), SessionError> {
        if allowed(&self.state) {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                action,
                state: self.state.name(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EditError;
    use crate::models::{Catalog, ConstraintSet, Course};
    use std::sync::Arc;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Course::new("A100").with_schedule("1/M").with_credits(2),
            Course::new("B100").with_schedule("2/M").with_credits(2),
        ])
    }

    fn candidates(catalog: &Catalog) -> Vec<TimetableCandidate> {
        vec![TimetableCandidate {
            pattern_key: "1/M".into(),
            pattern_score: 1,
            timetable: Timetable::from_courses(vec![Arc::clone(catalog.get("A100").unwrap())]),
            relaxed: false,
        }]
    }

    #[test]
    fn test_edit_flow() {
        let catalog = catalog();
        let constraints = ConstraintSet::new(0, 6);
        let mut session = EditSession::new(
            TimetableEditor::new(&catalog, &constraints),
            candidates(&catalog),
        );

        session.select(0).unwrap();
        let edited = session.apply(&EditAction::Add("B100".into())).unwrap();
        assert_eq!(edited.course_ids(), vec!["A100", "B100"]);
        // The candidate itself is untouched.
        assert_eq!(session.candidates()[0].timetable.len(), 1);

        let done = session.finish().unwrap().unwrap();
        assert_eq!(done.len(), 2);
        assert!(matches!(session.state(), SessionState::Done { .. }));
    }

    #[test]
    fn test_refused_edit_keeps_working_copy() {
        let catalog = catalog();
        let constraints = ConstraintSet::new(0, 6);
        let mut session = EditSession::new(
            TimetableEditor::new(&catalog, &constraints),
            candidates(&catalog),
        );
        session.select(0).unwrap();
        let err = session.apply(&EditAction::Remove("B100".into())).unwrap_err();
        assert_eq!(err, SessionError::Edit(EditError::NotPresent("B100".into())));
        assert_eq!(session.working().unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_transitions() {
        let catalog = catalog();
        let constraints = ConstraintSet::new(0, 6);
        let mut session = EditSession::new(
            TimetableEditor::new(&catalog, &constraints),
            candidates(&catalog),
        );

        assert!(matches!(
            session.apply(&EditAction::Add("B100".into())),
            Err(SessionError::InvalidTransition { state: "browsing", .. })
        ));
        assert!(session.discard().is_err());
        assert_eq!(
            session.select(3).unwrap_err(),
            SessionError::NoSuchCandidate { index: 3, count: 1 }
        );

        session.select(0).unwrap();
        session.discard().unwrap();
        assert_eq!(session.state(), &SessionState::Browsing);

        assert_eq!(session.finish().unwrap(), None);
        assert!(session.finish().is_err());
        assert!(session.select(0).is_err());
    }
}
