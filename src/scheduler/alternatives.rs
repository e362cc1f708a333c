//! Swap and addition discovery for a finished timetable.
//!
//! # Rules
//!
//! For a non-mandatory member `C`, a course `X` (valid, not in the
//! timetable, `X != C`) is a **swap** iff `X` conflicts with `C` and with
//! no other member. Replacing `C` by `X` therefore keeps the timetable
//! conflict-free.
//!
//! `X` is an **addition** iff it conflicts with no member and the
//! timetable's credits plus `X`'s stay within `max_credits`.
//!
//! Lists are ordered by (subject, id).

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::models::{Catalog, ConstraintSet, Course, Timetable};

/// A drop-in replacement for one member.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwapOption {
    pub course: Arc<Course>,
    /// Whether the swapped timetable stays within `max_credits`.
    pub within_credit_cap: bool,
}

/// Swaps per member and additions for one timetable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlternativeReport {
    /// Member id to its swap options. Members without options are absent.
    pub swaps: BTreeMap<String, Vec<SwapOption>>,
    pub additions: Vec<Arc<Course>>,
}

impl AlternativeReport {
    pub fn swaps_for(&self, id: &str) -> &[SwapOption] {
        self.swaps.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.swaps.is_empty() && self.additions.is_empty()
    }
}

/// Finds swaps and additions against a catalog.
#[derive(Debug, Clone, Copy)]
pub struct AlternativeFinder<'a> {
    catalog: &'a Catalog,
    constraints: &'a ConstraintSet,
}

impl<'a> AlternativeFinder<'a> {
    pub fn new(catalog: &'a Catalog, constraints: &'a ConstraintSet) -> Self {
        Self {
            catalog,
            constraints,
        }
    }

    /// Swap options for member `id`. Empty if `id` is not a member.
    pub fn swaps_for(&self, timetable: &Timetable, id: &str) -> Vec<SwapOption> {
        let Some(member) = timetable.get(id) else {
            return Vec::new();
        };
        let credits_without = timetable.total_credits().saturating_sub(member.credits);

        let mut options: Vec<SwapOption> = self
            .outside_candidates(timetable)
            .filter(|x| x.conflicts_with(member))
            .filter(|x| {
                timetable
                    .courses()
                    .iter()
                    .all(|other| other.id() == id || !other.conflicts_with(x))
            })
            .map(|x| SwapOption {
                within_credit_cap: self
                    .constraints
                    .within_budget(credits_without, x.credits)
                    .is_some(),
                course: Arc::clone(x),
            })
            .collect();
        options.sort_by(|a, b| subject_order(&a.course, &b.course));
        options
    }

    /// Courses that fit alongside every member.
    pub fn additions(&self, timetable: &Timetable) -> Vec<Arc<Course>> {
        let credits = timetable.total_credits();
        let mut additions: Vec<Arc<Course>> = self
            .outside_candidates(timetable)
            .filter(|x| self.constraints.within_budget(credits, x.credits).is_some())
            .filter(|x| !timetable.conflicts_with(x))
            .cloned()
            .collect();
        additions.sort_by(|a, b| subject_order(a, b));
        additions
    }

    /// Full report. Mandatory members get no swap entry.
    pub fn report(&self, timetable: &Timetable) -> AlternativeReport {
        let swaps = timetable
            .courses()
            .iter()
            .filter(|member| !self.constraints.is_mandatory(member.id()))
            .filter_map(|member| {
                let options = self.swaps_for(timetable, member.id());
                (!options.is_empty()).then(|| (member.id().to_string(), options))
            })
            .collect();
        AlternativeReport {
            swaps,
            additions: self.additions(timetable),
        }
    }

    /// Valid catalog courses not in the timetable.
    fn outside_candidates<'t>(
        &self,
        timetable: &'t Timetable,
    ) -> impl Iterator<Item = &'a Arc<Course>> + 't
    where
        'a: 't,
    {
        let catalog: &'a Catalog = self.catalog;
        let constraints: &'a ConstraintSet = self.constraints;
        catalog
            .iter()
            .filter(move |x| !timetable.contains(x.id()) && constraints.is_valid(x))
    }
}

fn subject_order(a: &Course, b: &Course) -> std::cmp::Ordering {
    (a.subject(), a.id()).cmp(&(b.subject(), b.id()))
}
