//! Course catalog.
//!
//! Ordered, id-indexed collection of courses. Built once from the
//! normalized course table and never mutated afterwards.
//!
//! # Record Format
//! Records follow the normalized table columns (`CourseNo`, `Language`,
//! `TitleEN`, `TitleJA`, `Schedule`, `Classroom`, `Mode`, `Instructor`,
//! `Credits`, `Links`). Every column except the id is optional; credits
//! that are not a non-negative integer count as 0.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use super::Course;
use crate::error::LoadError;

/// One row of the normalized course table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourseRecord {
    #[serde(rename = "CourseNo", alias = "course_no", alias = "no", alias = "id")]
    pub course_no: String,
    #[serde(rename = "Language", alias = "language", default)]
    pub language: String,
    #[serde(rename = "TitleEN", alias = "title_en", default)]
    pub title_en: String,
    #[serde(rename = "TitleJA", alias = "title_ja", default)]
    pub title_ja: String,
    #[serde(rename = "Schedule", alias = "schedule", default)]
    pub schedule: String,
    #[serde(rename = "Classroom", alias = "classroom", default)]
    pub classroom: String,
    #[serde(rename = "Mode", alias = "mode", default)]
    pub mode: String,
    #[serde(rename = "Instructor", alias = "instructor", default)]
    pub instructor: String,
    #[serde(
        rename = "Credits",
        alias = "credits",
        default,
        deserialize_with = "lenient_credits"
    )]
    pub credits: u32,
    #[serde(rename = "Links", alias = "links", alias = "link", default)]
    pub links: String,
}

impl CourseRecord {
    /// Converts the record into a course, parsing its schedule.
    pub fn into_course(self) -> Course {
        Course::new(self.course_no.trim())
            .with_language(self.language)
            .with_titles(self.title_en, self.title_ja)
            .with_schedule(self.schedule)
            .with_classroom(self.classroom)
            .with_mode(self.mode)
            .with_instructor(self.instructor)
            .with_credits(self.credits)
            .with_link(self.links)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCredits {
    Integer(u64),
    Float(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

fn lenient_credits<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let credits = match RawCredits::deserialize(deserializer)? {
        RawCredits::Integer(n) => u32::try_from(n).unwrap_or(0),
        RawCredits::Float(f) if f.is_finite() && f >= 0.0 && f <= f64::from(u32::MAX) => f as u32,
        RawCredits::Text(s) => s.trim().parse::<u32>().unwrap_or(0),
        RawCredits::Float(_) | RawCredits::Other(_) => 0,
    };
    Ok(credits)
}

/// Ordered collection of courses, indexed by id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    courses: Vec<Arc<Course>>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Builds a catalog from courses. Duplicate ids keep the first course.
    pub fn new(courses: impl IntoIterator<Item = Course>) -> Self {
        let mut catalog = Self::default();
        for course in courses {
            if catalog.index.contains_key(course.id()) {
                warn!(course = course.id(), "duplicate course id, keeping first");
                continue;
            }
            catalog
                .index
                .insert(course.id().to_string(), catalog.courses.len());
            catalog.courses.push(Arc::new(course));
        }

        let malformed = catalog.malformed_schedule_count();
        if malformed > 0 {
            warn!(
                courses = malformed,
                "schedule strings with unparsable tokens; affected courses keep partial slot sets"
            );
        }
        debug!(courses = catalog.len(), "catalog built");
        catalog
    }

    /// Builds a catalog from normalized table records.
    pub fn from_records(records: impl IntoIterator<Item = CourseRecord>) -> Self {
        Self::new(
            records
                .into_iter()
                .filter(|r| !r.course_no.trim().is_empty())
                .map(CourseRecord::into_course),
        )
    }

    /// Parses a JSON array of records.
    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        let records: Vec<CourseRecord> =
            serde_json::from_str(json).map_err(|source| LoadError::Json {
                what: "course catalog",
                source,
            })?;
        Ok(Self::from_records(records))
    }

    /// Reads a JSON array of records from a file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let text = LoadError::read(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Looks up a course by id.
    pub fn get(&self, id: &str) -> Option<&Arc<Course>> {
        self.index.get(id).map(|&i| &self.courses[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Courses in catalog order.
    pub fn courses(&self) -> &[Arc<Course>] {
        &self.courses
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Course>> {
        self.courses.iter()
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Number of courses whose schedule string had unparsable tokens.
    pub fn malformed_schedule_count(&self) -> usize {
        self.courses
            .iter()
            .filter(|c| c.malformed_tokens() > 0)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_preserves_order_and_index() {
        let catalog = Catalog::new(vec![
            Course::new("B200"),
            Course::new("A100"),
            Course::new("C300"),
        ]);
        let ids: Vec<&str> = catalog.iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["B200", "A100", "C300"]);
        assert_eq!(catalog.get("A100").unwrap().id(), "A100");
        assert!(catalog.get("Z999").is_none());
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let catalog = Catalog::new(vec![
            Course::new("A100").with_credits(2),
            Course::new("A100").with_credits(4),
        ]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("A100").unwrap().credits, 2);
    }

    #[test]
    fn test_records_from_json_lenient() {
        let json = r#"[
            {"CourseNo": "GEC101", "TitleEN": "Intro", "Schedule": "3/TU,2/TH", "Credits": "3"},
            {"CourseNo": "PHY261", "Schedule": "1/M", "Credits": 2},
            {"CourseNo": "ELA060", "Credits": "TBA"},
            {"course_no": "MAT100", "credits": null, "unknown_column": 1},
            {"CourseNo": "  "}
        ]"#;
        let catalog = Catalog::from_json_str(json).unwrap();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.get("GEC101").unwrap().credits, 3);
        assert_eq!(catalog.get("PHY261").unwrap().credits, 2);
        assert_eq!(catalog.get("ELA060").unwrap().credits, 0);
        assert!(catalog.get("ELA060").unwrap().is_unscheduled());
        assert_eq!(catalog.get("MAT100").unwrap().credits, 0);
    }

    #[test]
    fn test_malformed_schedule_count() {
        let catalog = Catalog::new(vec![
            Course::new("A100").with_schedule("1/M"),
            Course::new("B100").with_schedule("1/M, TBA"),
        ]);
        assert_eq!(catalog.malformed_schedule_count(), 1);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            Catalog::from_json_str("{not json"),
            Err(LoadError::Json { .. })
        ));
    }
}
