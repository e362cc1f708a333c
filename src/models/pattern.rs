//! Time-slot patterns.
//!
//! A pattern is a slot combination that recurs in the catalog, keyed by
//! its schedule signature (e.g. `"3/TU,2/TH"`), together with the ids of
//! the courses that meet in exactly that combination.
//!
//! # File Format
//! ```json
//! {
//!     "3/TU,2/TH": {
//!         "schedule": [["TU", 3], ["TH", 2]],
//!         "courses": ["GEC101", "PHY261"]
//!     }
//! }
//! ```
//! Document order is preserved; it decides ties when patterns score
//! equally.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::Path;

use tracing::debug;

use super::slot::{parse_schedule_strict, Slot};
use super::Catalog;
use crate::error::LoadError;

/// A named slot-combination signature and the courses that use it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    /// Signature key (the raw schedule string).
    pub key: String,
    /// Parsed (weekday, period) pairs.
    pub slots: Vec<Slot>,
    /// Ids of courses observed with exactly this combination.
    pub course_ids: Vec<String>,
}

impl Pattern {
    pub fn new(key: impl Into<String>, slots: Vec<Slot>, course_ids: Vec<String>) -> Self {
        Self {
            key: key.into(),
            slots,
            course_ids,
        }
    }

    /// Slots as a set.
    pub fn slot_set(&self) -> BTreeSet<Slot> {
        self.slots.iter().copied().collect()
    }
}

#[derive(Serialize, Deserialize)]
struct PatternEntry {
    #[serde(default)]
    schedule: Vec<Slot>,
    #[serde(default)]
    courses: Vec<String>,
}

/// Ordered collection of patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternLibrary {
    patterns: Vec<Pattern>,
    index: HashMap<String, usize>,
}

impl PatternLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a pattern; a pattern with the same key is replaced in place.
    pub fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.insert(pattern);
        self
    }

    /// Adds a pattern; a pattern with the same key is replaced in place.
    pub fn insert(&mut self, pattern: Pattern) {
        match self.index.get(&pattern.key) {
            Some(&i) => self.patterns[i] = pattern,
            None => {
                self.index.insert(pattern.key.clone(), self.patterns.len());
                self.patterns.push(pattern);
            }
        }
    }

    /// Derives patterns from a catalog.
    ///
    /// Courses are grouped by their raw schedule string in catalog order.
    /// A group becomes a pattern only if every token of its schedule
    /// string parses; empty and partially malformed strings are skipped.
    pub fn discover(catalog: &Catalog) -> Self {
        let mut groups: Vec<(String, Vec<String>)> = Vec::new();
        let mut group_index: HashMap<&str, usize> = HashMap::new();

        for course in catalog.iter() {
            match group_index.get(course.schedule()) {
                Some(&i) => groups[i].1.push(course.id().to_string()),
                None => {
                    group_index.insert(course.schedule(), groups.len());
                    groups.push((course.schedule().to_string(), vec![course.id().to_string()]));
                }
            }
        }

        let mut library = Self::new();
        let mut skipped = 0usize;
        for (key, course_ids) in groups {
            match parse_schedule_strict(&key) {
                Some(slots) => library.insert(Pattern::new(key, slots, course_ids)),
                None => skipped += 1,
            }
        }
        debug!(
            patterns = library.len(),
            skipped, "discovered slot patterns from catalog"
        );
        library
    }

    /// Parses a pattern file.
    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        serde_json::from_str(json).map_err(|source| LoadError::Json {
            what: "pattern library",
            source,
        })
    }

    /// Reads a pattern file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let text = LoadError::read(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Serializes to the pattern file format.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn get(&self, key: &str) -> Option<&Pattern> {
        self.index.get(key).map(|&i| &self.patterns[i])
    }

    /// Patterns in document order.
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Serialize for PatternLibrary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.patterns.len()))?;
        for pattern in &self.patterns {
            map.serialize_entry(
                &pattern.key,
                &PatternEntry {
                    schedule: pattern.slots.clone(),
                    courses: pattern.course_ids.clone(),
                },
            )?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PatternLibrary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LibraryVisitor;

        impl<'de> Visitor<'de> for LibraryVisitor {
            type Value = PatternLibrary;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from pattern keys to {schedule, courses} entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut library = PatternLibrary::new();
                while let Some((key, entry)) = map.next_entry::<String, PatternEntry>()? {
                    library.insert(Pattern::new(key, entry.schedule, entry.courses));
                }
                Ok(library)
            }
        }

        deserializer.deserialize_map(LibraryVisitor)
    }
}
