//! Catalog store: the immutable set of courses the bot knows about.
//!
//! The catalog is loaded once from a JSON metadata file and shared read-only
//! between requests. Two layouts are accepted:
//!
//! - an array, where position `i` is course id `i` (the scraper's output), and
//! - an object keyed by decimal ids, which acts as an explicit id mapping.

mod record;

pub use record::{CourseId, CourseRecord, Curriculum};

use crate::error::{CourseBotError, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, instrument};

/// In-memory course catalog keyed by id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: BTreeMap<CourseId, CourseRecord>,
}

impl Catalog {
    /// Build a catalog from explicit `(id, record)` pairs.
    pub fn new(records: impl IntoIterator<Item = (CourseId, CourseRecord)>) -> Self {
        Self {
            records: records.into_iter().collect(),
        }
    }

    /// Build a catalog where each record's id is its position.
    pub fn from_records(records: Vec<CourseRecord>) -> Self {
        Self::new(
            records
                .into_iter()
                .enumerate()
                .map(|(i, r)| (i as CourseId, r)),
        )
    }

    /// Parse a catalog from JSON text in either accepted layout.
    pub fn from_json(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content)?;

        match value {
            Value::Array(items) => {
                let records = items
                    .into_iter()
                    .map(serde_json::from_value::<CourseRecord>)
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(Self::from_records(records))
            }
            Value::Object(map) => {
                let mut records = BTreeMap::new();
                for (key, item) in map {
                    let id: CourseId = key.trim().parse().map_err(|_| {
                        CourseBotError::Catalog(format!("Metadata key '{}' is not a course id", key))
                    })?;
                    records.insert(id, serde_json::from_value(item)?);
                }
                Ok(Self { records })
            }
            _ => Err(CourseBotError::Catalog(
                "Metadata must be a JSON array or an object keyed by course id".to_string(),
            )),
        }
    }

    /// Load a catalog from a JSON file.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CourseBotError::Catalog(format!(
                "Metadata file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&content)?;
        info!("Loaded {} courses from {:?}", catalog.len(), path);
        Ok(catalog)
    }

    /// Write the catalog as an id-keyed JSON object.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let keyed: BTreeMap<String, &CourseRecord> = self
            .records
            .iter()
            .map(|(id, record)| (id.to_string(), record))
            .collect();
        std::fs::write(path, serde_json::to_string_pretty(&keyed)?)?;
        Ok(())
    }

    /// Look up a course by id.
    pub fn get(&self, id: CourseId) -> Option<&CourseRecord> {
        self.records.get(&id)
    }

    /// Number of courses.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the catalog has no courses.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate courses in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (CourseId, &CourseRecord)> {
        self.records.iter().map(|(id, record)| (*id, record))
    }
}
