//! Exact in-memory vector index.
//!
//! Brute-force scan over every stored vector; the catalog is small enough
//! that no approximate structure is needed.

use super::{squared_l2_distance, IndexEntry, SearchHit, VectorIndex};
use crate::catalog::CourseId;
use crate::error::{CourseBotError, Result};
use async_trait::async_trait;

/// Flat (exhaustive) squared-L2 index.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dimensions: usize,
    entries: Vec<IndexEntry>,
}

impl FlatIndex {
    /// Create an empty index for vectors of the given dimensionality.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            entries: Vec::new(),
        }
    }

    /// Create an index from pre-built entries, checking every dimension.
    pub fn from_entries(dimensions: usize, entries: Vec<IndexEntry>) -> Result<Self> {
        let mut index = Self::new(dimensions);
        for entry in entries {
            index.add(entry.course_id, entry.embedding)?;
        }
        Ok(index)
    }

    /// Append a vector. Insertion order breaks distance ties.
    pub fn add(&mut self, course_id: CourseId, embedding: Vec<f32>) -> Result<()> {
        if embedding.len() != self.dimensions {
            return Err(CourseBotError::Index(format!(
                "Vector for course {} has {} dimensions, index expects {}",
                course_id,
                embedding.len(),
                self.dimensions
            )));
        }
        self.entries.push(IndexEntry { course_id, embedding });
        Ok(())
    }

    /// Stored entries in insertion order.
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }
}

#[async_trait]
impl VectorIndex for FlatIndex {
    async fn search(&self, query_embedding: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if query_embedding.len() != self.dimensions {
            return Err(CourseBotError::Index(format!(
                "Query has {} dimensions, index expects {}",
                query_embedding.len(),
                self.dimensions
            )));
        }

        let mut hits: Vec<SearchHit> = self
            .entries
            .iter()
            .map(|entry| SearchHit {
                course_id: entry.course_id,
                distance: squared_l2_distance(query_embedding, &entry.embedding),
            })
            .collect();

        // Stable sort keeps insertion order for equal distances
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(k);

        Ok(hits)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
