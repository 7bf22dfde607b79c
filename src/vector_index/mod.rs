//! Vector index abstraction for course embeddings.
//!
//! The index maps positions to course ids and answers k-nearest-neighbor
//! queries by ascending distance. It is built offline by `coursebot index`,
//! persisted with [`IndexFile`], and loaded read-only at start.

mod memory;
mod sqlite;

pub use memory::FlatIndex;
pub use sqlite::{IndexFile, IndexInfo};

use crate::catalog::CourseId;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One stored vector and the course it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub course_id: CourseId,
    pub embedding: Vec<f32>,
}

/// A raw nearest-neighbor result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Course the matched vector belongs to.
    pub course_id: CourseId,
    /// Distance to the query (lower is more similar).
    pub distance: f32,
}

/// Trait for vector index implementations.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Return up to `k` hits in ascending distance order.
    ///
    /// Fewer than `k` hits are returned when the index holds fewer vectors.
    async fn search(&self, query_embedding: &[f32], k: usize) -> Result<Vec<SearchHit>>;

    /// Number of stored vectors.
    fn len(&self) -> usize;

    /// Whether the index holds no vectors.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimensionality every stored and query vector must have.
    fn dimensions(&self) -> usize;
}

/// Squared Euclidean distance between two vectors of equal length.
pub fn squared_l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squared_l2_distance() {
        let a = vec![1.0, 0.0, 0.0];
        assert!(squared_l2_distance(&a, &a).abs() < 1e-6);

        let b = vec![0.0, 1.0, 0.0];
        assert!((squared_l2_distance(&a, &b) - 2.0).abs() < 1e-6);

        let c = vec![0.5, 0.0, 0.0];
        assert!((squared_l2_distance(&a, &c) - 0.25).abs() < 1e-6);
    }
}
