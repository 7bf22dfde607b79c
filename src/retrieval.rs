//! Course retrieval: embedding a query, searching the index, and joining
//! hits back to the catalog.
//!
//! Two entry points share the same plumbing:
//!
//! - [`Retriever::rank`] applies the configured distance threshold and result
//!   cap, and backs course-lookup answers.
//! - [`Retriever::search`] is a plain top-k dump with caller-chosen `k` and no
//!   filtering.

use crate::catalog::{Catalog, CourseId, CourseRecord};
use crate::config::RetrievalSettings;
use crate::embedding::Embedder;
use crate::error::{CourseBotError, Result};
use crate::vector_index::{SearchHit, VectorIndex};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// A catalog record that survived threshold filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult {
    pub course_id: CourseId,
    pub course: CourseRecord,
    pub distance: f32,
}

/// One row of a plain similarity search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchMatch {
    /// 1-based rank.
    pub rank: usize,
    pub course_id: CourseId,
    /// `None` when the index refers to a course the catalog lacks.
    pub course: Option<CourseRecord>,
    pub distance: f32,
}

/// Thresholds applied by [`Retriever::rank`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingPolicy {
    /// Neighbors requested from the index.
    pub top_k: usize,
    /// Hits farther than this are dropped.
    pub distance_threshold: f32,
    /// Maximum length of the ranked shortlist.
    pub max_results: usize,
}

impl Default for RankingPolicy {
    fn default() -> Self {
        Self::from(&RetrievalSettings::default())
    }
}

impl From<&RetrievalSettings> for RankingPolicy {
    fn from(settings: &RetrievalSettings) -> Self {
        Self {
            top_k: settings.top_k,
            distance_threshold: settings.distance_threshold,
            max_results: settings.max_results,
        }
    }
}

/// Retrieves courses for a free-text query.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    catalog: Arc<Catalog>,
    policy: RankingPolicy,
}

impl Retriever {
    /// Create a retriever with the default ranking policy.
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>, catalog: Arc<Catalog>) -> Self {
        Self {
            embedder,
            index,
            catalog,
            policy: RankingPolicy::default(),
        }
    }

    /// Set the ranking policy.
    pub fn with_policy(mut self, policy: RankingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The active ranking policy.
    pub fn policy(&self) -> RankingPolicy {
        self.policy
    }

    /// The catalog hits are joined against.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Rank catalog courses for a lookup query.
    ///
    /// An empty result is a normal outcome meaning nothing was close enough.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn rank(&self, query: &str) -> Result<Vec<RankedResult>> {
        let hits = self.nearest(query, self.policy.top_k).await?;
        let fetched = hits.len();

        let mut results: Vec<RankedResult> = hits
            .into_iter()
            .filter_map(|hit| {
                let course = self.join(hit)?;
                Some(RankedResult {
                    course_id: hit.course_id,
                    course,
                    distance: hit.distance,
                })
            })
            .filter(|r| r.distance <= self.policy.distance_threshold)
            .collect();

        results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        results.truncate(self.policy.max_results);

        debug!(
            "Ranked {} of {} hits within distance {}",
            results.len(),
            fetched,
            self.policy.distance_threshold
        );
        Ok(results)
    }

    /// Plain top-`k` search with no threshold.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchMatch>> {
        if k == 0 {
            return Err(CourseBotError::InvalidInput("k must be at least 1".to_string()));
        }

        let hits = self.nearest(query, k).await?;

        Ok(hits
            .into_iter()
            .enumerate()
            .map(|(i, hit)| SearchMatch {
                rank: i + 1,
                course_id: hit.course_id,
                course: self.join(hit),
                distance: hit.distance,
            })
            .collect())
    }

    async fn nearest(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CourseBotError::InvalidInput("Query must not be empty".to_string()));
        }

        let query_embedding = self.embedder.embed(query).await?;
        self.index.search(&query_embedding, k).await
    }

    fn join(&self, hit: SearchHit) -> Option<CourseRecord> {
        let course = self.catalog.get(hit.course_id).cloned();
        if course.is_none() {
            warn!("Index returned course {} which is not in the catalog", hit.course_id);
        }
        course
    }
}
