//! Context building for RAG responses.

use super::ContextDocument;
use crate::error::Result;
use crate::retrieval::Retriever;
use std::sync::Arc;

/// Builds generation context from the courses nearest to a question.
pub struct ContextBuilder {
    retriever: Arc<Retriever>,
    max_documents: usize,
}

impl ContextBuilder {
    /// Create a new context builder.
    pub fn new(retriever: Arc<Retriever>) -> Self {
        Self {
            retriever,
            max_documents: 4,
        }
    }

    /// Set the maximum number of context documents.
    pub fn with_max_documents(mut self, max_documents: usize) -> Self {
        self.max_documents = max_documents.max(1);
        self
    }

    /// Build context for a query.
    ///
    /// Index hits without a catalog record are skipped.
    pub async fn build(&self, query: &str) -> Result<Vec<ContextDocument>> {
        let matches = self.retriever.search(query, self.max_documents).await?;

        Ok(matches
            .into_iter()
            .filter_map(|m| {
                let course = m.course?;
                Some(ContextDocument {
                    course_id: m.course_id,
                    title: course.name.clone().unwrap_or_else(|| format!("Course {}", m.course_id)),
                    content: course.document_text(),
                    distance: m.distance,
                })
            })
            .collect())
    }
}

/// Format context documents for inclusion in a prompt.
pub fn format_context_for_prompt(documents: &[ContextDocument]) -> String {
    if documents.is_empty() {
        return "(No course information found)".to_string();
    }

    documents
        .iter()
        .enumerate()
        .map(|(i, doc)| format!("---\n[{}] {}\n{}\n---", i + 1, doc.title, doc.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, CourseRecord};
    use crate::testing::FixedEmbedder;
    use crate::vector_index::FlatIndex;

    #[tokio::test]
    async fn test_build_skips_unknown_courses() {
        let mut index = FlatIndex::new(1);
        index.add(0, vec![0.0]).unwrap();
        index.add(7, vec![0.1]).unwrap();
        index.add(1, vec![0.2]).unwrap();
        index.add(2, vec![0.3]).unwrap();

        let catalog = Catalog::new([
            (0, CourseRecord::named("Python")),
            (1, CourseRecord::default()),
            (2, CourseRecord::named("Robotics")),
        ]);
        let retriever = Retriever::new(
            Arc::new(FixedEmbedder::new(vec![0.0])),
            Arc::new(index),
            Arc::new(catalog),
        );

        let documents = ContextBuilder::new(Arc::new(retriever))
            .with_max_documents(3)
            .build("anything")
            .await
            .unwrap();

        let titles: Vec<_> = documents.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["Python", "Course 1"]);
        assert!(documents[0].content.starts_with("Course Name: Python"));
    }

    #[test]
    fn test_format_context_for_prompt() {
        let documents = vec![ContextDocument {
            course_id: 0,
            title: "Python".to_string(),
            content: "Course Name: Python".to_string(),
            distance: 0.1,
        }];

        assert_eq!(
            format_context_for_prompt(&documents),
            "---\n[1] Python\nCourse Name: Python\n---"
        );
        assert_eq!(format_context_for_prompt(&[]), "(No course information found)");
    }
}
