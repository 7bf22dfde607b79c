//! Resource wiring for coursebot.
//!
//! Loads the persisted catalog and vector index once, creates the model
//! clients, and injects them into the conversation router. Also builds the
//! index files from a scraped catalog.

use crate::answer::AnswerFormatter;
use crate::catalog::Catalog;
use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{CourseBotError, Result};
use crate::history::History;
use crate::rag::{ContextBuilder, Fallback, GenerativeService, OpenAIGenerator};
use crate::retrieval::{RankingPolicy, Retriever, SearchMatch};
use crate::router::{ConversationRouter, Reply};
use crate::vector_index::{FlatIndex, IndexFile, IndexInfo, VectorIndex};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Owns the loaded resources and the router built from them.
pub struct Orchestrator {
    settings: Settings,
    catalog: Arc<Catalog>,
    index: Arc<dyn VectorIndex>,
    retriever: Arc<Retriever>,
    router: ConversationRouter,
}

impl Orchestrator {
    /// Load catalog and index from disk and connect to the model services.
    ///
    /// Any problem with the persisted artifacts is fatal here rather than
    /// surfacing mid-request.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let catalog = Catalog::load(&settings.metadata_path())?;
        let (index, index_info) = IndexFile::read(&settings.index_path())?;
        Self::check_index(&settings, &catalog, &index, &index_info)?;

        let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::from_settings(&settings.embedding)?);
        let generator: Arc<dyn GenerativeService> =
            Arc::new(OpenAIGenerator::from_settings(&settings.generation, prompts)?);

        info!(
            "Using {} for embeddings and {} for conversation",
            settings.embedding.model, settings.generation.model
        );

        Ok(Self::with_components(settings, catalog, Arc::new(index), embedder, generator))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        catalog: Catalog,
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn GenerativeService>,
    ) -> Self {
        let catalog = Arc::new(catalog);

        let retriever = Arc::new(
            Retriever::new(embedder, index.clone(), catalog.clone())
                .with_policy(RankingPolicy::from(&settings.retrieval)),
        );

        let context_builder =
            ContextBuilder::new(retriever.clone()).with_max_documents(settings.generation.context_documents);
        let fallback = Fallback::new(generator, context_builder);
        let router = ConversationRouter::new(retriever.clone(), AnswerFormatter::new(&settings.answer), fallback);

        Self {
            settings,
            catalog,
            index,
            retriever,
            router,
        }
    }

    fn check_index(settings: &Settings, catalog: &Catalog, index: &FlatIndex, info: &IndexInfo) -> Result<()> {
        if info.dimensions != settings.embedding.dimensions as usize {
            return Err(CourseBotError::Config(format!(
                "Index has {}-dimensional vectors but embedding.dimensions is {}. Rebuild with 'coursebot index'.",
                info.dimensions, settings.embedding.dimensions
            )));
        }

        if info.model != settings.embedding.model {
            warn!(
                "Index was built with '{}' but queries will use '{}'; distances may be meaningless",
                info.model, settings.embedding.model
            );
        }

        let unknown = index
            .entries()
            .iter()
            .filter(|e| catalog.get(e.course_id).is_none())
            .count();
        if unknown > 0 {
            warn!("{} indexed vectors have no catalog record and will be skipped", unknown);
        }

        Ok(())
    }

    /// Answer a chat message.
    pub async fn respond(&self, message: &str, history: History) -> Result<Reply> {
        self.router.respond(message, history).await
    }

    /// Plain similarity search; `None` uses the configured default `k`.
    pub async fn search(&self, query: &str, k: Option<usize>) -> Result<Vec<SearchMatch>> {
        let k = k.unwrap_or(self.settings.retrieval.search_k);
        self.retriever.search(query, k).await
    }

    pub fn router(&self) -> &ConversationRouter {
        &self.router
    }

    pub fn retriever(&self) -> Arc<Retriever> {
        self.retriever.clone()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn index(&self) -> Arc<dyn VectorIndex> {
        self.index.clone()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

/// Outcome of an index build.
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub courses: usize,
    pub info: IndexInfo,
}

/// Turns a scraped catalog into the persisted index and metadata files.
pub struct IndexBuilder {
    embedder: Arc<dyn Embedder>,
}

impl IndexBuilder {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    /// Embed every course and write both artifacts.
    ///
    /// Vectors are stored in ascending course id order, and the metadata is
    /// written keyed by id so the two files always agree.
    #[instrument(skip(self, catalog), fields(courses = catalog.len()))]
    pub async fn build(&self, catalog: &Catalog, index_path: &Path, metadata_path: &Path) -> Result<BuildResult> {
        if catalog.is_empty() {
            return Err(CourseBotError::Catalog("Catalog has no courses to index".to_string()));
        }

        let (ids, texts): (Vec<_>, Vec<_>) = catalog
            .iter()
            .map(|(id, course)| (id, course.document_text()))
            .unzip();

        info!("Embedding {} courses...", texts.len());
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != ids.len() {
            return Err(CourseBotError::Embedding(format!(
                "Expected {} embeddings, got {}",
                ids.len(),
                embeddings.len()
            )));
        }

        let mut index = FlatIndex::new(self.embedder.dimensions());
        for (id, embedding) in ids.into_iter().zip(embeddings) {
            index.add(id, embedding)?;
        }

        let info = IndexFile::write(index_path, &index, self.embedder.model_name())?;
        catalog.save(metadata_path)?;

        info!("Indexed {} courses", catalog.len());
        Ok(BuildResult {
            courses: catalog.len(),
            info,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CourseRecord;
    use crate::testing::{FixedEmbedder, ScriptedGenerator};

    fn catalog() -> Catalog {
        Catalog::from_records(vec![
            CourseRecord::named("Python"),
            CourseRecord::named("Java"),
            CourseRecord::named("Robotics"),
        ])
    }

    #[tokio::test]
    async fn test_build_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let index_path = dir.path().join("courses_index.db");
        let metadata_path = dir.path().join("courses_metadata.json");

        let builder = IndexBuilder::new(Arc::new(FixedEmbedder::new(vec![0.5, 0.5, 0.0])));
        let result = builder.build(&catalog(), &index_path, &metadata_path).await.unwrap();
        assert_eq!(result.courses, 3);
        assert_eq!(result.info.dimensions, 3);
        assert_eq!(result.info.model, "fixed");

        let (index, info) = IndexFile::read(&index_path).unwrap();
        let loaded = Catalog::load(&metadata_path).unwrap();
        assert_eq!(info.vectors, 3);
        assert!(index.entries().iter().all(|e| loaded.get(e.course_id).is_some()));
    }

    #[tokio::test]
    async fn test_build_rejects_empty_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let builder = IndexBuilder::new(Arc::new(FixedEmbedder::new(vec![1.0])));

        let err = builder
            .build(&Catalog::default(), &dir.path().join("i.db"), &dir.path().join("m.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, CourseBotError::Catalog(_)));
    }

    #[tokio::test]
    async fn test_with_components_wires_policy() {
        let mut settings = Settings::default();
        settings.retrieval.search_k = 2;

        let mut index = FlatIndex::new(2);
        index.add(0, vec![1.0, 0.0]).unwrap();
        index.add(1, vec![0.0, 1.0]).unwrap();
        index.add(2, vec![0.0, -1.0]).unwrap();

        let orchestrator = Orchestrator::with_components(
            settings,
            catalog(),
            Arc::new(index),
            Arc::new(FixedEmbedder::new(vec![1.0, 0.0])),
            Arc::new(ScriptedGenerator::new("hi")),
        );

        let matches = orchestrator.search("python", None).await.unwrap();
        let names: Vec<_> = matches
            .iter()
            .map(|m| m.course.as_ref().and_then(|c| c.name.as_deref()))
            .collect();
        // Java and Robotics tie at 2.0; insertion order breaks the tie
        assert_eq!(names, vec![Some("Python"), Some("Java")]);

        let reply = orchestrator.respond("python course", History::new()).await.unwrap();
        assert!(reply.answer.contains("PYTHON"));
        assert!(!reply.answer.contains("JAVA"));
        assert!(!reply.answer.contains("ROBOTICS"));
    }

    #[test]
    fn test_check_index_dimension_mismatch() {
        let settings = Settings::default();
        let index = FlatIndex::new(3);
        let info = IndexInfo {
            dimensions: 3,
            model: settings.embedding.model.clone(),
            vectors: 0,
        };

        let err = Orchestrator::check_index(&settings, &catalog(), &index, &info).unwrap_err();
        assert!(matches!(err, CourseBotError::Config(_)));
    }
}
