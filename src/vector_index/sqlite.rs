//! SQLite persistence for the vector index.
//!
//! The file holds a `meta` table (dimensions, embedding model) and a
//! `vectors` table whose `position` column preserves insertion order and
//! whose `course_id` column is the explicit id mapping into the catalog.

use super::{FlatIndex, IndexEntry, VectorIndex};
use crate::catalog::CourseId;
use crate::error::{CourseBotError, Result};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::Path;
use tracing::{info, instrument};

const SCHEMA: &str = r#"
CREATE TABLE meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE vectors (
    position INTEGER PRIMARY KEY,
    course_id INTEGER NOT NULL,
    embedding BLOB NOT NULL
);
"#;

/// Summary of a persisted index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexInfo {
    /// Vector dimensionality.
    pub dimensions: usize,
    /// Embedding model that produced the vectors.
    pub model: String,
    /// Number of stored vectors.
    pub vectors: usize,
}

/// Reader and writer for index files.
pub struct IndexFile;

impl IndexFile {
    /// Write an index to `path`, replacing any existing file.
    ///
    /// The file is written next to the target and renamed into place, so a
    /// failed build never leaves a half-written index behind.
    #[instrument(skip(index), fields(path = %path.display(), vectors = index.len()))]
    pub fn write(path: &Path, index: &FlatIndex, model: &str) -> Result<IndexInfo> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let tmp_path = path.with_extension("tmp");
        if tmp_path.exists() {
            std::fs::remove_file(&tmp_path)?;
        }

        {
            let mut conn = Connection::open(&tmp_path)?;
            conn.execute_batch(SCHEMA)?;

            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO meta (key, value) VALUES ('dimensions', ?1), ('model', ?2)",
                params![index.dimensions().to_string(), model],
            )?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO vectors (position, course_id, embedding) VALUES (?1, ?2, ?3)",
                )?;
                for (position, entry) in index.entries().iter().enumerate() {
                    let course_id = i64::try_from(entry.course_id).map_err(|_| {
                        CourseBotError::Index(format!("Course id {} does not fit the index file", entry.course_id))
                    })?;
                    stmt.execute(params![
                        position as i64,
                        course_id,
                        Self::embedding_to_bytes(&entry.embedding)
                    ])?;
                }
            }
            tx.commit()?;
        }

        std::fs::rename(&tmp_path, path)?;

        info!("Wrote {} vectors to {:?}", index.len(), path);

        Ok(IndexInfo {
            dimensions: index.dimensions(),
            model: model.to_string(),
            vectors: index.len(),
        })
    }

    /// Load an index file into memory.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn read(path: &Path) -> Result<(FlatIndex, IndexInfo)> {
        if !path.exists() {
            return Err(CourseBotError::Index(format!(
                "Index file not found: {}. Run 'coursebot index' first.",
                path.display()
            )));
        }

        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;

        let dimensions: usize = Self::meta(&conn, "dimensions")?
            .parse()
            .map_err(|_| CourseBotError::Index("Index file has an invalid dimension count".to_string()))?;
        let model = Self::meta(&conn, "model")?;

        let mut stmt = conn.prepare("SELECT course_id, embedding FROM vectors ORDER BY position")?;
        let rows = stmt.query_map([], |row| {
            let course_id: i64 = row.get(0)?;
            let bytes: Vec<u8> = row.get(1)?;
            Ok((course_id, bytes))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (course_id, bytes) = row?;
            let course_id = CourseId::try_from(course_id)
                .map_err(|_| CourseBotError::Index(format!("Index holds negative course id {}", course_id)))?;
            if bytes.len() % 4 != 0 {
                return Err(CourseBotError::Index(format!(
                    "Corrupt vector for course {}",
                    course_id
                )));
            }
            entries.push(IndexEntry {
                course_id,
                embedding: Self::bytes_to_embedding(&bytes),
            });
        }

        let index = FlatIndex::from_entries(dimensions, entries)?;
        info!("Loaded {} vectors ({} dimensions, model {})", index.len(), dimensions, model);

        let info = IndexInfo {
            dimensions,
            model,
            vectors: index.len(),
        };
        Ok((index, info))
    }

    fn meta(conn: &Connection, key: &str) -> Result<String> {
        conn.query_row("SELECT value FROM meta WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?
            .ok_or_else(|| CourseBotError::Index(format!("Index file is missing '{}' metadata", key)))
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_and_read_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("courses_index.db");

        let mut index = FlatIndex::new(3);
        index.add(5, vec![1.0, 0.0, 0.0]).unwrap();
        index.add(2, vec![0.0, 1.0, 0.0]).unwrap();
        index.add(9, vec![0.0, 0.0, 1.0]).unwrap();

        let written = IndexFile::write(&path, &index, "test-model").unwrap();
        assert_eq!(written.vectors, 3);

        let (loaded, info) = IndexFile::read(&path).unwrap();
        assert_eq!(info, written);
        assert_eq!(loaded.entries(), index.entries());

        let hits = loaded.search(&[0.0, 1.0, 0.0], 1).await.unwrap();
        assert_eq!(hits[0].course_id, 2);
    }

    #[test]
    fn test_write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("courses_index.db");

        let mut first = FlatIndex::new(2);
        first.add(0, vec![1.0, 1.0]).unwrap();
        first.add(1, vec![2.0, 2.0]).unwrap();
        IndexFile::write(&path, &first, "m").unwrap();

        let mut second = FlatIndex::new(2);
        second.add(0, vec![3.0, 3.0]).unwrap();
        IndexFile::write(&path, &second, "m").unwrap();

        let (loaded, _) = IndexFile::read(&path).unwrap();
        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = IndexFile::read(&dir.path().join("missing.db")).unwrap_err();
        assert!(matches!(err, CourseBotError::Index(_)));
    }
}
