//! Coursebot - Course Retrieval and Conversational Answers
//!
//! A chatbot engine that answers questions about a scraped course catalog.
//!
//! # Overview
//!
//! Coursebot allows you to:
//! - Build a vector index from a catalog of courses
//! - Look up courses by meaning and render them as answer cards
//! - Answer open questions with retrieval-augmented generation
//! - Serve the chatbot over HTTP or chat with it in the terminal
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `catalog` - Course records and the id-keyed catalog store
//! - `embedding` - Embedding generation
//! - `vector_index` - Nearest-neighbour index and its on-disk format
//! - `retrieval` - Query embedding, catalog join, ranking policy
//! - `answer` - Rendering ranked courses as a reply
//! - `intent` - Canned, lookup or open classification
//! - `rag` - Generative fallback for open questions
//! - `router` - Per-message routing and history bookkeeping
//! - `orchestrator` - Resource loading and index building
//!
//! # Example
//!
//! ```rust,no_run
//! use coursebot::config::Settings;
//! use coursebot::history::History;
//! use coursebot::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let reply = orchestrator
//!         .respond("What courses do you offer on Python?", History::new())
//!         .await?;
//!     println!("{}", reply.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod answer;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod history;
pub mod intent;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod retrieval;
pub mod router;
pub mod vector_index;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{CourseBotError, Result};
