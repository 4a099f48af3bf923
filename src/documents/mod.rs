//! Stored documents and the text windows derived from them.
//!
//! This module provides:
//! - The `Document` record and its identifier
//! - The `DocumentRepository` trait with a SQLite implementation
//! - Overlapping, boundary-aware chunking of extracted text

pub mod chunker;
pub mod config;
pub mod schema;
pub mod store;
pub mod types;

pub use chunker::{BoundaryChunker, Chunker, RawChunk, reassemble};
pub use config::ChunkingConfig;
pub use schema::SchemaReport;
pub use store::{DocumentRepository, SqliteDocumentStore, StoreError, StoreResult, run_blocking};
pub use types::{Document, DocumentId, NewDocument};
