//! Upload PDFs, extract their text, and answer questions about them with a
//! hosted language model.

pub mod cli;
pub mod config;
pub mod context;
pub mod documents;
pub mod extract;
#[cfg(feature = "http-server")]
pub mod http;
pub mod ingest;
pub mod llm;
pub mod logging;
pub mod qa;

pub use config::Settings;
pub use context::AppContext;
pub use documents::{Document, DocumentId, DocumentRepository, SqliteDocumentStore};
pub use extract::{ExtractError, PdfExtractor};
pub use ingest::{IngestError, Ingestor};
pub use llm::{GenerationError, GenerativeModel};
pub use qa::{AnsweringService, NOT_FOUND_ANSWER, QaError};
