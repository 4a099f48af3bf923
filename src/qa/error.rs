//! Error types for the answering service.

use thiserror::Error;

use crate::documents::{DocumentId, StoreError};
use crate::llm::GenerationError;

#[derive(Error, Debug)]
pub enum QaError {
    #[error("Document not found: {0}")]
    DocumentNotFound(DocumentId),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Error generating response: {0}")]
    Generation(#[from] GenerationError),
}

pub type QaResult<T> = Result<T, QaError>;
