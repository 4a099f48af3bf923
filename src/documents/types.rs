//! Core types for stored documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Unique identifier for a stored document.
///
/// Assigned by the store on creation and never reused for another record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(i64);

impl DocumentId {
    /// Wrap a raw identifier.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the inner value.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for DocumentId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Snapshot of a stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier.
    pub id: DocumentId,

    /// File name on disk, unique across all documents.
    pub filename: String,

    /// File name supplied by the uploader.
    pub original_filename: String,

    /// When the record was created.
    pub upload_date: DateTime<Utc>,

    /// Where the uploaded bytes live.
    pub file_path: PathBuf,

    /// Extracted text. Empty when nothing could be extracted.
    pub text_content: String,
}

impl Document {
    /// Length of the extracted text in characters.
    pub fn text_chars(&self) -> usize {
        self.text_content.chars().count()
    }
}

/// Input for creating a document record.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub original_filename: String,
    pub storage_path: PathBuf,
    pub text_content: String,
}

impl NewDocument {
    pub fn new(
        original_filename: impl Into<String>,
        storage_path: impl Into<PathBuf>,
        text_content: impl Into<String>,
    ) -> Self {
        Self {
            original_filename: original_filename.into(),
            storage_path: storage_path.into(),
            text_content: text_content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_serializes_as_number() {
        let id = DocumentId::new(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        assert_eq!(serde_json::from_str::<DocumentId>("7").unwrap(), DocumentId::new(7));
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_text_chars_counts_characters() {
        let doc = Document {
            id: DocumentId::new(1),
            filename: "20240101_000000_000000_a.pdf".to_string(),
            original_filename: "a.pdf".to_string(),
            upload_date: Utc::now(),
            file_path: PathBuf::from("uploads/20240101_000000_000000_a.pdf"),
            text_content: "héllo".to_string(),
        };
        assert_eq!(doc.text_chars(), 5);
    }
}
