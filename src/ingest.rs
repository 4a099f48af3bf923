//! Upload pipeline: stream bytes to disk, extract text, create the record.
//!
//! Bytes go to `{stored}.part` through a bounded buffer and are renamed into
//! place once fully flushed, so a crash mid-write never leaves a file under
//! a name the store could reference.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};

use crate::documents::{DocumentId, DocumentRepository, NewDocument, StoreError, run_blocking};
use crate::extract::{ExtractError, PdfExtractor};

const PDF_SUFFIX: &str = ".pdf";
const PART_SUFFIX: &str = ".part";

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Only PDF files are allowed")]
    NotPdf(String),

    #[error("Invalid filename: '{0}'")]
    InvalidFilename(String),

    #[error("Error saving file: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Extract(#[from] ExtractError),

    #[error("Error creating document record: {0}")]
    Store(#[from] StoreError),

    #[error("Extraction task failed: {0}")]
    Task(String),
}

impl IngestError {
    /// Caused by the client's input rather than the server.
    pub fn is_validation(&self) -> bool {
        matches!(self, IngestError::NotPdf(_) | IngestError::InvalidFilename(_))
    }
}

/// Check the client filename and reduce it to its final path component.
pub fn validate_filename(client_filename: &str) -> Result<String, IngestError> {
    let name = client_filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if name.is_empty() || name == "." || name == ".." {
        return Err(IngestError::InvalidFilename(client_filename.to_string()));
    }
    if !name.ends_with(PDF_SUFFIX) {
        return Err(IngestError::NotPdf(client_filename.to_string()));
    }
    Ok(name.to_string())
}

/// Timestamp-prefixed name the file is stored under.
pub fn stored_filename(original: &str, at: DateTime<Utc>) -> String {
    format!("{}_{original}", at.format("%Y%m%d_%H%M%S_%6f"))
}

/// An upload being streamed to disk.
pub struct UploadWriter {
    writer: BufWriter<File>,
    part_path: PathBuf,
    final_path: PathBuf,
    original_filename: String,
    bytes_written: u64,
}

impl UploadWriter {
    async fn create(
        final_path: PathBuf,
        original_filename: String,
        buffer_bytes: usize,
    ) -> Result<Self, IngestError> {
        let mut part_name = final_path.clone().into_os_string();
        part_name.push(PART_SUFFIX);
        let part_path = PathBuf::from(part_name);

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&part_path)
            .await?;

        Ok(Self {
            writer: BufWriter::with_capacity(buffer_bytes.max(1), file),
            part_path,
            final_path,
            original_filename,
            bytes_written: 0,
        })
    }

    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), IngestError> {
        self.writer.write_all(chunk).await?;
        self.bytes_written += chunk.len() as u64;
        Ok(())
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Flush and move the file to its final name.
    pub async fn finish(mut self) -> Result<StagedUpload, IngestError> {
        if let Err(e) = self.flush_and_rename().await {
            remove_quietly(&self.part_path).await;
            return Err(e);
        }

        tracing::info!(
            target: "ingest",
            "saved {} ({} bytes)",
            self.final_path.display(),
            self.bytes_written
        );
        Ok(StagedUpload {
            path: self.final_path,
            original_filename: self.original_filename,
        })
    }

    async fn flush_and_rename(&mut self) -> Result<(), IngestError> {
        self.writer.flush().await?;
        self.writer.get_mut().sync_all().await?;
        fs::rename(&self.part_path, &self.final_path).await?;
        Ok(())
    }

    /// Drop the partial file.
    pub async fn abort(self) {
        let UploadWriter {
            writer, part_path, ..
        } = self;
        drop(writer);
        remove_quietly(&part_path).await;
    }
}

/// A fully written upload awaiting extraction.
#[derive(Debug, Clone)]
pub struct StagedUpload {
    pub path: PathBuf,
    pub original_filename: String,
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::error!(target: "ingest", "failed to remove {}: {e}", path.display());
        }
    }
}

/// Turns uploaded files into stored documents.
pub struct Ingestor {
    upload_dir: PathBuf,
    buffer_bytes: usize,
    store: Arc<dyn DocumentRepository>,
    extractor: PdfExtractor,
}

impl Ingestor {
    pub fn new(
        upload_dir: impl Into<PathBuf>,
        buffer_bytes: usize,
        store: Arc<dyn DocumentRepository>,
    ) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            buffer_bytes,
            store,
            extractor: PdfExtractor::new(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Validate the client filename and open a writer for its bytes.
    pub async fn begin(&self, client_filename: &str) -> Result<UploadWriter, IngestError> {
        let original = validate_filename(client_filename).inspect_err(|e| {
            tracing::warn!(target: "ingest", "rejected upload '{client_filename}': {e}");
        })?;

        fs::create_dir_all(&self.upload_dir).await?;
        let final_path = self
            .upload_dir
            .join(stored_filename(&original, Utc::now()));

        tracing::info!(target: "ingest", "receiving {original} into {}", final_path.display());
        UploadWriter::create(final_path, original, self.buffer_bytes).await
    }

    /// Extract text from a staged upload and record it.
    ///
    /// The file is removed if either step fails.
    pub async fn complete(&self, staged: StagedUpload) -> Result<DocumentId, IngestError> {
        let text = match self.extract(&staged.path).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(target: "ingest", "extraction failed for {}: {e}", staged.path.display());
                remove_quietly(&staged.path).await;
                return Err(e);
            }
        };

        if text.is_empty() {
            tracing::warn!(target: "ingest", "no text extracted from {}", staged.original_filename);
        }

        let record = NewDocument::new(staged.original_filename, staged.path.clone(), text);
        match run_blocking(&self.store, move |store| store.create(record)).await {
            Ok(id) => Ok(id),
            Err(e) => {
                remove_quietly(&staged.path).await;
                Err(e.into())
            }
        }
    }

    /// Copy a local PDF into the upload directory and ingest it.
    pub async fn ingest_path(&self, source: &Path) -> Result<DocumentId, IngestError> {
        let client_filename = source.to_string_lossy();
        let mut input = File::open(source).await?;
        let mut writer = self.begin(&client_filename).await?;

        let mut buffer = vec![0u8; self.buffer_bytes.max(1)];
        loop {
            let read = match input.read(&mut buffer).await {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    writer.abort().await;
                    return Err(e.into());
                }
            };
            if let Err(e) = writer.write_chunk(&buffer[..read]).await {
                writer.abort().await;
                return Err(e);
            }
        }

        let staged = writer.finish().await?;
        self.complete(staged).await
    }

    async fn extract(&self, path: &Path) -> Result<String, IngestError> {
        let extractor = self.extractor;
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || extractor.extract(&path))
            .await
            .map_err(|e| IngestError::Task(e.to_string()))?
            .map_err(IngestError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::SqliteDocumentStore;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn ingestor(dir: &Path) -> (Ingestor, Arc<SqliteDocumentStore>) {
        let store = Arc::new(SqliteDocumentStore::open_in_memory().unwrap());
        (Ingestor::new(dir.join("uploads"), 16, store.clone()), store)
    }

    #[test]
    fn test_validate_filename() {
        assert_eq!(validate_filename("report.pdf").unwrap(), "report.pdf");
        assert_eq!(validate_filename("../../etc/report.pdf").unwrap(), "report.pdf");
        assert_eq!(validate_filename("C:\\docs\\scan.pdf").unwrap(), "scan.pdf");

        assert!(matches!(validate_filename("notes.txt"), Err(IngestError::NotPdf(_))));
        assert!(matches!(validate_filename("REPORT.PDF"), Err(IngestError::NotPdf(_))));
        assert!(matches!(validate_filename("dir/"), Err(IngestError::InvalidFilename(_))));
        assert!(validate_filename("notes.txt").unwrap_err().is_validation());
    }

    #[test]
    fn test_stored_filename_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
            + chrono::Duration::microseconds(42);
        assert_eq!(stored_filename("a.pdf", at), "20240309_140507_000042_a.pdf");
    }

    #[tokio::test]
    async fn test_writer_renames_on_finish() {
        let temp_dir = TempDir::new().unwrap();
        let (ingestor, _) = ingestor(temp_dir.path());

        let mut writer = ingestor.begin("doc.pdf").await.unwrap();
        let part_path = writer.part_path.clone();
        assert!(part_path.exists());

        writer.write_chunk(b"%PDF-1.5\n").await.unwrap();
        writer.write_chunk(&[b'x'; 100]).await.unwrap();
        assert_eq!(writer.bytes_written(), 109);

        let staged = writer.finish().await.unwrap();
        assert!(!part_path.exists());
        assert_eq!(std::fs::read(&staged.path).unwrap().len(), 109);
        assert_eq!(staged.original_filename, "doc.pdf");
        assert!(
            staged
                .path
                .file_name()
                .unwrap()
                .to_string_lossy()
                .ends_with("_doc.pdf")
        );
    }

    #[tokio::test]
    async fn test_abort_removes_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let (ingestor, _) = ingestor(temp_dir.path());

        let mut writer = ingestor.begin("doc.pdf").await.unwrap();
        writer.write_chunk(b"partial").await.unwrap();
        let part_path = writer.part_path.clone();
        writer.abort().await;

        assert!(!part_path.exists());
    }

    #[tokio::test]
    async fn test_rejects_non_pdf_before_touching_disk() {
        let temp_dir = TempDir::new().unwrap();
        let (ingestor, _) = ingestor(temp_dir.path());

        let result = ingestor.begin("image.png").await;
        assert!(matches!(result, Err(IngestError::NotPdf(_))));
        assert!(!ingestor.upload_dir().exists());
    }

    #[tokio::test]
    async fn test_malformed_pdf_is_cleaned_up() {
        let temp_dir = TempDir::new().unwrap();
        let (ingestor, store) = ingestor(temp_dir.path());

        let mut writer = ingestor.begin("broken.pdf").await.unwrap();
        writer.write_chunk(b"definitely not a pdf").await.unwrap();
        let staged = writer.finish().await.unwrap();
        let path = staged.path.clone();

        let result = ingestor.complete(staged).await;
        assert!(matches!(result, Err(IngestError::Extract(ExtractError::Malformed { .. }))));
        assert!(!path.exists());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_ingest_missing_source() {
        let temp_dir = TempDir::new().unwrap();
        let (ingestor, _) = ingestor(temp_dir.path());

        let result = ingestor.ingest_path(&temp_dir.path().join("nope.pdf")).await;
        assert!(matches!(result, Err(IngestError::Io(_))));
    }
}
