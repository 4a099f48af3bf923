//! Document storage backed by SQLite.
//!
//! The `DocumentRepository` trait is the only way the rest of the crate
//! touches persisted documents. Every read returns an owned `Document`
//! snapshot, so callers never hold a live handle into the database.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Row, params};
use thiserror::Error;

use super::schema;
use super::types::{Document, DocumentId, NewDocument};

/// Errors from document storage operations.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Document not found: {0}")]
    NotFound(DocumentId),

    #[error("Invalid storage path: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store task failed: {0}")]
    Task(String),
}

/// Result type for document store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence interface for uploaded documents.
pub trait DocumentRepository: Send + Sync {
    /// Insert a record for a file already written to `storage_path`.
    fn create(&self, document: NewDocument) -> StoreResult<DocumentId>;

    /// Fetch one document, `None` if no such id exists.
    fn get(&self, id: DocumentId) -> StoreResult<Option<Document>>;

    /// All documents ordered by upload time.
    fn list(&self) -> StoreResult<Vec<Document>>;

    /// Remove the stored file (best effort) and then the record.
    ///
    /// Returns the removed snapshot, or `StoreError::NotFound`.
    fn delete(&self, id: DocumentId) -> StoreResult<Document>;

    /// Number of stored documents.
    fn count(&self) -> StoreResult<usize>;
}

/// Run a store call on the blocking pool so async callers never hold the
/// connection on a runtime worker.
pub async fn run_blocking<T, F>(store: &Arc<dyn DocumentRepository>, call: F) -> StoreResult<T>
where
    F: FnOnce(&dyn DocumentRepository) -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || call(store.as_ref()))
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
}

/// SQLite implementation of `DocumentRepository`.
///
/// A single connection behind a mutex serialises writes and gives
/// read-after-write consistency without any session cache.
pub struct SqliteDocumentStore {
    conn: Mutex<Connection>,
    location: String,
}

impl std::fmt::Debug for SqliteDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteDocumentStore")
            .field("location", &self.location)
            .finish()
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, filename, original_filename, upload_date, file_path, text_content FROM documents";

impl SqliteDocumentStore {
    /// Open (or create) the database file and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        let store = Self::from_connection(conn, path.display().to_string())?;
        tracing::info!(target: "documents", "opened document store at {}", path.display());
        Ok(store)
    }

    /// In-memory store, mainly for tests.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?, ":memory:".to_string())
    }

    fn from_connection(conn: Connection, location: String) -> StoreResult<Self> {
        schema::ensure_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            location,
        })
    }

    fn fetch(conn: &Connection, id: DocumentId) -> StoreResult<Option<Document>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
        Ok(conn
            .query_row(&sql, params![id.value()], row_to_document)
            .optional()?)
    }
}

fn row_to_document(row: &Row<'_>) -> rusqlite::Result<Document> {
    let file_path: String = row.get(4)?;
    let upload_date: DateTime<Utc> = row.get(3)?;
    Ok(Document {
        id: DocumentId::new(row.get(0)?),
        filename: row.get(1)?,
        original_filename: row.get(2)?,
        upload_date,
        file_path: PathBuf::from(file_path),
        text_content: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
    })
}

/// Remove an uploaded file, logging instead of failing.
fn remove_stored_file(path: &Path) {
    if !path.exists() {
        tracing::warn!(target: "documents", "file not found, removing record only: {}", path.display());
        return;
    }

    match std::fs::remove_file(path) {
        Ok(()) => tracing::info!(target: "documents", "deleted file {}", path.display()),
        Err(e) => tracing::error!(target: "documents", "failed to delete file {}: {e}", path.display()),
    }
}

impl DocumentRepository for SqliteDocumentStore {
    fn create(&self, document: NewDocument) -> StoreResult<DocumentId> {
        let filename = document
            .storage_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| StoreError::InvalidPath(document.storage_path.clone()))?;
        let upload_date = Utc::now();

        let mut conn = self.conn.lock();
        // Dropping an uncommitted transaction rolls it back
        let tx = conn.transaction()?;
        let inserted = tx.execute(
            "INSERT INTO documents (filename, original_filename, upload_date, file_path, text_content)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                filename,
                document.original_filename,
                upload_date,
                document.storage_path.to_string_lossy().into_owned(),
                document.text_content,
            ],
        );

        if let Err(e) = inserted {
            tracing::error!(target: "documents", "insert failed for {filename}, rolling back: {e}");
            tx.rollback()?;
            return Err(e.into());
        }

        let id = DocumentId::new(tx.last_insert_rowid());
        tx.commit()?;

        tracing::info!(
            target: "documents",
            "created document {id} ({filename}, {} chars)",
            document.text_content.chars().count()
        );
        Ok(id)
    }

    fn get(&self, id: DocumentId) -> StoreResult<Option<Document>> {
        let conn = self.conn.lock();
        Self::fetch(&conn, id)
    }

    fn list(&self) -> StoreResult<Vec<Document>> {
        let conn = self.conn.lock();
        let sql = format!("{SELECT_COLUMNS} ORDER BY upload_date, id");
        let mut stmt = conn.prepare(&sql)?;
        let documents = stmt
            .query_map([], row_to_document)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(documents)
    }

    fn delete(&self, id: DocumentId) -> StoreResult<Document> {
        let document = {
            let conn = self.conn.lock();
            Self::fetch(&conn, id)?.ok_or(StoreError::NotFound(id))?
        };

        // File removal happens outside the connection lock
        remove_stored_file(&document.file_path);

        let affected = self
            .conn
            .lock()
            .execute("DELETE FROM documents WHERE id = ?1", params![id.value()])?;
        if affected == 0 {
            return Err(StoreError::NotFound(id));
        }

        tracing::info!(target: "documents", "deleted document {id}");
        Ok(document)
    }

    fn count(&self) -> StoreResult<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
