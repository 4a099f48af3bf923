//! SQLite schema for document records, plus inspection for `check-db`.

use rusqlite::Connection;

/// Table holding one row per uploaded document.
pub const DOCUMENTS_TABLE: &str = "documents";

pub const CREATE_DOCUMENTS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    filename TEXT NOT NULL UNIQUE,
    original_filename TEXT NOT NULL,
    upload_date TEXT NOT NULL,
    file_path TEXT NOT NULL,
    text_content TEXT NOT NULL DEFAULT ''
)";

pub const CREATE_UPLOAD_DATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS ix_documents_upload_date ON documents (upload_date)";

/// Columns the store reads and writes.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "id",
    "filename",
    "original_filename",
    "upload_date",
    "file_path",
    "text_content",
];

/// Create the table and index if they are missing.
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(&format!(
        "{CREATE_DOCUMENTS_TABLE};\n{CREATE_UPLOAD_DATE_INDEX};"
    ))
}

/// Result of inspecting a database against the expected schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaReport {
    pub table_present: bool,
    pub columns: Vec<String>,
    pub missing_columns: Vec<String>,
    pub document_count: Option<usize>,
}

impl SchemaReport {
    /// Table exists and carries every required column.
    pub fn is_healthy(&self) -> bool {
        self.table_present && self.missing_columns.is_empty()
    }
}

/// Check connectivity, table presence, and columns.
pub fn inspect(conn: &Connection) -> rusqlite::Result<SchemaReport> {
    // Fails fast on an unreadable or non-database file
    conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;

    let table_present: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
        [DOCUMENTS_TABLE],
        |row| row.get(0),
    )?;

    if !table_present {
        return Ok(SchemaReport {
            table_present,
            columns: Vec::new(),
            missing_columns: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            document_count: None,
        });
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
    let columns = stmt
        .query_map([DOCUMENTS_TABLE], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let missing_columns = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !columns.iter().any(|c| c == *required))
        .map(|c| c.to_string())
        .collect();

    let document_count: i64 =
        conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;

    Ok(SchemaReport {
        table_present,
        columns,
        missing_columns,
        document_count: Some(document_count as usize),
    })
}
