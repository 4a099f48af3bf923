//! Check-db command - verify the document database.

use rusqlite::Connection;

use crate::config::Settings;
use crate::documents::schema;

pub fn run(settings: &Settings, repair: bool) -> anyhow::Result<()> {
    let path = &settings.storage.database_path;
    if !path.exists() && !repair {
        anyhow::bail!(
            "Database file {} does not exist. Run with --repair to create it",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let conn = Connection::open(path)?;
    println!("Checking database at {}", path.display());

    let mut report = schema::inspect(&conn)?;
    print_report(&report);

    if !report.is_healthy() && repair {
        if report.table_present {
            // Columns cannot be added to an existing table with constraints intact
            anyhow::bail!(
                "Table '{}' exists but is missing columns: {}. Back up and remove the database to recreate it",
                schema::DOCUMENTS_TABLE,
                report.missing_columns.join(", ")
            );
        }
        println!("Creating table '{}'...", schema::DOCUMENTS_TABLE);
        schema::ensure_schema(&conn)?;
        report = schema::inspect(&conn)?;
        print_report(&report);
    }

    if report.is_healthy() {
        println!("Database is healthy.");
        Ok(())
    } else {
        anyhow::bail!("Database schema is incomplete")
    }
}

fn print_report(report: &schema::SchemaReport) {
    println!("  connection: ok");
    println!(
        "  table '{}': {}",
        schema::DOCUMENTS_TABLE,
        if report.table_present { "present" } else { "missing" }
    );
    if report.table_present {
        println!("  columns: {}", report.columns.join(", "));
    }
    if !report.missing_columns.is_empty() {
        println!("  missing columns: {}", report.missing_columns.join(", "));
    }
    if let Some(count) = report.document_count {
        println!("  documents: {count}");
    }
}
