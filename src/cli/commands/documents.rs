//! Document commands: add, list, remove.

use std::path::Path;

use crate::context::AppContext;
use crate::documents::DocumentId;

pub async fn run_add(ctx: &AppContext, path: &Path) -> anyhow::Result<()> {
    let id = ctx.ingestor.ingest_path(path).await?;
    let document = ctx
        .store
        .get(id)?
        .ok_or_else(|| anyhow::anyhow!("document {id} vanished after creation"))?;

    println!(
        "Added {} as document {id} ({} characters)",
        document.original_filename,
        document.text_chars()
    );
    Ok(())
}

pub fn run_list(ctx: &AppContext, json: bool) -> anyhow::Result<()> {
    let documents = ctx.store.list()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&documents)?);
        return Ok(());
    }

    if documents.is_empty() {
        println!("No documents stored.");
        return Ok(());
    }

    println!("{:>6}  {:<20}  {:>10}  FILE", "ID", "UPLOADED", "CHARS");
    for document in &documents {
        println!(
            "{:>6}  {:<20}  {:>10}  {}",
            document.id,
            document.upload_date.format("%Y-%m-%d %H:%M:%S"),
            document.text_chars(),
            document.original_filename
        );
    }
    Ok(())
}

pub fn run_remove(ctx: &AppContext, id: i64) -> anyhow::Result<()> {
    let removed = ctx.store.delete(DocumentId::new(id))?;
    println!("Deleted document {} ({})", removed.id, removed.original_filename);
    Ok(())
}
