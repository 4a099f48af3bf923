//! Extract command - print a PDF's text without storing it.

use std::path::Path;

use crate::extract::PdfExtractor;

pub fn run(path: &Path) -> anyhow::Result<()> {
    let text = PdfExtractor::new().extract(path)?;
    if text.is_empty() {
        eprintln!("No text could be extracted from {}", path.display());
    } else {
        println!("{text}");
    }
    Ok(())
}
