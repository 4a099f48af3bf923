//! PDF text extraction on top of lopdf.

use std::path::Path;

use super::error::ExtractError;

/// Error raised while extracting a single page.
pub type PageError = Box<dyn std::error::Error + Send + Sync>;

/// Pages between progress log lines.
const PROGRESS_INTERVAL: usize = 10;

/// A document that can be read one page at a time.
///
/// Pages are addressed by zero-based position in reading order.
pub trait PageSource {
    fn page_count(&self) -> usize;

    fn page_text(&self, index: usize) -> Result<String, PageError>;
}

/// Pages of a parsed lopdf document.
pub struct LopdfPages {
    document: lopdf::Document,
    page_numbers: Vec<u32>,
}

impl LopdfPages {
    pub fn new(document: lopdf::Document) -> Self {
        // get_pages is keyed by page number, so keys come out in order
        let page_numbers = document.get_pages().keys().copied().collect();
        Self {
            document,
            page_numbers,
        }
    }
}

impl PageSource for LopdfPages {
    fn page_count(&self) -> usize {
        self.page_numbers.len()
    }

    fn page_text(&self, index: usize) -> Result<String, PageError> {
        let page_number = self
            .page_numbers
            .get(index)
            .copied()
            .ok_or_else(|| format!("page index {index} out of range"))?;
        self.document
            .extract_text(&[page_number])
            .map_err(|e| e.to_string().into())
    }
}

/// Best-effort plain-text extractor for PDF files.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract the text of every page, joined with newlines and trimmed.
    ///
    /// A document with no pages yields an empty string. Pages that fail to
    /// extract are logged and skipped.
    pub fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        tracing::info!(target: "extract", "extracting text from {}", path.display());

        if !path.exists() {
            tracing::error!(target: "extract", "PDF file not found at {}", path.display());
            return Err(ExtractError::NotFound(path.to_path_buf()));
        }

        let bytes =
            std::fs::read(path).map_err(|e| ExtractError::from_io(path.to_path_buf(), e))?;

        let document =
            lopdf::Document::load_mem(&bytes).map_err(|e| ExtractError::Malformed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let pages = LopdfPages::new(document);
        let text = join_pages(&pages);

        tracing::info!(
            target: "extract",
            "extracted {} characters from {}",
            text.chars().count(),
            path.display()
        );
        Ok(text)
    }
}

/// Concatenate page texts in order, skipping pages that fail.
pub fn join_pages(source: &dyn PageSource) -> String {
    let total = source.page_count();
    tracing::info!(target: "extract", "PDF has {total} pages");

    if total == 0 {
        tracing::warn!(target: "extract", "PDF has no pages");
        return String::new();
    }

    let mut pages = Vec::with_capacity(total);
    for index in 0..total {
        match source.page_text(index) {
            Ok(text) => pages.push(text.trim_end().to_string()),
            // A failed page adds neither text nor a separator
            Err(e) => {
                tracing::warn!(target: "extract", "error extracting text from page {}: {e}", index + 1);
            }
        }

        if (index + 1) % PROGRESS_INTERVAL == 0 {
            tracing::info!(target: "extract", "processed {}/{total} pages", index + 1);
        }
    }

    pages.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{Object, Stream, dictionary};
    use tempfile::TempDir;

    fn write_pdf(path: &Path, page_texts: &[&str]) {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = Vec::new();
        for text in page_texts {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(Object::from(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    struct FakePages {
        pages: Vec<Result<&'static str, &'static str>>,
    }

    impl PageSource for FakePages {
        fn page_count(&self) -> usize {
            self.pages.len()
        }

        fn page_text(&self, index: usize) -> Result<String, PageError> {
            match self.pages[index] {
                Ok(text) => Ok(text.to_string()),
                Err(msg) => Err(msg.into()),
            }
        }
    }

    #[test]
    fn test_two_page_pdf_preserves_order() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("two.pdf");
        write_pdf(&path, &["Hello", "World"]);

        let text = PdfExtractor::new().extract(&path).unwrap();
        assert_eq!(text, "Hello\nWorld");
    }

    #[test]
    fn test_zero_page_pdf_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.pdf");
        write_pdf(&path, &[]);

        let text = PdfExtractor::new().extract(&path).unwrap();
        assert_eq!(text, "");
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.pdf");

        let result = PdfExtractor::new().extract(&path);
        assert!(matches!(result, Err(ExtractError::NotFound(p)) if p == path));
    }

    #[test]
    fn test_garbage_bytes_are_malformed() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf at all").unwrap();

        let result = PdfExtractor::new().extract(&path);
        assert!(matches!(result, Err(ExtractError::Malformed { .. })));
    }

    #[test]
    fn test_failing_page_is_skipped() {
        let source = FakePages {
            pages: vec![Ok("one"), Err("bad xref"), Ok("three")],
        };
        assert_eq!(join_pages(&source), "one\nthree");
    }

    #[test]
    fn test_empty_page_keeps_its_line() {
        let source = FakePages {
            pages: vec![Ok("one"), Ok(""), Ok("three")],
        };
        assert_eq!(join_pages(&source), "one\n\nthree");
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_is_permission_denied() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("locked.pdf");
        write_pdf(&path, &["secret"]);
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o000)).unwrap();

        // Root ignores mode bits
        if std::fs::read(&path).is_ok() {
            return;
        }

        let result = PdfExtractor::new().extract(&path);
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        assert!(matches!(result, Err(ExtractError::PermissionDenied(p)) if p == path));
    }

    #[test]
    fn test_failing_first_page_keeps_later_text() {
        let source = FakePages {
            pages: vec![Err("broken"), Ok("  second  \n"), Ok("third")],
        };
        assert_eq!(join_pages(&source), "second\nthird");
    }

    #[test]
    fn test_progress_over_many_pages() {
        let source = FakePages {
            pages: (0..25).map(|_| Ok("p")).collect(),
        };
        let text = join_pages(&source);
        assert_eq!(text.lines().count(), 25);
    }

    #[test]
    fn test_all_pages_failing_yields_empty() {
        let source = FakePages {
            pages: vec![Err("a"), Err("b")],
        };
        assert_eq!(join_pages(&source), "");
    }
}
