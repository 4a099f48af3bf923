//! Plain-text extraction from uploaded files.
//!
//! Extraction is page-tolerant: a page that cannot be decoded contributes
//! no text and the remaining pages are still read. Only problems with the
//! file as a whole surface as an [`ExtractError`].

pub mod error;
pub mod pdf;

pub use error::ExtractError;
pub use pdf::{LopdfPages, PageError, PageSource, PdfExtractor, join_pages};
