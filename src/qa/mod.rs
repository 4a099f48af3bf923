//! Question answering over stored document text.
//!
//! Both operations fetch the document, bound its text to the configured
//! context budget, build a prompt, and make exactly one model call.

pub mod error;
pub mod prompt;
pub mod service;

pub use error::{QaError, QaResult};
pub use prompt::{NOT_FOUND_ANSWER, PromptKind, build_prompt};
pub use service::{AnsweringService, parse_suggestions, select_context};
