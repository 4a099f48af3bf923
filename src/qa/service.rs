//! Answering service: document text in, model output out.

use std::borrow::Cow;
use std::sync::Arc;

use super::error::{QaError, QaResult};
use super::prompt::{PromptKind, build_prompt};
use crate::config::QaConfig;
use crate::documents::{BoundaryChunker, Chunker, DocumentId, DocumentRepository, run_blocking};
use crate::llm::GenerativeModel;

/// Answers questions about stored documents and proposes new ones.
///
/// Holds no per-request state; concurrent calls share only the store.
pub struct AnsweringService {
    store: Arc<dyn DocumentRepository>,
    model: Arc<dyn GenerativeModel>,
    policy: QaConfig,
    chunker: BoundaryChunker,
}

impl AnsweringService {
    pub fn new(
        store: Arc<dyn DocumentRepository>,
        model: Arc<dyn GenerativeModel>,
        policy: QaConfig,
    ) -> Self {
        Self {
            store,
            model,
            policy,
            chunker: BoundaryChunker::new(),
        }
    }

    pub fn policy(&self) -> &QaConfig {
        &self.policy
    }

    /// Answer `question` from the text of document `id`.
    ///
    /// The trimmed model output is returned as is, including the
    /// not-found reply.
    pub async fn answer(&self, id: DocumentId, question: &str) -> QaResult<String> {
        let text = self.document_text(id).await?;
        let context = select_context(&text, &self.policy, &self.chunker);
        let prompt = build_prompt(&context, PromptKind::Answer { question });

        tracing::info!(
            target: "qa",
            "answering question for document {id} with {} ({} context chars)",
            self.model.model_name(),
            context.chars().count()
        );

        let response = self.generate(&prompt).await?;
        Ok(response.trim().to_string())
    }

    /// Suggest up to `max_suggestions` questions about document `id`.
    pub async fn suggest(&self, id: DocumentId) -> QaResult<Vec<String>> {
        let text = self.document_text(id).await?;
        let context = select_context(&text, &self.policy, &self.chunker);
        let prompt = build_prompt(&context, PromptKind::Suggest);

        tracing::info!(target: "qa", "generating suggested questions for document {id}");

        let response = self.generate(&prompt).await?;
        let questions = parse_suggestions(&response, self.policy.max_suggestions);

        tracing::info!(target: "qa", "generated {} questions for document {id}", questions.len());
        Ok(questions)
    }

    async fn document_text(&self, id: DocumentId) -> QaResult<String> {
        let document = run_blocking(&self.store, move |store| store.get(id))
            .await?
            .ok_or(QaError::DocumentNotFound(id))?;
        Ok(document.text_content)
    }

    async fn generate(&self, prompt: &str) -> QaResult<String> {
        self.model.generate(prompt).await.map_err(|e| {
            tracing::error!(target: "qa", "model call failed: {e}");
            QaError::Generation(e)
        })
    }
}

/// Bound document text to the prompt budget.
///
/// Text within the threshold passes through untouched. Longer text is
/// chunked and the leading `max_chunks` windows are joined with newlines.
pub fn select_context<'a>(
    text: &'a str,
    policy: &QaConfig,
    chunker: &dyn Chunker,
) -> Cow<'a, str> {
    let chars = text.chars().count();
    if chars <= policy.context_threshold_chars {
        return Cow::Borrowed(text);
    }

    let chunks = chunker.chunk(text, &policy.chunking);
    tracing::debug!(
        target: "qa",
        "text of {chars} chars split into {} chunks, keeping first {}",
        chunks.len(),
        policy.max_chunks
    );

    let selected: Vec<&str> = chunks
        .iter()
        .take(policy.max_chunks)
        .map(|chunk| chunk.content.as_str())
        .collect();
    Cow::Owned(selected.join("\n"))
}

/// Non-blank trimmed lines of `response`, at most `limit` of them.
pub fn parse_suggestions(response: &str, limit: usize) -> Vec<String> {
    response
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(limit)
        .map(str::to_string)
        .collect()
}
