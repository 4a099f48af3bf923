//! Prompt templates for answering and suggesting questions.
//!
//! Templates embed the document text verbatim. Callers are responsible for
//! bounding the text before it gets here.

/// Reply the model must give when the text does not contain the answer.
pub const NOT_FOUND_ANSWER: &str = "I cannot find the answer in the provided text.";

/// What the prompt asks the model to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind<'a> {
    /// Answer `question` from the text.
    Answer { question: &'a str },
    /// Propose questions a reader might ask about the text.
    Suggest,
}

/// Assemble the prompt for `kind` around `text`.
pub fn build_prompt(text: &str, kind: PromptKind<'_>) -> String {
    match kind {
        PromptKind::Answer { question } => answer_prompt(text, question),
        PromptKind::Suggest => suggest_prompt(text),
    }
}

pub fn answer_prompt(text: &str, question: &str) -> String {
    format!(
        "Based on the following text, please answer the question. \
If the answer is not in the text, say \"{NOT_FOUND_ANSWER}\"

Text:
{text}

Question: {question}

Please provide a clear and concise answer:"
    )
}

pub fn suggest_prompt(text: &str) -> String {
    format!(
        "Analyze the following document text and generate 5-7 well-formatted, relevant questions \
that a reader might ask about it. Cover both factual details and deeper analytical points.

Document Text:
{text}

Output only the list of questions, one per line, with no additional text or numbering."
    )
}
