//! Document chunking strategies.
//!
//! Provides the `Chunker` trait and a boundary-aware sliding window
//! implementation that keeps prompt context within a fixed character budget.

use super::config::ChunkingConfig;

/// A chunk of text with its position in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChunk {
    /// Character range in the source text (start, end), end exclusive.
    pub char_range: (usize, usize),

    /// The text content of this chunk.
    pub content: String,
}

impl RawChunk {
    /// Create a new raw chunk.
    pub fn new(char_range: (usize, usize), content: String) -> Self {
        Self {
            char_range,
            content,
        }
    }

    /// Get character count.
    pub fn char_count(&self) -> usize {
        self.char_range.1 - self.char_range.0
    }
}

/// Trait for document chunking strategies.
pub trait Chunker: Send + Sync {
    /// Split text into ordered chunks.
    fn chunk(&self, content: &str, config: &ChunkingConfig) -> Vec<RawChunk>;
}

/// Sliding window chunker that prefers natural break points.
///
/// Algorithm:
/// 1. If the remaining text fits in one window, emit it and stop
/// 2. Otherwise look for the latest break in the back half of the window,
///    trying paragraph, line, sentence, then word boundaries
/// 3. Fall back to a hard cut at `chunk_size` characters
/// 4. Start the next window `chunk_overlap` characters before the cut
///
/// Every chunk is a contiguous slice of the input, so dropping the first
/// `chunk_overlap` characters of every chunk after the first and
/// concatenating reproduces the input exactly.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoundaryChunker;

impl BoundaryChunker {
    /// Create a new boundary chunker.
    pub fn new() -> Self {
        Self
    }
}

/// Break point preference, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    Paragraph,
    Line,
    Sentence,
    Word,
}

const BOUNDARY_ORDER: [Boundary; 4] = [
    Boundary::Paragraph,
    Boundary::Line,
    Boundary::Sentence,
    Boundary::Word,
];

impl Boundary {
    /// Whether a chunk may end right before character index `pos`.
    fn matches(self, chars: &[char], pos: usize) -> bool {
        let prev = chars[pos - 1];
        match self {
            Boundary::Paragraph => prev == '\n' && pos >= 2 && chars[pos - 2] == '\n',
            Boundary::Line => prev == '\n',
            Boundary::Sentence => {
                prev.is_whitespace() && pos >= 2 && matches!(chars[pos - 2], '.' | '!' | '?')
            }
            Boundary::Word => prev.is_whitespace(),
        }
    }
}

impl Chunker for BoundaryChunker {
    fn chunk(&self, content: &str, config: &ChunkingConfig) -> Vec<RawChunk> {
        if content.is_empty() {
            return Vec::new();
        }

        let size = config.chunk_size.max(1);
        let overlap = config.chunk_overlap.min(size - 1);

        let chars: Vec<char> = content.chars().collect();
        let total = chars.len();
        let mut chunks = Vec::new();
        let mut start = 0;

        loop {
            if total - start <= size {
                chunks.push(make_chunk(&chars, start, total));
                break;
            }

            let hard_end = start + size;
            // Never end so early that the next window fails to advance
            let min_end = start + (overlap + 1).max(size / 2);
            let end = find_break(&chars, min_end, hard_end).unwrap_or(hard_end);

            chunks.push(make_chunk(&chars, start, end));
            start = end - overlap;
        }

        chunks
    }
}

/// Latest break point in `[min_end, hard_end]`, by boundary preference.
fn find_break(chars: &[char], min_end: usize, hard_end: usize) -> Option<usize> {
    BOUNDARY_ORDER.iter().find_map(|boundary| {
        (min_end..=hard_end)
            .rev()
            .find(|&pos| boundary.matches(chars, pos))
    })
}

fn make_chunk(chars: &[char], start: usize, end: usize) -> RawChunk {
    RawChunk::new((start, end), chars[start..end].iter().collect())
}

/// Rebuild the source text from overlapping chunks.
pub fn reassemble(chunks: &[RawChunk], overlap: usize) -> String {
    let mut text = String::new();
    for (i, chunk) in chunks.iter().enumerate() {
        if i == 0 {
            text.push_str(&chunk.content);
        } else {
            text.extend(chunk.content.chars().skip(overlap));
        }
    }
    text
}
