//! Overlapping chunker.
//!
//! Splits on the widest separator available near the end of each window
//! (paragraph, then line, then word), falling back to a hard cut. Consecutive
//! chunks share up to `chunk_overlap` characters.

use serde_json::Value;

use super::{Document, RetrievalError};

const SEPARATORS: [&str; 3] = ["\n\n", "\n", " "];

/// Character-window text splitter. Sizes are in `char`s, not bytes.
#[derive(Debug, Clone, Copy)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 50,
        }
    }
}

impl TextSplitter {
    /// Fails unless `0 < chunk_size` and `chunk_overlap < chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, RetrievalError> {
        if chunk_size == 0 {
            return Err(RetrievalError::InvalidConfig("chunk_size must be > 0".into()));
        }
        if chunk_overlap >= chunk_size {
            return Err(RetrievalError::InvalidConfig(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Splits `text` into trimmed, non-empty chunks.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < len {
            let mut end = (start + self.chunk_size).min(len);
            if end < len {
                end = self.break_point(&chars, start, end);
            }
            let chunk: String = chars[start..end].iter().collect();
            let chunk = chunk.trim();
            if !chunk.is_empty() {
                chunks.push(chunk.to_string());
            }
            if end >= len {
                break;
            }
            start = end.saturating_sub(self.chunk_overlap).max(start + 1);
        }
        chunks
    }

    /// Latest separator end in the second half of the window, or `end` for a hard cut.
    fn break_point(&self, chars: &[char], start: usize, end: usize) -> usize {
        let floor = start + self.chunk_size / 2;
        for sep in SEPARATORS {
            let sep: Vec<char> = sep.chars().collect();
            let mut i = end;
            while i >= sep.len() && i - sep.len() > floor {
                if chars[i - sep.len()..i] == sep[..] {
                    return i;
                }
                i -= 1;
            }
        }
        end
    }

    /// Splits every document, copying its metadata and adding `chunk` (0-based index).
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Document> {
        documents
            .iter()
            .flat_map(|doc| {
                self.split_text(&doc.content)
                    .into_iter()
                    .enumerate()
                    .map(move |(i, content)| Document {
                        content,
                        metadata: doc.metadata.clone(),
                    }
                    .with_metadata("chunk", Value::from(i)))
            })
            .collect()
    }
}
