//! Parse Utilities
//!
//! Source documents and the spans that tie syntax nodes, IR nodes and
//! diagnostics back to the text they came from.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A template source file. Line starts are computed once so that span
/// construction is a binary search rather than a rescan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub file_path: Arc<str>,
    pub content: Arc<str>,
    line_starts: Vec<usize>,
}

impl SourceDocument {
    pub fn new(content: impl Into<String>, file_path: impl Into<String>) -> Self {
        let content: String = content.into();
        let mut line_starts = vec![0];
        let bytes = content.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                    line_starts.push(i + 2);
                    i += 2;
                    continue;
                }
                b'\r' | b'\n' => line_starts.push(i + 1),
                _ => {}
            }
            i += 1;
        }
        SourceDocument {
            file_path: Arc::from(file_path.into()),
            content: Arc::from(content),
            line_starts,
        }
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Resolve a byte offset into a zero-based line/character location.
    pub fn location(&self, offset: usize) -> SourceLocation {
        let offset = offset.min(self.content.len());
        let line_index = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line_index];
        SourceLocation {
            absolute_index: offset,
            line_index,
            character_index: self.content[line_start..offset].chars().count(),
        }
    }

    /// Build a span over `start..end` (byte offsets, end exclusive).
    pub fn span(&self, start: usize, end: usize) -> SourceSpan {
        let begin = self.location(start);
        let finish = self.location(end.max(start));
        SourceSpan {
            file_path: self.file_path.to_string(),
            absolute_index: begin.absolute_index,
            line_index: begin.line_index,
            character_index: begin.character_index,
            length: finish.absolute_index - begin.absolute_index,
            end_line_index: finish.line_index,
            end_character_index: finish.character_index,
        }
    }

    pub fn text(&self, span: &SourceSpan) -> &str {
        let start = span.absolute_index.min(self.content.len());
        let end = span.end().min(self.content.len());
        &self.content[start..end]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    pub absolute_index: usize,
    pub line_index: usize,
    pub character_index: usize,
}

/// Provenance of a node or diagnostic in its source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSpan {
    pub file_path: String,
    pub absolute_index: usize,
    pub line_index: usize,
    pub character_index: usize,
    pub length: usize,
    pub end_line_index: usize,
    pub end_character_index: usize,
}

impl SourceSpan {
    pub fn end(&self) -> usize {
        self.absolute_index + self.length
    }

    /// True when `next` starts exactly where this span stops.
    pub fn is_adjacent(&self, next: &SourceSpan) -> bool {
        self.file_path == next.file_path && self.end() == next.absolute_index
    }

    /// Smallest span covering both `self` and `other` (same file assumed).
    pub fn merge(&self, other: &SourceSpan) -> SourceSpan {
        let (first, last) = if self.absolute_index <= other.absolute_index {
            (self, other)
        } else {
            (other, self)
        };
        let (end_line_index, end_character_index, end) = if last.end() >= first.end() {
            (last.end_line_index, last.end_character_index, last.end())
        } else {
            (first.end_line_index, first.end_character_index, first.end())
        };
        SourceSpan {
            file_path: first.file_path.clone(),
            absolute_index: first.absolute_index,
            line_index: first.line_index,
            character_index: first.character_index,
            length: end - first.absolute_index,
            end_line_index,
            end_character_index,
        }
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}:{},{} [{}] {})",
            self.absolute_index,
            self.line_index,
            self.character_index,
            self.length,
            self.file_path
        )
    }
}
