// quill_ast/types - Basic types and position information
use serde::{Deserialize, Serialize};

/// Position information for AST nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Span {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl Span {
    pub fn new(start_line: usize, start_column: usize, end_line: usize, end_column: usize) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    pub fn dummy() -> Self {
        Self::default()
    }

    /// Smallest span that covers both `self` and `other`.
    pub fn covering(&self, other: &Span) -> Span {
        let (start_line, start_column) =
            if (self.start_line, self.start_column) <= (other.start_line, other.start_column) {
                (self.start_line, self.start_column)
            } else {
                (other.start_line, other.start_column)
            };
        let (end_line, end_column) =
            if (self.end_line, self.end_column) >= (other.end_line, other.end_column) {
                (self.end_line, self.end_column)
            } else {
                (other.end_line, other.end_column)
            };
        Span::new(start_line, start_column, end_line, end_column)
    }
}
