//! Line/column tracking for diagnostics
//!
//! Parse offsets count characters, so conversion walks `chars()` rather
//! than bytes. Lines break on `\n`; a `\r\n` pair counts once.

use std::fmt;

/// A line/column position in text input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourcePosition {
    /// Character offset from start of input
    pub offset: usize,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based, in characters)
    pub column: usize,
}

impl SourcePosition {
    /// Create a new source position
    #[inline]
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Position at the start of input
    #[inline]
    pub fn start() -> Self {
        Self::new(0, 1, 1)
    }

    /// Calculate line and column for a character offset
    pub fn from_offset(input: &str, offset: usize) -> Self {
        let mut line = 1;
        let mut column = 1;
        let mut consumed = 0;

        for ch in input.chars().take(offset) {
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
            consumed += 1;
        }

        Self {
            offset: consumed,
            line,
            column,
        }
    }

    /// The full text of the line containing this position
    pub fn line_text<'a>(&self, input: &'a str) -> &'a str {
        input
            .split('\n')
            .nth(self.line - 1)
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .unwrap_or("")
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

impl Default for SourcePosition {
    fn default() -> Self {
        Self::start()
    }
}
