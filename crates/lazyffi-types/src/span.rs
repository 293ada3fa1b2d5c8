use serde::{Deserialize, Serialize};
use std::fmt;

/// A region of a call template, declaration, or generated host source.
///
/// Lines and columns are 1-based. Templates are almost always a single line,
/// so most spans are built from byte offsets with [`Span::from_offsets`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    #[serde(rename = "line")]
    pub start_line: u32,
    #[serde(rename = "column")]
    pub start_col: u32,
    pub end_line: u32,
    #[serde(rename = "end_column")]
    pub end_col: u32,
}

impl Span {
    pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Zero-width span at a single position.
    pub fn point(line: u32, col: u32) -> Self {
        Self::new(line, col, line, col)
    }

    /// Span on line 1 covering the half-open byte range `start..end`.
    pub fn from_offsets(start: usize, end: usize) -> Self {
        let start_col = start as u32 + 1;
        let end_col = (end.max(start + 1)) as u32;
        Self::new(1, start_col, 1, end_col)
    }

    /// Smallest span covering both `self` and `other`.
    pub fn merge(self, other: Span) -> Span {
        let (start_line, start_col) = (self.start_line, self.start_col)
            .min((other.start_line, other.start_col));
        let (end_line, end_col) =
            (self.end_line, self.end_col).max((other.end_line, other.end_col));
        Span::new(start_line, start_col, end_line, end_col)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// Source text (a template, or an assembled call expression) kept for
/// diagnostics.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub source: String,
    line_starts: Vec<usize>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            name: name.into(),
            source,
            line_starts,
        }
    }

    /// The text of a 1-based line, without its terminator.
    pub fn line(&self, line_number: u32) -> Option<&str> {
        let idx = line_number.checked_sub(1)? as usize;
        let start = *self.line_starts.get(idx)?;
        let end = self
            .line_starts
            .get(idx + 1)
            .map(|&next| next - 1)
            .unwrap_or(self.source.len());
        Some(self.source[start..end].trim_end_matches('\r'))
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// The text covered by a span that starts and ends on the same line.
    pub fn slice(&self, span: Span) -> Option<&str> {
        if span.start_line != span.end_line {
            return None;
        }
        let line = self.line(span.start_line)?;
        let start = (span.start_col as usize).checked_sub(1)?;
        let end = (span.end_col as usize).min(line.len());
        line.get(start..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_map_to_one_based_columns() {
        // "%1.x(%9)": `%9` sits at bytes 5..7
        let span = Span::from_offsets(5, 7);
        assert_eq!(span, Span::new(1, 6, 1, 7));
    }

    #[test]
    fn empty_offset_range_still_covers_one_column() {
        let span = Span::from_offsets(3, 3);
        assert_eq!(span.start_col, 4);
        assert_eq!(span.end_col, 4);
    }

    #[test]
    fn merge_orders_by_line_then_column() {
        let a = Span::new(2, 9, 2, 12);
        let b = Span::new(1, 4, 1, 6);
        assert_eq!(a.merge(b), Span::new(1, 4, 2, 12));
        assert_eq!(b.merge(a), Span::new(1, 4, 2, 12));
    }

    #[test]
    fn display_shows_start_position() {
        assert_eq!(Span::new(1, 7, 1, 9).to_string(), "1:7");
    }

    #[test]
    fn slice_extracts_placeholder_text() {
        let src = SourceFile::new("alert", "window.alert(%1, %x)");
        assert_eq!(src.slice(Span::from_offsets(17, 19)), Some("%x"));
        assert_eq!(src.slice(Span::new(1, 1, 2, 1)), None);
    }

    #[test]
    fn lines_strip_crlf() {
        let src = SourceFile::new("prelude", "var a = 1;\r\nvar b = 2;\n");
        assert_eq!(src.line(1), Some("var a = 1;"));
        assert_eq!(src.line(2), Some("var b = 2;"));
        assert_eq!(src.line(3), Some(""));
        assert_eq!(src.line(4), None);
        assert_eq!(src.line(0), None);
        assert_eq!(src.line_count(), 3);
    }
}
