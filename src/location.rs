//! Source location utilities.

use saphyr_parser::Span as ParserSpan;
use serde::Serialize;

/// A byte span within the source document.
///
/// Offset/length based so that embedders building rich diagnostics can slice
/// the original input directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Default)]
pub struct Span {
    /// Byte offset within the source document.
    pub(crate) offset: usize,
    /// Byte length within the source document.
    pub(crate) len: u32,
}

impl Span {
    /// Sentinel span meaning "unknown".
    pub const UNKNOWN: Self = Self { offset: 0, len: 0 };

    /// Returns the byte offset within the source document.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the byte length within the source document.
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Row/column location within the source document (1-indexed).
///
/// This type is used for both:
/// - fatal error reporting ([`crate::Error`])
/// - validation error reporting ([`crate::ValidationError`]), where its
///   ordering participates in the stable total order of reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Default)]
pub struct Location {
    /// 1-indexed row number in the input stream.
    pub(crate) line: u32,
    /// 1-indexed column number in the input stream.
    pub(crate) column: u32,
    /// Byte span within the document.
    #[serde(skip_serializing_if = "Span::is_empty")]
    pub(crate) span: Span,
}

impl Location {
    /// Sentinel value meaning "location unknown".
    ///
    /// Used when a precise position is not yet available at error creation time.
    pub const UNKNOWN: Self = Self {
        line: 0,
        column: 0,
        span: Span::UNKNOWN,
    };

    /// serde_yaml-compatible line information.
    #[inline]
    pub fn line(&self) -> u64 {
        self.line as u64
    }

    /// serde_yaml-compatible column information.
    #[inline]
    pub fn column(&self) -> u64 {
        self.column as u64
    }

    /// Byte span within the source document.
    #[inline]
    pub fn span(&self) -> Span {
        self.span
    }

    /// Create a new location record.
    ///
    /// Arguments:
    /// - `line`: 1-indexed line.
    /// - `column`: 1-indexed column.
    pub(crate) const fn new(line: usize, column: usize) -> Self {
        // 4 Gb is larger than any API description document in the wild, and
        // these coordinates are reporting only.
        Self {
            line: line as u32,
            column: column as u32,
            span: Span::UNKNOWN,
        }
    }

    pub(crate) const fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    #[inline]
    pub(crate) fn is_known(&self) -> bool {
        self != &Location::UNKNOWN
    }
}

/// Convert a `saphyr_parser::Span` to a 1-indexed [`Location`].
///
/// Called by:
/// - The node composer for each raw parser event.
pub(crate) fn location_from_span(span: &ParserSpan) -> Location {
    let start = &span.start;
    Location::new(start.line(), start.col() + 1).with_span(Span {
        offset: start.index(),
        len: span.len() as u32,
    })
}
