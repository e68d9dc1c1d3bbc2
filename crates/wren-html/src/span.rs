//! Byte ranges into the document buffer.

/// A `(start, length)` byte range into the current document buffer.
///
/// Spans are only meaningful for the buffer generation they were taken
/// from. Flushing queued edits produces a new generation; the processors
/// translate the spans they own (bookmarks and the cursor) when that
/// happens, while spans handed out to callers go stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Byte offset of the first byte in the range.
    pub start: usize,
    /// Number of bytes in the range.
    pub length: usize,
}

impl Span {
    /// Create a span from a start offset and a length.
    #[must_use]
    pub const fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    /// Create a span covering `start..end`.
    #[must_use]
    pub const fn from_range(start: usize, end: usize) -> Self {
        Self {
            start,
            length: end.saturating_sub(start),
        }
    }

    /// Offset one past the last byte of the range.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.start + self.length
    }

    /// Whether the span covers zero bytes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Whether `offset` lies inside the span.
    #[must_use]
    pub const fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end()
    }

    /// Whether the two spans share at least one byte.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end() && other.start < self.end()
    }

    /// The bytes this span covers in `bytes`, clamped to the slice.
    #[must_use]
    pub fn slice<'a>(&self, bytes: &'a [u8]) -> &'a [u8] {
        let start = self.start.min(bytes.len());
        let end = self.end().min(bytes.len());
        &bytes[start..end]
    }
}
