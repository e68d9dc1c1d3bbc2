//! Queued edits against the document buffer.
//!
//! Attribute and text mutations never touch the buffer directly. They are
//! queued here, keyed by what they modify, and applied together in one
//! left-to-right pass when the processor flushes. The [`Remap`] returned by a
//! flush translates offsets from the old buffer into the new one so cursors
//! and bookmarks keep pointing at the same content.

use crate::error::{HtmlError, Result};
use crate::span::Span;

/// A single pending replacement of `span` with `replacement`.
///
/// `key` identifies what the edit modifies so a later edit of the same thing
/// replaces it. `value` carries whatever the owner needs to answer reads
/// before the flush (e.g. the pending attribute value).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit<K, V = ()> {
    /// What this edit modifies.
    pub key: K,
    /// Bytes of the current buffer being replaced. Empty for insertions.
    pub span: Span,
    /// Replacement bytes, already escaped for their position.
    pub replacement: String,
    /// Owner-defined payload describing the edit's logical effect.
    pub value: V,
}

impl<K, V> Edit<K, V> {
    /// Whether two edits cannot both be applied.
    ///
    /// Two insertions at the same offset are fine and apply in queue order.
    /// An insertion conflicts with a replacement only when it lands strictly
    /// inside it.
    fn conflicts_with<L, W>(&self, other: &Edit<L, W>) -> bool {
        let (a, b) = (self.span, other.span);
        match (a.is_empty(), b.is_empty()) {
            (true, true) => false,
            (true, false) => b.start < a.start && a.start < b.end(),
            (false, true) => a.start < b.start && b.start < a.end(),
            (false, false) => a.overlaps(&b),
        }
    }
}

/// Ordered collection of pending edits.
#[derive(Debug, Clone)]
pub struct EditQueue<K, V = ()> {
    edits: Vec<Edit<K, V>>,
}

impl<K, V> Default for EditQueue<K, V> {
    fn default() -> Self {
        Self { edits: Vec::new() }
    }
}

impl<K: PartialEq, V> EditQueue<K, V> {
    /// An empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Number of queued edits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Queue `edit`, replacing any queued edit with the same key.
    ///
    /// # Errors
    ///
    /// Returns [`HtmlError::ConflictingEdit`] if the edit overlaps a queued
    /// edit with a different key. The queue is left unchanged.
    pub fn enqueue(&mut self, edit: Edit<K, V>) -> Result<()> {
        if let Some(clash) = self
            .edits
            .iter()
            .find(|queued| queued.key != edit.key && queued.conflicts_with(&edit))
        {
            return Err(HtmlError::ConflictingEdit(clash.span));
        }

        match self.edits.iter_mut().find(|queued| queued.key == edit.key) {
            Some(queued) => *queued = edit,
            None => self.edits.push(edit),
        }
        Ok(())
    }

    /// The queued edit with `key`, if any.
    #[must_use]
    pub fn find(&self, key: &K) -> Option<&Edit<K, V>> {
        self.edits.iter().find(|queued| &queued.key == key)
    }

    /// Drop every queued edit for which `keep` returns false.
    pub fn retain(&mut self, keep: impl FnMut(&Edit<K, V>) -> bool) {
        self.edits.retain(keep);
    }

    /// Iterate over queued edits in queue order.
    pub fn iter(&self) -> impl Iterator<Item = &Edit<K, V>> {
        self.edits.iter()
    }

    /// Apply every queued edit to `buffer` and empty the queue.
    ///
    /// # Errors
    ///
    /// Returns [`HtmlError::ConflictingEdit`] if two queued edits overlap.
    /// Both the buffer and the queue are left untouched in that case.
    pub fn apply(&mut self, buffer: &mut Vec<u8>) -> Result<Remap> {
        if self.edits.is_empty() {
            return Ok(Remap::default());
        }

        // Stable: insertions at the same offset keep queue order.
        self.edits
            .sort_by_key(|edit| (edit.span.start, edit.span.end()));

        for pair in self.edits.windows(2) {
            if pair[0].conflicts_with(&pair[1]) || pair[1].span.start < pair[0].span.end() {
                return Err(HtmlError::ConflictingEdit(pair[1].span));
            }
        }

        let growth: usize = self.edits.iter().map(|edit| edit.replacement.len()).sum();
        let mut output = Vec::with_capacity(buffer.len() + growth);
        let mut replaced = Vec::with_capacity(self.edits.len());
        let mut copied_until = 0;

        for edit in self.edits.drain(..) {
            let start = edit.span.start.min(buffer.len());
            let end = edit.span.end().min(buffer.len());
            output.extend_from_slice(&buffer[copied_until..start]);
            output.extend_from_slice(edit.replacement.as_bytes());
            copied_until = end;
            replaced.push((Span::from_range(start, end), edit.replacement.len()));
        }
        output.extend_from_slice(&buffer[copied_until..]);

        *buffer = output;
        Ok(Remap { replaced })
    }
}

/// Translation of offsets from the buffer before a flush to the buffer after.
#[derive(Debug, Clone, Default)]
pub struct Remap {
    /// Replaced region in the old buffer and the length of its replacement,
    /// sorted by start offset.
    replaced: Vec<(Span, usize)>,
}

impl Remap {
    /// Whether the flush changed nothing.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.replaced.is_empty()
    }

    /// Translate an offset that marks the start of something.
    ///
    /// Insertions at exactly `offset` land before it. An offset strictly
    /// inside a replaced region moves to the start of its replacement.
    #[must_use]
    pub fn offset(&self, offset: usize) -> usize {
        let mut grown = 0;
        let mut shrunk = 0;
        for &(span, new_length) in &self.replaced {
            if span.end() <= offset {
                grown += new_length;
                shrunk += span.length;
            } else if span.start < offset {
                // Inside a replaced region.
                return span.start + grown - shrunk;
            } else {
                break;
            }
        }
        offset + grown - shrunk
    }

    /// Translate an offset that marks the end of something.
    ///
    /// Unlike [`Remap::offset`], insertions at exactly `offset` land after it.
    fn end_offset(&self, offset: usize) -> usize {
        let mut grown = 0;
        let mut shrunk = 0;
        for &(span, new_length) in &self.replaced {
            if span.start < offset && span.end() <= offset {
                grown += new_length;
                shrunk += span.length;
            } else if span.start >= offset {
                break;
            }
        }
        offset + grown - shrunk
    }

    /// Translate a span, or `None` if its content did not survive.
    ///
    /// A span disappears when a replaced region covers it, or when one of its
    /// boundaries falls strictly inside a replaced region. A span replaced
    /// exactly by non-empty content becomes the span of that content. Edits
    /// strictly inside the span resize it.
    #[must_use]
    pub fn span(&self, span: Span) -> Option<Span> {
        for &(replaced, new_length) in &self.replaced {
            if replaced.is_empty() {
                continue;
            }
            if replaced == span {
                return (new_length > 0).then(|| Span::new(self.offset(span.start), new_length));
            }
            let covers = replaced.start <= span.start && span.end() <= replaced.end();
            let cuts_start = replaced.start < span.start && span.start < replaced.end();
            let cuts_end = replaced.start < span.end() && span.end() < replaced.end();
            if covers || cuts_start || cuts_end {
                return None;
            }
        }

        let start = self.offset(span.start);
        let end = self.end_offset(span.end());
        Some(Span::from_range(start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(key: &'static str, start: usize, end: usize, replacement: &str) -> Edit<&'static str> {
        Edit {
            key,
            span: Span::from_range(start, end),
            replacement: replacement.to_string(),
            value: (),
        }
    }

    #[test]
    fn test_apply_in_one_pass() {
        let mut buffer = b"<div id=a class=b>".to_vec();
        let mut queue = EditQueue::new();
        queue.enqueue(edit("class", 10, 17, "class=\"c\"")).unwrap();
        queue.enqueue(edit("id", 4, 9, "")).unwrap();
        queue.enqueue(edit("new", 4, 4, " data-x")).unwrap();

        let remap = queue.apply(&mut buffer).unwrap();
        assert_eq!(buffer, b"<div data-x class=\"c\">");
        assert!(queue.is_empty());
        assert!(!remap.is_identity());
    }

    #[test]
    fn test_same_key_replaces_pending_edit() {
        let mut buffer = b"<p id=a>".to_vec();
        let mut queue = EditQueue::new();
        queue.enqueue(edit("id", 3, 7, "id=\"b\"")).unwrap();
        queue.enqueue(edit("id", 3, 7, "id=\"c\"")).unwrap();
        assert_eq!(queue.len(), 1);

        let _ = queue.apply(&mut buffer).unwrap();
        assert_eq!(buffer, b"<p id=\"c\">");
    }

    #[test]
    fn test_overlapping_edits_fail_fast() {
        let mut queue = EditQueue::new();
        queue.enqueue(edit("text", 10, 20, "x")).unwrap();
        let result = queue.enqueue(edit("other", 15, 25, "y"));
        assert!(matches!(result, Err(HtmlError::ConflictingEdit(_))));
        assert_eq!(queue.len(), 1);

        let result = queue.enqueue(edit("insert", 12, 12, "z"));
        assert!(matches!(result, Err(HtmlError::ConflictingEdit(_))));
    }

    #[test]
    fn test_insertions_at_same_offset_keep_order() {
        let mut buffer = b"<b>".to_vec();
        let mut queue = EditQueue::new();
        queue.enqueue(edit("one", 2, 2, " one")).unwrap();
        queue.enqueue(edit("two", 2, 2, " two")).unwrap();
        let _ = queue.apply(&mut buffer).unwrap();
        assert_eq!(buffer, b"<b one two>");
    }

    #[test]
    fn test_remap_shifts_later_spans() {
        let mut buffer = b"<a href=x>link</a><em>after</em>".to_vec();
        let mut queue = EditQueue::new();
        queue
            .enqueue(edit("href", 3, 9, "href=\"https://example.com\""))
            .unwrap();
        let remap = queue.apply(&mut buffer).unwrap();

        // `<em>` started at 18 and the edit grew the buffer by 20 bytes.
        let em = remap.span(Span::new(18, 4)).unwrap();
        assert_eq!(em, Span::new(38, 4));
        assert_eq!(&buffer[em.start..em.end()], b"<em>");

        // The edited tag itself grows but keeps its start.
        let anchor = remap.span(Span::new(0, 10)).unwrap();
        assert_eq!(anchor, Span::new(0, 30));
        assert_eq!(remap.offset(10), 30);
    }

    #[test]
    fn test_remap_invalidates_removed_content() {
        let mut buffer = b"<p>one two three</p>".to_vec();
        let mut queue = EditQueue::new();
        queue.enqueue(edit("text", 3, 16, "")).unwrap();
        let remap = queue.apply(&mut buffer).unwrap();

        assert_eq!(remap.span(Span::new(3, 13)), None);
        assert_eq!(remap.span(Span::new(16, 4)), Some(Span::new(3, 4)));
    }

    #[test]
    fn test_remap_tracks_exact_replacement() {
        let mut buffer = b"<p>old</p>".to_vec();
        let mut queue = EditQueue::new();
        queue.enqueue(edit("text", 3, 6, "brand new")).unwrap();
        let remap = queue.apply(&mut buffer).unwrap();

        assert_eq!(remap.span(Span::new(3, 3)), Some(Span::new(3, 9)));
        // A span cut in half by the replacement does not survive.
        assert_eq!(remap.span(Span::new(0, 5)), None);
    }
}
