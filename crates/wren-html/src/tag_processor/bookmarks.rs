//! Named positions that survive edits, and seeking back to them.

use super::{Bookmark, MAX_BOOKMARKS, MAX_SEEK_OPS, ParserState, TagProcessor};
use crate::error::{HtmlError, Result};

impl TagProcessor {
    /// Remember the current token under `name`, replacing any bookmark with
    /// that name.
    ///
    /// # Errors
    ///
    /// Returns [`HtmlError::InvalidOperation`] if there is no current token
    /// or [`MAX_BOOKMARKS`] bookmarks are already live.
    pub fn set_bookmark(&mut self, name: &str) -> Result<()> {
        const OPERATION: &str = "set a bookmark";

        if !matches!(self.state, ParserState::Token(_)) {
            return Err(HtmlError::invalid(OPERATION, "there is no current token"));
        }
        if !self.bookmarks.contains_key(name) && self.bookmarks.len() >= MAX_BOOKMARKS {
            return Err(HtmlError::invalid(OPERATION, "too many bookmarks are live"));
        }

        let bookmark = Bookmark {
            span: self.token,
            mode: self.token_mode,
            skips_newline: self.token_skips_newline,
            namespace: self.namespace,
        };
        let _ = self.bookmarks.insert(name.to_string(), bookmark);
        Ok(())
    }

    /// Forget the bookmark `name`. Returns whether it existed.
    pub fn release_bookmark(&mut self, name: &str) -> bool {
        self.bookmarks.remove(name).is_some()
    }

    /// Whether `name` is a live bookmark.
    #[must_use]
    pub fn has_bookmark(&self, name: &str) -> bool {
        self.bookmarks.contains_key(name)
    }

    /// Move back (or forward) so the next call to
    /// [`TagProcessor::next_token`] produces the bookmarked token.
    ///
    /// Queued edits are applied first.
    ///
    /// # Errors
    ///
    /// Returns [`HtmlError::InvalidBookmark`] if `name` is unknown or its
    /// content was removed by an edit, and [`HtmlError::InvalidOperation`]
    /// once [`MAX_SEEK_OPS`] seeks have been made.
    pub fn seek(&mut self, name: &str) -> Result<()> {
        if self.seek_count >= MAX_SEEK_OPS {
            return Err(HtmlError::invalid("seek", "too many seek operations"));
        }
        let _ = self.flush_edits()?;

        let bookmark = *self
            .bookmarks
            .get(name)
            .ok_or_else(|| HtmlError::InvalidBookmark(name.to_string()))?;

        self.seek_count += 1;
        self.clear_token();
        self.cursor = bookmark.span.start;
        self.mode = bookmark.mode;
        self.namespace = bookmark.namespace;
        self.skip_newline_at = bookmark.skips_newline.then_some(bookmark.span.start);
        self.last_error = None;
        Ok(())
    }
}
