//! The streaming tag processor.
//!
//! A [`TagProcessor`] walks a document token by token without building a
//! tree. It records byte spans for the current token, decodes text and
//! attribute values on demand, and queues edits that are applied in one pass
//! before the next token is produced.
//!
//! ```
//! use wren_html::{AttributeValue, TagProcessor, TagQuery};
//!
//! let mut processor = TagProcessor::new(r#"<p class="intro">Hello <b>world</b></p>"#);
//! assert!(processor.next_tag(Some(&TagQuery::new().tag_name("b"))));
//! processor.set_attribute("id", "greeting").unwrap();
//!
//! assert_eq!(
//!     processor.get_updated_html().unwrap(),
//!     r#"<p class="intro">Hello <b id="greeting">world</b></p>"#
//! );
//! ```

mod attributes;
mod bookmarks;
mod lexer;
mod query;
mod text;
pub mod token;

use std::borrow::Cow;
use std::collections::HashMap;

pub use query::{TagClosers, TagQuery};
pub use token::{Attribute, AttributeValue, CommentKind, Token, TokenKind, TokenType};

use crate::edits::{EditQueue, Remap};
use crate::elements::{self, Namespace, TextKind};
use crate::error::{HtmlError, Result};
use crate::span::Span;

/// How many bookmarks may be live at once.
pub const MAX_BOOKMARKS: usize = 100;

/// How many times `seek` may be called on one processor.
pub const MAX_SEEK_OPS: usize = 1000;

/// What the scanner does at the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum LexMode {
    /// Look for text and tags.
    #[default]
    Markup,
    /// Read the content of a special text element up to its closer.
    SpecialText {
        tag_name: &'static str,
        kind: TextKind,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParserState {
    /// Nothing scanned yet, or rewound by `seek`.
    Ready,
    /// A token of the given type is current.
    Token(TokenType),
    /// The whole document has been scanned.
    Complete,
    /// A terminal error was recorded.
    Failed,
}

/// What a queued edit modifies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EditKey {
    /// The first attribute named `name` (lowercase) on the tag at `tag_at`.
    Attribute { tag_at: usize, name: String },
    /// A later duplicate attribute, removed along with the first.
    DuplicateAttribute { at: usize },
    /// The modifiable text of the token at `token_at`.
    Text { token_at: usize },
}

/// The logical effect of a queued edit, for reads before the flush.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EditValue {
    /// `None` removes the attribute.
    Attribute(Option<AttributeValue>),
    Text(String),
    Removal,
}

#[derive(Debug, Clone, Copy)]
struct Bookmark {
    span: Span,
    mode: LexMode,
    skips_newline: bool,
    namespace: Namespace,
}

/// Scans an HTML document one token at a time.
#[derive(Debug, Clone)]
pub struct TagProcessor {
    html: Vec<u8>,
    /// Where scanning resumes.
    cursor: usize,
    state: ParserState,
    mode: LexMode,
    namespace: Namespace,
    /// A newline at this offset is not part of the following text.
    skip_newline_at: Option<usize>,

    // The current token.
    token: Span,
    tag_name: Span,
    tag_name_upper: String,
    text: Span,
    text_kind: TextKind,
    is_closer: bool,
    self_closing: bool,
    comment_kind: Option<CommentKind>,
    attributes: Vec<Attribute>,
    /// The mode the current token was scanned in, for re-scanning it.
    token_mode: LexMode,
    token_skips_newline: bool,

    edits: EditQueue<EditKey, EditValue>,
    bookmarks: HashMap<String, Bookmark>,
    seek_count: usize,
    last_error: Option<HtmlError>,
}

impl TagProcessor {
    /// Create a processor for `html`.
    #[must_use]
    pub fn new(html: &str) -> Self {
        Self::from_bytes(html.as_bytes())
    }

    /// Create a processor for raw bytes. Text and attribute values that are
    /// not valid UTF-8 are decoded lossily.
    #[must_use]
    pub fn from_bytes(html: &[u8]) -> Self {
        Self {
            html: html.to_vec(),
            cursor: 0,
            state: ParserState::Ready,
            mode: LexMode::Markup,
            namespace: Namespace::Html,
            skip_newline_at: None,
            token: Span::default(),
            tag_name: Span::default(),
            tag_name_upper: String::new(),
            text: Span::default(),
            text_kind: TextKind::Data,
            is_closer: false,
            self_closing: false,
            comment_kind: None,
            attributes: Vec::new(),
            token_mode: LexMode::Markup,
            token_skips_newline: false,
            edits: EditQueue::new(),
            bookmarks: HashMap::new(),
            seek_count: 0,
            last_error: None,
        }
    }

    /// Move to the next token.
    ///
    /// Queued edits are applied first. Returns false at the end of the
    /// document or once a terminal error has been recorded; check
    /// [`TagProcessor::get_last_error`] to tell the two apart.
    pub fn next_token(&mut self) -> bool {
        if matches!(self.state, ParserState::Complete | ParserState::Failed) {
            return false;
        }
        if let Err(error) = self.flush_edits() {
            self.fail(error);
            return false;
        }

        match self.lex_next() {
            Ok(true) => true,
            Ok(false) => {
                self.state = ParserState::Complete;
                false
            }
            Err(error) => {
                self.fail(error);
                false
            }
        }
    }

    /// Move to the next tag matching `query`, or the next opening tag when
    /// there is no query.
    pub fn next_tag(&mut self, query: Option<&TagQuery>) -> bool {
        let any_opener = TagQuery::default();
        let query = query.unwrap_or(&any_opener);
        let mut matched = 0;

        while self.next_token() {
            if self.matches_query(query) {
                matched += 1;
                if matched >= query.match_offset {
                    return true;
                }
            }
        }
        false
    }

    /// The error that ended iteration, if any.
    #[must_use]
    pub const fn get_last_error(&self) -> Option<&HtmlError> {
        self.last_error.as_ref()
    }

    /// Whether every token has been produced without error.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state == ParserState::Complete
    }

    /// The type of the current token.
    #[must_use]
    pub const fn get_token_type(&self) -> Option<TokenType> {
        match self.state {
            ParserState::Token(token_type) => Some(token_type),
            _ => None,
        }
    }

    /// The node name of the current token: the uppercase tag name for tags,
    /// `html` for a DOCTYPE, and `#text`-style names otherwise.
    #[must_use]
    pub fn get_token_name(&self) -> Option<Cow<'_, str>> {
        let token_type = self.get_token_type()?;
        Some(match token_type {
            TokenType::Tag => Cow::Borrowed(self.tag_name_upper.as_str()),
            TokenType::Doctype => Cow::Borrowed("html"),
            other => Cow::Owned(other.to_string()),
        })
    }

    /// The uppercase name of the current tag.
    #[must_use]
    pub fn get_tag(&self) -> Option<&str> {
        (self.get_token_type()? == TokenType::Tag).then_some(self.tag_name_upper.as_str())
    }

    /// Whether the current token is a closing tag.
    #[must_use]
    pub fn is_tag_closer(&self) -> bool {
        self.get_token_type() == Some(TokenType::Tag) && self.is_closer
    }

    /// Whether the current tag ends with `/>`.
    ///
    /// HTML elements ignore the flag; it only closes foreign elements.
    #[must_use]
    pub fn has_self_closing_flag(&self) -> bool {
        self.get_token_type() == Some(TokenType::Tag) && self.self_closing
    }

    /// Whether `tag_name` is a void element.
    #[must_use]
    pub fn is_void(tag_name: &str) -> bool {
        elements::is_void(tag_name)
    }

    /// The syntax of the current comment token.
    #[must_use]
    pub fn get_comment_type(&self) -> Option<CommentKind> {
        (self.get_token_type()? == TokenType::Comment)
            .then_some(self.comment_kind)
            .flatten()
    }

    /// The current token as a structured value.
    ///
    /// After the last token this is [`TokenKind::Eof`].
    #[must_use]
    pub fn current_token(&self) -> Option<Token<'_>> {
        let kind = match self.state {
            ParserState::Complete => {
                return Some(Token {
                    kind: TokenKind::Eof,
                    span: Span::new(self.html.len(), 0),
                });
            }
            ParserState::Ready | ParserState::Failed => return None,
            ParserState::Token(TokenType::Tag) => TokenKind::Tag {
                name: &self.tag_name_upper,
                is_closer: self.is_closer,
                is_void: elements::is_void(&self.tag_name_upper),
                has_self_closing_flag: self.self_closing,
            },
            ParserState::Token(TokenType::Text) => TokenKind::Text,
            ParserState::Token(TokenType::Comment) => {
                TokenKind::Comment(self.comment_kind.unwrap_or(CommentKind::HtmlComment))
            }
            ParserState::Token(TokenType::Doctype) => TokenKind::Doctype,
            ParserState::Token(TokenType::CdataSection) => TokenKind::CdataSection,
            ParserState::Token(TokenType::FunkyComment) => TokenKind::FunkyComment,
            ParserState::Token(TokenType::PresumptuousTag) => TokenKind::PresumptuousTag,
        };
        Some(Token {
            kind,
            span: self.token,
        })
    }

    /// The namespace openers are currently scanned in.
    ///
    /// Special text elements (`SCRIPT`, `STYLE`, ...) only switch the
    /// scanner in the HTML namespace, and CDATA sections are only
    /// recognized outside it.
    #[must_use]
    pub const fn get_parsing_namespace(&self) -> Namespace {
        self.namespace
    }

    /// Change the namespace subsequent tokens are scanned in.
    pub fn set_parsing_namespace(&mut self, namespace: Namespace) {
        self.namespace = namespace;
    }

    /// Apply queued edits and return the document.
    ///
    /// The current token is scanned again afterwards so its accessors keep
    /// working against the new buffer. If the edits removed the current
    /// token entirely, there is no current token until the next call to
    /// [`TagProcessor::next_token`], which yields whatever followed it.
    ///
    /// # Errors
    ///
    /// Returns [`HtmlError::ConflictingEdit`] if queued edits overlap.
    pub fn get_updated_html(&mut self) -> Result<Cow<'_, str>> {
        if !self.edits.is_empty() {
            let current = match self.state {
                ParserState::Token(_) => {
                    Some((self.token, self.token_mode, self.token_skips_newline))
                }
                _ => None,
            };
            let remap = self.flush_edits()?;

            if let Some((token, mode, skips_newline)) = current {
                self.cursor = remap.offset(token.start);
                self.mode = mode;
                if skips_newline {
                    self.skip_newline_at = Some(self.cursor);
                }
                if remap.span(token).is_none_or(|span| span.is_empty()) {
                    self.clear_token();
                    return Ok(String::from_utf8_lossy(&self.html));
                }
                match self.lex_next() {
                    Ok(true) => {}
                    Ok(false) => self.state = ParserState::Complete,
                    Err(error) => self.fail(error),
                }
            }
        }
        Ok(String::from_utf8_lossy(&self.html))
    }

    // Introspection, for tools that render the scanner's view of a document.

    /// The buffer as of the last flush.
    #[must_use]
    pub fn html_bytes(&self) -> &[u8] {
        &self.html
    }

    /// Where scanning resumes.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// The span of the whole current token.
    #[must_use]
    pub const fn current_token_span(&self) -> Option<Span> {
        match self.state {
            ParserState::Token(_) => Some(self.token),
            _ => None,
        }
    }

    /// The span of the current tag's name.
    #[must_use]
    pub fn tag_name_span(&self) -> Option<Span> {
        (self.get_token_type()? == TokenType::Tag).then_some(self.tag_name)
    }

    /// The span of the current token's raw text (text, comment contents,
    /// DOCTYPE contents, CDATA contents, funky comment contents).
    #[must_use]
    pub fn text_span(&self) -> Option<Span> {
        match self.get_token_type()? {
            TokenType::Tag | TokenType::PresumptuousTag => None,
            _ => Some(self.text),
        }
    }

    /// The parsed attributes of the current tag, in source order and
    /// including duplicates.
    #[must_use]
    pub fn attribute_spans(&self) -> &[Attribute] {
        match self.get_token_type() {
            Some(TokenType::Tag) => &self.attributes,
            _ => &[],
        }
    }

    /// Every live bookmark, ordered by position.
    #[must_use]
    pub fn bookmark_spans(&self) -> Vec<(&str, Span)> {
        let mut spans: Vec<_> = self
            .bookmarks
            .iter()
            .map(|(name, bookmark)| (name.as_str(), bookmark.span))
            .collect();
        spans.sort_by_key(|&(name, span)| (span.start, name));
        spans
    }

    /// Number of edits waiting for the next flush.
    #[must_use]
    pub fn pending_edit_count(&self) -> usize {
        self.edits.len()
    }

    // Internal state management.

    fn clear_token(&mut self) {
        self.state = ParserState::Ready;
        self.token = Span::default();
        self.tag_name = Span::default();
        self.tag_name_upper.clear();
        self.text = Span::default();
        self.text_kind = TextKind::Data;
        self.is_closer = false;
        self.self_closing = false;
        self.comment_kind = None;
        self.attributes.clear();
        self.token_skips_newline = false;
    }

    fn fail(&mut self, error: HtmlError) {
        self.clear_token();
        self.state = ParserState::Failed;
        self.last_error = Some(error);
    }

    /// Apply queued edits and translate every offset the processor owns.
    fn flush_edits(&mut self) -> Result<Remap> {
        if self.edits.is_empty() {
            return Ok(Remap::default());
        }

        let remap = self.edits.apply(&mut self.html)?;
        self.cursor = remap.offset(self.cursor);
        self.skip_newline_at = self.skip_newline_at.map(|at| remap.offset(at));
        self.bookmarks.retain(|_, bookmark| {
            remap.span(bookmark.span).is_some_and(|span| {
                bookmark.span = span;
                true
            })
        });
        Ok(remap)
    }

    /// Rewind to the start of the document, keeping edits and bookmarks.
    pub(crate) fn rewind(&mut self) -> Result<()> {
        let _ = self.flush_edits()?;
        self.clear_token();
        self.cursor = 0;
        self.mode = LexMode::Markup;
        self.namespace = Namespace::Html;
        self.skip_newline_at = None;
        self.last_error = None;
        Ok(())
    }

    /// Where the bookmark named `name` starts, after applying queued edits.
    pub(crate) fn bookmark_start(&mut self, name: &str) -> Result<usize> {
        let _ = self.flush_edits()?;
        self.bookmarks
            .get(name)
            .map(|bookmark| bookmark.span.start)
            .ok_or_else(|| HtmlError::InvalidBookmark(name.to_string()))
    }

    /// Record a terminal error raised by a layer above the scanner.
    pub(crate) fn record_error(&mut self, error: HtmlError) {
        self.fail(error);
    }

    /// Stop scanning `SCRIPT`, `STYLE`, ... content as text. Used when the
    /// HTML processor drops an opener the scanner already switched for.
    pub(crate) fn reset_text_mode(&mut self) {
        self.mode = LexMode::Markup;
    }
}
