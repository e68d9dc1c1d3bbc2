//! The HTML processor.
//!
//! An [`HtmlProcessor`] runs the [`TagProcessor`] through a subset of the
//! HTML tree construction algorithm. No tree is built; the processor keeps
//! the stack of open elements and the list of active formatting elements so
//! every token can be placed in the document structure.
//!
//! [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
//!
//! # Scope
//!
//! - Implied `HTML`, `HEAD`, `BODY`, `P`, `LI`, `DD`/`DT` and table section
//!   elements, and the closers they imply.
//! - Active formatting reconstruction and the Noah's Ark clause.
//! - Well-formed tables, `TEMPLATE`, SVG and `MathML`.
//!
//! # Not Yet Implemented
//!
//! These fail with [`HtmlError::UnsupportedMarkup`] instead of producing
//! wrong breadcrumbs:
//!
//! - Foster parenting of content misplaced inside tables.
//! - The adoption agency algorithm when a furthest block exists.
//! - `FRAMESET` documents and table content directly inside `TEMPLATE`.
//!
//! ```
//! use wren_html::HtmlProcessor;
//!
//! let mut processor = HtmlProcessor::create_fragment("<ul><li>One<li>Two</ul>");
//! while processor.next_token() {
//!     if processor.get_tag() == Some("LI") && !processor.is_tag_closer() {
//!         assert_eq!(processor.get_breadcrumbs(), ["HTML", "BODY", "UL", "LI"]);
//!     }
//! }
//! assert!(processor.get_last_error().is_none());
//! ```

mod before_body;
mod foreign_content;
mod formatting;
mod in_body;
mod in_table;
mod modes;
mod stack;

use std::borrow::Cow;

pub use modes::InsertionMode;

use wren_common::warning::warn_once;

use self::formatting::{ActiveFormattingElements, FormattingEntry};
use self::stack::{Element, NodeId, OpenElements, Scope};
use crate::elements::{self, Namespace};
use crate::error::{HtmlError, Malformed, Result, Unsupported};
use crate::span::Span;
use crate::tag_processor::{
    AttributeValue, CommentKind, MAX_SEEK_OPS, TagProcessor, TagQuery, Token, TokenType,
};

/// The token as the tree builder sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TreeToken {
    Doctype,
    Comment,
    Text,
    Cdata,
    StartTag { name: String, self_closing: bool },
    EndTag { name: String },
    /// `</>`, which the tokenizer drops.
    Nothing,
}

/// What happens to a token once the tree builder has seen it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// The token is part of the document.
    Yield,
    /// "Parse error. Ignore the token."
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Progress {
    Running,
    /// `seek` left the bookmarked token current; the next call to
    /// `next_token` reports it without advancing.
    Replayed,
    Finished,
}

/// Walks a document with the tag processor while tracking where every
/// token sits in the element tree.
#[derive(Debug, Clone)]
pub struct HtmlProcessor {
    tags: TagProcessor,
    /// The fragment context element, `None` for full documents.
    context: Option<String>,

    /// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
    mode: InsertionMode,
    /// [§ 13.2.4.1 The original insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#original-insertion-mode)
    original_mode: Option<InsertionMode>,
    /// "The stack of template insertion modes"
    template_modes: Vec<InsertionMode>,
    stack: OpenElements,
    formatting: ActiveFormattingElements,
    /// [§ 13.2.4.4 The element pointers](https://html.spec.whatwg.org/multipage/parsing.html#the-element-pointers)
    head: Option<Element>,
    /// "after head" pushed `HEAD` back to insert an element into it.
    head_reinserted: bool,
    form: Option<NodeId>,
    /// Set by a missing or legacy DOCTYPE. Only changes whether `TABLE`
    /// closes an open `P`.
    quirks: bool,
    next_id: usize,

    /// An element the current token closed, or opened and closed at once.
    /// It ends the breadcrumbs without being on the stack.
    tail: Option<Element>,
    /// How many open elements the current token sits under, when that is
    /// not the whole stack. Comments after the body belong to `HTML` or to
    /// the document itself.
    parent_depth: Option<usize>,
    progress: Progress,
    seek_count: usize,
}

impl HtmlProcessor {
    /// Process `html` as the contents of a `BODY` element.
    #[must_use]
    pub fn create_fragment(html: &str) -> Self {
        Self::with_context(TagProcessor::new(html), Some("BODY".to_string()))
    }

    /// Process `html` as the contents of a `context` element, given as a
    /// tag name (`"div"`) or a bare opener (`"<div>"`).
    ///
    /// # Errors
    ///
    /// Returns [`HtmlError::UnsupportedMarkup`] for contexts that change how
    /// the content is tokenized or that need a table, template, head or
    /// foreign-content insertion mode.
    pub fn create_fragment_with_context(html: &str, context: &str) -> Result<Self> {
        let name = context
            .trim()
            .trim_start_matches('<')
            .trim_end_matches('>')
            .trim()
            .to_ascii_uppercase();
        if !is_supported_context(&name) {
            let _ = warn_once(
                "HTML Processor",
                &format!("fragment context `{context}` is not supported"),
            );
            return Err(HtmlError::UnsupportedMarkup {
                at: 0,
                reason: Unsupported::FragmentContext,
            });
        }
        Ok(Self::with_context(TagProcessor::new(html), Some(name)))
    }

    /// Process `html` as a complete document, starting from the "initial"
    /// insertion mode.
    #[must_use]
    pub fn create_full_parser(html: &str) -> Self {
        Self::with_context(TagProcessor::new(html), None)
    }

    fn with_context(tags: TagProcessor, context: Option<String>) -> Self {
        let mut processor = Self {
            tags,
            context,
            mode: InsertionMode::Initial,
            original_mode: None,
            template_modes: Vec::new(),
            stack: OpenElements::new(),
            formatting: ActiveFormattingElements::new(),
            head: None,
            head_reinserted: false,
            form: None,
            quirks: false,
            next_id: 0,
            tail: None,
            parent_depth: None,
            progress: Progress::Running,
            seek_count: 0,
        };
        processor.reset_tree();
        processor
    }

    /// Put the tree builder back in its starting state.
    ///
    /// [§ 13.2.9 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
    fn reset_tree(&mut self) {
        self.mode = InsertionMode::Initial;
        self.original_mode = None;
        self.template_modes.clear();
        self.stack = OpenElements::new();
        self.formatting = ActiveFormattingElements::new();
        self.head = None;
        self.head_reinserted = false;
        self.form = None;
        self.quirks = false;
        self.next_id = 0;
        self.tail = None;
        self.parent_depth = None;

        let Some(context) = self.context.clone() else {
            return;
        };

        // STEP 7: "Let root be the result of creating an html element."
        // STEP 8: "Append the element root to the Document node created
        //          above."
        // STEP 9: "Set up the parser's stack of open elements so that it
        //          contains just the single element root."
        let root = self.create_element("HTML", Namespace::Html, false);
        self.stack.push(root);

        // The context element stays on the stack so it appears in the
        // breadcrumbs, below the floor so nothing in the fragment closes it.
        let context_element = self.create_element(&context, Namespace::Html, false);
        if context == "FORM" {
            self.form = Some(context_element.id);
        }
        self.stack.push(context_element);
        self.stack.protect_all();

        // STEP 11: "Reset the parser's insertion mode appropriately."
        self.reset_insertion_mode();
    }

    // Iteration.

    /// Move to the next token the tree builder keeps.
    ///
    /// Tokens the tree construction algorithm ignores (a second `BODY`
    /// opener, stray closers, misplaced DOCTYPEs, whitespace before `HTML`)
    /// are skipped. At the end of the document, elements other than `HTML`,
    /// `HEAD`, `BODY` and the fragment context that are still open are
    /// reported as [`Malformed::UnclosedElements`].
    pub fn next_token(&mut self) -> bool {
        match self.progress {
            Progress::Finished => return false,
            Progress::Replayed => {
                self.progress = Progress::Running;
                return true;
            }
            Progress::Running => {}
        }

        loop {
            self.tail = None;
            self.parent_depth = None;
            self.drop_reinserted_head();
            if !self.tags.next_token() {
                if self.tags.get_last_error().is_none() {
                    self.check_unclosed_elements();
                }
                self.progress = Progress::Finished;
                return false;
            }

            let token = self.tree_token();
            match self.dispatch(&token) {
                Ok(Step::Yield) => {
                    self.sync_parsing_namespace();
                    return true;
                }
                Ok(Step::Ignore) => {
                    // An ignored `SCRIPT`, `TEXTAREA`, ... opener must not
                    // switch the tokenizer.
                    if matches!(token, TreeToken::StartTag { .. }) {
                        self.tags.reset_text_mode();
                    }
                    self.sync_parsing_namespace();
                }
                Err(error) => {
                    self.bail(error);
                    return false;
                }
            }
        }
    }

    /// Move to the next tag matching `query`, or the next opening tag when
    /// there is no query. Queries may require breadcrumbs.
    pub fn next_tag(&mut self, query: Option<&TagQuery>) -> bool {
        let any_opener = TagQuery::default();
        let query = query.unwrap_or(&any_opener);
        let mut matched = 0;

        while self.next_token() {
            let breadcrumbs_match = query
                .breadcrumbs
                .as_deref()
                .is_none_or(|breadcrumbs| self.matches_breadcrumbs(breadcrumbs));
            let tag_matches = self
                .get_tag()
                .is_some_and(|tag| self.tags.matches_query_as(query, tag));
            if breadcrumbs_match && tag_matches {
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
        self.tags.get_last_error()
    }

    /// Whether the whole document was processed without error.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.progress == Progress::Finished && self.tags.is_complete()
    }

    /// The insertion mode the next token will be processed in.
    #[must_use]
    pub const fn get_insertion_mode(&self) -> InsertionMode {
        self.mode
    }

    /// The underlying tag processor, for read-only introspection.
    #[must_use]
    pub const fn tag_processor(&self) -> &TagProcessor {
        &self.tags
    }

    // Tree position.

    /// The tag names from the root to the current token.
    ///
    /// For an opener this ends with the element it opened, for a closer
    /// with the element it closed, and for anything else with the element
    /// that contains it. Empty when there is no current token.
    #[must_use]
    pub fn get_breadcrumbs(&self) -> Vec<&str> {
        self.breadcrumb_elements()
            .map(|element| element.name.as_str())
            .collect()
    }

    /// Whether the breadcrumbs end with `breadcrumbs`, where `*` matches any
    /// one element. Names compare ASCII case-insensitively.
    #[must_use]
    pub fn matches_breadcrumbs<S: AsRef<str>>(&self, breadcrumbs: &[S]) -> bool {
        let actual = self.get_breadcrumbs();
        if breadcrumbs.is_empty() || breadcrumbs.len() > actual.len() {
            return false;
        }
        actual
            .iter()
            .rev()
            .zip(breadcrumbs.iter().rev())
            .all(|(name, pattern)| {
                let pattern = pattern.as_ref();
                pattern == "*" || name.eq_ignore_ascii_case(pattern)
            })
    }

    /// How many elements deep the current token is.
    #[must_use]
    pub fn get_current_depth(&self) -> usize {
        self.breadcrumb_elements().count()
    }

    /// The namespace of the element the current token opened, closed or
    /// sits in.
    #[must_use]
    pub fn get_namespace(&self) -> Namespace {
        self.breadcrumb_elements()
            .last()
            .map_or(Namespace::Html, |element| element.namespace)
    }

    /// The current tag's name as it appears in the DOM: uppercase for
    /// HTML, lowercase for `MathML`, and with SVG's mixed case restored.
    #[must_use]
    pub fn get_qualified_tag_name(&self) -> Option<Cow<'_, str>> {
        let tag = self.get_tag()?;
        Some(match self.get_namespace() {
            Namespace::Html => Cow::Borrowed(tag),
            Namespace::MathMl => Cow::Owned(tag.to_ascii_lowercase()),
            Namespace::Svg => {
                let lowercase = tag.to_ascii_lowercase();
                foreign_content::adjusted_svg_tag_name(&lowercase)
                    .map_or(Cow::Owned(lowercase), Cow::Borrowed)
            }
        })
    }

    /// The DOM name of attribute `name` on the current tag, with the SVG,
    /// `MathML` and foreign attribute adjustments applied.
    #[must_use]
    pub fn get_qualified_attribute_name(&self, name: &str) -> Option<String> {
        let _ = self.get_tag()?;
        Some(foreign_content::adjusted_attribute_name(
            self.get_namespace(),
            &name.to_ascii_lowercase(),
        ))
    }

    /// Whether the current token opened an element that a later closer
    /// will end. False for void elements, self-closing foreign elements,
    /// closers and non-tag tokens.
    #[must_use]
    pub fn expects_closer(&self) -> bool {
        self.tags.get_token_type() == Some(TokenType::Tag)
            && !self.tags.is_tag_closer()
            && self.tail.is_none()
    }

    /// Whether `tag_name` is a void element.
    #[must_use]
    pub fn is_void(tag_name: &str) -> bool {
        elements::is_void(tag_name)
    }

    // The current token, as on the tag processor.

    /// See [`TagProcessor::get_token_type`].
    #[must_use]
    pub const fn get_token_type(&self) -> Option<TokenType> {
        self.tags.get_token_type()
    }

    /// See [`TagProcessor::get_token_name`]. `IMAGE` is reported as `IMG`,
    /// which is what the tree builder creates for it.
    #[must_use]
    pub fn get_token_name(&self) -> Option<Cow<'_, str>> {
        match self.get_tag() {
            Some(tag) => Some(Cow::Borrowed(tag)),
            None => self.tags.get_token_name(),
        }
    }

    /// The uppercase name of the current tag. `IMAGE` is reported as `IMG`.
    #[must_use]
    pub fn get_tag(&self) -> Option<&str> {
        match self.tags.get_tag()? {
            "IMAGE" if self.get_namespace() == Namespace::Html => Some("IMG"),
            tag => Some(tag),
        }
    }

    /// See [`TagProcessor::is_tag_closer`].
    #[must_use]
    pub fn is_tag_closer(&self) -> bool {
        self.tags.is_tag_closer()
    }

    /// See [`TagProcessor::has_self_closing_flag`].
    #[must_use]
    pub fn has_self_closing_flag(&self) -> bool {
        self.tags.has_self_closing_flag()
    }

    /// See [`TagProcessor::get_comment_type`].
    #[must_use]
    pub fn get_comment_type(&self) -> Option<CommentKind> {
        self.tags.get_comment_type()
    }

    /// See [`TagProcessor::current_token`].
    #[must_use]
    pub fn current_token(&self) -> Option<Token<'_>> {
        self.tags.current_token()
    }

    /// See [`TagProcessor::current_token_span`].
    #[must_use]
    pub const fn current_token_span(&self) -> Option<Span> {
        self.tags.current_token_span()
    }

    /// See [`TagProcessor::get_attribute`].
    ///
    /// # Errors
    ///
    /// Returns [`HtmlError::InvalidOperation`] if the current token is not
    /// a tag.
    pub fn get_attribute(&self, name: &str) -> Result<Option<AttributeValue>> {
        self.tags.get_attribute(name)
    }

    /// See [`TagProcessor::get_attribute_names_with_prefix`].
    #[must_use]
    pub fn get_attribute_names_with_prefix(&self, prefix: &str) -> Option<Vec<String>> {
        self.tags.get_attribute_names_with_prefix(prefix)
    }

    /// See [`TagProcessor::set_attribute`].
    ///
    /// # Errors
    ///
    /// As for [`TagProcessor::set_attribute`].
    pub fn set_attribute(&mut self, name: &str, value: &str) -> Result<()> {
        self.tags.set_attribute(name, value)
    }

    /// See [`TagProcessor::set_boolean_attribute`].
    ///
    /// # Errors
    ///
    /// As for [`TagProcessor::set_attribute`].
    pub fn set_boolean_attribute(&mut self, name: &str) -> Result<()> {
        self.tags.set_boolean_attribute(name)
    }

    /// See [`TagProcessor::remove_attribute`].
    ///
    /// # Errors
    ///
    /// As for [`TagProcessor::set_attribute`].
    pub fn remove_attribute(&mut self, name: &str) -> Result<bool> {
        self.tags.remove_attribute(name)
    }

    /// See [`TagProcessor::has_class`].
    ///
    /// # Errors
    ///
    /// As for [`TagProcessor::get_attribute`].
    pub fn has_class(&self, name: &str) -> Result<bool> {
        self.tags.has_class(name)
    }

    /// See [`TagProcessor::class_list`].
    ///
    /// # Errors
    ///
    /// As for [`TagProcessor::get_attribute`].
    pub fn class_list(&self) -> Result<Vec<String>> {
        self.tags.class_list()
    }

    /// See [`TagProcessor::add_class`].
    ///
    /// # Errors
    ///
    /// As for [`TagProcessor::set_attribute`].
    pub fn add_class(&mut self, name: &str) -> Result<()> {
        self.tags.add_class(name)
    }

    /// See [`TagProcessor::remove_class`].
    ///
    /// # Errors
    ///
    /// As for [`TagProcessor::set_attribute`].
    pub fn remove_class(&mut self, name: &str) -> Result<()> {
        self.tags.remove_class(name)
    }

    /// See [`TagProcessor::get_modifiable_text`].
    #[must_use]
    pub fn get_modifiable_text(&self) -> String {
        self.tags.get_modifiable_text()
    }

    /// See [`TagProcessor::set_modifiable_text`].
    ///
    /// # Errors
    ///
    /// As for [`TagProcessor::set_modifiable_text`].
    pub fn set_modifiable_text(&mut self, text: &str) -> Result<()> {
        self.tags.set_modifiable_text(text)
    }

    /// See [`TagProcessor::get_updated_html`].
    ///
    /// # Errors
    ///
    /// Returns [`HtmlError::ConflictingEdit`] if queued edits overlap.
    pub fn get_updated_html(&mut self) -> Result<Cow<'_, str>> {
        self.tags.get_updated_html()
    }

    // Bookmarks.

    /// See [`TagProcessor::set_bookmark`].
    ///
    /// # Errors
    ///
    /// As for [`TagProcessor::set_bookmark`].
    pub fn set_bookmark(&mut self, name: &str) -> Result<()> {
        self.tags.set_bookmark(name)
    }

    /// See [`TagProcessor::release_bookmark`].
    pub fn release_bookmark(&mut self, name: &str) -> bool {
        self.tags.release_bookmark(name)
    }

    /// See [`TagProcessor::has_bookmark`].
    #[must_use]
    pub fn has_bookmark(&self, name: &str) -> bool {
        self.tags.has_bookmark(name)
    }

    /// Return to the token bookmarked as `name`, so the next call to
    /// [`HtmlProcessor::next_token`] produces it again.
    ///
    /// The document is replayed from the start so the stack of open
    /// elements and the breadcrumbs match a straight run to that token.
    /// Queued edits are applied first.
    ///
    /// # Errors
    ///
    /// Returns [`HtmlError::InvalidBookmark`] if `name` is unknown, was
    /// invalidated by an edit, or no longer starts a token the tree builder
    /// keeps, and [`HtmlError::InvalidOperation`] once [`MAX_SEEK_OPS`]
    /// seeks have been made.
    pub fn seek(&mut self, name: &str) -> Result<()> {
        if self.seek_count >= MAX_SEEK_OPS {
            return Err(HtmlError::invalid("seek", "too many seek operations"));
        }
        let target = self.tags.bookmark_start(name)?;
        self.seek_count += 1;

        self.tags.rewind()?;
        self.reset_tree();
        self.progress = Progress::Running;

        while self.next_token() {
            match self.tags.current_token_span() {
                Some(span) if span.start == target => {
                    self.progress = Progress::Replayed;
                    return Ok(());
                }
                Some(span) if span.start > target => break,
                _ => {}
            }
        }
        Err(HtmlError::InvalidBookmark(name.to_string()))
    }

    // Tree builder internals shared by the insertion modes.

    fn breadcrumb_elements(&self) -> impl Iterator<Item = &Element> {
        let has_token = self.tags.get_token_type().is_some();
        self.stack
            .iter()
            .chain(self.tail.iter())
            .take(self.parent_depth.unwrap_or(usize::MAX))
            .filter(move |_| has_token)
    }

    fn tree_token(&self) -> TreeToken {
        match self.tags.get_token_type() {
            Some(TokenType::Tag) => {
                let name = self.tags.get_tag().unwrap_or_default().to_string();
                if self.tags.is_tag_closer() {
                    TreeToken::EndTag { name }
                } else {
                    TreeToken::StartTag {
                        name,
                        self_closing: self.tags.has_self_closing_flag(),
                    }
                }
            }
            Some(TokenType::Text) => TreeToken::Text,
            Some(TokenType::Comment | TokenType::FunkyComment) => TreeToken::Comment,
            Some(TokenType::Doctype) => TreeToken::Doctype,
            Some(TokenType::CdataSection) => TreeToken::Cdata,
            Some(TokenType::PresumptuousTag) | None => TreeToken::Nothing,
        }
    }

    /// [§ 13.2.6 Tree construction dispatcher](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction-dispatcher)
    pub(crate) fn dispatch(&mut self, token: &TreeToken) -> Result<Step> {
        if *token == TreeToken::Nothing {
            return Ok(Step::Ignore);
        }
        if self.uses_foreign_rules(token) {
            self.step_in_foreign_content(token)
        } else {
            self.step_in(self.mode, token)
        }
    }

    /// Process `token` using the rules for `mode`.
    pub(crate) fn step_in(&mut self, mode: InsertionMode, token: &TreeToken) -> Result<Step> {
        match mode {
            InsertionMode::Initial => self.step_initial(token),
            InsertionMode::BeforeHtml => self.step_before_html(token),
            InsertionMode::BeforeHead => self.step_before_head(token),
            InsertionMode::InHead => self.step_in_head(token),
            InsertionMode::AfterHead => self.step_after_head(token),
            InsertionMode::InBody => self.step_in_body(token),
            InsertionMode::Text => Ok(self.step_text(token)),
            InsertionMode::InTable => self.step_in_table(token),
            InsertionMode::InCaption => self.step_in_caption(token),
            InsertionMode::InColumnGroup => self.step_in_column_group(token),
            InsertionMode::InTableBody => self.step_in_table_body(token),
            InsertionMode::InRow => self.step_in_row(token),
            InsertionMode::InCell => self.step_in_cell(token),
            InsertionMode::InTemplate => self.step_in_template(token),
            InsertionMode::AfterBody => self.step_after_body(token),
            InsertionMode::AfterAfterBody => self.step_after_after_body(token),
        }
    }

    /// Switch to `mode` and reprocess the token.
    pub(crate) fn reprocess_in(&mut self, mode: InsertionMode, token: &TreeToken) -> Result<Step> {
        self.mode = mode;
        self.dispatch(token)
    }

    /// The tokenizer recognizes CDATA sections and switches into special
    /// text only when the namespace calls for it.
    fn sync_parsing_namespace(&mut self) {
        let namespace = match self.stack.current() {
            Some(node)
                if !node.is_html_integration_point()
                    && !node.is_mathml_text_integration_point() =>
            {
                node.namespace
            }
            _ => Namespace::Html,
        };
        self.tags.set_parsing_namespace(namespace);
    }

    fn bail(&mut self, error: HtmlError) {
        if let HtmlError::UnsupportedMarkup { reason, .. } = &error {
            let _ = warn_once("HTML Processor", &format!("cannot process {reason}"));
        }
        self.tail = None;
        self.parent_depth = None;
        self.tags.record_error(error);
        self.progress = Progress::Finished;
    }

    fn check_unclosed_elements(&mut self) {
        let unclosed = self
            .stack
            .unprotected()
            .iter()
            .any(|element| !element.is_one_of(&["HTML", "HEAD", "BODY", "PLAINTEXT"]));
        if unclosed {
            let at = self.tags.html_bytes().len();
            self.tags.record_error(HtmlError::MalformedInput {
                at,
                reason: Malformed::UnclosedElements,
            });
        }
    }

    pub(crate) fn unsupported(&self, reason: Unsupported) -> HtmlError {
        HtmlError::UnsupportedMarkup {
            at: self.tags.current_token_span().map_or(0, |span| span.start),
            reason,
        }
    }

    /// Whether the current text token is only inter-element whitespace.
    pub(crate) fn is_whitespace_text(&self) -> bool {
        self.tags
            .get_modifiable_text()
            .bytes()
            .all(|byte| matches!(byte, b'\t' | b'\n' | b'\x0c' | b'\r' | b' '))
    }

    /// The decoded attributes of the current tag, for comparing formatting
    /// elements.
    fn current_attributes(&self) -> Vec<(String, String)> {
        let names = self
            .tags
            .get_attribute_names_with_prefix("")
            .unwrap_or_default();
        names
            .into_iter()
            .map(|name| {
                let value = match self.tags.get_attribute(&name) {
                    Ok(Some(AttributeValue::String(value))) => value,
                    _ => String::new(),
                };
                (name, value)
            })
            .collect()
    }

    fn attribute_is(&self, name: &str, expected: &[&str]) -> bool {
        matches!(
            self.tags.get_attribute(name),
            Ok(Some(AttributeValue::String(value)))
                if expected.iter().any(|candidate| value.eq_ignore_ascii_case(candidate))
        )
    }

    /// [§ 13.2.6.1 Create an element for the token](https://html.spec.whatwg.org/multipage/parsing.html#create-an-element-for-the-token)
    ///
    /// `from_token` is false for elements the algorithm creates without a
    /// tag in the document.
    fn create_element(&mut self, name: &str, namespace: Namespace, from_token: bool) -> Element {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        let html_annotation = from_token
            && namespace == Namespace::MathMl
            && name == "ANNOTATION-XML"
            && self.attribute_is("encoding", &["text/html", "application/xhtml+xml"]);
        Element {
            id,
            name: name.to_string(),
            namespace,
            html_annotation,
        }
    }

    /// [§ 13.2.6.1 Insert an HTML element](https://html.spec.whatwg.org/multipage/parsing.html#insert-an-html-element)
    /// for the current start tag.
    pub(crate) fn insert_html_element(&mut self, name: &str) -> Element {
        let element = self.create_element(name, Namespace::Html, true);
        self.stack.push(element.clone());
        element
    }

    /// Insert an element the document did not spell out.
    pub(crate) fn insert_implied_element(&mut self, name: &str) -> Element {
        let element = self.create_element(name, Namespace::Html, false);
        self.stack.push(element.clone());
        element
    }

    /// "Insert an HTML element for the token. Immediately pop the current
    /// node off the stack of open elements."
    pub(crate) fn insert_void_element(&mut self, name: &str) {
        self.tail = Some(self.create_element(name, Namespace::Html, true));
    }

    /// [§ 13.2.6.1 Insert a foreign element](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-foreign-element)
    ///
    /// "If the token has its self-closing flag set, pop the current node
    /// off the stack of open elements and acknowledge the token's
    /// self-closing flag."
    pub(crate) fn insert_foreign_element(
        &mut self,
        name: &str,
        namespace: Namespace,
        self_closing: bool,
    ) {
        let element = self.create_element(name, namespace, true);
        if self_closing {
            self.tail = Some(element);
        } else {
            self.stack.push(element);
        }
    }

    /// Insert a `TITLE`, `SCRIPT`, `TEXTAREA`, ... element whose content the
    /// tokenizer reads as text, and wait for its closer in the "text" mode.
    pub(crate) fn insert_text_element(&mut self, name: &str) {
        let _ = self.insert_html_element(name);
        self.original_mode = Some(self.mode);
        self.mode = InsertionMode::Text;
    }

    /// Insert a formatting element and push it onto the list of active
    /// formatting elements.
    pub(crate) fn insert_formatting_element(&mut self, name: &str) {
        let attributes = self.current_attributes();
        let element = self.insert_html_element(name);
        self.formatting.push(element, attributes);
    }

    /// [§ 13.2.6.2 Generate implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
    ///
    /// "while the current node is a dd element, a dt element, an li
    /// element, an optgroup element, an option element, a p element, an rb
    /// element, an rp element, an rt element, or an rtc element, the user
    /// agent must pop the current node off the stack of open elements."
    ///
    /// "If a step requires the user agent to generate implied end tags but
    /// lists an element to exclude from the process, then the user agent
    /// must perform the above steps as if that element was not in the above
    /// list."
    pub(crate) fn generate_implied_end_tags(&mut self, except: Option<&str>) {
        const IMPLIED: &[&str] = &[
            "DD", "DT", "LI", "OPTGROUP", "OPTION", "P", "RB", "RP", "RT", "RTC",
        ];
        while let Some(current) = self.stack.current() {
            if !current.is_one_of(IMPLIED) || except.is_some_and(|name| current.is(name)) {
                break;
            }
            if self.stack.pop().is_none() {
                break;
            }
        }
    }

    /// [§ 13.2.6.2 Generate all implied end tags thoroughly](https://html.spec.whatwg.org/multipage/parsing.html#generate-all-implied-end-tags-thoroughly)
    pub(crate) fn generate_all_implied_end_tags(&mut self) {
        const IMPLIED: &[&str] = &[
            "CAPTION", "COLGROUP", "DD", "DT", "LI", "OPTGROUP", "OPTION", "P", "RB", "RP",
            "RT", "RTC", "TBODY", "TD", "TFOOT", "TH", "THEAD", "TR",
        ];
        while self
            .stack
            .current()
            .is_some_and(|current| current.is_one_of(IMPLIED))
        {
            if self.stack.pop().is_none() {
                break;
            }
        }
    }

    /// [§ 13.2.6.4.7 Close a p element](https://html.spec.whatwg.org/multipage/parsing.html#close-a-p-element)
    ///
    /// STEP 1: "Generate implied end tags, except for p elements."
    /// STEP 2: "If the current node is not a p element, then this is a
    ///          parse error."
    /// STEP 3: "Pop elements from the stack of open elements until a p
    ///          element has been popped from the stack."
    pub(crate) fn close_p_element(&mut self) -> Option<Element> {
        self.generate_implied_end_tags(Some("P"));
        self.stack.pop_until("P")
    }

    /// "If the stack of open elements has a p element in button scope,
    /// then close a p element."
    pub(crate) fn close_p_in_button_scope(&mut self) {
        if self.stack.has_in_scope("P", Scope::Button) {
            let _ = self.close_p_element();
        }
    }

    /// [§ 13.2.4.4 Reconstruct the active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#reconstruct-the-active-formatting-elements)
    pub(crate) fn reconstruct_active_formatting_elements(&mut self) {
        let is_open = |entry: &FormattingEntry, stack: &OpenElements| match entry {
            FormattingEntry::Marker => true,
            FormattingEntry::Element { element, .. } => stack.contains(element.id),
        };

        // STEP 1: "If there are no entries in the list of active formatting
        //          elements, then there is nothing to reconstruct; stop this
        //          algorithm."
        let Some(last) = self.formatting.len().checked_sub(1) else {
            return;
        };

        // STEP 2: "If the last (most recently added) entry in the list of
        //          active formatting elements is a marker, or if it is an
        //          element that is in the stack of open elements, then there
        //          is nothing to reconstruct; stop this algorithm."
        if self
            .formatting
            .get(last)
            .is_some_and(|entry| is_open(entry, &self.stack))
        {
            return;
        }

        // STEP 3-6 (rewind): walk back to the entry after the last marker
        // or open element.
        let mut index = last;
        while index > 0 {
            index -= 1;
            if self
                .formatting
                .get(index)
                .is_some_and(|entry| is_open(entry, &self.stack))
            {
                index += 1;
                break;
            }
        }

        // STEP 7-10 (advance, create): recreate every later element and
        // point its entry at the new element.
        for index in index..=last {
            let Some(FormattingEntry::Element { element, .. }) = self.formatting.get(index) else {
                continue;
            };
            let name = element.name.clone();
            let recreated = self.insert_implied_element(&name);
            self.formatting.replace(index, recreated);
        }
    }

    /// [§ 13.2.4.1 Reset the insertion mode appropriately](https://html.spec.whatwg.org/multipage/parsing.html#reset-the-insertion-mode-appropriately)
    pub(crate) fn reset_insertion_mode(&mut self) {
        let floor = self.stack.floor();
        let fragment = self.context.is_some();

        for index in (0..self.stack.len()).rev() {
            let Some(node) = self.stack.get(index) else {
                continue;
            };
            // STEP 3: "If node is the first node in the stack of open
            //          elements, then set last to true, and, if the parser
            //          was created as part of the HTML fragment parsing
            //          algorithm, set node to the context element."
            let last = index == 0 || (fragment && index < floor);
            let name = if node.namespace == Namespace::Html {
                node.name.as_str()
            } else {
                ""
            };

            let mode = match name {
                "TD" | "TH" if !last => Some(InsertionMode::InCell),
                "TR" => Some(InsertionMode::InRow),
                "TBODY" | "THEAD" | "TFOOT" => Some(InsertionMode::InTableBody),
                "CAPTION" => Some(InsertionMode::InCaption),
                "COLGROUP" => Some(InsertionMode::InColumnGroup),
                "TABLE" => Some(InsertionMode::InTable),
                "TEMPLATE" => Some(
                    self.template_modes
                        .last()
                        .copied()
                        .unwrap_or(InsertionMode::InTemplate),
                ),
                "HEAD" if !last => Some(InsertionMode::InHead),
                "BODY" => Some(InsertionMode::InBody),
                "HTML" => Some(if self.head.is_none() {
                    InsertionMode::BeforeHead
                } else {
                    InsertionMode::AfterHead
                }),
                // "If last is true, then switch the insertion mode to "in
                //  body" and return."
                _ if last => Some(InsertionMode::InBody),
                _ => None,
            };
            if let Some(mode) = mode {
                self.mode = mode;
                return;
            }
        }
        self.mode = InsertionMode::InBody;
    }
}

/// Whether `name` (uppercase) can be a fragment context. Contexts must
/// leave the tokenizer in its data state and reset the insertion mode to
/// "in body".
fn is_supported_context(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'-')
        && name.as_bytes()[0].is_ascii_alphabetic()
        && !elements::is_void(name)
        && elements::special_text_kind(name).is_none()
        && !matches!(
            name,
            "HTML"
                | "HEAD"
                | "TABLE"
                | "CAPTION"
                | "COLGROUP"
                | "TBODY"
                | "THEAD"
                | "TFOOT"
                | "TR"
                | "TD"
                | "TH"
                | "TEMPLATE"
                | "FRAMESET"
                | "SELECT"
                | "SVG"
                | "MATH"
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_contexts() {
        assert!(is_supported_context("BODY"));
        assert!(is_supported_context("DIV"));
        assert!(is_supported_context("MY-ELEMENT"));
        assert!(!is_supported_context("TD"));
        assert!(!is_supported_context("TEXTAREA"));
        assert!(!is_supported_context("IMG"));
        assert!(!is_supported_context("SVG"));
        assert!(!is_supported_context(""));
        assert!(!is_supported_context("1A"));
    }
}
