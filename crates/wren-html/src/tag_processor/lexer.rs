//! The byte scanner behind `next_token`.
//!
//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! Scanning never copies or decodes anything. Each step records spans for
//! the token it found and leaves the cursor after it.

use memchr::{memchr, memmem};

use super::{LexMode, ParserState, TagProcessor};
use crate::elements::{self, Namespace, TextKind};
use crate::error::{HtmlError, Malformed, Result, Unsupported};
use crate::span::Span;
use crate::tag_processor::token::{Attribute, CommentKind, TokenType};

/// "tab, line feed, form feed, carriage return, space"
const WHITESPACE: &[u8] = b" \t\n\x0c\r";

/// Number of leading bytes of `doc[at..]` that are in `set`.
fn strspn(doc: &[u8], at: usize, set: &[u8]) -> usize {
    let rest = doc.get(at..).unwrap_or_default();
    rest.iter().take_while(|byte| set.contains(byte)).count()
}

/// Number of leading bytes of `doc[at..]` that are not in `set`.
fn strcspn(doc: &[u8], at: usize, set: &[u8]) -> usize {
    let rest = doc.get(at..).unwrap_or_default();
    rest.iter().take_while(|byte| !set.contains(byte)).count()
}

/// Offset of the first `needle` at or after `at`.
fn find(doc: &[u8], at: usize, needle: &[u8]) -> Option<usize> {
    memmem::find(doc.get(at..)?, needle).map(|found| at + found)
}

/// Whether `doc[at..]` starts with `prefix`, ignoring ASCII case.
fn starts_with_ignore_case(doc: &[u8], at: usize, prefix: &[u8]) -> bool {
    doc.get(at..at + prefix.len())
        .is_some_and(|bytes| bytes.eq_ignore_ascii_case(prefix))
}

/// Whether `doc[at..]` is `</name` followed by a byte that ends a tag name,
/// or by the end of the document.
pub(super) fn is_closer_for(doc: &[u8], at: usize, name: &str) -> bool {
    doc.get(at) == Some(&b'<')
        && doc.get(at + 1) == Some(&b'/')
        && starts_with_ignore_case(doc, at + 2, name.as_bytes())
        && doc
            .get(at + 2 + name.len())
            .is_none_or(|byte| WHITESPACE.contains(byte) || matches!(byte, b'/' | b'>'))
}

impl TagProcessor {
    /// Scan the next token from the cursor.
    ///
    /// Returns `Ok(false)` at the end of the document.
    pub(super) fn lex_next(&mut self) -> Result<bool> {
        self.clear_token();
        if self.cursor >= self.html.len() {
            return Ok(false);
        }

        self.token_mode = self.mode;
        self.token_skips_newline = self.skip_newline_at == Some(self.cursor);

        if let LexMode::SpecialText { tag_name, kind } = self.mode {
            self.mode = LexMode::Markup;
            if self.lex_special_text(tag_name, kind) {
                return Ok(true);
            }
            // An empty element: the closer is next.
            self.token_mode = LexMode::Markup;
        }

        self.lex_markup()
    }

    /// Scan the content of a RAWTEXT, RCDATA, script or PLAINTEXT element as
    /// one text token. Returns false when the content is empty.
    fn lex_special_text(&mut self, tag_name: &'static str, kind: TextKind) -> bool {
        let start = self.cursor;
        let end = match kind {
            TextKind::Plaintext | TextKind::Data => self.html.len(),
            TextKind::ScriptData => self.find_script_closer(start),
            TextKind::RcData | TextKind::RawText => self.find_closer(start, tag_name),
        };
        if end == start {
            return false;
        }

        self.token = Span::from_range(start, end);
        self.text = self.token;
        self.text_kind = kind;
        self.state = ParserState::Token(TokenType::Text);
        self.cursor = end;
        true
    }

    /// [§ 13.2.5.2 RCDATA state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-state)
    /// and [§ 13.2.5.3 RAWTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state)
    ///
    /// Offset of the "appropriate end tag", or the end of the document.
    fn find_closer(&self, from: usize, tag_name: &str) -> usize {
        let doc = &self.html;
        let mut at = from;
        while let Some(found) = find(doc, at, b"</") {
            if is_closer_for(doc, found, tag_name) {
                return found;
            }
            at = found + 2;
        }
        doc.len()
    }

    /// [§ 13.2.5.4 Script data state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-state)
    ///
    /// Walks the escaped and double-escaped substates: `<!--` enters the
    /// escaped state, where `<script` enters the double-escaped state and
    /// `</script` leaves it again; `-->` returns to plain script data from
    /// either. Only `</script` outside the double-escaped state closes.
    fn find_script_closer(&self, from: usize) -> usize {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Escape {
            Unescaped,
            Escaped,
            DoubleEscaped,
        }

        let doc = &self.html;
        let mut state = Escape::Unescaped;
        let mut at = from;

        while at < doc.len() {
            at += strcspn(doc, at, b"-<");
            if at >= doc.len() {
                break;
            }

            if doc[at..].starts_with(b"-->") {
                state = Escape::Unescaped;
                at += 3;
                continue;
            }
            if doc[at] == b'-' {
                at += 1;
                continue;
            }

            // At a `<`.
            if doc[at..].starts_with(b"<!--") {
                if state == Escape::Unescaped {
                    state = Escape::Escaped;
                }
                at += 4;
                continue;
            }

            let is_closer = doc.get(at + 1) == Some(&b'/');
            let name_at = at + 1 + usize::from(is_closer);
            let names_script = starts_with_ignore_case(doc, name_at, b"script")
                && doc
                    .get(name_at + 6)
                    .is_none_or(|byte| WHITESPACE.contains(byte) || matches!(byte, b'/' | b'>'));
            if !names_script {
                at += 1;
                continue;
            }

            match (is_closer, state) {
                (false, Escape::Escaped) => state = Escape::DoubleEscaped,
                (true, Escape::DoubleEscaped) => state = Escape::Escaped,
                (true, _) => return at,
                (false, _) => {}
            }
            at = name_at + 6;
        }

        doc.len()
    }

    /// Scan text up to the next token, or the token at the cursor.
    fn lex_markup(&mut self) -> Result<bool> {
        let start = self.cursor;
        let mut at = start;

        loop {
            let Some(found) = memchr(b'<', &self.html[at..]) else {
                self.lex_text(start, self.html.len());
                return Ok(true);
            };
            let lt = at + found;

            if !self.starts_token(lt) {
                at = lt + 1;
                continue;
            }
            if lt > start {
                self.lex_text(start, lt);
                return Ok(true);
            }
            return self.lex_token_at(lt).map(|()| true);
        }
    }

    fn lex_text(&mut self, start: usize, end: usize) {
        self.token = Span::from_range(start, end);
        self.text = self.token;
        self.text_kind = TextKind::Data;
        self.state = ParserState::Token(TokenType::Text);
        self.cursor = end;
    }

    /// [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    ///
    /// Whether the `<` at `lt` starts a token rather than being text.
    fn starts_token(&self, lt: usize) -> bool {
        let doc = &self.html;
        match doc.get(lt + 1) {
            Some(b'!' | b'?') => true,
            Some(byte) if byte.is_ascii_alphabetic() => true,
            Some(b'/') => match doc.get(lt + 2) {
                // "</" at the end of the document is emitted as text.
                None => false,
                Some(byte) if byte.is_ascii_alphabetic() || *byte == b'>' => true,
                // A funky comment, unless a tag opens before its `>`, in which
                // case the `</` is taken literally.
                Some(_) => {
                    let end =
                        memchr(b'>', &doc[lt + 2..]).map_or(doc.len(), |found| lt + 2 + found);
                    !doc[lt + 2..end]
                        .windows(2)
                        .any(|pair| pair[0] == b'<' && pair[1].is_ascii_alphabetic())
                }
            },
            _ => false,
        }
    }

    /// Scan the token starting with the `<` at `lt`.
    fn lex_token_at(&mut self, lt: usize) -> Result<()> {
        match self.html.get(lt + 1).copied() {
            Some(b'!') => self.lex_markup_declaration(lt),
            Some(b'?') => self.lex_processing_instruction(lt),
            Some(b'/') => match self.html.get(lt + 2).copied() {
                Some(b'>') => {
                    self.token = Span::new(lt, 3);
                    self.state = ParserState::Token(TokenType::PresumptuousTag);
                    self.cursor = lt + 3;
                    Ok(())
                }
                Some(byte) if byte.is_ascii_alphabetic() => self.lex_tag(lt, true),
                _ => self.lex_funky_comment(lt),
            },
            _ => self.lex_tag(lt, false),
        }
    }

    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    /// through [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    fn lex_tag(&mut self, lt: usize, is_closer: bool) -> Result<()> {
        let name_start = lt + 1 + usize::from(is_closer);
        let name_length = strcspn(&self.html, name_start, b" \t\n\x0c\r/>");
        let mut at = name_start + name_length;
        let mut self_closing = false;
        self.attributes.clear();

        loop {
            let whitespace_start = at;
            at += strspn(&self.html, at, WHITESPACE);
            match self.html.get(at) {
                None => {
                    return Err(HtmlError::MalformedInput {
                        at: lt,
                        reason: Malformed::UnterminatedTag,
                    });
                }
                Some(b'>') => {
                    at += 1;
                    break;
                }
                Some(b'/') => {
                    at += 1;
                    if self.html.get(at) == Some(&b'>') {
                        self_closing = true;
                        at += 1;
                        break;
                    }
                }
                Some(_) => {
                    let attribute = self.lex_attribute(lt, whitespace_start, at)?;
                    at = attribute.span.end();
                    self.attributes.push(attribute);
                }
            }
        }

        self.token = Span::from_range(lt, at);
        self.tag_name = Span::new(name_start, name_length);
        self.tag_name_upper.clear();
        self.tag_name_upper
            .push_str(&String::from_utf8_lossy(self.tag_name.slice(&self.html)));
        self.tag_name_upper.make_ascii_uppercase();
        self.is_closer = is_closer;
        self.self_closing = self_closing;
        self.state = ParserState::Token(TokenType::Tag);
        self.cursor = at;

        if !is_closer && self.namespace == Namespace::Html {
            if let Some((tag_name, kind)) = elements::special_text(&self.tag_name_upper) {
                self.mode = LexMode::SpecialText { tag_name, kind };
            }
            if elements::skips_leading_newline(&self.tag_name_upper) {
                self.skip_newline_at = Some(at);
            }
        }
        Ok(())
    }

    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    ///
    /// An `=` at the start of a name is part of the name.
    fn lex_attribute(
        &self,
        lt: usize,
        whitespace_start: usize,
        name_start: usize,
    ) -> Result<Attribute> {
        let doc = &self.html;
        let unterminated = HtmlError::MalformedInput {
            at: lt,
            reason: Malformed::UnterminatedTag,
        };

        let leading_equals = usize::from(doc[name_start] == b'=');
        let name_length =
            leading_equals + strcspn(doc, name_start + leading_equals, b"=/> \t\n\x0c\r");
        let name = Span::new(name_start, name_length);

        let mut at = name.end();
        at += strspn(doc, at, WHITESPACE);
        if doc.get(at) != Some(&b'=') {
            // Boolean attribute; the whitespace belongs to whatever follows.
            return Ok(Attribute {
                name,
                value: Span::new(name.end(), 0),
                has_value: false,
                span: name,
                removal: Span::from_range(whitespace_start, name.end()),
            });
        }

        at += 1;
        at += strspn(doc, at, WHITESPACE);
        let (value, end) = match doc.get(at) {
            None => return Err(unterminated),
            Some(&quote @ (b'"' | b'\'')) => {
                let close = memchr(quote, &doc[at + 1..]).ok_or(unterminated)?;
                let value = Span::new(at + 1, close);
                (value, value.end() + 1)
            }
            Some(_) => {
                let length = strcspn(doc, at, b"> \t\n\x0c\r");
                (Span::new(at, length), at + length)
            }
        };

        Ok(Attribute {
            name,
            value,
            has_value: true,
            span: Span::from_range(name_start, end),
            removal: Span::from_range(whitespace_start, end),
        })
    }

    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    fn lex_markup_declaration(&mut self, lt: usize) -> Result<()> {
        let doc = &self.html;

        if doc[lt + 2..].starts_with(b"--") {
            return self.lex_comment(lt);
        }

        if starts_with_ignore_case(doc, lt + 2, b"DOCTYPE") {
            let close = memchr(b'>', &doc[lt + 9..]).ok_or(HtmlError::MalformedInput {
                at: lt,
                reason: Malformed::UnterminatedDoctype,
            })?;
            self.text = Span::new(lt + 9, close);
            self.token = Span::from_range(lt, self.text.end() + 1);
            self.state = ParserState::Token(TokenType::Doctype);
            self.cursor = self.token.end();
            return Ok(());
        }

        if doc[lt + 2..].starts_with(b"[CDATA[") {
            if self.namespace == Namespace::Html {
                return Err(HtmlError::UnsupportedMarkup {
                    at: lt,
                    reason: Unsupported::CdataOutsideForeignContent,
                });
            }
            let close = find(doc, lt + 9, b"]]>").ok_or(HtmlError::MalformedInput {
                at: lt,
                reason: Malformed::UnterminatedCdata,
            })?;
            self.text = Span::from_range(lt + 9, close);
            self.token = Span::from_range(lt, close + 3);
            self.state = ParserState::Token(TokenType::CdataSection);
            self.cursor = self.token.end();
            return Ok(());
        }

        Err(HtmlError::UnsupportedMarkup {
            at: lt,
            reason: Unsupported::InvalidMarkupDeclaration,
        })
    }

    /// [§ 13.2.5.43 Comment start state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-state)
    /// through [§ 13.2.5.52 Comment end bang state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-bang-state)
    fn lex_comment(&mut self, lt: usize) -> Result<()> {
        let doc = &self.html;
        let content_start = lt + 4;

        // `<!-->`, `<!--->`, and runs of dashes such as `<!------>`.
        let dashes = strspn(doc, content_start, b"-");
        if doc.get(content_start + dashes) == Some(&b'>') {
            let end = content_start + dashes + 1;
            if dashes < 2 {
                self.text = Span::new(content_start, 0);
                self.comment_kind = Some(CommentKind::AbruptlyClosed);
            } else {
                self.text = Span::new(content_start, dashes - 2);
                self.comment_kind = Some(CommentKind::HtmlComment);
            }
            self.token = Span::from_range(lt, end);
            self.state = ParserState::Token(TokenType::Comment);
            self.cursor = end;
            return Ok(());
        }

        let mut at = content_start;
        loop {
            let dashes_at = find(doc, at, b"--").ok_or(HtmlError::MalformedInput {
                at: lt,
                reason: Malformed::UnterminatedComment,
            })?;
            let end = if doc.get(dashes_at + 2) == Some(&b'>') {
                Some(dashes_at + 3)
            } else if doc[dashes_at + 2..].starts_with(b"!>") {
                Some(dashes_at + 4)
            } else {
                None
            };

            if let Some(end) = end {
                self.text = Span::from_range(content_start, dashes_at);
                self.token = Span::from_range(lt, end);
                self.comment_kind = Some(CommentKind::HtmlComment);
                self.state = ParserState::Token(TokenType::Comment);
                self.cursor = end;
                return Ok(());
            }
            at = dashes_at + 1;
        }
    }

    /// [§ 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    /// entered from `<?`.
    fn lex_processing_instruction(&mut self, lt: usize) -> Result<()> {
        let doc = &self.html;
        let close = memchr(b'>', &doc[lt + 2..]).ok_or(HtmlError::MalformedInput {
            at: lt,
            reason: Malformed::UnterminatedComment,
        })?;
        let looks_like_pi = doc.get(lt + 2).is_some_and(u8::is_ascii_alphabetic);

        self.text = Span::new(lt + 2, close);
        self.token = Span::from_range(lt, self.text.end() + 1);
        self.comment_kind = Some(if looks_like_pi {
            CommentKind::ProcessingInstructionLookalike
        } else {
            CommentKind::Bogus
        });
        self.state = ParserState::Token(TokenType::Comment);
        self.cursor = self.token.end();
        Ok(())
    }

    /// [§ 13.2.5.7 End tag open state](https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state)
    ///
    /// "anything else: This is an invalid-first-character-of-tag-name parse
    /// error. Create a comment token [...] Reconsume in the bogus comment
    /// state."
    fn lex_funky_comment(&mut self, lt: usize) -> Result<()> {
        let close = memchr(b'>', &self.html[lt + 2..]).ok_or(HtmlError::MalformedInput {
            at: lt,
            reason: Malformed::UnterminatedComment,
        })?;
        self.text = Span::new(lt + 2, close);
        self.token = Span::from_range(lt, self.text.end() + 1);
        self.state = ParserState::Token(TokenType::FunkyComment);
        self.cursor = self.token.end();
        Ok(())
    }
}
