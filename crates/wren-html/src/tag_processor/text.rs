//! Modifiable text: the decoded content of text-bearing tokens.

use super::{EditKey, EditValue, TagProcessor, lexer};
use crate::character_reference::{ReferenceContext, decode};
use crate::edits::Edit;
use crate::elements::TextKind;
use crate::error::{HtmlError, Result};
use crate::tag_processor::token::{CommentKind, TokenType};

/// Escape text for a data or RCDATA position.
fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn strip_leading_newline(raw: &[u8]) -> &[u8] {
    if let Some(rest) = raw.strip_prefix(b"\r\n") {
        rest
    } else if let Some(rest) = raw.strip_prefix(b"\n").or_else(|| raw.strip_prefix(b"\r")) {
        rest
    } else {
        raw
    }
}

/// Whether `text` contains something that would end a `tag_name` element
/// whose content is scanned as raw text.
fn closes_raw_text(text: &str, tag_name: &str) -> bool {
    let bytes = text.as_bytes();
    memchr::memmem::find_iter(bytes, b"</").any(|at| lexer::is_closer_for(bytes, at, tag_name))
}

/// Whether script `text` would leave the plain script data state. The
/// escaped states make the closer hard to predict, so they are refused.
fn escapes_script_data(text: &str) -> bool {
    let lowercase = text.to_ascii_lowercase();
    closes_raw_text(text, "script") || lowercase.contains("<!--") || lowercase.contains("<script")
}

impl TagProcessor {
    /// The decoded content of the current token.
    ///
    /// For text this resolves character references where the element
    /// allows them and drops the newline that follows a `PRE`, `LISTING`
    /// or `TEXTAREA` opener. Comments, CDATA sections, funky comments and
    /// DOCTYPEs return their raw inner text. Tags return an empty string.
    /// Queued text edits are visible immediately.
    #[must_use]
    pub fn get_modifiable_text(&self) -> String {
        let Some(token_type) = self.get_token_type() else {
            return String::new();
        };
        if matches!(token_type, TokenType::Tag | TokenType::PresumptuousTag) {
            return String::new();
        }

        let key = EditKey::Text {
            token_at: self.token.start,
        };
        if let Some(edit) = self.edits.find(&key)
            && let EditValue::Text(text) = &edit.value
        {
            return text.clone();
        }

        let raw = self.text.slice(&self.html);
        let raw = if token_type == TokenType::Text && self.token_skips_newline {
            strip_leading_newline(raw)
        } else {
            raw
        };

        if token_type == TokenType::Text && self.text_kind.decodes_references() {
            decode(ReferenceContext::Data, raw)
        } else {
            String::from_utf8_lossy(raw).into_owned()
        }
    }

    /// Replace the content of the current text or comment token.
    ///
    /// Text is escaped as needed for where it appears. Content of RAWTEXT
    /// and script elements cannot be escaped, so text that would close the
    /// element early is refused. Comments are rewritten as `<!--text-->`.
    ///
    /// # Errors
    ///
    /// Returns [`HtmlError::InvalidOperation`] if the token has no
    /// modifiable text or `text` cannot be written there, and
    /// [`HtmlError::ConflictingEdit`] if the edit overlaps another one.
    pub fn set_modifiable_text(&mut self, text: &str) -> Result<()> {
        const OPERATION: &str = "set modifiable text";

        let (span, replacement) = match self.get_token_type() {
            None => return Err(HtmlError::invalid(OPERATION, "there is no current token")),
            Some(TokenType::Text) => {
                let mut replacement = match self.text_kind {
                    TextKind::Data | TextKind::RcData => escape_text(text),
                    TextKind::Plaintext => text.to_string(),
                    TextKind::RawText => {
                        let closes = match self.token_mode {
                            super::LexMode::SpecialText { tag_name, .. } => {
                                closes_raw_text(text, tag_name)
                            }
                            super::LexMode::Markup => false,
                        };
                        if closes {
                            return Err(HtmlError::invalid(
                                OPERATION,
                                "the text would close its element early",
                            ));
                        }
                        text.to_string()
                    }
                    TextKind::ScriptData => {
                        if escapes_script_data(text) {
                            return Err(HtmlError::invalid(
                                OPERATION,
                                "the text would close or escape its SCRIPT element",
                            ));
                        }
                        text.to_string()
                    }
                };
                // The first newline after the opener is swallowed.
                if self.token_skips_newline && text.starts_with('\n') {
                    replacement.insert(0, '\n');
                }
                (self.text, replacement)
            }
            Some(TokenType::Comment)
                if matches!(
                    self.comment_kind,
                    Some(CommentKind::HtmlComment | CommentKind::AbruptlyClosed)
                ) =>
            {
                if text.contains("-->")
                    || text.contains("--!>")
                    || text.starts_with('>')
                    || text.starts_with("->")
                    || text.ends_with("<!-")
                {
                    return Err(HtmlError::invalid(
                        OPERATION,
                        "the text would close the comment early",
                    ));
                }
                (self.token, format!("<!--{text}-->"))
            }
            Some(_) => {
                return Err(HtmlError::invalid(
                    OPERATION,
                    "the current token has no modifiable text",
                ));
            }
        };

        self.edits.enqueue(Edit {
            key: EditKey::Text {
                token_at: self.token.start,
            },
            span,
            replacement,
            value: EditValue::Text(text.to_string()),
        })
    }

    /// The raw bytes of the current token.
    #[must_use]
    pub fn token_bytes(&self) -> &[u8] {
        match self.current_token_span() {
            Some(span) => span.slice(&self.html),
            None => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_text_closer_detection() {
        assert!(closes_raw_text("a</style>b", "STYLE"));
        assert!(closes_raw_text("a</STYLE", "style"));
        assert!(!closes_raw_text("a</styles>", "style"));
        assert!(escapes_script_data("x = '<!--';"));
        assert!(escapes_script_data("</script >"));
        assert!(!escapes_script_data("if (a < b) {}"));
    }
}
