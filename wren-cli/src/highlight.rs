//! `wren highlight`: the document as written, colored by token.

use std::io::Write;

use anyhow::Result;
use owo_colors::{OwoColorize, Style};
use wren_html::{HtmlError, Span, TagProcessor, TokenType};

/// Copies the document to `out` piece by piece, never skipping or repeating
/// a byte.
struct Painter<'a, W: Write> {
    html: &'a str,
    out: &'a mut W,
    at: usize,
}

impl<W: Write> Painter<'_, W> {
    /// Write everything from the last position up to `end` in `style`.
    fn paint_to(&mut self, end: usize, style: Style) -> Result<()> {
        if end <= self.at {
            return Ok(());
        }
        let piece = self.html.get(self.at..end).unwrap_or_default();
        write!(self.out, "{}", piece.style(style))?;
        self.at = end;
        Ok(())
    }

    fn paint_span(&mut self, span: Span, before: Style, style: Style) -> Result<()> {
        self.paint_to(span.start, before)?;
        self.paint_to(span.end(), style)
    }
}

/// Write `html` with tag names, attributes, comments and DOCTYPEs colored.
///
/// Returns the error that stopped the scan, if any; the rest of the
/// document is still written, in red.
pub fn highlight(html: &str, out: &mut impl Write) -> Result<Option<HtmlError>> {
    let punctuation = Style::new().dimmed();
    let plain = Style::new();
    let mut painter = Painter { html, out, at: 0 };
    let mut tags = TagProcessor::new(html);

    while tags.next_token() {
        let Some(token) = tags.current_token_span() else {
            continue;
        };
        match tags.get_token_type() {
            Some(TokenType::Tag) => {
                if let Some(name) = tags.tag_name_span() {
                    painter.paint_span(name, punctuation, Style::new().blue().bold())?;
                }
                for attribute in tags.attribute_spans() {
                    painter.paint_span(attribute.name, plain, Style::new().cyan())?;
                    if attribute.has_value {
                        painter.paint_span(attribute.value, punctuation, Style::new().green())?;
                    }
                }
                painter.paint_to(token.end(), punctuation)?;
            }
            Some(TokenType::Comment | TokenType::FunkyComment | TokenType::PresumptuousTag) => {
                painter.paint_to(token.end(), Style::new().dimmed().italic())?;
            }
            Some(TokenType::Doctype) => painter.paint_to(token.end(), Style::new().magenta())?,
            Some(TokenType::CdataSection) => painter.paint_to(token.end(), Style::new().yellow())?,
            Some(TokenType::Text) | None => painter.paint_to(token.end(), plain)?,
        }
    }

    let error = tags.get_last_error().cloned();
    let rest = if error.is_some() {
        Style::new().red()
    } else {
        plain
    };
    painter.paint_to(html.len(), rest)?;
    Ok(error)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Highlighting only adds escape codes: stripping them gives back the
    /// input.
    fn strip_ansi(colored: &str) -> String {
        let mut plain = String::new();
        let mut chars = colored.chars();
        while let Some(ch) = chars.next() {
            if ch == '\x1b' {
                for code in chars.by_ref() {
                    if code == 'm' {
                        break;
                    }
                }
            } else {
                plain.push(ch);
            }
        }
        plain
    }

    fn highlighted(html: &str) -> (String, Option<HtmlError>) {
        let mut out = Vec::new();
        let error = highlight(html, &mut out).unwrap();
        (String::from_utf8(out).unwrap(), error)
    }

    #[test]
    fn test_highlight_preserves_the_document() {
        let html = "<!DOCTYPE html><p class=\"a\" hidden>Hi &amp; bye<!-- c --></p></3 ><?pi x?>";
        let (colored, error) = highlighted(html);
        assert!(error.is_none());
        assert_ne!(colored, html);
        assert_eq!(strip_ansi(&colored), html);
    }

    #[test]
    fn test_highlight_writes_the_unfinished_tail() {
        let html = "<p>ok</p><div class=\"x";
        let (colored, error) = highlighted(html);
        assert!(error.is_some());
        assert_eq!(strip_ansi(&colored), html);
    }
}
