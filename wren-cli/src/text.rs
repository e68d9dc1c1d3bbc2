//! Text extraction for `wren text` and `wren grep`.

use wren_html::elements::is_line_breaker;
use wren_html::{HtmlProcessor, TokenType};

/// Elements whose text is never shown to a reader.
const HIDDEN: &[&str] = &["HEAD", "NOSCRIPT", "SCRIPT", "STYLE", "TEMPLATE"];

/// Elements whose text keeps its whitespace.
const VERBATIM: &[&str] = &["LISTING", "PLAINTEXT", "PRE", "TEXTAREA"];

/// A visible text token and where it sits in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub breadcrumbs: Vec<String>,
    pub text: String,
    pub verbatim: bool,
}

fn inside(breadcrumbs: &[&str], names: &[&str]) -> bool {
    breadcrumbs.iter().any(|crumb| names.contains(crumb))
}

/// Every visible, non-blank text token in document order.
pub fn text_runs(processor: &mut HtmlProcessor) -> Vec<TextRun> {
    let mut runs = Vec::new();
    while processor.next_token() {
        if processor.get_token_type() != Some(TokenType::Text) {
            continue;
        }
        let breadcrumbs = processor.get_breadcrumbs();
        if inside(&breadcrumbs, HIDDEN) {
            continue;
        }
        let text = processor.get_modifiable_text();
        if text.trim().is_empty() {
            continue;
        }
        runs.push(TextRun {
            verbatim: inside(&breadcrumbs, VERBATIM),
            breadcrumbs: breadcrumbs.into_iter().map(str::to_string).collect(),
            text,
        });
    }
    runs
}

/// Accumulates text, collapsing whitespace outside verbatim elements and
/// starting a new line at block boundaries.
#[derive(Debug, Default)]
struct TextWriter {
    output: String,
    pending_space: bool,
}

impl TextWriter {
    fn at_line_start(&self) -> bool {
        self.output.is_empty() || self.output.ends_with('\n')
    }

    fn line_break(&mut self) {
        self.pending_space = false;
        if !self.at_line_start() {
            self.output.push('\n');
        }
    }

    fn push_verbatim(&mut self, text: &str) {
        if self.pending_space && !self.at_line_start() {
            self.output.push(' ');
        }
        self.pending_space = false;
        self.output.push_str(text);
    }

    fn push_collapsed(&mut self, text: &str) {
        if text.starts_with(|ch: char| ch.is_ascii_whitespace()) {
            self.pending_space = true;
        }
        for word in text.split_ascii_whitespace() {
            if self.pending_space && !self.at_line_start() {
                self.output.push(' ');
            }
            self.output.push_str(word);
            self.pending_space = true;
        }
        if !text.ends_with(|ch: char| ch.is_ascii_whitespace()) {
            self.pending_space = false;
        }
    }

    fn finish(mut self) -> String {
        while self.output.ends_with(char::is_whitespace) {
            let _ = self.output.pop();
        }
        if !self.output.is_empty() {
            self.output.push('\n');
        }
        self.output
    }
}

/// The readable text of a document: scripts and styles dropped, whitespace
/// collapsed except inside `PRE` and friends, and block elements on their
/// own lines.
pub fn readable_text(processor: &mut HtmlProcessor) -> String {
    let mut writer = TextWriter::default();
    while processor.next_token() {
        match processor.get_token_type() {
            Some(TokenType::Tag) => {
                if processor.get_tag().is_some_and(is_line_breaker) {
                    writer.line_break();
                }
            }
            Some(TokenType::Text | TokenType::CdataSection) => {
                let breadcrumbs = processor.get_breadcrumbs();
                if inside(&breadcrumbs, HIDDEN) {
                    continue;
                }
                let text = processor.get_modifiable_text();
                if inside(&breadcrumbs, VERBATIM) {
                    writer.push_verbatim(&text);
                } else {
                    writer.push_collapsed(&text);
                }
            }
            _ => {}
        }
    }
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(html: &str) -> String {
        readable_text(&mut HtmlProcessor::create_fragment(html))
    }

    #[test]
    fn test_blocks_start_new_lines() {
        assert_eq!(
            text_of("<p>One</p><p>Two <b>three</b></p>"),
            "One\nTwo three\n"
        );
        assert_eq!(text_of("a<br>b"), "a\nb\n");
    }

    #[test]
    fn test_whitespace_collapses_outside_pre() {
        assert_eq!(
            text_of("<div>  lots \n of   space </div>"),
            "lots of space\n"
        );
        assert_eq!(text_of("<pre>\n  keep\n  this</pre>"), "  keep\n  this\n");
    }

    #[test]
    fn test_hidden_text_is_dropped() {
        assert_eq!(text_of("<script>var x;</script><p>shown</p>"), "shown\n");
        assert_eq!(text_of("<style>p{}</style>x"), "x\n");
    }

    #[test]
    fn test_text_runs_carry_breadcrumbs() {
        let mut processor = HtmlProcessor::create_fragment("<ul><li>a</li><li> </li></ul>");
        let runs = text_runs(&mut processor);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "a");
        assert_eq!(runs[0].breadcrumbs, ["HTML", "BODY", "UL", "LI"]);
        assert!(!runs[0].verbatim);
    }
}
