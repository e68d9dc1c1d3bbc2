//! Wren CLI - inspect documents through the tag and HTML processors
//!
//! Usage:
//!   wren tokens <file>              One line per token
//!   wren tokens --tree <file>       Tokens with breadcrumbs from the HTML processor
//!   wren tokens --json <file>       One JSON object per token
//!   wren tags <file>                Opening tags as breadcrumb paths
//!   wren text <file>                Readable text content
//!   wren grep <PATTERN> <file>      Text matching a regular expression
//!   wren highlight <file>           The document with colored markup
//!
//! Input is a file path, `--html '<p>...</p>'`, or stdin.

mod highlight;
mod record;
mod text;

use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use owo_colors::OwoColorize;
use regex::Regex;
use wren_common::warning::warn_once;
use wren_html::{HtmlError, HtmlProcessor, TagProcessor, TokenType};

use record::TokenRecord;
use text::TextRun;

/// Wren - streaming HTML tag processing from the command line
#[derive(Parser, Debug)]
#[command(name = "wren")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Tokens of an inline document
    wren tokens --html '<p class=x>Hi</p>'

    # Tokens with breadcrumbs, as JSON lines
    wren tokens --tree --json index.html

    # Only the comments
    wren tokens --only comment index.html

    # Text matching a pattern, with one run of context on each side
    wren grep -B 1 -A 1 'error|warning' page.html

    # Colored source from stdin
    cat page.html | wren highlight
"#)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Where the document comes from.
#[derive(Args, Debug)]
struct Input {
    /// Path to an HTML file (stdin is read when neither FILE nor --html is given)
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// Process this HTML string instead of a file
    #[arg(long, value_name = "HTML", conflicts_with = "path")]
    html: Option<String>,

    /// Treat the input as the contents of a BODY element instead of a
    /// whole document
    #[arg(long)]
    fragment: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every token
    Tokens {
        #[command(flatten)]
        input: Input,

        /// Run the HTML processor and include breadcrumbs
        #[arg(long)]
        tree: bool,

        /// Print one JSON object per line
        #[arg(long)]
        json: bool,

        /// Only print tokens of this type (tag, text, comment, doctype, ...)
        #[arg(long, value_name = "TYPE", value_parser = parse_token_type)]
        only: Option<TokenType>,
    },

    /// Print each opening tag as its breadcrumb path
    Tags {
        #[command(flatten)]
        input: Input,
    },

    /// Print the readable text of the document
    Text {
        #[command(flatten)]
        input: Input,
    },

    /// Print text runs matching a regular expression
    Grep {
        /// Regular expression to search the decoded text for
        pattern: String,

        #[command(flatten)]
        input: Input,

        /// Text runs of context to print before each match
        #[arg(short = 'B', long, value_name = "N", default_value = "0")]
        before: usize,

        /// Text runs of context to print after each match
        #[arg(short = 'A', long, value_name = "N", default_value = "0")]
        after: usize,
    },

    /// Print the document with tags, attributes and comments colored
    Highlight {
        #[command(flatten)]
        input: Input,
    },
}

fn parse_token_type(value: &str) -> Result<TokenType, strum::ParseError> {
    value.parse()
}

impl Input {
    /// Read the whole document. Invalid UTF-8 is replaced rather than
    /// refused.
    fn read(&self) -> Result<String> {
        if let Some(html) = &self.html {
            return Ok(html.clone());
        }
        let bytes = match &self.path {
            Some(path) => {
                fs::read(path).with_context(|| format!("failed to read '{}'", path.display()))?
            }
            None => {
                let mut bytes = Vec::new();
                let _ = io::stdin()
                    .read_to_end(&mut bytes)
                    .context("failed to read stdin")?;
                bytes
            }
        };

        Ok(match String::from_utf8(bytes) {
            Ok(html) => html,
            Err(error) => {
                let _ = warn_once(
                    "CLI",
                    "input is not valid UTF-8; invalid bytes were replaced"
                );
                String::from_utf8_lossy(error.as_bytes()).into_owned()
            }
        })
    }

    fn processor(&self, html: &str) -> HtmlProcessor {
        if self.fragment {
            HtmlProcessor::create_fragment(html)
        } else {
            HtmlProcessor::create_full_parser(html)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut out = BufWriter::new(io::stdout().lock());

    let stopped = match &cli.command {
        Command::Tokens {
            input,
            tree,
            json,
            only,
        } => print_tokens(input, *tree, *json, *only, &mut out)?,
        Command::Tags { input } => print_tags(input, &mut out)?,
        Command::Text { input } => {
            let mut processor = input.processor(&input.read()?);
            out.write_all(text::readable_text(&mut processor).as_bytes())?;
            processor.get_last_error().cloned()
        }
        Command::Grep {
            pattern,
            input,
            before,
            after,
        } => {
            let regex =
                Regex::new(pattern).with_context(|| format!("invalid pattern '{pattern}'"))?;
            let mut processor = input.processor(&input.read()?);
            let runs = text::text_runs(&mut processor);
            print_matches(&runs, &regex, *before, *after, &mut out)?;
            processor.get_last_error().cloned()
        }
        Command::Highlight { input } => highlight::highlight(&input.read()?, &mut out)?,
    };
    out.flush()?;

    match stopped {
        Some(error) => Err(error).context("the document was not fully processed"),
        None => Ok(()),
    }
}

/// Print each token; returns the error that stopped the scan, if any.
fn print_tokens(
    input: &Input,
    tree: bool,
    json: bool,
    only: Option<TokenType>,
    out: &mut impl Write,
) -> Result<Option<HtmlError>> {
    let html = input.read()?;
    let wanted = |token_type: Option<TokenType>| only.is_none_or(|only| token_type == Some(only));

    if tree {
        let mut processor = input.processor(&html);
        while processor.next_token() {
            if !wanted(processor.get_token_type()) {
                continue;
            }
            if let Some(record) = TokenRecord::from_tree(&processor) {
                emit(&record, json, out)?;
            }
        }
        Ok(processor.get_last_error().cloned())
    } else {
        let mut tags = TagProcessor::new(&html);
        while tags.next_token() {
            if !wanted(tags.get_token_type()) {
                continue;
            }
            if let Some(record) = TokenRecord::from_tags(&tags) {
                emit(&record, json, out)?;
            }
        }
        Ok(tags.get_last_error().cloned())
    }
}

fn emit(record: &TokenRecord, json: bool, out: &mut impl Write) -> Result<()> {
    if json {
        serde_json::to_writer(&mut *out, record)?;
        writeln!(out)?;
    } else {
        writeln!(out, "{}", record.render())?;
    }
    Ok(())
}

fn print_tags(input: &Input, out: &mut impl Write) -> Result<Option<HtmlError>> {
    let html = input.read()?;
    let mut processor = input.processor(&html);
    while processor.next_tag(None) {
        let path = processor.get_breadcrumbs().join(" > ");
        let classes = processor.class_list().unwrap_or_default();
        if classes.is_empty() {
            writeln!(out, "{path}")?;
        } else {
            writeln!(out, "{path} {}", format!(".{}", classes.join(".")).dimmed())?;
        }
    }
    Ok(processor.get_last_error().cloned())
}

/// Print matching runs grep-style: breadcrumbs, then the text with each
/// match highlighted. Groups of runs that are not adjacent are separated
/// by `--`.
fn print_matches(
    runs: &[TextRun],
    regex: &Regex,
    before: usize,
    after: usize,
    out: &mut impl Write,
) -> Result<()> {
    let matches: Vec<usize> = runs
        .iter()
        .enumerate()
        .filter(|(_, run)| regex.is_match(&run.text))
        .map(|(index, _)| index)
        .collect();

    let mut printed_through: Option<usize> = None;
    for &index in &matches {
        let first = index.saturating_sub(before);
        let last = (index + after).min(runs.len().saturating_sub(1));
        let start = printed_through.map_or(first, |through| first.max(through + 1));
        if printed_through.is_some_and(|through| start > through + 1) {
            writeln!(out, "{}", "--".dimmed())?;
        }
        for (offset, run) in runs.iter().enumerate().take(last + 1).skip(start) {
            let crumbs = run.breadcrumbs.join(" > ");
            let text = if regex.is_match(&run.text) {
                highlight_matches(&run.text, regex)
            } else {
                run.text.clone()
            };
            let separator = if matches.binary_search(&offset).is_ok() {
                ':'
            } else {
                '-'
            };
            let shown = if run.verbatim {
                text.as_str()
            } else {
                text.trim()
            };
            writeln!(out, "{}{separator} {shown}", crumbs.dimmed())?;
        }
        printed_through = Some(printed_through.map_or(last, |through| through.max(last)));
    }
    Ok(())
}

fn highlight_matches(text: &str, regex: &Regex) -> String {
    let mut highlighted = String::with_capacity(text.len());
    let mut at = 0;
    for found in regex.find_iter(text) {
        highlighted.push_str(&text[at..found.start()]);
        highlighted.push_str(&found.as_str().red().bold().to_string());
        at = found.end();
    }
    highlighted.push_str(&text[at..]);
    highlighted
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_token_type_filter_parses() {
        let cli = Cli::parse_from(["wren", "tokens", "--only", "comment", "--html", "<!--x-->"]);
        let Command::Tokens { only, input, .. } = cli.command else {
            panic!("expected the tokens command");
        };
        assert_eq!(only, Some(TokenType::Comment));
        assert_eq!(input.read().unwrap(), "<!--x-->");
    }

    #[test]
    fn test_grep_context_groups() {
        let runs: Vec<TextRun> = ["alpha", "beta", "gamma", "delta", "epsilon"]
            .iter()
            .map(|text| TextRun {
                breadcrumbs: vec!["P".to_string()],
                text: (*text).to_string(),
                verbatim: false,
            })
            .collect();
        let regex = Regex::new("^(alpha|epsilon)$").unwrap();
        let mut out = Vec::new();
        print_matches(&runs, &regex, 0, 1, &mut out).unwrap();
        let printed = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = printed.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].ends_with("- beta"));
        assert!(lines[2].contains("--"));
        assert!(lines[3].contains("epsilon"));
    }
}
