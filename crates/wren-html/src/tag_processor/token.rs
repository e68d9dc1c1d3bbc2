//! The token views handed to callers.

use strum_macros::{Display, EnumString};

use crate::span::Span;

/// The kind of the current token, without its payload.
///
/// Displays as the node-name style string consumers switch on (`#tag`,
/// `#text`, ...). Parses from that string or from the bare name (`text`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum TokenType {
    /// An opening or closing tag.
    #[strum(to_string = "#tag", serialize = "tag")]
    Tag,
    /// A run of text, including the content of RAWTEXT and RCDATA elements.
    #[strum(to_string = "#text", serialize = "text")]
    Text,
    /// A `<![CDATA[ ... ]]>` section inside SVG or `MathML`.
    #[strum(to_string = "#cdata-section", serialize = "cdata-section")]
    CdataSection,
    /// A comment, or markup the HTML parser turns into one.
    #[strum(to_string = "#comment", serialize = "comment")]
    Comment,
    /// A `<!DOCTYPE ...>` declaration.
    #[strum(to_string = "#doctype", serialize = "doctype")]
    Doctype,
    /// `</>`, which browsers drop entirely.
    #[strum(to_string = "#presumptuous-tag", serialize = "presumptuous-tag")]
    PresumptuousTag,
    /// A closer whose name does not start with a letter, e.g. `</3 >` or
    /// `</%name>`. Browsers treat it as a comment.
    #[strum(to_string = "#funky-comment", serialize = "funky-comment")]
    FunkyComment,
}

/// The syntax a comment token was written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum CommentKind {
    /// `<!-- ... -->`, also closed by `--!>`.
    #[strum(serialize = "html-comment")]
    HtmlComment,
    /// `<!-->` or `<!--->`, which close immediately and hold no text.
    #[strum(serialize = "abruptly-closed")]
    AbruptlyClosed,
    /// `<?target ...>`, which looks like an XML processing instruction.
    #[strum(serialize = "pi-lookalike")]
    ProcessingInstructionLookalike,
    /// Any other `<?...>` construct.
    #[strum(serialize = "bogus")]
    Bogus,
}

/// The value of an attribute as returned by `get_attribute`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttributeValue {
    /// Present without a value, e.g. `<input disabled>`.
    Boolean,
    /// Present with a value, character references decoded.
    String(String),
}

impl AttributeValue {
    /// The decoded value, or `None` for a boolean attribute.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Boolean => None,
            Self::String(value) => Some(value),
        }
    }

    /// Whether the attribute has no value.
    #[must_use]
    pub const fn is_boolean(&self) -> bool {
        matches!(self, Self::Boolean)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// Where an attribute's parts are in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
    /// The attribute name as written.
    pub name: Span,
    /// The raw value between its quotes, or an empty span at the end of the
    /// name for boolean attributes.
    pub value: Span,
    /// Whether an `=` and value were written.
    pub has_value: bool,
    /// The whole attribute, from the first byte of the name to the last
    /// byte of the value or closing quote.
    pub span: Span,
    /// The attribute plus the whitespace before it, which is what removal
    /// deletes.
    pub(crate) removal: Span,
}

/// The current token and its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// What kind of token this is.
    pub kind: TokenKind<'a>,
    /// Where the whole token is in the buffer.
    pub span: Span,
}

/// The kind of a token with the fields consumers match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind<'a> {
    /// `<!DOCTYPE ...>`.
    Doctype,
    /// A comment of the given syntax.
    Comment(CommentKind),
    /// An opening or closing tag.
    Tag {
        /// Uppercase tag name.
        name: &'a str,
        /// Whether this is `</name>`.
        is_closer: bool,
        /// Whether the element never has content.
        is_void: bool,
        /// Whether the tag ends with `/>`.
        has_self_closing_flag: bool,
    },
    /// A text run.
    Text,
    /// A CDATA section in foreign content.
    CdataSection,
    /// A funky comment such as `</3 >`.
    FunkyComment,
    /// `</>`.
    PresumptuousTag,
    /// The document has been fully scanned.
    Eof,
}
