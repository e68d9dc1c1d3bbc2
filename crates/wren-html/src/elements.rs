//! Element classification tables.
//!
//! All predicates accept tag names in any ASCII case.
//!
//! [§ 13.1.2 Elements](https://html.spec.whatwg.org/multipage/syntax.html#elements-2)

use std::borrow::Cow;

use strum_macros::Display;

/// Uppercase `name` without allocating when it already is.
pub(crate) fn uppercase(name: &str) -> Cow<'_, str> {
    if name.bytes().any(|byte| byte.is_ascii_lowercase()) {
        Cow::Owned(name.to_ascii_uppercase())
    } else {
        Cow::Borrowed(name)
    }
}

/// [§ 13.1.2 Void elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
///
/// "area, base, br, col, embed, hr, img, input, link, meta, source, track, wbr"
///
/// The legacy `BASEFONT`, `BGSOUND`, `FRAME`, `KEYGEN` and `PARAM` are
/// parsed the same way and are included. A trailing `/` in the markup has no
/// bearing on this.
#[must_use]
pub fn is_void(tag_name: &str) -> bool {
    matches!(
        &*uppercase(tag_name),
        "AREA"
            | "BASE"
            | "BASEFONT"
            | "BGSOUND"
            | "BR"
            | "COL"
            | "EMBED"
            | "FRAME"
            | "HR"
            | "IMG"
            | "INPUT"
            | "KEYGEN"
            | "LINK"
            | "META"
            | "PARAM"
            | "SOURCE"
            | "TRACK"
            | "WBR"
    )
}

/// How the content of an element is tokenized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum TextKind {
    /// Ordinary markup.
    #[strum(serialize = "data")]
    Data,
    /// Tags are not recognized; character references are decoded.
    #[strum(serialize = "RCDATA")]
    RcData,
    /// Tags are not recognized; character references are left alone.
    #[strum(serialize = "RAWTEXT")]
    RawText,
    /// RAWTEXT with the escaped and double-escaped comment states.
    #[strum(serialize = "script data")]
    ScriptData,
    /// Everything up to the end of the document is text.
    #[strum(serialize = "PLAINTEXT")]
    Plaintext,
}

impl TextKind {
    /// Whether character references in this content are decoded.
    #[must_use]
    pub const fn decodes_references(self) -> bool {
        matches!(self, Self::Data | Self::RcData)
    }
}

/// Elements whose content is not tokenized as markup, with the text kind
/// their opener switches the tokenizer to.
///
/// [§ 13.2.6.4.7 "in body"](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
/// and [§ 13.2.6.4.4 "in head"](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
/// switch the tokenizer for these elements. Scripting is treated as
/// enabled, so `NOSCRIPT` is RAWTEXT.
const SPECIAL_TEXT_ELEMENTS: &[(&str, TextKind)] = &[
    ("SCRIPT", TextKind::ScriptData),
    ("TEXTAREA", TextKind::RcData),
    ("TITLE", TextKind::RcData),
    ("IFRAME", TextKind::RawText),
    ("NOEMBED", TextKind::RawText),
    ("NOFRAMES", TextKind::RawText),
    ("NOSCRIPT", TextKind::RawText),
    ("STYLE", TextKind::RawText),
    ("XMP", TextKind::RawText),
    ("PLAINTEXT", TextKind::Plaintext),
];

/// The text kind an HTML element's opener switches the tokenizer to, if any.
#[must_use]
pub fn special_text_kind(tag_name: &str) -> Option<TextKind> {
    special_text(tag_name).map(|(_, kind)| kind)
}

/// Like [`special_text_kind`], also returning the canonical element name.
pub(crate) fn special_text(tag_name: &str) -> Option<(&'static str, TextKind)> {
    SPECIAL_TEXT_ELEMENTS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(tag_name))
        .copied()
}

/// The namespace elements are created in.
///
/// [§ 2.1.8 Namespaces](https://infra.spec.whatwg.org/#namespaces)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum Namespace {
    /// The HTML namespace.
    #[default]
    #[strum(serialize = "html")]
    Html,
    /// The SVG namespace.
    #[strum(serialize = "svg")]
    Svg,
    /// The `MathML` namespace.
    #[strum(serialize = "math")]
    MathMl,
}

/// Elements whose first newline after the opener is not part of the content.
///
/// "If the next token is a U+000A LINE FEED (LF) character token, then
/// ignore that token and move on to the next one."
#[must_use]
pub fn skips_leading_newline(tag_name: &str) -> bool {
    matches!(&*uppercase(tag_name), "PRE" | "LISTING" | "TEXTAREA")
}

/// [§ 13.2.4.2 Special](https://html.spec.whatwg.org/multipage/parsing.html#special)
///
/// The HTML elements in the "special" category. The SVG and `MathML` members
/// of the category are checked by the HTML processor with their namespace.
#[must_use]
pub fn is_special(tag_name: &str) -> bool {
    matches!(
        &*uppercase(tag_name),
        "ADDRESS"
            | "APPLET"
            | "AREA"
            | "ARTICLE"
            | "ASIDE"
            | "BASE"
            | "BASEFONT"
            | "BGSOUND"
            | "BLOCKQUOTE"
            | "BODY"
            | "BR"
            | "BUTTON"
            | "CAPTION"
            | "CENTER"
            | "COL"
            | "COLGROUP"
            | "DD"
            | "DETAILS"
            | "DIR"
            | "DIV"
            | "DL"
            | "DT"
            | "EMBED"
            | "FIELDSET"
            | "FIGCAPTION"
            | "FIGURE"
            | "FOOTER"
            | "FORM"
            | "FRAME"
            | "FRAMESET"
            | "H1"
            | "H2"
            | "H3"
            | "H4"
            | "H5"
            | "H6"
            | "HEAD"
            | "HEADER"
            | "HGROUP"
            | "HR"
            | "HTML"
            | "IFRAME"
            | "IMG"
            | "INPUT"
            | "KEYGEN"
            | "LI"
            | "LINK"
            | "LISTING"
            | "MAIN"
            | "MARQUEE"
            | "MENU"
            | "META"
            | "NAV"
            | "NOEMBED"
            | "NOFRAMES"
            | "NOSCRIPT"
            | "OBJECT"
            | "OL"
            | "P"
            | "PARAM"
            | "PLAINTEXT"
            | "PRE"
            | "SCRIPT"
            | "SEARCH"
            | "SECTION"
            | "SELECT"
            | "SOURCE"
            | "STYLE"
            | "SUMMARY"
            | "TABLE"
            | "TBODY"
            | "TD"
            | "TEMPLATE"
            | "TEXTAREA"
            | "TFOOT"
            | "TH"
            | "THEAD"
            | "TITLE"
            | "TR"
            | "TRACK"
            | "UL"
            | "WBR"
            | "XMP"
    )
}

/// [§ 13.2.4.2 Formatting](https://html.spec.whatwg.org/multipage/parsing.html#formatting)
///
/// "a, b, big, code, em, font, i, nobr, s, small, strike, strong, tt, u"
#[must_use]
pub fn is_formatting(tag_name: &str) -> bool {
    matches!(
        &*uppercase(tag_name),
        "A" | "B"
            | "BIG"
            | "CODE"
            | "EM"
            | "FONT"
            | "I"
            | "NOBR"
            | "S"
            | "SMALL"
            | "STRIKE"
            | "STRONG"
            | "TT"
            | "U"
    )
}

/// Elements after which text consumers start a new line.
#[must_use]
pub fn is_line_breaker(tag_name: &str) -> bool {
    matches!(
        &*uppercase(tag_name),
        "BLOCKQUOTE"
            | "BR"
            | "DD"
            | "DIV"
            | "DL"
            | "DT"
            | "H1"
            | "H2"
            | "H3"
            | "H4"
            | "H5"
            | "H6"
            | "HR"
            | "LI"
            | "OL"
            | "P"
            | "UL"
    )
}

/// `H1` through `H6`.
#[must_use]
pub fn is_heading(tag_name: &str) -> bool {
    matches!(
        &*uppercase(tag_name),
        "H1" | "H2" | "H3" | "H4" | "H5" | "H6"
    )
}
