//! Character reference decoding.
//!
//! [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
//!
//! The tag processor never rewrites the buffer to resolve references.
//! Text and attribute values are decoded on demand from their raw spans,
//! which keeps scanning allocation-free until someone asks for a value.

mod named;

use std::borrow::Cow;

use memchr::memchr;

pub use named::{LONGEST_LEGACY_NAME, LONGEST_NAME, is_legacy_name, lookup_entity};

/// Where a reference appears, which changes how legacy names are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceContext {
    /// Text content (including RCDATA).
    Data,
    /// An attribute value.
    Attribute,
}

/// U+FFFD REPLACEMENT CHARACTER
const REPLACEMENT: char = '\u{FFFD}';

/// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
///
/// "If the number is one of the numbers in the first column of the following
/// table, then find the row with that number in the first column, and set
/// the character reference code to the number in the second column."
///
/// Indexed by `code - 0x80`. Unlisted entries keep their C1 code point.
const WINDOWS_1252: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

/// Decode the character reference starting at `text[offset]`.
///
/// Returns the replacement text and how many bytes of `text` it consumed,
/// or `None` if no reference starts there. Callers that want the documented
/// fallback emit a literal `&` and move on by one byte, as [`decode`] does.
///
/// ```
/// use wren_html::character_reference::{ReferenceContext, decode_one};
///
/// let (text, consumed) = decode_one(ReferenceContext::Data, b"a &amp; b", 2).unwrap();
/// assert_eq!((&*text, consumed), ("&", 5));
/// assert!(decode_one(ReferenceContext::Attribute, b"?a=1&copy=2", 4).is_none());
/// ```
#[must_use]
pub fn decode_one(
    context: ReferenceContext,
    text: &[u8],
    offset: usize,
) -> Option<(Cow<'static, str>, usize)> {
    if text.get(offset) != Some(&b'&') {
        return None;
    }
    let rest = &text[offset + 1..];
    match rest.first()? {
        b'#' => decode_numeric(rest),
        byte if byte.is_ascii_alphanumeric() => decode_named(context, rest),
        _ => None,
    }
}

/// Decode every reference in `text`, passing other bytes through.
///
/// Invalid UTF-8 is replaced with U+FFFD.
#[must_use]
pub fn decode(context: ReferenceContext, text: &[u8]) -> String {
    let mut decoded = String::with_capacity(text.len());
    let mut copied_until = 0;
    let mut at = 0;

    while let Some(found) = memchr(b'&', &text[at..]) {
        let amp = at + found;
        match decode_one(context, text, amp) {
            Some((replacement, consumed)) => {
                decoded.push_str(&String::from_utf8_lossy(&text[copied_until..amp]));
                decoded.push_str(&replacement);
                at = amp + consumed;
                copied_until = at;
            }
            None => at = amp + 1,
        }
    }
    decoded.push_str(&String::from_utf8_lossy(&text[copied_until..]));
    decoded
}

/// `rest` starts just after the `&` with `#`.
fn decode_numeric(rest: &[u8]) -> Option<(Cow<'static, str>, usize)> {
    let is_hex = matches!(rest.get(1), Some(b'x' | b'X'));
    let digits_at = if is_hex { 2 } else { 1 };
    let radix = if is_hex { 16 } else { 10 };

    let digits = rest[digits_at.min(rest.len())..]
        .iter()
        .take_while(|byte| {
            if is_hex {
                byte.is_ascii_hexdigit()
            } else {
                byte.is_ascii_digit()
            }
        })
        .count();
    if digits == 0 {
        return None;
    }

    // Saturate past the Unicode range; the exact value no longer matters.
    let mut code: u32 = 0;
    for &byte in &rest[digits_at..digits_at + digits] {
        let digit = char::from(byte).to_digit(radix).unwrap_or(0);
        code = code
            .saturating_mul(radix)
            .saturating_add(digit)
            .min(0x11_0000);
    }

    let end = digits_at + digits;
    let consumed = 1 + end + usize::from(rest.get(end) == Some(&b';'));
    Some((Cow::Owned(numeric_replacement(code).to_string()), consumed))
}

/// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
fn numeric_replacement(code: u32) -> char {
    match code {
        0 | 0xD800..=0xDFFF => REPLACEMENT,
        0x80..=0x9F => WINDOWS_1252[(code - 0x80) as usize]
            .or_else(|| char::from_u32(code))
            .unwrap_or(REPLACEMENT),
        _ => char::from_u32(code).unwrap_or(REPLACEMENT),
    }
}

/// [§ 13.2.5.73 Named character reference state](https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state)
///
/// `rest` starts just after the `&` with an ASCII alphanumeric.
fn decode_named(context: ReferenceContext, rest: &[u8]) -> Option<(Cow<'static, str>, usize)> {
    let run = rest
        .iter()
        .take(LONGEST_NAME)
        .take_while(|byte| byte.is_ascii_alphanumeric())
        .count();

    // Only the whole run can be followed by the semicolon.
    if rest.get(run) == Some(&b';') {
        let name = std::str::from_utf8(&rest[..=run]).ok()?;
        if let Some(value) = lookup_entity(name) {
            return Some((Cow::Borrowed(value), run + 2));
        }
    }

    for length in (1..=run.min(LONGEST_LEGACY_NAME)).rev() {
        let name = std::str::from_utf8(&rest[..length]).ok()?;
        let Some(value) = lookup_entity(name) else {
            continue;
        };

        // "If the character reference was consumed as part of an attribute,
        // and the last character matched is not a U+003B SEMICOLON character
        // (;), and the next input character is either a U+003D EQUALS SIGN
        // character (=) or an ASCII alphanumeric, then [...] flush code points
        // consumed as a character reference and switch to the return state."
        if context == ReferenceContext::Attribute
            && rest
                .get(length)
                .is_some_and(|next| *next == b'=' || next.is_ascii_alphanumeric())
        {
            return None;
        }
        return Some((Cow::Borrowed(value), length + 1));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(text: &str) -> String {
        decode(ReferenceContext::Data, text.as_bytes())
    }

    fn attribute(text: &str) -> String {
        decode(ReferenceContext::Attribute, text.as_bytes())
    }

    #[test]
    fn test_numeric_replacements() {
        assert_eq!(data("&#0;"), "\u{FFFD}");
        assert_eq!(data("&#xD800;"), "\u{FFFD}");
        assert_eq!(data("&#x110000;"), "\u{FFFD}");
        assert_eq!(data("&#99999999999999;"), "\u{FFFD}");
        assert_eq!(data("&#x80;"), "\u{20AC}");
        assert_eq!(data("&#x81;"), "\u{81}");
        assert_eq!(data("&#150;"), "\u{2013}");
    }

    #[test]
    fn test_numeric_requires_digits() {
        assert_eq!(data("&#;"), "&#;");
        assert_eq!(data("&#x;"), "&#x;");
        assert_eq!(data("&#xg"), "&#xg");
    }

    #[test]
    fn test_semicolon_is_optional_for_numeric() {
        assert_eq!(data("&#65x"), "Ax");
        assert_eq!(data("&#x41;B"), "AB");
    }

    #[test]
    fn test_longest_legacy_prefix_wins() {
        assert_eq!(data("&notit;"), "\u{00AC}it;");
        assert_eq!(data("&notin;"), "\u{2209}");
        assert_eq!(data("&ampx"), "&x");
    }
}
