//! Integration tests for character reference decoding.

use wren_html::TagProcessor;
use wren_html::character_reference::{
    LONGEST_LEGACY_NAME, ReferenceContext, decode, decode_one, is_legacy_name, lookup_entity,
};

fn data(text: &str) -> String {
    decode(ReferenceContext::Data, text.as_bytes())
}

fn attribute(text: &str) -> String {
    decode(ReferenceContext::Attribute, text.as_bytes())
}

#[test]
fn test_named_references() {
    assert_eq!(data("a &amp; b"), "a & b");
    assert_eq!(data("&lt;p&gt;"), "<p>");
    assert_eq!(data("&hellip;"), "\u{2026}");
    assert_eq!(data("&nbsp;"), "\u{00A0}");
}

#[test]
fn test_unknown_names_pass_through() {
    assert_eq!(data("&bogus;"), "&bogus;");
    assert_eq!(data("& amp;"), "& amp;");
    assert_eq!(data("AT&T"), "AT&T");
    assert_eq!(data("trailing &"), "trailing &");
}

#[test]
fn test_semicolon_required_outside_legacy_names() {
    // `hellip` is only recognized with its semicolon.
    assert_eq!(data("&hellip"), "&hellip");
    assert_eq!(data("&copy 2024"), "\u{00A9} 2024");
    assert!(is_legacy_name("copy"));
    assert!(!is_legacy_name("hellip"));
}

#[test]
fn test_numeric_references() {
    assert_eq!(data("&#65;&#x42;&#X43;"), "ABC");
    assert_eq!(data("&#x1F600;"), "\u{1F600}");
    assert_eq!(data("&#128;"), "\u{20AC}");
    assert_eq!(data("&#0;"), "\u{FFFD}");
}

#[test]
fn test_attribute_context_keeps_legacy_names_before_alphanumerics() {
    assert_eq!(attribute("?a=1&copy=2"), "?a=1&copy=2");
    assert_eq!(attribute("&notit"), "&notit");
    assert_eq!(attribute("&copy;=2"), "\u{00A9}=2");
    assert_eq!(attribute("&copy 2"), "\u{00A9} 2");
    // Data context decodes the same text.
    assert_eq!(data("?a=1&copy=2"), "?a=1\u{00A9}=2");
}

#[test]
fn test_decode_one_reports_consumed_bytes() {
    let text = b"x &notin; y";
    let (decoded, consumed) = decode_one(ReferenceContext::Data, text, 2).unwrap();
    assert_eq!(&*decoded, "\u{2209}");
    assert_eq!(consumed, 7);

    assert!(decode_one(ReferenceContext::Data, text, 0).is_none());
    assert!(decode_one(ReferenceContext::Data, b"&;", 0).is_none());
}

#[test]
fn test_decoding_does_not_touch_the_buffer() {
    let html = "<a title='&lt;&amp;'>&quot;hi&quot;</a>";
    let mut processor = TagProcessor::new(html);
    assert!(processor.next_token());
    let title = processor.get_attribute("title").unwrap().unwrap();
    assert_eq!(title.as_str(), Some("<&"));
    assert!(processor.next_token());
    assert_eq!(processor.get_modifiable_text(), "\"hi\"");
    assert_eq!(processor.get_modifiable_text(), "\"hi\"");
    assert_eq!(processor.html_bytes(), html.as_bytes());
}

#[test]
fn test_lookup_table() {
    assert_eq!(lookup_entity("amp;"), Some("&"));
    assert_eq!(lookup_entity("amp"), Some("&"));
    assert_eq!(lookup_entity("hellip;"), Some("\u{2026}"));
    assert_eq!(lookup_entity("nope;"), None);
    assert!(is_legacy_name("middot"));
    assert_eq!(LONGEST_LEGACY_NAME, "middot".len());
}
