//! Integration tests for the tag processor.

use wren_html::{
    AttributeValue, CommentKind, ErrorKind, HtmlError, MAX_BOOKMARKS, Malformed, Namespace,
    TagProcessor, TagQuery, TokenKind, TokenType, Unsupported,
};

/// Describe the current token as `DIV`, `/DIV`, `#text`, ...
fn describe(processor: &TagProcessor) -> String {
    match processor.get_token_type() {
        Some(TokenType::Tag) => {
            let name = processor.get_tag().unwrap_or_default();
            if processor.is_tag_closer() {
                format!("/{name}")
            } else {
                name.to_string()
            }
        }
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Helper to scan a string and describe every token
fn scan(html: &str) -> Vec<String> {
    let mut processor = TagProcessor::new(html);
    let mut tokens = Vec::new();
    while processor.next_token() {
        tokens.push(describe(&processor));
    }
    tokens
}

/// Helper to collect the modifiable text of every text token
fn texts(html: &str) -> Vec<String> {
    let mut processor = TagProcessor::new(html);
    let mut texts = Vec::new();
    while processor.next_token() {
        if processor.get_token_type() == Some(TokenType::Text) {
            texts.push(processor.get_modifiable_text());
        }
    }
    texts
}

fn string(value: &str) -> Option<AttributeValue> {
    Some(AttributeValue::String(value.to_string()))
}

#[test]
fn test_mixed_markup_with_stray_closers() {
    let html = "<div class=start>I </3 when <img> outflow <br class=end> inflow</div></li></ul>";
    assert_eq!(
        scan(html),
        ["DIV", "#text", "IMG", "#text", "BR", "#text", "/DIV", "/LI", "/UL"]
    );

    let mut processor = TagProcessor::new(html);
    assert!(processor.next_tag(None));
    assert_eq!(processor.get_attribute("class").unwrap(), string("start"));

    // `</3 when <img>` would swallow a tag, so the `</` is literal text.
    assert!(processor.next_token());
    assert_eq!(processor.get_modifiable_text(), "I </3 when ");

    assert!(processor.next_tag(None));
    assert_eq!(processor.get_tag(), Some("IMG"));
    assert!(processor.next_tag(None));
    assert_eq!(processor.get_tag(), Some("BR"));
    assert_eq!(processor.get_attribute("class").unwrap(), string("end"));

    while processor.next_token() {}
    assert!(processor.get_last_error().is_none());
    assert!(processor.is_complete());
}

#[test]
fn test_unclosed_paragraph_still_yields_tokens() {
    assert_eq!(scan("<p>A</p><p>B"), ["P", "#text", "/P", "P", "#text"]);
    assert_eq!(texts("<p>A</p><p>B"), ["A", "B"]);
}

#[test]
fn test_set_attribute_is_visible_before_flush() {
    let mut processor = TagProcessor::new("<div>content</div>");
    assert!(processor.next_tag(None));
    processor.set_attribute("id", "x").unwrap();

    assert_eq!(processor.get_attribute("id").unwrap(), string("x"));
    assert_eq!(processor.html_bytes(), b"<div>content</div>");
    assert_eq!(processor.pending_edit_count(), 1);

    assert_eq!(
        processor.get_updated_html().unwrap(),
        r#"<div id="x">content</div>"#
    );
    assert_eq!(processor.pending_edit_count(), 0);
    assert_eq!(processor.get_attribute("id").unwrap(), string("x"));
}

#[test]
fn test_text_is_decoded_but_span_is_raw() {
    let mut processor = TagProcessor::new("<p>a &amp; b</p>");
    assert!(processor.next_token());
    assert!(processor.next_token());

    assert_eq!(processor.get_modifiable_text(), "a & b");
    assert_eq!(processor.token_bytes(), b"a &amp; b");
    let span = processor.current_token_span().unwrap();
    assert_eq!((span.start, span.length), (3, 9));
}

#[test]
fn test_script_content_is_one_text_token() {
    let html = "<script>console.log('<a>');</script>";
    assert_eq!(scan(html), ["SCRIPT", "#text", "/SCRIPT"]);
    assert_eq!(texts(html), ["console.log('<a>');"]);
}

#[test]
fn test_script_ignores_split_closer() {
    let html = "<script>document.write('</scr' + 'ipt>');</script><p>";
    assert_eq!(scan(html), ["SCRIPT", "#text", "/SCRIPT", "P"]);
    assert_eq!(texts(html), ["document.write('</scr' + 'ipt>');"]);
}

#[test]
fn test_script_double_escaped_closer() {
    let html = "<script><!--<script>x</script>--></script>";
    assert_eq!(texts(html), ["<!--<script>x</script>-->"]);
    assert_eq!(scan(html), ["SCRIPT", "#text", "/SCRIPT"]);
}

#[test]
fn test_empty_script_has_no_text_token() {
    assert_eq!(scan("<script></script>"), ["SCRIPT", "/SCRIPT"]);
}

#[test]
fn test_rcdata_and_rawtext() {
    assert_eq!(
        scan("<textarea><b>x</b></textarea>"),
        ["TEXTAREA", "#text", "/TEXTAREA"]
    );
    assert_eq!(texts("<title>a &amp; b</title>"), ["a & b"]);
    assert_eq!(texts("<style>a &amp; b</style>"), ["a &amp; b"]);
    assert_eq!(texts("<xmp><p></XMP >"), ["<p>"]);
}

#[test]
fn test_plaintext_runs_to_the_end() {
    assert_eq!(scan("<plaintext><p>x</plaintext>"), ["PLAINTEXT", "#text"]);
    assert_eq!(texts("<plaintext><p>x</plaintext>"), ["<p>x</plaintext>"]);
}

#[test]
fn test_leading_newline_dropped_after_pre_and_textarea() {
    assert_eq!(texts("<textarea>\nhello</textarea>"), ["hello"]);
    assert_eq!(texts("<pre>\n\nx</pre>"), ["\nx"]);
    assert_eq!(texts("<div>\nx</div>"), ["\nx"]);
}

#[test]
fn test_comment_fixtures() {
    let mut processor = TagProcessor::new("<!------><!---><!-- improperly closed --!>after");

    assert!(processor.next_token());
    assert_eq!(processor.get_token_type(), Some(TokenType::Comment));
    assert_eq!(processor.get_comment_type(), Some(CommentKind::HtmlComment));
    assert_eq!(processor.get_modifiable_text(), "--");

    assert!(processor.next_token());
    assert_eq!(
        processor.get_comment_type(),
        Some(CommentKind::AbruptlyClosed)
    );
    assert_eq!(processor.get_modifiable_text(), "");

    assert!(processor.next_token());
    assert_eq!(processor.get_comment_type(), Some(CommentKind::HtmlComment));
    assert_eq!(processor.get_modifiable_text(), " improperly closed ");

    assert!(processor.next_token());
    assert_eq!(processor.get_token_type(), Some(TokenType::Text));
    assert_eq!(processor.get_modifiable_text(), "after");
    assert!(!processor.next_token());
    assert!(processor.is_complete());
}

#[test]
fn test_abruptly_closed_comment() {
    let mut processor = TagProcessor::new("<!-->");
    assert!(processor.next_token());
    assert_eq!(
        processor.get_comment_type(),
        Some(CommentKind::AbruptlyClosed)
    );
    assert_eq!(processor.token_bytes(), b"<!-->");
}

#[test]
fn test_processing_instruction_lookalikes() {
    let mut processor = TagProcessor::new(r#"<?xml version="1.0"?><?>"#);
    assert!(processor.next_token());
    assert_eq!(
        processor.get_comment_type(),
        Some(CommentKind::ProcessingInstructionLookalike)
    );
    assert_eq!(processor.get_modifiable_text(), r#"xml version="1.0"?"#);

    assert!(processor.next_token());
    assert_eq!(processor.get_comment_type(), Some(CommentKind::Bogus));
}

#[test]
fn test_funky_comments_and_presumptuous_tags() {
    assert_eq!(
        scan("a</%name>b</>c"),
        ["#text", "#funky-comment", "#text", "#presumptuous-tag", "#text"]
    );

    let mut processor = TagProcessor::new("</%name>");
    assert!(processor.next_token());
    assert_eq!(processor.get_modifiable_text(), "%name");
}

#[test]
fn test_lone_angle_brackets_are_text() {
    assert_eq!(scan("a < b"), ["#text"]);
    assert_eq!(scan("x</"), ["#text"]);
    assert_eq!(texts("1 <2 and 3< 4"), ["1 <2 and 3< 4"]);
}

#[test]
fn test_doctype() {
    let mut processor = TagProcessor::new("<!DOCTYPE html><html>");
    assert!(processor.next_token());
    assert_eq!(processor.get_token_type(), Some(TokenType::Doctype));
    assert_eq!(processor.get_token_name().as_deref(), Some("html"));
    assert_eq!(processor.get_modifiable_text(), " html");
    assert!(processor.next_tag(None));
    assert_eq!(processor.get_tag(), Some("HTML"));
}

#[test]
fn test_token_names() {
    let mut processor = TagProcessor::new("<Div>text<!--c-->");
    assert!(processor.next_token());
    assert_eq!(processor.get_token_name().as_deref(), Some("DIV"));
    assert!(processor.next_token());
    assert_eq!(processor.get_token_name().as_deref(), Some("#text"));
    assert!(processor.next_token());
    assert_eq!(processor.get_token_name().as_deref(), Some("#comment"));
    assert!(!processor.next_token());
    assert_eq!(processor.get_token_name(), None);
}

#[test]
fn test_token_types_parse_from_names() {
    assert_eq!("#text".parse::<TokenType>(), Ok(TokenType::Text));
    assert_eq!("comment".parse::<TokenType>(), Ok(TokenType::Comment));
    assert_eq!(
        "Funky-Comment".parse::<TokenType>(),
        Ok(TokenType::FunkyComment)
    );
    assert_eq!(TokenType::CdataSection.to_string(), "#cdata-section");
    assert!("element".parse::<TokenType>().is_err());
}

#[test]
fn test_current_token_kinds() {
    let mut processor = TagProcessor::new("<br/><div/></div>");

    assert!(processor.next_token());
    let token = processor.current_token().unwrap();
    assert_eq!(
        token.kind,
        TokenKind::Tag {
            name: "BR",
            is_closer: false,
            is_void: true,
            has_self_closing_flag: true,
        }
    );

    assert!(processor.next_token());
    assert!(processor.has_self_closing_flag());
    assert!(!TagProcessor::is_void("div"));

    assert!(processor.next_token());
    assert!(matches!(
        processor.current_token().unwrap().kind,
        TokenKind::Tag { is_closer: true, .. }
    ));

    assert!(!processor.next_token());
    assert_eq!(processor.current_token().unwrap().kind, TokenKind::Eof);
}

#[test]
fn test_boolean_and_missing_attributes() {
    let mut processor = TagProcessor::new("<input disabled value='a &amp; b'></input>");
    assert!(processor.next_tag(None));
    assert_eq!(
        processor.get_attribute("disabled").unwrap(),
        Some(AttributeValue::Boolean)
    );
    assert_eq!(processor.get_attribute("VALUE").unwrap(), string("a & b"));
    assert_eq!(processor.get_attribute("missing").unwrap(), None);

    // Closers have no attributes.
    assert!(processor.next_token());
    assert!(processor.is_tag_closer());
    assert_eq!(processor.get_attribute("disabled").unwrap(), None);
}

#[test]
fn test_attribute_reads_on_non_tags_fail() {
    let mut processor = TagProcessor::new("text");
    assert!(matches!(
        processor.get_attribute("id"),
        Err(HtmlError::InvalidOperation { .. })
    ));
    assert!(processor.next_token());
    let error = processor.get_attribute("id").unwrap_err();
    assert_eq!(error.kind(), ErrorKind::InvalidOperation);
    assert!(!error.is_terminal());
    assert!(processor.set_attribute("id", "x").is_err());
}

#[test]
fn test_duplicate_attributes() {
    let mut processor = TagProcessor::new("<div id=a ID=b>");
    assert!(processor.next_tag(None));
    assert_eq!(processor.get_attribute("id").unwrap(), string("a"));
    assert_eq!(processor.attribute_spans().len(), 2);

    assert!(processor.remove_attribute("id").unwrap());
    assert_eq!(processor.get_attribute("id").unwrap(), None);
    assert_eq!(processor.get_updated_html().unwrap(), "<div>");
}

#[test]
fn test_attribute_names_with_prefix() {
    let mut processor = TagProcessor::new("<div data-a=1 DATA-B=2 id=x></div>");
    assert!(processor.next_tag(None));
    processor.set_attribute("data-c", "3").unwrap();
    assert_eq!(
        processor.get_attribute_names_with_prefix("data-").unwrap(),
        ["data-a", "data-b", "data-c"]
    );

    assert!(processor.next_token());
    assert_eq!(processor.get_attribute_names_with_prefix(""), None);
}

#[test]
fn test_set_attribute_escapes_and_validates() {
    let mut processor = TagProcessor::new("<a href=x>link</a>");
    assert!(processor.next_tag(None));
    processor
        .set_attribute("title", r#"say "hi" & go"#)
        .unwrap();
    processor.set_attribute("href", "/next").unwrap();
    assert!(matches!(
        processor.set_attribute("a b", "x"),
        Err(HtmlError::InvalidOperation { .. })
    ));

    // Edits flush when the processor moves on.
    assert!(processor.next_token());
    assert_eq!(processor.get_modifiable_text(), "link");
    assert_eq!(
        processor.get_updated_html().unwrap(),
        r#"<a title="say &quot;hi&quot; &amp; go" href="/next">link</a>"#
    );
}

#[test]
fn test_boolean_attribute_and_removal_of_queued_addition() {
    let mut processor = TagProcessor::new("<input>");
    assert!(processor.next_tag(None));
    processor.set_boolean_attribute("checked").unwrap();
    processor.set_attribute("name", "x").unwrap();
    assert!(processor.remove_attribute("name").unwrap());
    assert!(!processor.remove_attribute("name").unwrap());
    assert_eq!(processor.get_updated_html().unwrap(), "<input checked>");
}

#[test]
fn test_class_helpers() {
    let mut processor = TagProcessor::new(r#"<div class="one two one">"#);
    assert!(processor.next_tag(None));
    assert_eq!(processor.class_list().unwrap(), ["one", "two"]);
    assert!(processor.has_class("two").unwrap());
    assert!(!processor.has_class("three").unwrap());

    processor.add_class("three").unwrap();
    assert!(processor.has_class("three").unwrap());
    processor.remove_class("one").unwrap();
    assert_eq!(processor.class_list().unwrap(), ["two", "three"]);
    assert_eq!(
        processor.get_updated_html().unwrap(),
        r#"<div class="two three">"#
    );

    let mut processor = TagProcessor::new(r#"<p class="solo">"#);
    assert!(processor.next_tag(None));
    processor.remove_class("solo").unwrap();
    assert_eq!(processor.get_updated_html().unwrap(), "<p>");
}

#[test]
fn test_next_tag_queries() {
    let html = r#"<ul><li class="done">a</li><li>b</li><li class="done" data-id=3>c</li></ul>"#;
    let mut processor = TagProcessor::new(html);
    let query = TagQuery::new()
        .tag_name("LI")
        .class_name("done")
        .match_offset(2);
    assert!(processor.next_tag(Some(&query)));
    assert_eq!(processor.get_attribute("data-id").unwrap(), string("3"));

    let mut processor = TagProcessor::new(html);
    let query = TagQuery::new().attribute_value("data-id", "3");
    assert!(processor.next_tag(Some(&query)));
    assert_eq!(processor.get_tag(), Some("LI"));

    let mut processor = TagProcessor::new(html);
    let query = TagQuery::new().tag_name("ul").visit_closers();
    assert!(processor.next_tag(Some(&query)));
    assert!(!processor.is_tag_closer());
    assert!(processor.next_tag(Some(&query)));
    assert!(processor.is_tag_closer());
    assert!(!processor.next_tag(Some(&query)));
}

#[test]
fn test_set_modifiable_text() {
    let mut processor = TagProcessor::new("<p>old</p><!--note-->");
    assert!(processor.next_token());
    assert!(processor.set_modifiable_text("x").is_err());

    assert!(processor.next_token());
    processor.set_modifiable_text("x < y").unwrap();
    assert_eq!(processor.get_modifiable_text(), "x < y");

    assert!(processor.next_token());
    assert!(processor.next_token());
    assert!(processor.set_modifiable_text("a --> b").is_err());
    processor.set_modifiable_text("changed").unwrap();

    assert_eq!(
        processor.get_updated_html().unwrap(),
        "<p>x &lt; y</p><!--changed-->"
    );
}

#[test]
fn test_emptied_text_does_not_swallow_the_next_token() {
    let mut processor = TagProcessor::new("<p>gone</p><b>x</b>");
    assert!(processor.next_token());
    assert!(processor.next_token());
    assert_eq!(processor.get_token_type(), Some(TokenType::Text));
    processor.set_modifiable_text("").unwrap();
    assert_eq!(processor.get_updated_html().unwrap(), "<p></p><b>x</b>");
    assert_eq!(processor.get_token_type(), None);

    let mut rest = Vec::new();
    while processor.next_token() {
        rest.push(describe(&processor));
    }
    assert_eq!(rest, ["/P", "B", "#text", "/B"]);
    assert!(processor.get_last_error().is_none());
}

#[test]
fn test_edited_text_stays_current_after_update() {
    let mut processor = TagProcessor::new("<p>old</p>");
    assert!(processor.next_token());
    assert!(processor.next_token());
    processor.set_modifiable_text("new").unwrap();
    assert_eq!(processor.get_updated_html().unwrap(), "<p>new</p>");
    assert_eq!(processor.get_modifiable_text(), "new");
    assert!(processor.next_token());
    assert_eq!(describe(&processor), "/P");
}

#[test]
fn test_script_text_cannot_close_its_element() {
    let mut processor = TagProcessor::new("<script>a()</script>");
    assert!(processor.next_token());
    assert!(processor.next_token());
    assert!(processor.set_modifiable_text("</script><b>").is_err());
    processor.set_modifiable_text("b()").unwrap();
    assert_eq!(
        processor.get_updated_html().unwrap(),
        "<script>b()</script>"
    );
}

#[test]
fn test_bookmarks_and_seek() {
    let mut processor = TagProcessor::new("<ul><li>One</li><li>Two</li></ul>");
    let li = TagQuery::new().tag_name("li");
    assert!(processor.next_tag(Some(&li)));
    processor.set_bookmark("first").unwrap();
    assert!(processor.has_bookmark("first"));

    assert!(processor.next_tag(Some(&li)));
    assert!(processor.next_token());
    assert_eq!(processor.get_modifiable_text(), "Two");

    processor.seek("first").unwrap();
    assert!(processor.next_token());
    assert_eq!(processor.get_tag(), Some("LI"));
    assert!(processor.next_token());
    assert_eq!(processor.get_modifiable_text(), "One");

    assert!(processor.release_bookmark("first"));
    assert!(!processor.release_bookmark("first"));
    assert_eq!(
        processor.seek("first"),
        Err(HtmlError::InvalidBookmark("first".to_string()))
    );
}

#[test]
fn test_bookmarks_follow_edits() {
    let mut processor = TagProcessor::new("<ul><li>One</li></ul>");
    assert!(processor.next_tag(None));
    processor.set_attribute("class", "list").unwrap();
    assert!(processor.next_tag(None));
    processor.set_bookmark("item").unwrap();

    // Flushes the class edit, which moves the `LI`.
    assert!(processor.next_token());
    let spans = processor.bookmark_spans();
    let (name, span) = spans[0];
    assert_eq!(name, "item");
    assert_eq!(span.slice(processor.html_bytes()), b"<li>");

    processor.seek("item").unwrap();
    assert!(processor.next_token());
    assert_eq!(processor.get_tag(), Some("LI"));
}

#[test]
fn test_removed_content_invalidates_bookmark() {
    let mut processor = TagProcessor::new("<p>gone</p>");
    assert!(processor.next_token());
    assert!(processor.next_token());
    processor.set_bookmark("text").unwrap();
    processor.set_modifiable_text("").unwrap();

    assert!(processor.next_token());
    assert!(!processor.has_bookmark("text"));
    assert!(matches!(
        processor.seek("text"),
        Err(HtmlError::InvalidBookmark(_))
    ));
}

#[test]
fn test_bookmark_limits() {
    let mut processor = TagProcessor::new("<p>");
    assert!(processor.set_bookmark("early").is_err());
    assert!(processor.next_token());

    for index in 0..MAX_BOOKMARKS {
        processor.set_bookmark(&format!("mark-{index}")).unwrap();
    }
    assert!(processor.set_bookmark("one-too-many").is_err());
    // Replacing a live bookmark is still allowed.
    processor.set_bookmark("mark-0").unwrap();
}

#[test]
fn test_unterminated_constructs_are_malformed() {
    let cases = [
        ("<p>text<div class=\"x", Malformed::UnterminatedTag, 7),
        ("<!-- open", Malformed::UnterminatedComment, 0),
        ("a<!DOCTYPE html", Malformed::UnterminatedDoctype, 1),
        ("</%x", Malformed::UnterminatedComment, 0),
    ];
    for (html, expected, offset) in cases {
        let mut processor = TagProcessor::new(html);
        while processor.next_token() {}
        assert_eq!(
            processor.get_last_error(),
            Some(&HtmlError::MalformedInput {
                at: offset,
                reason: expected,
            }),
            "{html}"
        );
        assert!(!processor.is_complete());
        assert!(!processor.next_token());
    }

    // Tokens before the failure are still produced.
    assert_eq!(scan("<p>text<div class=\"x"), ["P", "#text"]);
}

#[test]
fn test_unsupported_markup_declarations() {
    let mut processor = TagProcessor::new("<!ELEMENT br EMPTY>");
    assert!(!processor.next_token());
    let error = processor.get_last_error().unwrap();
    assert!(error.is_terminal());
    assert_eq!(
        *error,
        HtmlError::UnsupportedMarkup {
            at: 0,
            reason: Unsupported::InvalidMarkupDeclaration,
        }
    );

    let mut processor = TagProcessor::new("<![CDATA[x]]>");
    assert!(!processor.next_token());
    assert!(matches!(
        processor.get_last_error(),
        Some(HtmlError::UnsupportedMarkup {
            reason: Unsupported::CdataOutsideForeignContent,
            ..
        })
    ));
}

#[test]
fn test_cdata_in_foreign_content() {
    let mut processor = TagProcessor::new("<![CDATA[x < y]]><script>");
    processor.set_parsing_namespace(Namespace::Svg);
    assert!(processor.next_token());
    assert_eq!(processor.get_token_type(), Some(TokenType::CdataSection));
    assert_eq!(processor.get_modifiable_text(), "x < y");

    // Outside HTML, `SCRIPT` does not switch to script data.
    assert!(processor.next_token());
    assert_eq!(processor.get_tag(), Some("SCRIPT"));
    assert!(!processor.next_token());
    assert!(processor.is_complete());
}
