//! Integration tests for the HTML processor.

use wren_html::{
    HtmlError, HtmlProcessor, InsertionMode, Malformed, Namespace, TagQuery, TokenType,
    Unsupported,
};

/// Describe the current token as `DIV`, `/DIV`, `#text`, ...
fn describe(processor: &HtmlProcessor) -> String {
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

/// Helper to walk a processor and record each token with its breadcrumbs
fn walk(processor: &mut HtmlProcessor) -> Vec<(String, String)> {
    let mut tokens = Vec::new();
    while processor.next_token() {
        tokens.push((describe(processor), processor.get_breadcrumbs().join(" ")));
    }
    tokens
}

fn fragment(html: &str) -> Vec<(String, String)> {
    walk(&mut HtmlProcessor::create_fragment(html))
}

fn names(tokens: &[(String, String)]) -> Vec<&str> {
    tokens.iter().map(|(name, _)| name.as_str()).collect()
}

/// The breadcrumbs recorded for the first token described as `name`.
fn crumbs_of<'a>(tokens: &'a [(String, String)], name: &str) -> &'a str {
    tokens
        .iter()
        .find(|(token, _)| token == name)
        .map(|(_, crumbs)| crumbs.as_str())
        .unwrap_or_else(|| panic!("no {name} token"))
}

fn unsupported_reason(processor: &HtmlProcessor) -> Option<Unsupported> {
    match processor.get_last_error() {
        Some(HtmlError::UnsupportedMarkup { reason, .. }) => Some(*reason),
        _ => None,
    }
}

#[test]
fn test_list_items_close_implicitly() {
    let mut processor = HtmlProcessor::create_fragment("<ul><li>One<li>Two</ul>");
    let tokens = walk(&mut processor);
    let expected = [
        ("UL", "HTML BODY UL"),
        ("LI", "HTML BODY UL LI"),
        ("#text", "HTML BODY UL LI"),
        ("LI", "HTML BODY UL LI"),
        ("#text", "HTML BODY UL LI"),
        ("/UL", "HTML BODY UL"),
    ];
    let actual: Vec<(&str, &str)> = tokens
        .iter()
        .map(|(name, crumbs)| (name.as_str(), crumbs.as_str()))
        .collect();
    assert_eq!(actual, expected);
    assert!(processor.get_last_error().is_none());
    assert!(processor.is_complete());
}

#[test]
fn test_stray_closers_are_skipped() {
    let html = "<div class=start>I </3 when <img> outflow <br class=end> inflow</div></li></ul>";
    let mut processor = HtmlProcessor::create_fragment(html);
    let tokens = walk(&mut processor);
    assert_eq!(
        names(&tokens),
        ["DIV", "#text", "IMG", "#text", "BR", "#text", "/DIV"]
    );
    assert_eq!(crumbs_of(&tokens, "IMG"), "HTML BODY DIV IMG");
    assert_eq!(crumbs_of(&tokens, "BR"), "HTML BODY DIV BR");
    assert!(processor.get_last_error().is_none());
}

#[test]
fn test_unclosed_elements_are_reported_at_the_end() {
    let html = "<p>A</p><p>B";
    let mut processor = HtmlProcessor::create_fragment(html);
    let tokens = walk(&mut processor);
    assert_eq!(names(&tokens), ["P", "#text", "/P", "P", "#text"]);
    assert_eq!(
        processor.get_last_error(),
        Some(&HtmlError::MalformedInput {
            at: html.len(),
            reason: Malformed::UnclosedElements,
        })
    );
    assert!(!processor.is_complete());
    assert!(!processor.next_token());
}

#[test]
fn test_blocks_close_paragraphs() {
    let tokens = fragment("<p>one<div>two</div>");
    assert_eq!(names(&tokens), ["P", "#text", "DIV", "#text", "/DIV"]);
    assert_eq!(crumbs_of(&tokens, "DIV"), "HTML BODY DIV");
    assert_eq!(crumbs_of(&tokens, "/DIV"), "HTML BODY DIV");
}

#[test]
fn test_headings_replace_open_headings() {
    let tokens = fragment("<h1>a<h2>b</h1>");
    assert_eq!(crumbs_of(&tokens, "H2"), "HTML BODY H2");
    assert_eq!(crumbs_of(&tokens, "/H1"), "HTML BODY H2");
}

#[test]
fn test_formatting_elements_are_reconstructed() {
    let mut processor = HtmlProcessor::create_fragment("<p><b>x<p>y</b></p>");
    let tokens = walk(&mut processor);
    assert_eq!(
        names(&tokens),
        ["P", "B", "#text", "P", "#text", "/B", "/P"]
    );
    assert_eq!(tokens[3].1, "HTML BODY P");
    // The `B` closed by the second paragraph is reopened for its text.
    assert_eq!(tokens[4].1, "HTML BODY P B");
    assert_eq!(tokens[5].1, "HTML BODY P B");
    assert!(processor.get_last_error().is_none());
}

#[test]
fn test_nested_anchors_close_the_outer_anchor() {
    let mut processor = HtmlProcessor::create_fragment("<a href=1>x<a href=2>y</a>");
    let tokens = walk(&mut processor);
    assert_eq!(names(&tokens), ["A", "#text", "A", "#text", "/A"]);
    assert_eq!(tokens[2].1, "HTML BODY A");
    assert!(processor.get_last_error().is_none());
}

#[test]
fn test_misnested_formatting_with_block_is_unsupported() {
    let mut processor = HtmlProcessor::create_fragment("<b><p>x</b>");
    let tokens = walk(&mut processor);
    assert_eq!(names(&tokens), ["B", "P", "#text"]);
    assert_eq!(
        processor.get_last_error(),
        Some(&HtmlError::UnsupportedMarkup {
            at: 7,
            reason: Unsupported::AdoptionAgency,
        })
    );
    assert!(processor.get_breadcrumbs().is_empty());
}

#[test]
fn test_tables() {
    let mut processor =
        HtmlProcessor::create_fragment("<table>\n<tr><td>x</td></tr></table><p>after</p>");
    let tokens = walk(&mut processor);
    assert_eq!(
        names(&tokens),
        ["TABLE", "#text", "TR", "TD", "#text", "/TD", "/TR", "/TABLE", "P", "#text", "/P"]
    );
    assert_eq!(crumbs_of(&tokens, "TR"), "HTML BODY TABLE TBODY TR");
    assert_eq!(crumbs_of(&tokens, "TD"), "HTML BODY TABLE TBODY TR TD");
    assert_eq!(tokens[4].1, "HTML BODY TABLE TBODY TR TD");
    assert_eq!(crumbs_of(&tokens, "/TR"), "HTML BODY TABLE TBODY TR");
    assert_eq!(crumbs_of(&tokens, "/TABLE"), "HTML BODY TABLE");
    assert_eq!(crumbs_of(&tokens, "P"), "HTML BODY P");
    assert!(processor.get_last_error().is_none());
    assert_eq!(processor.get_insertion_mode(), InsertionMode::InBody);
}

#[test]
fn test_table_cells_close_each_other() {
    let tokens = fragment("<table><tr><td>a<td>b<tr><th>c</table>");
    assert_eq!(
        names(&tokens),
        ["TABLE", "TR", "TD", "#text", "TD", "#text", "TR", "TH", "#text", "/TABLE"]
    );
    assert_eq!(tokens[4].1, "HTML BODY TABLE TBODY TR TD");
    assert_eq!(tokens[6].1, "HTML BODY TABLE TBODY TR");
    assert_eq!(tokens[7].1, "HTML BODY TABLE TBODY TR TH");
}

#[test]
fn test_captions_and_column_groups() {
    let tokens = fragment("<table><caption>c</caption><colgroup><col></colgroup></table>");
    assert_eq!(crumbs_of(&tokens, "CAPTION"), "HTML BODY TABLE CAPTION");
    assert_eq!(crumbs_of(&tokens, "/CAPTION"), "HTML BODY TABLE CAPTION");
    assert_eq!(crumbs_of(&tokens, "COL"), "HTML BODY TABLE COLGROUP COL");
    assert_eq!(crumbs_of(&tokens, "/COLGROUP"), "HTML BODY TABLE COLGROUP");
}

#[test]
fn test_misplaced_table_content_is_unsupported() {
    for html in ["<table>oops</table>", "<table><div>x</div></table>", "<table></p>"] {
        let mut processor = HtmlProcessor::create_fragment(html);
        while processor.next_token() {}
        assert_eq!(
            unsupported_reason(&processor),
            Some(Unsupported::FosterParenting),
            "{html}"
        );
    }

    // Hidden inputs stay in the table.
    let mut processor =
        HtmlProcessor::create_fragment(r#"<table><input type="hidden"></table>"#);
    let tokens = walk(&mut processor);
    assert_eq!(crumbs_of(&tokens, "INPUT"), "HTML BODY TABLE INPUT");
    assert!(processor.get_last_error().is_none());
}

#[test]
fn test_void_and_self_closing_elements() {
    let mut processor = HtmlProcessor::create_fragment("<div><img src=a><span/>x</span></div>");
    assert!(processor.next_tag(Some(&TagQuery::new().tag_name("img"))));
    assert_eq!(processor.get_breadcrumbs(), ["HTML", "BODY", "DIV", "IMG"]);
    assert!(!processor.expects_closer());

    // HTML elements ignore the self-closing flag.
    assert!(processor.next_tag(None));
    assert!(processor.has_self_closing_flag());
    assert!(processor.expects_closer());
    assert!(processor.next_token());
    assert_eq!(processor.get_breadcrumbs(), ["HTML", "BODY", "DIV", "SPAN"]);
    assert!(HtmlProcessor::is_void("img"));
}

#[test]
fn test_image_is_reported_as_img() {
    let mut processor = HtmlProcessor::create_fragment("<image src=x>");
    assert!(processor.next_token());
    assert_eq!(processor.get_tag(), Some("IMG"));
    assert_eq!(processor.get_token_name().as_deref(), Some("IMG"));
    assert_eq!(processor.get_breadcrumbs(), ["HTML", "BODY", "IMG"]);
}

#[test]
fn test_image_matches_img_queries() {
    let mut processor = HtmlProcessor::create_fragment("<p><image src=x></p>");
    assert!(processor.next_tag(Some(&TagQuery::new().tag_name("img"))));
    assert_eq!(processor.get_breadcrumbs(), ["HTML", "BODY", "P", "IMG"]);

    let mut processor = HtmlProcessor::create_fragment("<image src=x>");
    assert!(!processor.next_tag(Some(&TagQuery::new().tag_name("image"))));
}

#[test]
fn test_svg_content() {
    let html = r#"<svg viewbox="0 0 1 1"><foreignObject><div>x</div></foreignObject><rect/></svg>"#;
    let mut processor = HtmlProcessor::create_fragment(html);

    assert!(processor.next_token());
    assert_eq!(processor.get_namespace(), Namespace::Svg);
    assert_eq!(processor.get_qualified_tag_name().as_deref(), Some("svg"));
    assert_eq!(
        processor.get_qualified_attribute_name("VIEWBOX").as_deref(),
        Some("viewBox")
    );

    assert!(processor.next_token());
    assert_eq!(processor.get_tag(), Some("FOREIGNOBJECT"));
    assert_eq!(
        processor.get_qualified_tag_name().as_deref(),
        Some("foreignObject")
    );

    assert!(processor.next_token());
    assert_eq!(processor.get_namespace(), Namespace::Html);
    assert_eq!(
        processor.get_breadcrumbs(),
        ["HTML", "BODY", "SVG", "FOREIGNOBJECT", "DIV"]
    );

    let rect = TagQuery::new().tag_name("rect");
    assert!(processor.next_tag(Some(&rect)));
    assert_eq!(processor.get_breadcrumbs(), ["HTML", "BODY", "SVG", "RECT"]);
    assert!(!processor.expects_closer());

    assert!(processor.next_token());
    assert!(processor.is_tag_closer());
    assert_eq!(processor.get_breadcrumbs(), ["HTML", "BODY", "SVG"]);
    assert!(!processor.next_token());
    assert!(processor.get_last_error().is_none());
}

#[test]
fn test_cdata_inside_svg() {
    let mut processor = HtmlProcessor::create_fragment("<svg><![CDATA[a<b]]></svg>");
    let tokens = walk(&mut processor);
    assert_eq!(names(&tokens), ["SVG", "#cdata-section", "/SVG"]);
    assert!(processor.get_last_error().is_none());

    let mut processor = HtmlProcessor::create_fragment("<div><![CDATA[a]]></div>");
    while processor.next_token() {}
    assert_eq!(
        unsupported_reason(&processor),
        Some(Unsupported::CdataOutsideForeignContent)
    );
}

#[test]
fn test_html_breaks_out_of_foreign_content() {
    let tokens = fragment("<svg><circle><p>x</p>");
    assert_eq!(crumbs_of(&tokens, "P"), "HTML BODY P");
}

#[test]
fn test_mathml_names() {
    let mut processor = HtmlProcessor::create_fragment("<math><mi>x</mi></math>");
    assert!(processor.next_tag(Some(&TagQuery::new().tag_name("mi"))));
    assert_eq!(processor.get_namespace(), Namespace::MathMl);
    assert_eq!(processor.get_qualified_tag_name().as_deref(), Some("mi"));
    assert_eq!(processor.get_breadcrumbs(), ["HTML", "BODY", "MATH", "MI"]);
}

#[test]
fn test_full_document() {
    let html = "<!DOCTYPE html><html><head><title>T</title></head>\n<body><p>Hi</p></body></html>";
    let mut processor = HtmlProcessor::create_full_parser(html);
    let tokens = walk(&mut processor);

    assert_eq!(tokens[0], ("#doctype".to_string(), String::new()));
    assert_eq!(crumbs_of(&tokens, "HTML"), "HTML");
    assert_eq!(crumbs_of(&tokens, "#text"), "HTML HEAD TITLE");
    assert_eq!(crumbs_of(&tokens, "/HEAD"), "HTML HEAD");
    assert_eq!(crumbs_of(&tokens, "BODY"), "HTML BODY");
    assert_eq!(crumbs_of(&tokens, "P"), "HTML BODY P");
    assert!(processor.get_last_error().is_none());
    assert!(processor.is_complete());
    assert_eq!(
        processor.get_insertion_mode(),
        InsertionMode::AfterAfterBody
    );
}

#[test]
fn test_comments_after_the_body() {
    let html = "<p>Hi</p></body><!--one--></html><!--two-->";
    let mut processor = HtmlProcessor::create_full_parser(html);
    let tokens = walk(&mut processor);
    let comments: Vec<&str> = tokens
        .iter()
        .filter(|(name, _)| name == "#comment")
        .map(|(_, crumbs)| crumbs.as_str())
        .collect();
    assert_eq!(comments, ["HTML", ""]);
    assert!(processor.get_last_error().is_none());
}

#[test]
fn test_implied_document_structure() {
    let mut processor = HtmlProcessor::create_full_parser("<title>T</title><p>Hi</p>");
    let tokens = walk(&mut processor);
    assert_eq!(crumbs_of(&tokens, "TITLE"), "HTML HEAD TITLE");
    assert_eq!(crumbs_of(&tokens, "P"), "HTML BODY P");
    assert!(processor.get_last_error().is_none());
}

#[test]
fn test_head_elements_after_head() {
    let html = "<html><head></head><script>x</script><body>";
    let tokens = walk(&mut HtmlProcessor::create_full_parser(html));
    assert_eq!(crumbs_of(&tokens, "SCRIPT"), "HTML HEAD SCRIPT");
    assert_eq!(crumbs_of(&tokens, "/SCRIPT"), "HTML HEAD SCRIPT");
    assert_eq!(crumbs_of(&tokens, "BODY"), "HTML BODY");
}

#[test]
fn test_doctype_quirks_change_table_nesting() {
    let quirky = TagQuery::new().tag_name("table");
    let mut processor = HtmlProcessor::create_full_parser("<p><table>");
    assert!(processor.next_tag(Some(&quirky)));
    assert_eq!(processor.get_breadcrumbs(), ["HTML", "BODY", "P", "TABLE"]);

    let mut processor = HtmlProcessor::create_full_parser("<!DOCTYPE html><p><table>");
    assert!(processor.next_tag(Some(&quirky)));
    assert_eq!(processor.get_breadcrumbs(), ["HTML", "BODY", "TABLE"]);
}

#[test]
fn test_framesets_are_unsupported() {
    let mut processor = HtmlProcessor::create_full_parser("<frameset></frameset>");
    while processor.next_token() {}
    assert_eq!(unsupported_reason(&processor), Some(Unsupported::Frameset));
}

#[test]
fn test_templates() {
    let mut processor = HtmlProcessor::create_fragment("<template><p>x</p></template>");
    let tokens = walk(&mut processor);
    assert_eq!(crumbs_of(&tokens, "P"), "HTML BODY TEMPLATE P");
    assert_eq!(crumbs_of(&tokens, "/TEMPLATE"), "HTML BODY TEMPLATE");
    assert!(processor.get_last_error().is_none());

    let mut processor = HtmlProcessor::create_fragment("<template><tr>");
    while processor.next_token() {}
    assert_eq!(
        unsupported_reason(&processor),
        Some(Unsupported::TemplateContents)
    );
}

#[test]
fn test_text_elements_in_body() {
    let mut processor = HtmlProcessor::create_fragment("<textarea>\n<b>x</textarea><b>y</b>");
    let tokens = walk(&mut processor);
    assert_eq!(
        names(&tokens),
        ["TEXTAREA", "#text", "/TEXTAREA", "B", "#text", "/B"]
    );
    assert_eq!(tokens[1].1, "HTML BODY TEXTAREA");
    assert!(processor.get_last_error().is_none());
}

#[test]
fn test_plaintext_is_not_reported_unclosed() {
    let mut processor = HtmlProcessor::create_fragment("<plaintext><p>x");
    let tokens = walk(&mut processor);
    assert_eq!(names(&tokens), ["PLAINTEXT", "#text"]);
    assert!(processor.get_last_error().is_none());
    assert!(processor.is_complete());
}

#[test]
fn test_ignored_tokens_are_skipped() {
    let tokens = fragment("<body><p>x</p></li><!DOCTYPE html>");
    assert_eq!(names(&tokens), ["P", "#text", "/P"]);
}

#[test]
fn test_fragment_contexts() {
    let mut processor =
        HtmlProcessor::create_fragment_with_context("<span>x</span>", "<div>").unwrap();
    assert!(processor.next_token());
    assert_eq!(processor.get_breadcrumbs(), ["HTML", "DIV", "SPAN"]);
    assert_eq!(processor.get_current_depth(), 3);

    for context in ["td", "<textarea>", "svg", "br", ""] {
        let error = HtmlProcessor::create_fragment_with_context("x", context).unwrap_err();
        assert_eq!(
            error,
            HtmlError::UnsupportedMarkup {
                at: 0,
                reason: Unsupported::FragmentContext,
            },
            "{context}"
        );
    }
}

#[test]
fn test_breadcrumb_queries() {
    let html = "<div><img><p><img></p></div>";
    let mut processor = HtmlProcessor::create_fragment(html);
    let query = TagQuery::new().tag_name("img").breadcrumbs(&["P", "IMG"]);
    assert!(processor.next_tag(Some(&query)));
    assert_eq!(processor.get_current_depth(), 5);
    assert!(processor.matches_breadcrumbs(&["div", "*", "img"]));
    assert!(!processor.matches_breadcrumbs(&["BODY", "IMG"]));
    assert!(!processor.next_tag(Some(&query)));
}

#[test]
fn test_seek_replays_the_tree() {
    let html = "<div><p>one</p><p>two</p></div>";
    let mut processor = HtmlProcessor::create_fragment(html);
    let paragraph = TagQuery::new().tag_name("p");
    assert!(processor.next_tag(Some(&paragraph)));
    processor.set_bookmark("first").unwrap();
    assert!(processor.next_tag(Some(&paragraph)));

    processor.seek("first").unwrap();
    assert!(processor.next_token());
    assert_eq!(processor.get_tag(), Some("P"));
    assert_eq!(processor.get_breadcrumbs(), ["HTML", "BODY", "DIV", "P"]);
    assert!(processor.next_token());
    assert_eq!(processor.get_modifiable_text(), "one");

    assert!(matches!(
        processor.seek("missing"),
        Err(HtmlError::InvalidBookmark(_))
    ));
}

#[test]
fn test_edits_through_the_processor() {
    let mut processor = HtmlProcessor::create_fragment("<ul><li>a</ul>");
    assert!(processor.next_tag(Some(&TagQuery::new().tag_name("li"))));
    processor.add_class("x").unwrap();
    assert!(processor.has_class("x").unwrap());
    while processor.next_token() {}
    assert!(processor.get_last_error().is_none());
    assert_eq!(
        processor.get_updated_html().unwrap(),
        r#"<ul><li class="x">a</ul>"#
    );
}

#[test]
fn test_emptied_text_keeps_the_tree_in_step() {
    let mut processor = HtmlProcessor::create_fragment("<div><p>gone</p><b>x</b></div>");
    while processor.next_token() {
        if processor.get_token_type() == Some(TokenType::Text) {
            break;
        }
    }
    processor.set_modifiable_text("").unwrap();
    assert_eq!(
        processor.get_updated_html().unwrap(),
        "<div><p></p><b>x</b></div>"
    );

    assert!(processor.next_token());
    assert_eq!(describe(&processor), "/P");
    assert!(processor.next_tag(Some(&TagQuery::new().tag_name("b"))));
    assert_eq!(processor.get_breadcrumbs(), ["HTML", "BODY", "DIV", "B"]);
    while processor.next_token() {}
    assert!(processor.get_last_error().is_none());
}
