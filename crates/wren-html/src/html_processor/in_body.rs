//! "in body", "in template" and the modes after `BODY`.

use super::stack::{Element, Scope};
use super::{HtmlProcessor, InsertionMode, Step, TreeToken};
use crate::elements::{self, Namespace};
use crate::error::{Result, Unsupported};

/// Start tags that close an open `P` in button scope before inserting.
const BLOCK_OPENERS: &[&str] = &[
    "ADDRESS", "ARTICLE", "ASIDE", "BLOCKQUOTE", "CENTER", "DETAILS", "DIALOG", "DIR", "DIV",
    "DL", "FIELDSET", "FIGCAPTION", "FIGURE", "FOOTER", "HEADER", "HGROUP", "MAIN", "MENU",
    "NAV", "OL", "P", "SEARCH", "SECTION", "SUMMARY", "UL",
];

/// End tags that pop to their element if it is in scope.
const BLOCK_CLOSERS: &[&str] = &[
    "ADDRESS", "ARTICLE", "ASIDE", "BLOCKQUOTE", "BUTTON", "CENTER", "DETAILS", "DIALOG", "DIR",
    "DIV", "DL", "FIELDSET", "FIGCAPTION", "FIGURE", "FOOTER", "HEADER", "HGROUP", "LISTING",
    "MAIN", "MENU", "NAV", "OL", "PRE", "SEARCH", "SECTION", "SUMMARY", "UL",
];

const HEADINGS: &[&str] = &["H1", "H2", "H3", "H4", "H5", "H6"];

impl HtmlProcessor {
    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    pub(crate) fn step_in_body(&mut self, token: &TreeToken) -> Result<Step> {
        match token {
            // "Any other character token"
            // "Reconstruct the active formatting elements, if any."
            // "Insert the token's character."
            TreeToken::Text => {
                self.reconstruct_active_formatting_elements();
                Ok(Step::Yield)
            }

            // "A comment token"
            // "Insert a comment."
            TreeToken::Comment | TreeToken::Cdata => Ok(Step::Yield),

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            TreeToken::Doctype | TreeToken::Nothing => Ok(Step::Ignore),

            TreeToken::StartTag { name, self_closing } => {
                self.in_body_start_tag(name, *self_closing, token)
            }

            TreeToken::EndTag { name } => self.in_body_end_tag(name, token),
        }
    }

    fn in_body_start_tag(
        &mut self,
        name: &str,
        self_closing: bool,
        token: &TreeToken,
    ) -> Result<Step> {
        match name {
            // "A start tag whose tag name is "html""
            // "Parse error." Attributes are merged onto the existing element,
            // which has no effect on the breadcrumbs.
            // "A start tag whose tag name is "body""
            // "Parse error."
            "HTML" | "BODY" => Ok(Step::Ignore),

            // "A start tag whose tag name is one of: "base", "basefont",
            // "bgsound", "link", "meta", "noframes", "script", "style",
            // "template", "title""
            // "Process the token using the rules for the "in head" insertion
            // mode."
            "BASE" | "BASEFONT" | "BGSOUND" | "LINK" | "META" | "NOFRAMES" | "SCRIPT" | "STYLE"
            | "TEMPLATE" | "TITLE" => self.step_in_head(token),

            "FRAMESET" => Err(self.unsupported(Unsupported::Frameset)),

            // "If the stack of open elements has a p element in button scope,
            // then close a p element."
            // "Insert an HTML element for the token."
            _ if BLOCK_OPENERS.contains(&name) => {
                self.close_p_in_button_scope();
                let _ = self.insert_html_element(name);
                Ok(Step::Yield)
            }

            // "If the current node is an HTML element whose tag name is one
            // of "h1", "h2", "h3", "h4", "h5", or "h6", then this is a parse
            // error; pop the current node off the stack of open elements."
            _ if HEADINGS.contains(&name) => {
                self.close_p_in_button_scope();
                if self
                    .stack
                    .current()
                    .is_some_and(|node| node.is_one_of(HEADINGS))
                {
                    let _ = self.stack.pop();
                }
                let _ = self.insert_html_element(name);
                Ok(Step::Yield)
            }

            // "A start tag whose tag name is one of: "pre", "listing""
            // The newline that may follow is dropped by the tokenizer.
            "PRE" | "LISTING" => {
                self.close_p_in_button_scope();
                let _ = self.insert_html_element(name);
                Ok(Step::Yield)
            }

            // "A start tag whose tag name is "form""
            // "If the form element pointer is not null, and there is no
            // template element on the stack of open elements, then this is a
            // parse error; ignore the token."
            "FORM" => {
                let in_template = self.stack.contains_named("TEMPLATE");
                if self.form.is_some() && !in_template {
                    return Ok(Step::Ignore);
                }
                self.close_p_in_button_scope();
                let form = self.insert_html_element("FORM");
                if !in_template {
                    self.form = Some(form.id);
                }
                Ok(Step::Yield)
            }

            "LI" => {
                self.close_list_item(&["LI"]);
                self.close_p_in_button_scope();
                let _ = self.insert_html_element("LI");
                Ok(Step::Yield)
            }

            "DD" | "DT" => {
                self.close_list_item(&["DD", "DT"]);
                self.close_p_in_button_scope();
                let _ = self.insert_html_element(name);
                Ok(Step::Yield)
            }

            // "A start tag whose tag name is "plaintext""
            // Nothing closes it; the tokenizer reads the rest of the document
            // as its text.
            "PLAINTEXT" => {
                self.close_p_in_button_scope();
                let _ = self.insert_html_element("PLAINTEXT");
                Ok(Step::Yield)
            }

            // "A start tag whose tag name is "button""
            // "If the stack of open elements has a button element in scope,
            // then run these substeps: Parse error. Generate implied end
            // tags. Pop elements from the stack of open elements until a
            // button element has been popped from the stack."
            "BUTTON" => {
                if self.stack.has_in_scope("BUTTON", Scope::Default) {
                    self.generate_implied_end_tags(None);
                    let _ = self.stack.pop_until("BUTTON");
                }
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element("BUTTON");
                Ok(Step::Yield)
            }

            // "A start tag whose tag name is "a""
            // "If the list of active formatting elements contains an a
            // element between the end of the list and the last marker on the
            // list (or the start of the list if there is no marker on the
            // list), then this is a parse error; run the adoption agency
            // algorithm for the token, then remove that element from the
            // list of active formatting elements and the stack of open
            // elements if the adoption agency algorithm didn't already
            // remove it."
            "A" => {
                if let Some((_, previous)) = self.formatting.last_named("A") {
                    let previous = previous.id;
                    let _ = self.run_adoption_agency("A")?;
                    self.tail = None;
                    self.formatting.remove(previous);
                    let _ = self.stack.remove(previous);
                }
                self.reconstruct_active_formatting_elements();
                self.insert_formatting_element("A");
                Ok(Step::Yield)
            }

            // "A start tag whose tag name is "nobr""
            // "If the stack of open elements has a nobr element in scope,
            // then this is a parse error; run the adoption agency algorithm
            // for the token, then once again reconstruct the active
            // formatting elements, if any."
            "NOBR" => {
                self.reconstruct_active_formatting_elements();
                if self.stack.has_in_scope("NOBR", Scope::Default) {
                    let _ = self.run_adoption_agency("NOBR")?;
                    self.tail = None;
                    self.reconstruct_active_formatting_elements();
                }
                self.insert_formatting_element("NOBR");
                Ok(Step::Yield)
            }

            // "A start tag whose tag name is one of: "b", "big", "code",
            // "em", "font", "i", "s", "small", "strike", "strong", "tt", "u""
            // "Reconstruct the active formatting elements, if any."
            // "Insert an HTML element for the token. Push onto the list of
            // active formatting elements that element."
            _ if elements::is_formatting(name) => {
                self.reconstruct_active_formatting_elements();
                self.insert_formatting_element(name);
                Ok(Step::Yield)
            }

            // "A start tag whose tag name is one of: "applet", "marquee",
            // "object""
            // "Insert a marker at the end of the list of active formatting
            // elements."
            "APPLET" | "MARQUEE" | "OBJECT" => {
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(name);
                self.formatting.insert_marker();
                Ok(Step::Yield)
            }

            // "A start tag whose tag name is "table""
            // "If the Document is not set to quirks mode, and the stack of
            // open elements has a p element in button scope, then close a p
            // element."
            "TABLE" => {
                if !self.quirks {
                    self.close_p_in_button_scope();
                }
                let _ = self.insert_html_element("TABLE");
                self.mode = InsertionMode::InTable;
                Ok(Step::Yield)
            }

            // "A start tag whose tag name is one of: "area", "br", "embed",
            // "img", "keygen", "wbr""
            // "A start tag whose tag name is "input""
            // "Reconstruct the active formatting elements, if any."
            // "Insert an HTML element for the token. Immediately pop the
            // current node off the stack of open elements."
            "AREA" | "BR" | "EMBED" | "IMG" | "KEYGEN" | "WBR" | "INPUT" => {
                self.reconstruct_active_formatting_elements();
                self.insert_void_element(name);
                Ok(Step::Yield)
            }

            // "A start tag whose tag name is "image""
            // "Parse error. Change the token's tag name to "img" and
            // reprocess it."
            "IMAGE" => {
                self.reconstruct_active_formatting_elements();
                self.insert_void_element("IMG");
                Ok(Step::Yield)
            }

            // "A start tag whose tag name is one of: "param", "source",
            // "track""
            "PARAM" | "SOURCE" | "TRACK" => {
                self.insert_void_element(name);
                Ok(Step::Yield)
            }

            // "A start tag whose tag name is "hr""
            "HR" => {
                self.close_p_in_button_scope();
                self.insert_void_element("HR");
                Ok(Step::Yield)
            }

            // "A start tag whose tag name is "textarea""
            // "Switch the tokenizer to the RCDATA state."
            "TEXTAREA" => {
                self.insert_text_element("TEXTAREA");
                Ok(Step::Yield)
            }

            // "A start tag whose tag name is "xmp""
            // "If the stack of open elements has a p element in button scope,
            // then close a p element."
            // "Reconstruct the active formatting elements, if any."
            // "Follow the generic raw text element parsing algorithm."
            "XMP" => {
                self.close_p_in_button_scope();
                self.reconstruct_active_formatting_elements();
                self.insert_text_element("XMP");
                Ok(Step::Yield)
            }

            // "A start tag whose tag name is "iframe""
            // "A start tag whose tag name is "noembed""
            // "A start tag whose tag name is "noscript", if the scripting
            // flag is enabled"
            // "Follow the generic raw text element parsing algorithm."
            "IFRAME" | "NOEMBED" | "NOSCRIPT" => {
                self.insert_text_element(name);
                Ok(Step::Yield)
            }

            // "A start tag whose tag name is "select""
            // `SELECT` content stays in this mode.
            "SELECT" => {
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element("SELECT");
                Ok(Step::Yield)
            }

            // "A start tag whose tag name is one of: "optgroup", "option""
            // "If the current node is an option element, then pop the current
            // node off the stack of open elements."
            "OPTGROUP" | "OPTION" => {
                if self.stack.current_is("OPTION") {
                    let _ = self.stack.pop();
                }
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(name);
                Ok(Step::Yield)
            }

            // "A start tag whose tag name is one of: "rb", "rtc""
            // "If the stack of open elements has a ruby element in scope,
            // then generate implied end tags."
            "RB" | "RTC" => {
                if self.stack.has_in_scope("RUBY", Scope::Default) {
                    self.generate_implied_end_tags(None);
                }
                let _ = self.insert_html_element(name);
                Ok(Step::Yield)
            }

            // "A start tag whose tag name is one of: "rp", "rt""
            // "If the stack of open elements has a ruby element in scope,
            // then generate implied end tags, except for rtc elements."
            "RP" | "RT" => {
                if self.stack.has_in_scope("RUBY", Scope::Default) {
                    self.generate_implied_end_tags(Some("RTC"));
                }
                let _ = self.insert_html_element(name);
                Ok(Step::Yield)
            }

            // "A start tag whose tag name is "math""
            // "A start tag whose tag name is "svg""
            // "Reconstruct the active formatting elements, if any."
            // "Insert a foreign element for the token, with MathML namespace
            // [or the SVG namespace] and false."
            // "If the token has its self-closing flag set, pop the current
            // node off the stack of open elements and acknowledge the token's
            // self-closing flag."
            "MATH" | "SVG" => {
                self.reconstruct_active_formatting_elements();
                let namespace = if name == "MATH" {
                    Namespace::MathMl
                } else {
                    Namespace::Svg
                };
                self.insert_foreign_element(name, namespace, self_closing);
                Ok(Step::Yield)
            }

            // "A start tag whose tag name is one of: "caption", "col",
            // "colgroup", "frame", "head", "tbody", "td", "tfoot", "th",
            // "thead", "tr""
            // "Parse error. Ignore the token."
            "CAPTION" | "COL" | "COLGROUP" | "FRAME" | "HEAD" | "TBODY" | "TD" | "TFOOT" | "TH"
            | "THEAD" | "TR" => Ok(Step::Ignore),

            // "Any other start tag"
            // "Reconstruct the active formatting elements, if any."
            // "Insert an HTML element for the token."
            _ => {
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(name);
                Ok(Step::Yield)
            }
        }
    }

    fn in_body_end_tag(&mut self, name: &str, token: &TreeToken) -> Result<Step> {
        match name {
            "TEMPLATE" => Ok(self.close_template()),

            // "An end tag whose tag name is "body""
            // "If the stack of open elements does not have a body element in
            // scope, this is a parse error; ignore the token."
            // "Switch the insertion mode to "after body"."
            "BODY" => {
                if !self.stack.has_in_scope("BODY", Scope::Default) {
                    return Ok(Step::Ignore);
                }
                self.mode = InsertionMode::AfterBody;
                Ok(Step::Yield)
            }

            // "An end tag whose tag name is "html""
            // "Switch the insertion mode to "after body"."
            // "Reprocess the token."
            "HTML" => {
                if !self.stack.has_in_scope("BODY", Scope::Default) {
                    return Ok(Step::Ignore);
                }
                self.reprocess_in(InsertionMode::AfterBody, token)
            }

            // "If the stack of open elements does not have an element in scope
            // that is an HTML element with the same tag name as that of the
            // token, then this is a parse error; ignore the token."
            // "Generate implied end tags."
            // "Pop elements from the stack of open elements until an HTML
            // element with the same tag name as the token has been popped
            // from the stack."
            _ if BLOCK_CLOSERS.contains(&name) => {
                if !self.stack.has_in_scope(name, Scope::Default) {
                    return Ok(Step::Ignore);
                }
                self.generate_implied_end_tags(None);
                self.tail = self.stack.pop_until(name);
                Ok(Step::Yield)
            }

            // "An end tag whose tag name is "form""
            "FORM" => Ok(self.close_form()),

            // "An end tag whose tag name is "p""
            // "If the stack of open elements does not have a p element in
            // button scope, then this is a parse error; insert an HTML
            // element for a "p" start tag token with no attributes."
            // "Close a p element."
            "P" => {
                if !self.stack.has_in_scope("P", Scope::Button) {
                    let _ = self.insert_implied_element("P");
                }
                self.tail = self.close_p_element();
                Ok(Step::Yield)
            }

            // "An end tag whose tag name is "li""
            // "If the stack of open elements does not have an li element in
            // list item scope, then this is a parse error; ignore the token."
            "LI" => {
                if !self.stack.has_in_scope("LI", Scope::ListItem) {
                    return Ok(Step::Ignore);
                }
                self.generate_implied_end_tags(Some("LI"));
                self.tail = self.stack.pop_until("LI");
                Ok(Step::Yield)
            }

            "DD" | "DT" => {
                if !self.stack.has_in_scope(name, Scope::Default) {
                    return Ok(Step::Ignore);
                }
                self.generate_implied_end_tags(Some(name));
                self.tail = self.stack.pop_until(name);
                Ok(Step::Yield)
            }

            // "An end tag whose tag name is one of: "h1", "h2", "h3", "h4",
            // "h5", "h6""
            // "If the stack of open elements does not have an element in
            // scope that is an HTML element and whose tag name is one of
            // "h1", "h2", "h3", "h4", "h5", or "h6", then this is a parse
            // error; ignore the token."
            _ if HEADINGS.contains(&name) => {
                if !self.stack.has_any_in_scope(HEADINGS, Scope::Default) {
                    return Ok(Step::Ignore);
                }
                self.generate_implied_end_tags(None);
                self.tail = self.stack.pop_until_one_of(HEADINGS);
                Ok(Step::Yield)
            }

            // "An end tag whose tag name is one of: "a", "b", "big", "code",
            // "em", "font", "i", "nobr", "s", "small", "strike", "strong",
            // "tt", "u""
            // "Run the adoption agency algorithm for the token."
            _ if elements::is_formatting(name) => self.run_adoption_agency(name),

            // "An end tag token whose tag name is one of: "applet",
            // "marquee", "object""
            // "Clear the list of active formatting elements up to the last
            // marker."
            "APPLET" | "MARQUEE" | "OBJECT" => {
                if !self.stack.has_in_scope(name, Scope::Default) {
                    return Ok(Step::Ignore);
                }
                self.generate_implied_end_tags(None);
                self.tail = self.stack.pop_until(name);
                self.formatting.clear_to_last_marker();
                Ok(Step::Yield)
            }

            // "An end tag whose tag name is "br""
            // "Parse error. Drop the attributes from the token, and act as
            // described in the next entry; i.e. act as if this was a "br"
            // start tag token with no attributes, rather than the end tag
            // token that it actually is."
            "BR" => {
                self.reconstruct_active_formatting_elements();
                self.insert_void_element("BR");
                Ok(Step::Yield)
            }

            _ => Ok(self.any_other_end_tag(name)),
        }
    }

    /// The `LI`, `DD` and `DT` start tag loop.
    ///
    /// STEP 1: "Initialize node to be the current node (the bottommost node
    ///          of the stack)."
    /// STEP 2: "Loop: If node is an li element, then run these substeps:
    ///          Generate implied end tags, except for li elements. Pop
    ///          elements from the stack of open elements until an li element
    ///          has been popped from the stack."
    /// STEP 3: "If node is in the special category, but is not an address,
    ///          div, or p element, then jump to the step labeled done below."
    /// STEP 4: "Otherwise, set node to the previous entry in the stack of
    ///          open elements and return to the step labeled loop."
    fn close_list_item(&mut self, names: &[&str]) {
        let mut found = None;
        for node in self.stack.unprotected().iter().rev() {
            if node.is_one_of(names) {
                found = Some(node.name.clone());
                break;
            }
            if node.is_special() && !node.is_one_of(&["ADDRESS", "DIV", "P"]) {
                break;
            }
        }
        if let Some(name) = found {
            self.generate_implied_end_tags(Some(&name));
            let _ = self.stack.pop_until(&name);
        }
    }

    /// "An end tag whose tag name is "form""
    fn close_form(&mut self) -> Step {
        if self.stack.contains_named("TEMPLATE") {
            // "If the stack of open elements does not have a form element in
            // scope, then this is a parse error; return and ignore the
            // token."
            if !self.stack.has_in_scope("FORM", Scope::Default) {
                return Step::Ignore;
            }
            self.generate_implied_end_tags(None);
            self.tail = self.stack.pop_until("FORM");
            return Step::Yield;
        }

        // "Let node be the element that the form element pointer is set to,
        // or null if it is not set to an element."
        // "Set the form element pointer to null."
        // "If node is null or if the stack of open elements does not have
        // node in scope, then this is a parse error; return and ignore the
        // token."
        let Some(node) = self.form.take() else {
            return Step::Ignore;
        };
        if !self.stack.has_node_in_scope(node, Scope::Default) {
            return Step::Ignore;
        }

        // "Generate implied end tags."
        // "Remove node from the stack of open elements."
        self.generate_implied_end_tags(None);
        self.tail = self.stack.remove(node);
        Step::Yield
    }

    /// [§ 13.2.6.4.7 "in body" - Any other end tag](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    ///
    /// STEP 1: "Initialize node to be the current node (the bottommost node
    ///          of the stack)."
    /// STEP 2: "Loop: If node is an HTML element with the same tag name as
    ///          the token, then: Generate implied end tags, except for HTML
    ///          elements with the same tag name as the token. ... Pop all
    ///          the nodes from the current node up to node, including node,
    ///          then stop these steps."
    /// STEP 3: "Otherwise, if node is in the special category, then this is
    ///          a parse error; ignore the token, and return."
    /// STEP 4: "Set node to the previous entry in the stack of open elements."
    pub(crate) fn any_other_end_tag(&mut self, name: &str) -> Step {
        let floor = self.stack.floor();
        for index in (floor..self.stack.len()).rev() {
            let Some(node) = self.stack.get(index) else {
                continue;
            };
            if node.is(name) {
                // Implied end tags are all above `node`, so `index` stays put.
                self.generate_implied_end_tags(Some(name));
                self.tail = self.stack.pop_through(index);
                return Step::Yield;
            }
            if node.is_special() {
                return Step::Ignore;
            }
        }
        Step::Ignore
    }

    /// [§ 13.2.6.4.7 The adoption agency algorithm](https://html.spec.whatwg.org/multipage/parsing.html#adoption-agency-algorithm)
    ///
    /// Only the cases that leave the tree shaped like the tags are handled.
    /// A misnested formatting element with a furthest block would need
    /// nodes moved around, which is [`Unsupported::AdoptionAgency`].
    pub(crate) fn run_adoption_agency(&mut self, subject: &str) -> Result<Step> {
        // STEP 2: "If the current node is an HTML element whose tag name is
        //          subject, and the current node is not in the list of active
        //          formatting elements, then pop the current node off the
        //          stack of open elements and return."
        if let Some(current) = self.stack.current()
            && current.is(subject)
            && !self.formatting.contains(current.id)
        {
            self.tail = self.stack.pop();
            return Ok(Step::Yield);
        }

        // STEP 4.3: "Let formattingElement be the last element in the list
        //            of active formatting elements that: is between the end
        //            of the list and the last marker in the list, if any, or
        //            the start of the list otherwise, and has the tag name
        //            subject."
        //            "If there is no such element, then return and instead
        //            act as described in the "any other end tag" entry above."
        let Some((_, element)) = self.formatting.last_named(subject) else {
            return Ok(self.any_other_end_tag(subject));
        };
        let element = element.clone();

        // STEP 4.4: "If formattingElement is not in the stack of open
        //            elements, then this is a parse error; remove the element
        //            from the list, and return."
        let Some(index) = self.stack.position(element.id) else {
            self.formatting.remove(element.id);
            return Ok(Step::Ignore);
        };

        // STEP 4.5: "If formattingElement is in the stack of open elements,
        //            but the element is not in scope, then this is a parse
        //            error; return."
        if !self.stack.has_node_in_scope(element.id, Scope::Default) {
            return Ok(Step::Ignore);
        }

        // STEP 4.7: "Let furthestBlock be the topmost node in the stack of
        //            open elements that is lower in the stack than
        //            formattingElement, and is an element in the special
        //            category. There might not be one."
        let has_furthest_block = self.stack.iter().skip(index + 1).any(Element::is_special);
        if has_furthest_block {
            return Err(self.unsupported(Unsupported::AdoptionAgency));
        }

        // STEP 4.8: "If there is no furthestBlock, then the UA must first pop
        //            all the nodes from the bottom of the stack of open
        //            elements, from the current node up to and including
        //            formattingElement, then remove formattingElement from
        //            the list of active formatting elements, and finally
        //            return."
        self.tail = self.stack.pop_through(index);
        self.formatting.remove(element.id);
        Ok(Step::Yield)
    }

    /// [§ 13.2.6.4.18 The "in template" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intemplate)
    pub(crate) fn step_in_template(&mut self, token: &TreeToken) -> Result<Step> {
        match token {
            // "A character token; A comment token; A DOCTYPE token"
            // "Process the token using the rules for the "in body" insertion
            // mode."
            TreeToken::Text | TreeToken::Comment | TreeToken::Cdata | TreeToken::Doctype => {
                self.step_in_body(token)
            }

            TreeToken::StartTag { name, .. } => match name.as_str() {
                "BASE" | "BASEFONT" | "BGSOUND" | "LINK" | "META" | "NOFRAMES" | "SCRIPT"
                | "STYLE" | "TEMPLATE" | "TITLE" => self.step_in_head(token),

                // "A start tag whose tag name is one of: "caption",
                // "colgroup", "tbody", "tfoot", "thead""
                // "A start tag whose tag name is "col""
                // "A start tag whose tag name is "tr""
                // "A start tag whose tag name is one of: "td", "th""
                "CAPTION" | "COLGROUP" | "TBODY" | "TFOOT" | "THEAD" | "COL" | "TR" | "TD"
                | "TH" => Err(self.unsupported(Unsupported::TemplateContents)),

                // "Any other start tag"
                // "Pop the current template insertion mode off the stack of
                // template insertion modes."
                // "Push "in body" onto the stack of template insertion modes
                // so that it is the new current template insertion mode."
                // "Switch the insertion mode to "in body", and reprocess the
                // token."
                _ => {
                    let _ = self.template_modes.pop();
                    self.template_modes.push(InsertionMode::InBody);
                    self.reprocess_in(InsertionMode::InBody, token)
                }
            },

            TreeToken::EndTag { name } if name == "TEMPLATE" => self.step_in_head(token),

            // "Any other end tag"
            // "Parse error. Ignore the token."
            TreeToken::EndTag { .. } | TreeToken::Nothing => Ok(Step::Ignore),
        }
    }

    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    pub(crate) fn step_after_body(&mut self, token: &TreeToken) -> Result<Step> {
        match token {
            TreeToken::Text if self.is_whitespace_text() => self.step_in_body(token),

            // "A comment token"
            // "Insert a comment as the last child of the first element in
            // the stack of open elements (the html element)."
            TreeToken::Comment | TreeToken::Cdata => {
                self.parent_depth = Some(1);
                Ok(Step::Yield)
            }

            TreeToken::Doctype => Ok(Step::Ignore),

            TreeToken::StartTag { name, .. } if name == "HTML" => self.step_in_body(token),

            // "An end tag whose tag name is "html""
            // "If the parser was created as part of the HTML fragment parsing
            // algorithm, this is a parse error; ignore the token."
            // "Otherwise, switch the insertion mode to "after after body"."
            TreeToken::EndTag { name } if name == "HTML" => {
                if self.context.is_some() {
                    return Ok(Step::Ignore);
                }
                self.mode = InsertionMode::AfterAfterBody;
                Ok(Step::Yield)
            }

            // "Anything else"
            // "Parse error. Switch the insertion mode to "in body" and
            // reprocess the token."
            _ => self.reprocess_in(InsertionMode::InBody, token),
        }
    }

    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    pub(crate) fn step_after_after_body(&mut self, token: &TreeToken) -> Result<Step> {
        match token {
            // "A comment token"
            // "Insert a comment as the last child of the Document object."
            TreeToken::Comment | TreeToken::Cdata => {
                self.parent_depth = Some(0);
                Ok(Step::Yield)
            }

            // "A DOCTYPE token; A character token that is one of U+0009
            // CHARACTER TABULATION, U+000A LINE FEED (LF), U+000C FORM FEED
            // (FF), U+000D CARRIAGE RETURN (CR), or U+0020 SPACE; A start tag
            // whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion
            // mode."
            TreeToken::Doctype => self.step_in_body(token),
            TreeToken::Text if self.is_whitespace_text() => self.step_in_body(token),
            TreeToken::StartTag { name, .. } if name == "HTML" => self.step_in_body(token),

            // "Anything else"
            // "Parse error. Switch the insertion mode to "in body" and
            // reprocess the token."
            _ => self.reprocess_in(InsertionMode::InBody, token),
        }
    }
}
