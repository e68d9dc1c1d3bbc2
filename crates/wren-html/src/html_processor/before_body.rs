//! The insertion modes before `BODY`, plus "text".

use super::{HtmlProcessor, InsertionMode, Step, TreeToken};
use crate::error::{Result, Unsupported};

/// Public identifiers that put a document in quirks mode, lowercase.
///
/// [§ 13.2.6.4.1](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
/// lists every prefix; the prefixes still seen in real documents are kept.
const QUIRKY_PUBLIC_PREFIXES: &[&str] = &[
    "-//ietf//dtd html",
    "-//w3c//dtd html 3",
    "-//w3c//dtd html 4.0 frameset//",
    "-//w3c//dtd html 4.0 transitional//",
    "-//w3c//dtd w3 html//",
    "-//w3o//dtd w3 html 3.0//",
    "-//netscape comm. corp.//dtd html//",
    "-//microsoft//dtd internet explorer",
    "-//softquad//",
    "-//spyglass//dtd html 2.0 extended//",
];

/// "Public identifiers that, without a system identifier, also trigger
/// quirks mode."
const QUIRKY_WITHOUT_SYSTEM: &[&str] = &[
    "-//w3c//dtd html 4.01 frameset//",
    "-//w3c//dtd html 4.01 transitional//",
];

/// Whether the contents of a DOCTYPE (everything after `<!DOCTYPE`) put the
/// document in quirks mode.
pub(crate) fn doctype_forces_quirks(contents: &str) -> bool {
    let contents = contents.trim_start_matches(|ch: char| ch.is_ascii_whitespace());
    let name_end = contents
        .find(|ch: char| ch.is_ascii_whitespace())
        .unwrap_or(contents.len());
    let (name, rest) = contents.split_at(name_end);
    if !name.eq_ignore_ascii_case("html") {
        return true;
    }

    let mut identifiers = rest.split(['"', '\'']).skip(1).step_by(2);
    let keyword = rest.trim_start().get(..6).map(str::to_ascii_uppercase);
    if keyword.as_deref() != Some("PUBLIC") {
        return false;
    }
    let Some(public) = identifiers.next().map(str::to_ascii_lowercase) else {
        return false;
    };
    let has_system = identifiers.next().is_some();

    public == "html"
        || public == "-/w3c/dtd html 4.0 transitional/en"
        || QUIRKY_PUBLIC_PREFIXES
            .iter()
            .any(|prefix| public.starts_with(prefix))
        || (!has_system
            && QUIRKY_WITHOUT_SYSTEM
                .iter()
                .any(|prefix| public.starts_with(prefix)))
}

impl HtmlProcessor {
    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    pub(crate) fn step_initial(&mut self, token: &TreeToken) -> Result<Step> {
        match token {
            // "A character token that is one of U+0009 CHARACTER TABULATION,
            // U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            // RETURN (CR), or U+0020 SPACE"
            // "Ignore the token."
            TreeToken::Text if self.is_whitespace_text() => Ok(Step::Ignore),

            // "A comment token"
            // "Insert a comment as the last child of the Document object."
            TreeToken::Comment | TreeToken::Cdata => Ok(Step::Yield),

            // "A DOCTYPE token"
            // "Then, switch the insertion mode to "before html"."
            TreeToken::Doctype => {
                self.quirks = doctype_forces_quirks(&self.tags.get_modifiable_text());
                self.mode = InsertionMode::BeforeHtml;
                Ok(Step::Yield)
            }

            // "Anything else"
            // "If the document is not an iframe srcdoc document, then this
            // is a parse error; ... set the Document to quirks mode."
            // "In any case, switch the insertion mode to "before html", then
            // reprocess the token."
            _ => {
                self.quirks = true;
                self.reprocess_in(InsertionMode::BeforeHtml, token)
            }
        }
    }

    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    pub(crate) fn step_before_html(&mut self, token: &TreeToken) -> Result<Step> {
        match token {
            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            TreeToken::Doctype => Ok(Step::Ignore),

            // "A comment token"
            // "Insert a comment as the last child of the Document object."
            TreeToken::Comment | TreeToken::Cdata => Ok(Step::Yield),

            TreeToken::Text if self.is_whitespace_text() => Ok(Step::Ignore),

            // "A start tag whose tag name is "html""
            // "Create an element for the token in the HTML namespace, with
            // the Document as the intended parent. Append it to the Document
            // object. Put this element in the stack of open elements."
            // "Switch the insertion mode to "before head"."
            TreeToken::StartTag { name, .. } if name == "HTML" => {
                let _ = self.insert_html_element("HTML");
                self.stack.protect_all();
                self.mode = InsertionMode::BeforeHead;
                Ok(Step::Yield)
            }

            // "An end tag whose tag name is one of: "head", "body", "html",
            // "br""
            // "Act as described in the "anything else" entry below."
            //
            // "Any other end tag"
            // "Parse error. Ignore the token."
            TreeToken::EndTag { name }
                if !matches!(name.as_str(), "HEAD" | "BODY" | "HTML" | "BR") =>
            {
                Ok(Step::Ignore)
            }

            // "Anything else"
            // "Create an html element whose node document is the Document
            // object. Append it to the Document object. Put this element in
            // the stack of open elements."
            // "Switch the insertion mode to "before head", then reprocess
            // the token."
            _ => {
                let _ = self.insert_implied_element("HTML");
                self.stack.protect_all();
                self.reprocess_in(InsertionMode::BeforeHead, token)
            }
        }
    }

    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    pub(crate) fn step_before_head(&mut self, token: &TreeToken) -> Result<Step> {
        match token {
            TreeToken::Text if self.is_whitespace_text() => Ok(Step::Ignore),

            // "A comment token"
            // "Insert a comment."
            TreeToken::Comment | TreeToken::Cdata => Ok(Step::Yield),

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            TreeToken::Doctype => Ok(Step::Ignore),

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion
            // mode."
            TreeToken::StartTag { name, .. } if name == "HTML" => self.step_in_body(token),

            // "A start tag whose tag name is "head""
            // "Insert an HTML element for the token."
            // "Set the head element pointer to the newly created head
            // element."
            // "Switch the insertion mode to "in head"."
            TreeToken::StartTag { name, .. } if name == "HEAD" => {
                self.head = Some(self.insert_html_element("HEAD"));
                self.mode = InsertionMode::InHead;
                Ok(Step::Yield)
            }

            // "Any other end tag"
            // "Parse error. Ignore the token."
            TreeToken::EndTag { name }
                if !matches!(name.as_str(), "HEAD" | "BODY" | "HTML" | "BR") =>
            {
                Ok(Step::Ignore)
            }

            // "Anything else"
            // "Insert an HTML element for a "head" start tag token with no
            // attributes."
            // "Set the head element pointer to the newly created head
            // element."
            // "Switch the insertion mode to "in head"."
            // "Reprocess the current token."
            _ => {
                self.head = Some(self.insert_implied_element("HEAD"));
                self.reprocess_in(InsertionMode::InHead, token)
            }
        }
    }

    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    pub(crate) fn step_in_head(&mut self, token: &TreeToken) -> Result<Step> {
        match token {
            // "Insert the character."
            TreeToken::Text if self.is_whitespace_text() => Ok(Step::Yield),

            // "A comment token"
            // "Insert a comment."
            TreeToken::Comment | TreeToken::Cdata => Ok(Step::Yield),

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            TreeToken::Doctype => Ok(Step::Ignore),

            TreeToken::StartTag { name, .. } => match name.as_str() {
                "HTML" => self.step_in_body(token),

                // "A start tag whose tag name is one of: "base", "basefont",
                // "bgsound", "link""
                // "Insert an HTML element for the token. Immediately pop the
                // current node off the stack of open elements."
                "BASE" | "BASEFONT" | "BGSOUND" | "LINK" | "META" => {
                    self.insert_void_element(name);
                    Ok(Step::Yield)
                }

                // "A start tag whose tag name is "title""
                // "Follow the generic RCDATA element parsing algorithm."
                //
                // "A start tag whose tag name is "noscript", if the scripting
                // flag is enabled"
                // "A start tag whose tag name is one of: "noframes", "style""
                // "Follow the generic raw text element parsing algorithm."
                //
                // "A start tag whose tag name is "script""
                // "Switch the tokenizer to the script data state."
                "TITLE" | "NOSCRIPT" | "NOFRAMES" | "STYLE" | "SCRIPT" => {
                    self.insert_text_element(name);
                    Ok(Step::Yield)
                }

                // "A start tag whose tag name is "template""
                "TEMPLATE" => {
                    self.open_template();
                    Ok(Step::Yield)
                }

                // "A start tag whose tag name is "head""
                // "Parse error. Ignore the token."
                "HEAD" => Ok(Step::Ignore),

                _ => self.in_head_anything_else(token),
            },

            TreeToken::EndTag { name } => match name.as_str() {
                // "An end tag whose tag name is "head""
                // "Pop the current node (which will be the head element) off
                // the stack of open elements."
                // "Switch the insertion mode to "after head"."
                "HEAD" => {
                    self.tail = self.stack.pop();
                    self.mode = InsertionMode::AfterHead;
                    Ok(Step::Yield)
                }

                "TEMPLATE" => Ok(self.close_template()),

                // "An end tag whose tag name is one of: "body", "html", "br""
                // "Act as described in the "anything else" entry below."
                "BODY" | "HTML" | "BR" => self.in_head_anything_else(token),

                // "Any other end tag"
                // "Parse error. Ignore the token."
                _ => Ok(Step::Ignore),
            },

            _ => self.in_head_anything_else(token),
        }
    }

    /// "Pop the current node (which will be the head element) off the stack
    /// of open elements."
    /// "Switch the insertion mode to "after head"."
    /// "Reprocess the token."
    fn in_head_anything_else(&mut self, token: &TreeToken) -> Result<Step> {
        let _ = self.stack.pop();
        self.reprocess_in(InsertionMode::AfterHead, token)
    }

    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    pub(crate) fn step_after_head(&mut self, token: &TreeToken) -> Result<Step> {
        match token {
            TreeToken::Text if self.is_whitespace_text() => Ok(Step::Yield),
            TreeToken::Comment | TreeToken::Cdata => Ok(Step::Yield),
            TreeToken::Doctype => Ok(Step::Ignore),

            TreeToken::StartTag { name, .. } => match name.as_str() {
                "HTML" => self.step_in_body(token),

                // "A start tag whose tag name is "body""
                // "Insert an HTML element for the token."
                // "Set the frameset-ok flag to "not ok"."
                // "Switch the insertion mode to "in body"."
                "BODY" => {
                    let _ = self.insert_html_element("BODY");
                    self.mode = InsertionMode::InBody;
                    Ok(Step::Yield)
                }

                "FRAMESET" => Err(self.unsupported(Unsupported::Frameset)),

                // "A start tag whose tag name is one of: "base", "basefont",
                // "bgsound", "link", "meta", "noframes", "script", "style",
                // "template", "title""
                // "Parse error."
                // "Push the node pointed to by the head element pointer onto
                // the stack of open elements."
                // "Process the token using the rules for the "in head"
                // insertion mode."
                // "Remove the node pointed to by the head element pointer
                // from the stack of open elements."
                "BASE" | "BASEFONT" | "BGSOUND" | "LINK" | "META" | "NOFRAMES" | "SCRIPT"
                | "STYLE" | "TEMPLATE" | "TITLE" => {
                    if let Some(head) = self.head.clone() {
                        self.stack.push(head);
                        self.head_reinserted = true;
                    }
                    self.step_in_head(token)
                }

                // "A start tag whose tag name is "head""
                // "Parse error. Ignore the token."
                "HEAD" => Ok(Step::Ignore),

                _ => self.after_head_anything_else(token),
            },

            TreeToken::EndTag { name } => match name.as_str() {
                "TEMPLATE" => self.step_in_head(token),
                "BODY" | "HTML" | "BR" => self.after_head_anything_else(token),
                _ => Ok(Step::Ignore),
            },

            _ => self.after_head_anything_else(token),
        }
    }

    /// "Insert an HTML element for a "body" start tag token with no
    /// attributes."
    /// "Switch the insertion mode to "in body"."
    /// "Reprocess the current token."
    fn after_head_anything_else(&mut self, token: &TreeToken) -> Result<Step> {
        let _ = self.insert_implied_element("BODY");
        self.reprocess_in(InsertionMode::InBody, token)
    }

    /// Take the `HEAD` element pushed back by "after head" off the stack
    /// once the element inserted into it has been yielded.
    pub(crate) fn drop_reinserted_head(&mut self) {
        if !self.head_reinserted || self.mode == InsertionMode::Text {
            return;
        }
        self.head_reinserted = false;
        if let Some(head) = &self.head {
            let _ = self.stack.remove(head.id);
        }
    }

    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    pub(crate) fn step_text(&mut self, token: &TreeToken) -> Step {
        match token {
            // "A character token"
            // "Insert the token's character."
            TreeToken::Text => Step::Yield,

            // "Any other end tag"
            // "Pop the current node off the stack of open elements."
            // "Switch the insertion mode to the original insertion mode."
            TreeToken::EndTag { .. } => {
                self.tail = self.stack.pop();
                self.mode = self.original_mode.take().unwrap_or(InsertionMode::InBody);
                Step::Yield
            }

            // The tokenizer yields nothing else before the closer.
            _ => Step::Ignore,
        }
    }

    /// "A start tag whose tag name is "template""
    ///
    /// "Insert an HTML element for the token."
    /// "Insert a marker at the end of the list of active formatting
    /// elements."
    /// "Switch the insertion mode to "in template"."
    /// "Push "in template" onto the stack of template insertion modes so
    /// that it is the new current template insertion mode."
    pub(crate) fn open_template(&mut self) {
        let _ = self.insert_html_element("TEMPLATE");
        self.formatting.insert_marker();
        self.mode = InsertionMode::InTemplate;
        self.template_modes.push(InsertionMode::InTemplate);
    }

    /// "An end tag whose tag name is "template""
    pub(crate) fn close_template(&mut self) -> Step {
        // "If there is no template element on the stack of open elements,
        // then this is a parse error; ignore the token."
        if !self.stack.contains_named("TEMPLATE") {
            return Step::Ignore;
        }

        // "Generate all implied end tags thoroughly."
        self.generate_all_implied_end_tags();

        // "Pop elements from the stack of open elements until a template
        // element has been popped from the stack."
        self.tail = self.stack.pop_until("TEMPLATE");

        // "Clear the list of active formatting elements up to the last
        // marker."
        self.formatting.clear_to_last_marker();

        // "Pop the current template insertion mode off the stack of
        // template insertion modes."
        let _ = self.template_modes.pop();

        // "Reset the insertion mode appropriately."
        self.reset_insertion_mode();
        Step::Yield
    }
}
