//! The table insertion modes.
//!
//! Well-formed tables are tracked exactly. Content the tree builder would
//! foster-parent out of the table is refused with
//! [`Unsupported::FosterParenting`].

use super::stack::{Element, Scope};
use super::{HtmlProcessor, InsertionMode, Step, TreeToken};
use crate::error::{Result, Unsupported};

/// "clear the stack back to a table context"
const TABLE_CONTEXT: &[&str] = &["TABLE", "TEMPLATE", "HTML"];
/// "clear the stack back to a table body context"
const TABLE_BODY_CONTEXT: &[&str] = &["TBODY", "TFOOT", "THEAD", "TEMPLATE", "HTML"];
/// "clear the stack back to a table row context"
const TABLE_ROW_CONTEXT: &[&str] = &["TR", "TEMPLATE", "HTML"];

const TABLE_SECTIONS: &[&str] = &["TBODY", "TFOOT", "THEAD"];

const TABLE_STRUCTURE: &[&str] = &[
    "CAPTION", "COL", "COLGROUP", "TBODY", "TD", "TFOOT", "TH", "THEAD", "TR",
];

impl HtmlProcessor {
    /// [§ 13.2.6.4.9 The "in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
    pub(crate) fn step_in_table(&mut self, token: &TreeToken) -> Result<Step> {
        match token {
            // "A character token, if the current node is table, tbody,
            // template, tfoot, thead, or tr element"
            // Whitespace is inserted in place; anything else would be
            // foster-parented.
            TreeToken::Text => {
                let in_table_node = self.stack.current().is_some_and(|node| {
                    node.is_one_of(&["TABLE", "TBODY", "TEMPLATE", "TFOOT", "THEAD", "TR"])
                });
                if in_table_node && self.is_whitespace_text() {
                    Ok(Step::Yield)
                } else {
                    Err(self.unsupported(Unsupported::FosterParenting))
                }
            }

            // "A comment token"
            // "Insert a comment."
            TreeToken::Comment | TreeToken::Cdata => Ok(Step::Yield),

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            TreeToken::Doctype | TreeToken::Nothing => Ok(Step::Ignore),

            TreeToken::StartTag { name, .. } => match name.as_str() {
                // "A start tag whose tag name is "caption""
                // "Clear the stack back to a table context."
                // "Insert a marker at the end of the list of active formatting
                // elements."
                // "Insert an HTML element for the token, then switch the
                // insertion mode to "in caption"."
                "CAPTION" => {
                    self.stack.clear_back_to(TABLE_CONTEXT);
                    self.formatting.insert_marker();
                    let _ = self.insert_html_element("CAPTION");
                    self.mode = InsertionMode::InCaption;
                    Ok(Step::Yield)
                }

                // "A start tag whose tag name is "colgroup""
                "COLGROUP" => {
                    self.stack.clear_back_to(TABLE_CONTEXT);
                    let _ = self.insert_html_element("COLGROUP");
                    self.mode = InsertionMode::InColumnGroup;
                    Ok(Step::Yield)
                }

                // "A start tag whose tag name is "col""
                // "Insert an HTML element for a "colgroup" start tag token
                // with no attributes, then switch the insertion mode to "in
                // column group"."
                // "Reprocess the current token."
                "COL" => {
                    self.stack.clear_back_to(TABLE_CONTEXT);
                    let _ = self.insert_implied_element("COLGROUP");
                    self.reprocess_in(InsertionMode::InColumnGroup, token)
                }

                // "A start tag whose tag name is one of: "tbody", "tfoot",
                // "thead""
                "TBODY" | "TFOOT" | "THEAD" => {
                    self.stack.clear_back_to(TABLE_CONTEXT);
                    let _ = self.insert_html_element(name);
                    self.mode = InsertionMode::InTableBody;
                    Ok(Step::Yield)
                }

                // "A start tag whose tag name is one of: "td", "th", "tr""
                // "Insert an HTML element for a "tbody" start tag token with
                // no attributes, then switch the insertion mode to "in table
                // body"."
                // "Reprocess the current token."
                "TD" | "TH" | "TR" => {
                    self.stack.clear_back_to(TABLE_CONTEXT);
                    let _ = self.insert_implied_element("TBODY");
                    self.reprocess_in(InsertionMode::InTableBody, token)
                }

                // "A start tag whose tag name is "table""
                // "Parse error."
                // "If the stack of open elements does not have a table element
                // in table scope, ignore the token."
                // "Otherwise: Pop elements from this stack until a table
                // element has been popped from the stack. Reset the insertion
                // mode appropriately. Reprocess the token."
                "TABLE" => {
                    if !self.stack.has_in_scope("TABLE", Scope::Table) {
                        return Ok(Step::Ignore);
                    }
                    let _ = self.stack.pop_until("TABLE");
                    self.reset_insertion_mode();
                    self.dispatch(token)
                }

                // "A start tag whose tag name is one of: "style", "script",
                // "template""
                // "Process the token using the rules for the "in head"
                // insertion mode."
                "STYLE" | "SCRIPT" | "TEMPLATE" => self.step_in_head(token),

                // "A start tag whose tag name is "input""
                // "If the token does not have an attribute with the name
                // "type", or if it does, but that attribute's value is not an
                // ASCII case-insensitive match for the string "hidden", then:
                // act as described in the "anything else" entry below."
                "INPUT" if self.attribute_is("type", &["hidden"]) => {
                    self.insert_void_element("INPUT");
                    Ok(Step::Yield)
                }

                // "A start tag whose tag name is "form""
                // "If there is a template element on the stack of open
                // elements, or if the form element pointer is not null,
                // ignore the token."
                // "Otherwise: Insert an HTML element for the token, and set
                // the form element pointer to point to the element created."
                // "Pop that form element off the stack of open elements."
                "FORM" => {
                    if self.form.is_some() || self.stack.contains_named("TEMPLATE") {
                        return Ok(Step::Ignore);
                    }
                    let form = self.insert_html_element("FORM");
                    self.form = Some(form.id);
                    self.tail = self.stack.pop();
                    Ok(Step::Yield)
                }

                // "Anything else"
                // "Parse error. Enable foster parenting, process the token
                // using the rules for the "in body" insertion mode, and then
                // disable foster parenting."
                _ => Err(self.unsupported(Unsupported::FosterParenting)),
            },

            TreeToken::EndTag { name } => match name.as_str() {
                // "An end tag whose tag name is "table""
                // "If the stack of open elements does not have a table element
                // in table scope, this is a parse error; ignore the token."
                // "Otherwise: Pop elements from this stack until a table
                // element has been popped from the stack. Reset the insertion
                // mode appropriately."
                "TABLE" => {
                    if !self.stack.has_in_scope("TABLE", Scope::Table) {
                        return Ok(Step::Ignore);
                    }
                    self.tail = self.stack.pop_until("TABLE");
                    self.reset_insertion_mode();
                    Ok(Step::Yield)
                }

                // "An end tag whose tag name is one of: "body", "caption",
                // "col", "colgroup", "html", "tbody", "td", "tfoot", "th",
                // "thead", "tr""
                // "Parse error. Ignore the token."
                "BODY" | "CAPTION" | "COL" | "COLGROUP" | "HTML" | "TBODY" | "TD" | "TFOOT"
                | "TH" | "THEAD" | "TR" => Ok(Step::Ignore),

                "TEMPLATE" => self.step_in_head(token),

                // These insert an element, which would be foster-parented.
                "P" | "BR" => Err(self.unsupported(Unsupported::FosterParenting)),

                // Other end tags only pop elements, which foster parenting
                // does not affect.
                _ => self.step_in_body(token),
            },
        }
    }

    /// [§ 13.2.6.4.11 The "in caption" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incaption)
    pub(crate) fn step_in_caption(&mut self, token: &TreeToken) -> Result<Step> {
        match token {
            // "An end tag whose tag name is "caption""
            TreeToken::EndTag { name } if name == "CAPTION" => {
                if !self.stack.has_in_scope("CAPTION", Scope::Table) {
                    return Ok(Step::Ignore);
                }
                self.tail = self.close_caption();
                Ok(Step::Yield)
            }

            // "A start tag whose tag name is one of: "caption", "col",
            // "colgroup", "tbody", "td", "tfoot", "th", "thead", "tr""
            // "An end tag whose tag name is "table""
            // "If the stack of open elements does not have a caption element
            // in table scope, this is a parse error; ignore the token."
            // "Otherwise: ... Switch the insertion mode to "in table".
            // Reprocess the token."
            TreeToken::StartTag { name, .. } if TABLE_STRUCTURE.contains(&name.as_str()) => {
                self.close_caption_and_reprocess(token)
            }
            TreeToken::EndTag { name } if name == "TABLE" => {
                self.close_caption_and_reprocess(token)
            }

            // "An end tag whose tag name is one of: "body", "col",
            // "colgroup", "html", "tbody", "td", "tfoot", "th", "thead", "tr""
            // "Parse error. Ignore the token."
            TreeToken::EndTag { name }
                if matches!(
                    name.as_str(),
                    "BODY" | "COL" | "COLGROUP" | "HTML" | "TBODY" | "TD" | "TFOOT" | "TH" | "THEAD"
                        | "TR"
                ) =>
            {
                Ok(Step::Ignore)
            }

            // "Anything else"
            // "Process the token using the rules for the "in body" insertion
            // mode."
            _ => self.step_in_body(token),
        }
    }

    fn close_caption_and_reprocess(&mut self, token: &TreeToken) -> Result<Step> {
        if !self.stack.has_in_scope("CAPTION", Scope::Table) {
            return Ok(Step::Ignore);
        }
        let _ = self.close_caption();
        self.dispatch(token)
    }

    /// "Generate implied end tags."
    /// "Pop elements from this stack until a caption element has been popped
    /// from the stack."
    /// "Clear the list of active formatting elements up to the last marker."
    /// "Switch the insertion mode to "in table"."
    fn close_caption(&mut self) -> Option<Element> {
        self.generate_implied_end_tags(None);
        let caption = self.stack.pop_until("CAPTION");
        self.formatting.clear_to_last_marker();
        self.mode = InsertionMode::InTable;
        caption
    }

    /// [§ 13.2.6.4.12 The "in column group" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incolumngroup)
    pub(crate) fn step_in_column_group(&mut self, token: &TreeToken) -> Result<Step> {
        match token {
            TreeToken::Text if self.is_whitespace_text() => Ok(Step::Yield),
            TreeToken::Comment | TreeToken::Cdata => Ok(Step::Yield),
            TreeToken::Doctype | TreeToken::Nothing => Ok(Step::Ignore),

            TreeToken::StartTag { name, .. } if name == "HTML" => self.step_in_body(token),

            // "A start tag whose tag name is "col""
            // "Insert an HTML element for the token. Immediately pop the
            // current node off the stack of open elements."
            TreeToken::StartTag { name, .. } if name == "COL" => {
                self.insert_void_element("COL");
                Ok(Step::Yield)
            }

            // "An end tag whose tag name is "colgroup""
            // "If the current node is not a colgroup element, then this is a
            // parse error; ignore the token."
            // "Otherwise, pop the current node from the stack of open
            // elements. Switch the insertion mode to "in table"."
            TreeToken::EndTag { name } if name == "COLGROUP" => {
                if !self.stack.current_is("COLGROUP") {
                    return Ok(Step::Ignore);
                }
                self.tail = self.stack.pop();
                self.mode = InsertionMode::InTable;
                Ok(Step::Yield)
            }

            // "An end tag whose tag name is "col""
            // "Parse error. Ignore the token."
            TreeToken::EndTag { name } if name == "COL" => Ok(Step::Ignore),

            TreeToken::StartTag { name, .. } | TreeToken::EndTag { name } if name == "TEMPLATE" => {
                self.step_in_head(token)
            }

            // "Anything else"
            // "If the current node is not a colgroup element, then this is a
            // parse error; ignore the token."
            // "Otherwise, pop the current node from the stack of open
            // elements."
            // "Switch the insertion mode to "in table"."
            // "Reprocess the token."
            _ => {
                if !self.stack.current_is("COLGROUP") {
                    return Ok(Step::Ignore);
                }
                let _ = self.stack.pop();
                self.reprocess_in(InsertionMode::InTable, token)
            }
        }
    }

    /// [§ 13.2.6.4.13 The "in table body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intablebody)
    pub(crate) fn step_in_table_body(&mut self, token: &TreeToken) -> Result<Step> {
        match token {
            TreeToken::StartTag { name, .. } => match name.as_str() {
                // "A start tag whose tag name is "tr""
                // "Clear the stack back to a table body context."
                // "Insert an HTML element for the token, then switch the
                // insertion mode to "in row"."
                "TR" => {
                    self.stack.clear_back_to(TABLE_BODY_CONTEXT);
                    let _ = self.insert_html_element("TR");
                    self.mode = InsertionMode::InRow;
                    Ok(Step::Yield)
                }

                // "A start tag whose tag name is one of: "th", "td""
                // "Parse error."
                // "Insert an HTML element for a "tr" start tag token with no
                // attributes, then switch the insertion mode to "in row"."
                // "Reprocess the current token."
                "TH" | "TD" => {
                    self.stack.clear_back_to(TABLE_BODY_CONTEXT);
                    let _ = self.insert_implied_element("TR");
                    self.reprocess_in(InsertionMode::InRow, token)
                }

                // "A start tag whose tag name is one of: "caption", "col",
                // "colgroup", "tbody", "tfoot", "thead""
                "CAPTION" | "COL" | "COLGROUP" | "TBODY" | "TFOOT" | "THEAD" => {
                    self.close_table_section_and_reprocess(token)
                }

                _ => self.step_in_table(token),
            },

            TreeToken::EndTag { name } => match name.as_str() {
                // "An end tag whose tag name is one of: "tbody", "tfoot",
                // "thead""
                // "If the stack of open elements does not have an element in
                // table scope that is an HTML element with the same tag name
                // as the token, this is a parse error; ignore the token."
                // "Otherwise: Clear the stack back to a table body context.
                // Pop the current node from the stack of open elements.
                // Switch the insertion mode to "in table"."
                "TBODY" | "TFOOT" | "THEAD" => {
                    if !self.stack.has_in_scope(name, Scope::Table) {
                        return Ok(Step::Ignore);
                    }
                    self.stack.clear_back_to(TABLE_BODY_CONTEXT);
                    self.tail = self.stack.pop();
                    self.mode = InsertionMode::InTable;
                    Ok(Step::Yield)
                }

                "TABLE" => self.close_table_section_and_reprocess(token),

                // "An end tag whose tag name is one of: "body", "caption",
                // "col", "colgroup", "html", "td", "th", "tr""
                // "Parse error. Ignore the token."
                "BODY" | "CAPTION" | "COL" | "COLGROUP" | "HTML" | "TD" | "TH" | "TR" => {
                    Ok(Step::Ignore)
                }

                _ => self.step_in_table(token),
            },

            // "Anything else"
            // "Process the token using the rules for the "in table" insertion
            // mode."
            _ => self.step_in_table(token),
        }
    }

    /// "If the stack of open elements does not have a tbody, thead, or tfoot
    /// element in table scope, this is a parse error; ignore the token."
    /// "Otherwise: Clear the stack back to a table body context. Pop the
    /// current node from the stack of open elements. Switch the insertion
    /// mode to "in table". Reprocess the token."
    fn close_table_section_and_reprocess(&mut self, token: &TreeToken) -> Result<Step> {
        if !self.stack.has_any_in_scope(TABLE_SECTIONS, Scope::Table) {
            return Ok(Step::Ignore);
        }
        self.stack.clear_back_to(TABLE_BODY_CONTEXT);
        let _ = self.stack.pop();
        self.reprocess_in(InsertionMode::InTable, token)
    }

    /// [§ 13.2.6.4.14 The "in row" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inrow)
    pub(crate) fn step_in_row(&mut self, token: &TreeToken) -> Result<Step> {
        match token {
            TreeToken::StartTag { name, .. } => match name.as_str() {
                // "A start tag whose tag name is one of: "th", "td""
                // "Clear the stack back to a table row context."
                // "Insert an HTML element for the token, then switch the
                // insertion mode to "in cell"."
                // "Insert a marker at the end of the list of active formatting
                // elements."
                "TH" | "TD" => {
                    self.stack.clear_back_to(TABLE_ROW_CONTEXT);
                    let _ = self.insert_html_element(name);
                    self.mode = InsertionMode::InCell;
                    self.formatting.insert_marker();
                    Ok(Step::Yield)
                }

                "CAPTION" | "COL" | "COLGROUP" | "TBODY" | "TFOOT" | "THEAD" | "TR" => {
                    self.close_row_and_reprocess(token)
                }

                _ => self.step_in_table(token),
            },

            TreeToken::EndTag { name } => match name.as_str() {
                // "An end tag whose tag name is "tr""
                // "If the stack of open elements does not have a tr element in
                // table scope, this is a parse error; ignore the token."
                // "Otherwise: Clear the stack back to a table row context. Pop
                // the current node (which will be a tr element) from the
                // stack of open elements. Switch the insertion mode to "in
                // table body"."
                "TR" => {
                    if !self.stack.has_in_scope("TR", Scope::Table) {
                        return Ok(Step::Ignore);
                    }
                    self.stack.clear_back_to(TABLE_ROW_CONTEXT);
                    self.tail = self.stack.pop();
                    self.mode = InsertionMode::InTableBody;
                    Ok(Step::Yield)
                }

                "TABLE" => self.close_row_and_reprocess(token),

                // "An end tag whose tag name is one of: "tbody", "tfoot",
                // "thead""
                // "If the stack of open elements does not have an element in
                // table scope that is an HTML element with the same tag name
                // as the token, this is a parse error; ignore the token."
                "TBODY" | "TFOOT" | "THEAD" => {
                    if !self.stack.has_in_scope(name, Scope::Table) {
                        return Ok(Step::Ignore);
                    }
                    self.close_row_and_reprocess(token)
                }

                "BODY" | "CAPTION" | "COL" | "COLGROUP" | "HTML" | "TD" | "TH" => {
                    Ok(Step::Ignore)
                }

                _ => self.step_in_table(token),
            },

            _ => self.step_in_table(token),
        }
    }

    /// "If the stack of open elements does not have a tr element in table
    /// scope, this is a parse error; ignore the token."
    /// "Otherwise: Clear the stack back to a table row context. Pop the
    /// current node (which will be a tr element) from the stack of open
    /// elements. Switch the insertion mode to "in table body". Reprocess the
    /// token."
    fn close_row_and_reprocess(&mut self, token: &TreeToken) -> Result<Step> {
        if !self.stack.has_in_scope("TR", Scope::Table) {
            return Ok(Step::Ignore);
        }
        self.stack.clear_back_to(TABLE_ROW_CONTEXT);
        let _ = self.stack.pop();
        self.reprocess_in(InsertionMode::InTableBody, token)
    }

    /// [§ 13.2.6.4.15 The "in cell" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incell)
    pub(crate) fn step_in_cell(&mut self, token: &TreeToken) -> Result<Step> {
        match token {
            // "An end tag whose tag name is one of: "td", "th""
            // "If the stack of open elements does not have an element in
            // table scope that is an HTML element with the same tag name as
            // that of the token, then this is a parse error; ignore the
            // token."
            TreeToken::EndTag { name } if name == "TD" || name == "TH" => {
                if !self.stack.has_in_scope(name, Scope::Table) {
                    return Ok(Step::Ignore);
                }
                // "Generate implied end tags."
                // "Pop elements from the stack of open elements until an HTML
                // element with the same tag name as the token has been popped
                // from the stack."
                // "Clear the list of active formatting elements up to the last
                // marker."
                // "Switch the insertion mode to "in row"."
                self.generate_implied_end_tags(None);
                self.tail = self.stack.pop_until(name);
                self.formatting.clear_to_last_marker();
                self.mode = InsertionMode::InRow;
                Ok(Step::Yield)
            }

            // "A start tag whose tag name is one of: "caption", "col",
            // "colgroup", "tbody", "td", "tfoot", "th", "thead", "tr""
            // "Assert: The stack of open elements has a td or th element in
            // table scope."
            // "Close the cell and reprocess the token."
            TreeToken::StartTag { name, .. } if TABLE_STRUCTURE.contains(&name.as_str()) => {
                if !self.stack.has_any_in_scope(&["TD", "TH"], Scope::Table) {
                    return Ok(Step::Ignore);
                }
                self.close_cell();
                self.dispatch(token)
            }

            // "An end tag whose tag name is one of: "body", "caption", "col",
            // "colgroup", "html""
            // "Parse error. Ignore the token."
            TreeToken::EndTag { name }
                if matches!(
                    name.as_str(),
                    "BODY" | "CAPTION" | "COL" | "COLGROUP" | "HTML"
                ) =>
            {
                Ok(Step::Ignore)
            }

            // "An end tag whose tag name is one of: "table", "tbody",
            // "tfoot", "thead", "tr""
            // "If the stack of open elements does not have an element in
            // table scope that is an HTML element with the same tag name as
            // that of the token, then this is a parse error; ignore the
            // token."
            // "Otherwise, close the cell and reprocess the token."
            TreeToken::EndTag { name }
                if matches!(name.as_str(), "TABLE" | "TBODY" | "TFOOT" | "THEAD" | "TR") =>
            {
                if !self.stack.has_in_scope(name, Scope::Table) {
                    return Ok(Step::Ignore);
                }
                self.close_cell();
                self.dispatch(token)
            }

            // "Anything else"
            // "Process the token using the rules for the "in body" insertion
            // mode."
            _ => self.step_in_body(token),
        }
    }

    /// [§ 13.2.6.4.15 Close the cell](https://html.spec.whatwg.org/multipage/parsing.html#close-the-cell)
    ///
    /// STEP 1: "Generate implied end tags."
    /// STEP 3: "Pop elements from the stack of open elements stack until a
    ///          td element or a th element has been popped from the stack."
    /// STEP 4: "Clear the list of active formatting elements up to the last
    ///          marker."
    /// STEP 5: "Switch the insertion mode to "in row"."
    fn close_cell(&mut self) {
        self.generate_implied_end_tags(None);
        let _ = self.stack.pop_until_one_of(&["TD", "TH"]);
        self.formatting.clear_to_last_marker();
        self.mode = InsertionMode::InRow;
    }
}
