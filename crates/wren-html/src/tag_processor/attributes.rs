//! Reading and queuing edits to the current tag's attributes.

use super::{EditKey, EditValue, TagProcessor};
use crate::character_reference::{ReferenceContext, decode};
use crate::edits::Edit;
use crate::error::{HtmlError, Result};
use crate::span::Span;
use crate::tag_processor::token::{Attribute, AttributeValue, TokenType};

/// Escape an attribute value for a double-quoted position.
fn escape_attribute_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// [§ 13.1.2.3 Attributes](https://html.spec.whatwg.org/multipage/syntax.html#attributes-2)
///
/// "Attribute names must consist of one or more characters other than
/// controls, U+0020 SPACE, U+0022 ("), U+0027 ('), U+003E (>), U+002F (/),
/// U+003D (=), and noncharacters."
///
/// `&` and `<` are refused as well; they would be misread when the tag is
/// scanned again.
fn is_valid_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|ch| {
            let code = u32::from(ch);
            !(ch.is_control()
                || matches!(
                    ch,
                    ' ' | '\t' | '\n' | '\x0c' | '\r' | '"' | '\'' | '>' | '/' | '=' | '&' | '<'
                )
                || (0xFDD0..=0xFDEF).contains(&code)
                || code & 0xFFFE == 0xFFFE)
        })
}

impl TagProcessor {
    /// Fail unless the current token is a tag.
    fn require_tag(&self, operation: &'static str) -> Result<()> {
        match self.get_token_type() {
            Some(TokenType::Tag) => Ok(()),
            Some(_) => Err(HtmlError::invalid(operation, "the current token is not a tag")),
            None => Err(HtmlError::invalid(operation, "there is no current token")),
        }
    }

    /// The first attribute named `name`, compared ASCII case-insensitively.
    fn find_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|attribute| {
                attribute
                    .name
                    .slice(&self.html)
                    .eq_ignore_ascii_case(name.as_bytes())
            })
    }

    fn pending_attribute(&self, lowercase_name: &str) -> Option<&Option<AttributeValue>> {
        let key = EditKey::Attribute {
            tag_at: self.token.start,
            name: lowercase_name.to_string(),
        };
        match &self.edits.find(&key)?.value {
            EditValue::Attribute(value) => Some(value),
            _ => None,
        }
    }

    fn read_attribute(&self, attribute: &Attribute) -> AttributeValue {
        if attribute.has_value {
            AttributeValue::String(decode(
                ReferenceContext::Attribute,
                attribute.value.slice(&self.html),
            ))
        } else {
            AttributeValue::Boolean
        }
    }

    /// The value of the attribute `name` on the current tag.
    ///
    /// Values queued by [`TagProcessor::set_attribute`] and friends are
    /// visible immediately. Closing tags have no attributes.
    ///
    /// # Errors
    ///
    /// Returns [`HtmlError::InvalidOperation`] if the current token is not
    /// a tag.
    pub fn get_attribute(&self, name: &str) -> Result<Option<AttributeValue>> {
        self.require_tag("get an attribute")?;
        if self.is_closer {
            return Ok(None);
        }

        let lowercase_name = name.to_ascii_lowercase();
        if let Some(pending) = self.pending_attribute(&lowercase_name) {
            return Ok(pending.clone());
        }
        Ok(self
            .find_attribute(&lowercase_name)
            .map(|attribute| self.read_attribute(attribute)))
    }

    /// The lowercase names of the current tag's attributes that start with
    /// `prefix` (case-insensitive), including queued additions.
    ///
    /// Returns `None` when the current token is not an opening tag.
    #[must_use]
    pub fn get_attribute_names_with_prefix(&self, prefix: &str) -> Option<Vec<String>> {
        if self.get_token_type()? != TokenType::Tag || self.is_closer {
            return None;
        }

        let prefix = prefix.to_ascii_lowercase();
        let mut names: Vec<String> = Vec::new();
        for attribute in &self.attributes {
            let name =
                String::from_utf8_lossy(attribute.name.slice(&self.html)).to_ascii_lowercase();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        for edit in self.edits.iter() {
            if let EditKey::Attribute { tag_at, name } = &edit.key
                && *tag_at == self.token.start
                && !names.contains(name)
            {
                names.push(name.clone());
            }
        }

        names.retain(|name| {
            name.starts_with(&prefix)
                && !matches!(self.pending_attribute(name), Some(None))
        });
        Some(names)
    }

    /// Set the attribute `name` to `value` on the current tag.
    ///
    /// # Errors
    ///
    /// Returns [`HtmlError::InvalidOperation`] if the current token is not
    /// an opening tag or `name` cannot be written as an attribute name, and
    /// [`HtmlError::ConflictingEdit`] if the edit overlaps another one.
    pub fn set_attribute(&mut self, name: &str, value: &str) -> Result<()> {
        let _ = self.queue_attribute_edit(name, Some(&AttributeValue::from(value)))?;
        Ok(())
    }

    /// Add `name` to the current tag as a boolean attribute, replacing any
    /// value it has.
    ///
    /// # Errors
    ///
    /// As for [`TagProcessor::set_attribute`].
    pub fn set_boolean_attribute(&mut self, name: &str) -> Result<()> {
        let _ = self.queue_attribute_edit(name, Some(&AttributeValue::Boolean))?;
        Ok(())
    }

    /// Remove every attribute named `name` from the current tag.
    ///
    /// Returns whether the attribute was present.
    ///
    /// # Errors
    ///
    /// As for [`TagProcessor::set_attribute`].
    pub fn remove_attribute(&mut self, name: &str) -> Result<bool> {
        self.queue_attribute_edit(name, None)
    }

    /// Queue the change of `name` to `value` (`None` removes it). Returns
    /// whether the attribute was present before this call.
    fn queue_attribute_edit(&mut self, name: &str, value: Option<&AttributeValue>) -> Result<bool> {
        self.require_tag("modify an attribute")?;
        if self.is_closer {
            return Err(HtmlError::invalid(
                "modify an attribute",
                "closing tags cannot have attributes",
            ));
        }
        if !is_valid_attribute_name(name) {
            return Err(HtmlError::invalid(
                "modify an attribute",
                "the name contains characters that cannot appear in an attribute name",
            ));
        }

        let lowercase_name = name.to_ascii_lowercase();
        let key = EditKey::Attribute {
            tag_at: self.token.start,
            name: lowercase_name.clone(),
        };
        let existing = self.find_attribute(&lowercase_name).copied();
        let was_present = match self.pending_attribute(&lowercase_name) {
            Some(pending) => pending.is_some(),
            None => existing.is_some(),
        };

        let serialized = match value {
            Some(AttributeValue::Boolean) => name.to_string(),
            Some(AttributeValue::String(text)) => {
                format!("{name}=\"{}\"", escape_attribute_value(text))
            }
            None => String::new(),
        };

        let (span, replacement) = match (existing, value.is_some()) {
            (Some(attribute), true) => (attribute.span, serialized),
            (None, true) => (Span::new(self.tag_name.end(), 0), format!(" {serialized}")),
            (Some(attribute), false) => (attribute.removal, String::new()),
            (None, false) => {
                // Only a queued addition to take back.
                self.edits.retain(|edit| edit.key != key);
                return Ok(was_present);
            }
        };

        self.edits.enqueue(Edit {
            key,
            span,
            replacement,
            value: EditValue::Attribute(value.cloned()),
        })?;

        if value.is_none() {
            let duplicates: Vec<Span> = self
                .attributes
                .iter()
                .filter(|attribute| {
                    attribute
                        .name
                        .slice(&self.html)
                        .eq_ignore_ascii_case(lowercase_name.as_bytes())
                })
                .skip(1)
                .map(|attribute| attribute.removal)
                .collect();
            for removal in duplicates {
                self.edits.enqueue(Edit {
                    key: EditKey::DuplicateAttribute { at: removal.start },
                    span: removal,
                    replacement: String::new(),
                    value: EditValue::Removal,
                })?;
            }
        }

        Ok(was_present)
    }

    /// The current tag's classes in source order, without duplicates.
    ///
    /// # Errors
    ///
    /// As for [`TagProcessor::get_attribute`].
    pub fn class_list(&self) -> Result<Vec<String>> {
        let mut classes: Vec<String> = Vec::new();
        if let Some(AttributeValue::String(value)) = self.get_attribute("class")? {
            for class in value.split_ascii_whitespace() {
                if !classes.iter().any(|seen| seen == class) {
                    classes.push(class.to_string());
                }
            }
        }
        Ok(classes)
    }

    /// Whether the current tag has the class `name`.
    ///
    /// # Errors
    ///
    /// As for [`TagProcessor::get_attribute`].
    pub fn has_class(&self, name: &str) -> Result<bool> {
        Ok(self.class_list()?.iter().any(|class| class == name))
    }

    /// Add `name` to the current tag's classes.
    ///
    /// # Errors
    ///
    /// As for [`TagProcessor::set_attribute`].
    pub fn add_class(&mut self, name: &str) -> Result<()> {
        let mut classes = self.class_list()?;
        if classes.iter().any(|class| class == name) {
            return Ok(());
        }
        classes.push(name.to_string());
        self.set_attribute("class", &classes.join(" "))
    }

    /// Remove `name` from the current tag's classes, dropping the attribute
    /// when no class is left.
    ///
    /// # Errors
    ///
    /// As for [`TagProcessor::set_attribute`].
    pub fn remove_class(&mut self, name: &str) -> Result<()> {
        let classes = self.class_list()?;
        if !classes.iter().any(|class| class == name) {
            return Ok(());
        }
        let remaining: Vec<String> = classes.into_iter().filter(|class| class != name).collect();
        if remaining.is_empty() {
            let _ = self.remove_attribute("class")?;
            Ok(())
        } else {
            self.set_attribute("class", &remaining.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_names_reject_markup() {
        assert!(is_valid_attribute_name("data-wp-bind"));
        assert!(is_valid_attribute_name("@click"));
        assert!(!is_valid_attribute_name(""));
        assert!(!is_valid_attribute_name("a b"));
        assert!(!is_valid_attribute_name("a>b"));
        assert!(!is_valid_attribute_name("x=y"));
        assert!(!is_valid_attribute_name("\u{FDD0}"));
    }

    #[test]
    fn test_escape_attribute_value() {
        assert_eq!(
            escape_attribute_value(r#"a "b" & <c>"#),
            "a &quot;b&quot; &amp; &lt;c&gt;"
        );
    }
}
