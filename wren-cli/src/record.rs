//! The per-token record printed by `wren tokens`.

use std::borrow::Cow;
use std::fmt::Write as _;

use owo_colors::OwoColorize;
use serde::{Serialize, Serializer};
use wren_html::{AttributeValue, HtmlProcessor, TagProcessor, TokenType};

/// One token as consumers see it, plus breadcrumbs when the HTML processor
/// produced it.
#[derive(Debug, Serialize)]
pub struct TokenRecord {
    #[serde(rename = "type", serialize_with = "display")]
    pub token_type: TokenType,
    pub name: Option<String>,
    pub is_closer: bool,
    pub has_self_closing_flag: bool,
    pub modifiable_text: String,
    pub attributes: Vec<AttributeRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breadcrumbs: Option<Vec<String>>,
}

/// A decoded attribute. `value` is `None` for boolean attributes.
#[derive(Debug, Serialize)]
pub struct AttributeRecord {
    pub name: String,
    pub value: Option<String>,
}

fn display<S: Serializer>(value: &TokenType, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

impl TokenRecord {
    /// Snapshot the current token of a tag processor.
    pub fn from_tags(tags: &TagProcessor) -> Option<Self> {
        let token_type = tags.get_token_type()?;
        let attributes = tags
            .get_attribute_names_with_prefix("")
            .unwrap_or_default()
            .into_iter()
            .map(|name| {
                let value = match tags.get_attribute(&name) {
                    Ok(Some(AttributeValue::String(value))) => Some(value),
                    _ => None,
                };
                AttributeRecord { name, value }
            })
            .collect();

        Some(Self {
            token_type,
            name: tags.get_token_name().map(Cow::into_owned),
            is_closer: tags.is_tag_closer(),
            has_self_closing_flag: tags.has_self_closing_flag(),
            modifiable_text: tags.get_modifiable_text(),
            attributes,
            breadcrumbs: None,
        })
    }

    /// Snapshot the current token of an HTML processor, breadcrumbs included.
    pub fn from_tree(processor: &HtmlProcessor) -> Option<Self> {
        let mut record = Self::from_tags(processor.tag_processor())?;
        record.name = processor.get_token_name().map(Cow::into_owned);
        record.breadcrumbs = Some(
            processor
                .get_breadcrumbs()
                .into_iter()
                .map(str::to_string)
                .collect(),
        );
        Some(record)
    }

    /// A single human-readable line.
    pub fn render(&self) -> String {
        let mut line = if self.token_type == TokenType::Tag {
            self.render_tag()
        } else {
            format!("{} {:?}", self.token_type.dimmed(), self.modifiable_text)
        };

        if let Some(breadcrumbs) = &self.breadcrumbs {
            let _ = write!(
                line,
                "  {}",
                format!("@ {}", breadcrumbs.join(" > ")).dimmed()
            );
        }
        line
    }

    fn render_tag(&self) -> String {
        let name = self.name.as_deref().unwrap_or_default();
        if self.is_closer {
            return format!("</{}>", name.blue().bold());
        }

        let mut tag = format!("<{}", name.blue().bold());
        for attribute in &self.attributes {
            match &attribute.value {
                Some(value) => {
                    let _ = write!(
                        tag,
                        " {}={}",
                        attribute.name.cyan(),
                        format!("{value:?}").green()
                    );
                }
                None => {
                    let _ = write!(tag, " {}", attribute.name.cyan());
                }
            }
        }
        if self.has_self_closing_flag {
            tag.push_str(" /");
        }
        tag.push('>');
        tag
    }
}
