//! Tag queries for [`TagProcessor::next_tag`].

use super::TagProcessor;
use crate::tag_processor::token::{AttributeValue, TokenType};

/// Whether a query stops on closing tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagClosers {
    /// Only opening tags match.
    #[default]
    Skip,
    /// Opening and closing tags both match.
    Visit,
}

/// What [`TagProcessor::next_tag`] looks for.
///
/// ```
/// use wren_html::{TagProcessor, TagQuery};
///
/// let query = TagQuery::new().tag_name("li").class_name("done").match_offset(2);
/// let mut processor = TagProcessor::new(
///     r#"<li class="done">a<li>b<li class="done x">c<li class="done">d"#,
/// );
/// assert!(processor.next_tag(Some(&query)));
/// assert_eq!(processor.get_modifiable_text(), "");
/// assert!(processor.next_token());
/// assert_eq!(processor.get_modifiable_text(), "c");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagQuery {
    /// Matched ASCII case-insensitively.
    pub tag_name: Option<String>,
    /// A class the tag must carry.
    pub class_name: Option<String>,
    /// Attributes the tag must carry, with the decoded value to compare
    /// against when one is given.
    pub attributes: Vec<(String, Option<String>)>,
    /// Stop on the n-th match, counting from 1.
    pub match_offset: usize,
    /// Whether closing tags can match.
    pub tag_closers: TagClosers,
    /// Breadcrumbs the tag must match, with `*` matching any one element.
    /// Only the HTML processor tracks breadcrumbs; the tag processor
    /// ignores this field.
    pub breadcrumbs: Option<Vec<String>>,
}

impl Default for TagQuery {
    fn default() -> Self {
        Self {
            tag_name: None,
            class_name: None,
            attributes: Vec::new(),
            match_offset: 1,
            tag_closers: TagClosers::Skip,
            breadcrumbs: None,
        }
    }
}

impl TagQuery {
    /// A query matching any opening tag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require the tag name `name`.
    #[must_use]
    pub fn tag_name(mut self, name: &str) -> Self {
        self.tag_name = Some(name.to_string());
        self
    }

    /// Require the class `name`.
    #[must_use]
    pub fn class_name(mut self, name: &str) -> Self {
        self.class_name = Some(name.to_string());
        self
    }

    /// Require the attribute `name` with any value.
    #[must_use]
    pub fn attribute(mut self, name: &str) -> Self {
        self.attributes.push((name.to_string(), None));
        self
    }

    /// Require the attribute `name` with the decoded value `value`.
    #[must_use]
    pub fn attribute_value(mut self, name: &str, value: &str) -> Self {
        self.attributes.push((name.to_string(), Some(value.to_string())));
        self
    }

    /// Stop on the `offset`-th match. Zero is treated as one.
    #[must_use]
    pub fn match_offset(mut self, offset: usize) -> Self {
        self.match_offset = offset.max(1);
        self
    }

    /// Require the tag's breadcrumbs to end with `breadcrumbs`.
    #[must_use]
    pub fn breadcrumbs(mut self, breadcrumbs: &[&str]) -> Self {
        self.breadcrumbs = Some(breadcrumbs.iter().map(ToString::to_string).collect());
        self
    }

    /// Let closing tags match too.
    #[must_use]
    pub fn visit_closers(mut self) -> Self {
        self.tag_closers = TagClosers::Visit;
        self
    }
}

impl TagProcessor {
    /// Whether the current token satisfies `query`.
    pub(crate) fn matches_query(&self, query: &TagQuery) -> bool {
        self.matches_query_as(query, &self.tag_name_upper)
    }

    /// Whether the current token satisfies `query` when its tag is known as
    /// `tag_name`, which may differ from the name in the document (`IMAGE`
    /// is processed as `IMG`).
    pub(crate) fn matches_query_as(&self, query: &TagQuery, tag_name: &str) -> bool {
        if self.get_token_type() != Some(TokenType::Tag) {
            return false;
        }
        if self.is_closer && query.tag_closers == TagClosers::Skip {
            return false;
        }
        if let Some(name) = &query.tag_name
            && !tag_name.eq_ignore_ascii_case(name)
        {
            return false;
        }
        if let Some(class) = &query.class_name
            && !self.has_class(class).unwrap_or(false)
        {
            return false;
        }

        query.attributes.iter().all(|(name, expected)| {
            match (self.get_attribute(name).ok().flatten(), expected) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(AttributeValue::String(value)), Some(expected)) => value == *expected,
                (Some(AttributeValue::Boolean), Some(expected)) => expected.is_empty(),
            }
        })
    }
}
