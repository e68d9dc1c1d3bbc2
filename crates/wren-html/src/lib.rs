//! Streaming HTML tag processing for the Wren toolkit.
//!
//! # Scope
//!
//! This crate implements:
//! - **Tag Processor** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - Tags, text, comments, DOCTYPEs, CDATA sections and funky comments
//!   - RAWTEXT, RCDATA, script data and PLAINTEXT content
//!   - Lazy attribute and text decoding, queued edits, bookmarks and seeking
//!
//! - **Character References** ([WHATWG § 13.5](https://html.spec.whatwg.org/multipage/named-characters.html))
//!   - Named, decimal and hexadecimal references in text and attribute values
//!
//! - **HTML Processor** ([WHATWG § 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction))
//!   - Insertion modes from `Initial` through `AfterAfterBody`, tables, templates
//!     and foreign content
//!   - Breadcrumbs for every token, full documents and fragments
//!
//! # Not Yet Implemented
//!
//! - Foster parenting
//! - Adoption agency algorithm with a furthest block
//! - Framesets
//! - Encoding sniffing (input must already be UTF-8)

pub mod character_reference;
pub mod edits;
pub mod elements;
pub mod error;
pub mod html_processor;
pub mod span;
pub mod tag_processor;

pub use elements::Namespace;
pub use error::{ErrorKind, HtmlError, Malformed, Result, Unsupported};
pub use html_processor::{HtmlProcessor, InsertionMode};
pub use span::Span;
pub use tag_processor::{
    Attribute, AttributeValue, CommentKind, MAX_BOOKMARKS, MAX_SEEK_OPS, TagClosers,
    TagProcessor, TagQuery, Token, TokenKind, TokenType,
};
