//! Errors reported by the tag processor and the HTML processor.

use strum_macros::{Display, EnumDiscriminants};
use thiserror::Error;

use crate::span::Span;

/// Convenience alias used throughout the crate.
pub type Result<T, E = HtmlError> = std::result::Result<T, E>;

/// Everything that can go wrong while scanning or editing a document.
///
/// `UnsupportedMarkup` and `MalformedInput` are terminal: once a processor
/// records one it stops producing tokens. The other variants are returned
/// from individual calls and leave the processor usable.
#[derive(Debug, Clone, PartialEq, Eq, Error, EnumDiscriminants)]
#[strum_discriminants(name(ErrorKind), derive(Display, Hash))]
pub enum HtmlError {
    /// The markup is valid HTML but needs tree-construction machinery this
    /// crate does not implement.
    #[error("unsupported markup at byte {at}: {reason}")]
    UnsupportedMarkup {
        /// Byte offset of the token that triggered the bail.
        at: usize,
        /// What was unsupported.
        reason: Unsupported,
    },

    /// The document ended in the middle of a construct.
    #[error("malformed input at byte {at}: {reason}")]
    MalformedInput {
        /// Byte offset where the unfinished construct starts.
        at: usize,
        /// What was left unfinished.
        reason: Malformed,
    },

    /// `seek` was asked for a bookmark that does not exist or whose content
    /// was removed by an edit.
    #[error("unknown or invalidated bookmark `{0}`")]
    InvalidBookmark(String),

    /// Two queued edits touch the same bytes.
    #[error("queued edits overlap at bytes {}..{}", .0.start, .0.end())]
    ConflictingEdit(Span),

    /// A call was made in a state that does not allow it, e.g. reading an
    /// attribute while the current token is a comment.
    #[error("cannot {operation}: {reason}")]
    InvalidOperation {
        /// The operation that was attempted.
        operation: &'static str,
        /// Why it was refused.
        reason: &'static str,
    },
}

impl HtmlError {
    /// The variant of this error without its payload.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.into()
    }

    /// Whether this error ends iteration for the processor that raised it.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedMarkup { .. } | Self::MalformedInput { .. }
        )
    }

    pub(crate) const fn invalid(operation: &'static str, reason: &'static str) -> Self {
        Self::InvalidOperation { operation, reason }
    }
}

/// Constructs the processors recognize but refuse to handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Unsupported {
    /// `<![CDATA[` found in HTML content.
    #[strum(serialize = "CDATA section outside of foreign content")]
    CdataOutsideForeignContent,

    /// `<!` that opens neither a comment nor a DOCTYPE.
    #[strum(serialize = "markup declaration that is neither a comment nor a DOCTYPE")]
    InvalidMarkupDeclaration,

    /// Content inside a table that the tree builder would move before it.
    #[strum(serialize = "content that would be foster-parented out of a table")]
    FosterParenting,

    /// An end tag for a formatting element that crosses a block element.
    #[strum(serialize = "misnested formatting element that needs the full adoption agency")]
    AdoptionAgency,

    /// A fragment context element other than an ordinary HTML element.
    #[strum(serialize = "fragment context element")]
    FragmentContext,

    /// `FRAMESET` documents.
    #[strum(serialize = "FRAMESET content")]
    Frameset,

    /// Table content placed directly inside a `TEMPLATE`.
    #[strum(serialize = "table content inside TEMPLATE")]
    TemplateContents,
}

/// Constructs the document ended in the middle of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Malformed {
    /// A tag without its closing `>`.
    #[strum(serialize = "unterminated tag")]
    UnterminatedTag,

    /// A comment, bogus comment or processing-instruction lookalike without
    /// its closer.
    #[strum(serialize = "unterminated comment")]
    UnterminatedComment,

    /// A DOCTYPE declaration without its closing `>`.
    #[strum(serialize = "unterminated DOCTYPE")]
    UnterminatedDoctype,

    /// A CDATA section without `]]>`.
    #[strum(serialize = "unterminated CDATA section")]
    UnterminatedCdata,

    /// Elements that still needed a closing tag at the end of the document.
    #[strum(serialize = "elements left open at end of document")]
    UnclosedElements,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_strips_payload() {
        let error = HtmlError::MalformedInput {
            at: 3,
            reason: Malformed::UnterminatedTag,
        };
        assert_eq!(error.kind(), ErrorKind::MalformedInput);
        assert_eq!(error.kind().to_string(), "MalformedInput");
        assert!(error.is_terminal());
    }

    #[test]
    fn test_messages_name_the_construct() {
        let error = HtmlError::UnsupportedMarkup {
            at: 10,
            reason: Unsupported::FosterParenting,
        };
        assert_eq!(
            error.to_string(),
            "unsupported markup at byte 10: content that would be foster-parented out of a table"
        );

        let error = HtmlError::ConflictingEdit(Span::new(4, 6));
        assert_eq!(error.to_string(), "queued edits overlap at bytes 4..10");
        assert!(!error.is_terminal());
    }
}
