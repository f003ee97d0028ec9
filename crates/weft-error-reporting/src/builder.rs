//! Builder API for diagnostic messages.
//!
//! The builder encodes the message structure (title, problem, details,
//! hints) so call sites stay readable:
//!
//! ```
//! use weft_error_reporting::DiagnosticMessageBuilder;
//!
//! let warning = DiagnosticMessageBuilder::warning("Unresolved slot selector")
//!     .with_code("W-SLT-1")
//!     .problem("No subtree matched the selector for slot `abstract`.")
//!     .add_detail("selector was heading text `Abstract`")
//!     .add_hint("Does the document contain that heading?")
//!     .build();
//! assert_eq!(warning.code.as_deref(), Some("W-SLT-1"));
//! ```

use crate::diagnostic::{
    DetailItem, DetailKind, DiagnosticKind, DiagnosticMessage, Location,
};

/// Builder for [`DiagnosticMessage`].
#[derive(Debug, Clone)]
pub struct DiagnosticMessageBuilder {
    message: DiagnosticMessage,
}

impl DiagnosticMessageBuilder {
    fn new(kind: DiagnosticKind, title: impl Into<String>) -> Self {
        Self {
            message: DiagnosticMessage::new(kind, title),
        }
    }

    /// Start building an error message.
    pub fn error(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Error, title)
    }

    /// Start building a warning message.
    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Warning, title)
    }

    /// Start building an info message.
    pub fn info(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Info, title)
    }

    /// Attach a stable code from the catalog.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.message.code = Some(code.into());
        self
    }

    /// Set the problem statement.
    pub fn problem(mut self, problem: impl Into<String>) -> Self {
        self.message.problem = Some(problem.into());
        self
    }

    /// Add an error-kind detail bullet.
    pub fn add_detail(mut self, content: impl Into<String>) -> Self {
        self.message.details.push(DetailItem {
            kind: DetailKind::Error,
            content: content.into(),
        });
        self
    }

    /// Add an info-kind detail bullet.
    pub fn add_info_detail(mut self, content: impl Into<String>) -> Self {
        self.message.details.push(DetailItem {
            kind: DetailKind::Info,
            content: content.into(),
        });
        self
    }

    /// Add a note-kind detail bullet.
    pub fn add_note(mut self, content: impl Into<String>) -> Self {
        self.message.details.push(DetailItem {
            kind: DetailKind::Note,
            content: content.into(),
        });
        self
    }

    /// Add a hint.
    pub fn add_hint(mut self, hint: impl Into<String>) -> Self {
        self.message.hints.push(hint.into());
        self
    }

    /// Attach a location.
    pub fn at(mut self, location: Location) -> Self {
        self.message.location = Some(location);
        self
    }

    /// Finish building.
    pub fn build(self) -> DiagnosticMessage {
        self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_assembles_all_fields() {
        let msg = DiagnosticMessageBuilder::error("Ownership conflict")
            .with_code("W-RES-1")
            .problem("Attribute `code.engine` has two owners.")
            .add_detail("first registered by template `article`")
            .add_detail("re-registered by fragment `listings`")
            .add_info_detail("owners must be unique per attribute name")
            .add_hint("Rename one of the attributes?")
            .at(Location::stage("resolve"))
            .build();

        assert_eq!(msg.kind, DiagnosticKind::Error);
        assert_eq!(msg.code.as_deref(), Some("W-RES-1"));
        assert_eq!(msg.details.len(), 3);
        assert_eq!(msg.hints.len(), 1);
        assert_eq!(msg.location.as_ref().unwrap().stage, "resolve");
    }

    #[test]
    fn builder_kinds() {
        assert_eq!(
            DiagnosticMessageBuilder::warning("w").build().kind,
            DiagnosticKind::Warning
        );
        assert_eq!(
            DiagnosticMessageBuilder::info("i").build().kind,
            DiagnosticKind::Info
        );
    }
}
