//! Error types for configuration resolution.

use thiserror::Error;

use crate::spec::Owner;

/// Fatal, pre-render resolution errors.
///
/// Everything here aborts the document render; recoverable conditions are
/// reported as diagnostics instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Two specs claim the same attribute name with different owners.
    #[error(
        "attribute `{name}` is already owned by {existing}; \
         cannot re-register it for {incoming}"
    )]
    OwnershipConflict {
        name: String,
        existing: Owner,
        incoming: Owner,
    },

    /// A resolved value violates its declared type or domain.
    #[error("attribute `{name}` expects {expected}, got {got}")]
    Validation {
        name: String,
        expected: String,
        got: String,
    },

    /// An attribute was resolved that no spec declares.
    #[error("attribute `{0}` is not registered")]
    UnknownAttribute(String),

    /// Two active fragments override the same node kind's partial.
    #[error(
        "node kind `{node_kind}` has partial overrides from both \
         fragment `{first}` and fragment `{second}`"
    )]
    DuplicatePartialProvider {
        node_kind: String,
        first: String,
        second: String,
    },

    /// A fragment names an unknown dependency.
    #[error("fragment `{fragment}` depends on unknown fragment `{dependency}`")]
    UnknownFragmentDependency { fragment: String, dependency: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
