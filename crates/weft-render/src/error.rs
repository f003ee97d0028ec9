//! Error types for the render core.

use thiserror::Error;
use weft_config::ConfigError;

/// Fatal render errors. Recoverable conditions (unresolved slot selectors,
/// per-node handler failures) are diagnostics, not errors.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Resolution failed before rendering (ownership conflict, validation,
    /// duplicate partial provider).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A required partial has no provider anywhere. Raised after partial
    /// resolution, before any phase runs.
    #[error("required partial `{name}` (declared by {declared_by}) has no provider")]
    MissingPartialProvider { name: String, declared_by: String },

    /// A fragment piece targets a slot or variable the template does not
    /// declare.
    #[error("fragment `{fragment}` injects into undeclared {target}")]
    Template { fragment: String, target: String },

    /// Fragment dependencies form a cycle; no deterministic injection
    /// order exists.
    #[error("fragment dependency cycle involving `{0}`")]
    FragmentCycle(String),

    /// A handler flagged a node failure as fatal (malformed tree); the
    /// whole slot aborts.
    #[error("fatal render failure in slot `{slot}` at node {node_path}: {message}")]
    FatalNode {
        slot: String,
        node_path: String,
        message: String,
    },

    /// Cooperative cancellation was requested.
    #[error("render cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, RenderError>;
