//! Stable code catalog and lookup.
//!
//! Maps diagnostic codes (like "W-SLT-1") to their metadata. Codes stay
//! stable across releases even when message wording changes.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

/// Metadata for a diagnostic code.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorCodeInfo {
    /// Subsystem name (e.g., "resolve", "slots", "partials", "render")
    pub subsystem: &'static str,

    /// Short title for the code
    pub title: &'static str,

    /// One-line description of the condition
    pub description: &'static str,
}

/// Global code catalog.
pub static ERROR_CATALOG: Lazy<HashMap<&'static str, ErrorCodeInfo>> = Lazy::new(|| {
    let entries = [
        (
            "W-RES-1",
            ErrorCodeInfo {
                subsystem: "resolve",
                title: "Attribute ownership conflict",
                description: "Two specs claim the same attribute name with different owners.",
            },
        ),
        (
            "W-RES-2",
            ErrorCodeInfo {
                subsystem: "resolve",
                title: "Attribute validation failure",
                description: "A resolved value violates its declared type or domain.",
            },
        ),
        (
            "W-RES-3",
            ErrorCodeInfo {
                subsystem: "resolve",
                title: "Unknown placeholder",
                description: "A {{name}} placeholder names no resolved attribute.",
            },
        ),
        (
            "W-SLT-1",
            ErrorCodeInfo {
                subsystem: "slots",
                title: "Unresolved slot selector",
                description: "No subtree matched a requested slot selector; \
                              content stays in the default slot.",
            },
        ),
        (
            "W-PRT-1",
            ErrorCodeInfo {
                subsystem: "partials",
                title: "Missing required partial",
                description: "A declared required partial has no provider.",
            },
        ),
        (
            "W-PRT-2",
            ErrorCodeInfo {
                subsystem: "partials",
                title: "Duplicate partial provider",
                description: "Two fragments override the same node kind.",
            },
        ),
        (
            "W-RND-1",
            ErrorCodeInfo {
                subsystem: "render",
                title: "Node render failure",
                description: "A handler failed on one node; a placeholder was substituted.",
            },
        ),
        (
            "W-INJ-1",
            ErrorCodeInfo {
                subsystem: "inject",
                title: "Undeclared injection target",
                description: "A fragment piece targets a slot or variable the template \
                              does not declare.",
            },
        ),
    ];
    entries.into_iter().collect()
});

/// Look up code information. Returns `None` for unknown codes.
pub fn get_error_info(code: &str) -> Option<&'static ErrorCodeInfo> {
    ERROR_CATALOG.get(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_resolve() {
        let info = get_error_info("W-SLT-1").unwrap();
        assert_eq!(info.subsystem, "slots");
        assert!(get_error_info("W-RES-1").is_some());
        assert!(get_error_info("W-INJ-1").is_some());
    }

    #[test]
    fn unknown_code_is_none() {
        assert!(get_error_info("W-XXX-9").is_none());
    }
}
