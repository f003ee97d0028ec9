//! Core diagnostic message types.

use serde::{Deserialize, Serialize};

/// The kind of diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// An error that prevents completion
    Error,
    /// A warning that doesn't prevent completion but indicates a problem
    Warning,
    /// Informational message
    Info,
    /// A note providing additional context
    Note,
}

/// How detail items should be presented (x/i bullet style).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetailKind {
    /// Error detail (✖ bullet)
    Error,
    /// Info detail (i bullet)
    Info,
    /// Plain bullet
    Note,
}

/// A detail item in a diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailItem {
    /// The kind of detail (error, info, note)
    pub kind: DetailKind,
    /// The content of the detail
    pub content: String,
}

/// Where in the pipeline (and in the document) a diagnostic arose.
///
/// The render core has no file/offset source map: its input is an
/// already-normalized tree. Locations therefore name the pipeline stage
/// and, when available, the slot and a node path within it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Location {
    /// Pipeline stage that raised the diagnostic ("resolve", "extract",
    /// "partials", "render", "inject").
    pub stage: String,

    /// Slot being processed, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot: Option<String>,

    /// Dotted node path within the slot subtree (e.g. "2.0.1"), if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_path: Option<String>,
}

impl Location {
    /// Location naming only a pipeline stage.
    pub fn stage(stage: impl Into<String>) -> Self {
        Location {
            stage: stage.into(),
            slot: None,
            node_path: None,
        }
    }

    /// Location naming a stage and a slot.
    pub fn in_slot(stage: impl Into<String>, slot: impl Into<String>) -> Self {
        Location {
            stage: stage.into(),
            slot: Some(slot.into()),
            node_path: None,
        }
    }

    /// Attach a node path.
    pub fn at_node(mut self, path: impl Into<String>) -> Self {
        self.node_path = Some(path.into());
        self
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.stage)?;
        if let Some(slot) = &self.slot {
            write!(f, " (slot `{slot}`")?;
            if let Some(path) = &self.node_path {
                write!(f, ", node {path}")?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// A structured diagnostic message.
///
/// Structure:
/// 1. **Code**: Optional stable code (e.g., "W-SLT-1") for searchability
/// 2. **Title**: Brief message
/// 3. **Kind**: Error, Warning, Info, Note
/// 4. **Problem**: What went wrong (the "must" or "can't" statement)
/// 5. **Details**: Specific information (bulleted)
/// 6. **Hints**: Optional guidance for fixing (ends with ?)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticMessage {
    /// Optional stable code (e.g., "W-SLT-1").
    ///
    /// Codes are optional but encouraged: they stay stable even when the
    /// message wording improves, and each maps to a catalog entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Brief title for the message
    pub title: String,

    /// The kind of diagnostic
    pub kind: DiagnosticKind,

    /// The problem statement (the "what")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,

    /// Specific details (the "where/why")
    pub details: Vec<DetailItem>,

    /// Optional hints for fixing (end with ?)
    pub hints: Vec<String>,

    /// Where the diagnostic arose
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl DiagnosticMessage {
    /// Create a new diagnostic message with just a title and kind.
    ///
    /// Consider using [`crate::DiagnosticMessageBuilder`] instead.
    pub fn new(kind: DiagnosticKind, title: impl Into<String>) -> Self {
        Self {
            code: None,
            title: title.into(),
            kind,
            problem: None,
            details: Vec::new(),
            hints: Vec::new(),
            location: None,
        }
    }

    /// True if this diagnostic is an error.
    pub fn is_error(&self) -> bool {
        self.kind == DiagnosticKind::Error
    }

    /// Render the message as plain text.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let label = match self.kind {
            DiagnosticKind::Error => "Error",
            DiagnosticKind::Warning => "Warning",
            DiagnosticKind::Info => "Info",
            DiagnosticKind::Note => "Note",
        };
        match &self.code {
            Some(code) => out.push_str(&format!("{label} [{code}]: {}", self.title)),
            None => out.push_str(&format!("{label}: {}", self.title)),
        }
        if let Some(location) = &self.location {
            out.push_str(&format!("\n  at {location}"));
        }
        if let Some(problem) = &self.problem {
            out.push_str(&format!("\n  {problem}"));
        }
        for detail in &self.details {
            let bullet = match detail.kind {
                DetailKind::Error => "✖",
                DetailKind::Info => "ℹ",
                DetailKind::Note => "•",
            };
            out.push_str(&format!("\n  {bullet} {}", detail.content));
        }
        for hint in &self.hints {
            out.push_str(&format!("\n  ? {hint}"));
        }
        out
    }

    /// Serialize to a JSON value for machine-readable output.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_rendering_includes_code_and_details() {
        let mut msg = DiagnosticMessage::new(DiagnosticKind::Warning, "Slot not found");
        msg.code = Some("W-SLT-1".to_string());
        msg.problem = Some("No heading matched the selector.".to_string());
        msg.details.push(DetailItem {
            kind: DetailKind::Info,
            content: "selector was `Abstract`".to_string(),
        });
        let text = msg.to_text();
        assert!(text.starts_with("Warning [W-SLT-1]: Slot not found"));
        assert!(text.contains("No heading matched"));
        assert!(text.contains("ℹ selector was `Abstract`"));
    }

    #[test]
    fn location_display() {
        let loc = Location::in_slot("render", "body").at_node("1.2");
        assert_eq!(loc.to_string(), "render (slot `body`, node 1.2)");
        assert_eq!(Location::stage("resolve").to_string(), "resolve");
    }

    #[test]
    fn json_roundtrip() {
        let msg = DiagnosticMessage::new(DiagnosticKind::Error, "boom");
        let json = msg.to_json();
        let back: DiagnosticMessage = serde_json::from_value(json).unwrap();
        assert_eq!(back, msg);
    }
}
