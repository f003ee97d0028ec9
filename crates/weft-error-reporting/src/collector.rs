//! Ordered aggregation of diagnostics across a render.

use crate::diagnostic::{DiagnosticKind, DiagnosticMessage};

/// Collects diagnostics in the order they are raised.
///
/// One collector is threaded through a whole document render; its contents
/// are returned alongside the output.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollector {
    messages: Vec<DiagnosticMessage>,
}

impl DiagnosticCollector {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    pub fn push(&mut self, message: DiagnosticMessage) {
        self.messages.push(message);
    }

    /// Record several diagnostics.
    pub fn extend(&mut self, messages: impl IntoIterator<Item = DiagnosticMessage>) {
        self.messages.extend(messages);
    }

    /// Number of collected diagnostics.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True if nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// True if any collected diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(DiagnosticMessage::is_error)
    }

    /// Count of diagnostics of a given kind.
    pub fn count_of(&self, kind: DiagnosticKind) -> usize {
        self.messages.iter().filter(|m| m.kind == kind).count()
    }

    /// View the collected diagnostics.
    pub fn messages(&self) -> &[DiagnosticMessage] {
        &self.messages
    }

    /// Consume the collector, yielding the diagnostics in raise order.
    pub fn into_messages(self) -> Vec<DiagnosticMessage> {
        self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::DiagnosticMessageBuilder;

    #[test]
    fn collects_in_order() {
        let mut collector = DiagnosticCollector::new();
        collector.push(DiagnosticMessageBuilder::warning("first").build());
        collector.push(DiagnosticMessageBuilder::error("second").build());
        collector.push(DiagnosticMessageBuilder::warning("third").build());

        assert_eq!(collector.len(), 3);
        assert!(collector.has_errors());
        assert_eq!(collector.count_of(DiagnosticKind::Warning), 2);

        let titles: Vec<_> = collector
            .into_messages()
            .into_iter()
            .map(|m| m.title)
            .collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[test]
    fn empty_collector_has_no_errors() {
        let collector = DiagnosticCollector::new();
        assert!(collector.is_empty());
        assert!(!collector.has_errors());
    }
}
