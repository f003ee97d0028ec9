//! Element attributes.

use serde::{Deserialize, Serialize};

/// Attributes attached to an element: identifier, classes, key/value pairs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Attr {
    pub id: String,
    pub classes: Vec<String>,
    pub attributes: Vec<(String, String)>,
}

impl Attr {
    /// An empty attribute set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Attributes with only an identifier.
    pub fn with_id(id: impl Into<String>) -> Self {
        Attr {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Attributes with only classes.
    pub fn with_classes(classes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Attr {
            classes: classes.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// First value for a key, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.classes.is_empty() && self.attributes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_and_key_lookup() {
        let attr = Attr {
            id: "sec-intro".to_string(),
            classes: vec!["unnumbered".to_string()],
            attributes: vec![("lang".to_string(), "de".to_string())],
        };
        assert!(attr.has_class("unnumbered"));
        assert!(!attr.has_class("numbered"));
        assert_eq!(attr.get("lang"), Some("de"));
        assert_eq!(attr.get("dir"), None);
        assert!(!attr.is_empty());
        assert!(Attr::empty().is_empty());
    }
}
