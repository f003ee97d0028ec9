//! Attribute values and raw override trees.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A resolved attribute value.
///
/// Truthiness and string rendering follow template-engine conventions:
/// any non-empty string is truthy (even `"false"`), a list is truthy when
/// any element is, `Null` renders empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<AttrValue>),
}

impl AttrValue {
    pub fn is_truthy(&self) -> bool {
        match self {
            AttrValue::Null => false,
            AttrValue::Bool(b) => *b,
            AttrValue::Number(n) => *n != 0.0,
            AttrValue::String(s) => !s.is_empty(),
            AttrValue::List(items) => items.iter().any(AttrValue::is_truthy),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Name of the value's type, for validation messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttrValue::Null => "null",
            AttrValue::Bool(_) => "bool",
            AttrValue::Number(_) => "number",
            AttrValue::String(_) => "string",
            AttrValue::List(_) => "list",
        }
    }

    /// Render for output interpolation.
    ///
    /// - String: as-is
    /// - Bool: "true" or "" (empty for false)
    /// - Number: minimal decimal form
    /// - List: concatenation of rendered elements
    /// - Null: ""
    pub fn render(&self) -> String {
        match self {
            AttrValue::Null => String::new(),
            AttrValue::Bool(true) => "true".to_string(),
            AttrValue::Bool(false) => String::new(),
            AttrValue::Number(n) => {
                if n.fract() == 0.0 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            AttrValue::String(s) => s.clone(),
            AttrValue::List(items) => items.iter().map(AttrValue::render).collect(),
        }
    }
}

impl Default for AttrValue {
    fn default() -> Self {
        AttrValue::Null
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::String(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::String(s)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

impl From<f64> for AttrValue {
    fn from(n: f64) -> Self {
        AttrValue::Number(n)
    }
}

/// A raw override tree from an upstream source (CLI map, front matter,
/// config file). Leaves are already-typed values; the front-end owns
/// file-format parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawValue {
    Value(AttrValue),
    Map(IndexMap<String, RawValue>),
}

impl RawValue {
    /// An empty map.
    pub fn empty() -> Self {
        RawValue::Map(IndexMap::new())
    }

    /// Build a map from entries.
    pub fn map(entries: impl IntoIterator<Item = (impl Into<String>, RawValue)>) -> Self {
        RawValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v))
                .collect(),
        )
    }

    /// Leaf constructor.
    pub fn value(value: impl Into<AttrValue>) -> Self {
        RawValue::Value(value.into())
    }

    /// Look up a (possibly dotted) attribute name.
    ///
    /// A flat key takes priority over a nested path: for `code.engine`,
    /// a top-level `"code.engine"` entry wins over `code: {engine: …}`.
    /// Only leaf values resolve; landing on a map yields `None`.
    pub fn lookup(&self, name: &str) -> Option<&AttrValue> {
        let RawValue::Map(map) = self else {
            return None;
        };
        if let Some(entry) = map.get(name) {
            return entry.as_leaf();
        }
        let mut current = self;
        for segment in name.split('.') {
            match current {
                RawValue::Map(map) => current = map.get(segment)?,
                RawValue::Value(_) => return None,
            }
        }
        current.as_leaf()
    }

    fn as_leaf(&self) -> Option<&AttrValue> {
        match self {
            RawValue::Value(v) => Some(v),
            RawValue::Map(_) => None,
        }
    }
}

impl Default for RawValue {
    fn default() -> Self {
        RawValue::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness() {
        assert!(AttrValue::from("false").is_truthy());
        assert!(!AttrValue::String(String::new()).is_truthy());
        assert!(!AttrValue::Null.is_truthy());
        assert!(AttrValue::List(vec![AttrValue::Bool(false), AttrValue::Bool(true)]).is_truthy());
    }

    #[test]
    fn rendering() {
        assert_eq!(AttrValue::Bool(false).render(), "");
        assert_eq!(AttrValue::Number(2.0).render(), "2");
        assert_eq!(AttrValue::Number(2.5).render(), "2.5");
        assert_eq!(
            AttrValue::List(vec!["a".into(), "b".into()]).render(),
            "ab"
        );
    }

    #[test]
    fn dotted_lookup_nested() {
        let raw = RawValue::map([(
            "code",
            RawValue::map([("engine", RawValue::value("listings"))]),
        )]);
        assert_eq!(
            raw.lookup("code.engine"),
            Some(&AttrValue::from("listings"))
        );
        assert_eq!(raw.lookup("code.missing"), None);
        // landing on a map is not a value
        assert_eq!(raw.lookup("code"), None);
    }

    #[test]
    fn flat_key_wins_over_nested_path() {
        let mut entries = IndexMap::new();
        entries.insert("code.engine".to_string(), RawValue::value("minted"));
        entries.insert(
            "code".to_string(),
            RawValue::map([("engine", RawValue::value("listings"))]),
        );
        let raw = RawValue::Map(entries);
        assert_eq!(raw.lookup("code.engine"), Some(&AttrValue::from("minted")));
    }
}
