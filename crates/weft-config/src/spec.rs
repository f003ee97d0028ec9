//! Attribute specifications.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::source::SourceLayer;
use crate::value::AttrValue;

/// Who declared (and therefore owns) an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    Template(String),
    Fragment(String),
}

impl Owner {
    pub fn id(&self) -> &str {
        match self {
            Owner::Template(id) | Owner::Fragment(id) => id,
        }
    }
}

impl std::fmt::Display for Owner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Owner::Template(id) => write!(f, "template `{id}`"),
            Owner::Fragment(id) => write!(f, "fragment `{id}`"),
        }
    }
}

/// Declared type (and domain) of an attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrType {
    Bool,
    String,
    Number,
    List,
    Enum { choices: Vec<String> },
}

impl AttrType {
    /// Validate a value against this type. Out-of-domain values are an
    /// error, never clamped.
    pub fn check(&self, name: &str, value: &AttrValue) -> Result<(), ConfigError> {
        let ok = match self {
            AttrType::Bool => matches!(value, AttrValue::Bool(_)),
            AttrType::String => matches!(value, AttrValue::String(_)),
            AttrType::Number => matches!(value, AttrValue::Number(_)),
            AttrType::List => matches!(value, AttrValue::List(_)),
            AttrType::Enum { choices } => match value {
                AttrValue::String(s) => {
                    if choices.iter().any(|c| c == s) {
                        true
                    } else {
                        return Err(ConfigError::Validation {
                            name: name.to_string(),
                            expected: format!("one of {choices:?}"),
                            got: format!("`{s}`"),
                        });
                    }
                }
                _ => false,
            },
        };
        if ok {
            Ok(())
        } else {
            Err(ConfigError::Validation {
                name: name.to_string(),
                expected: self.describe(),
                got: value.type_name().to_string(),
            })
        }
    }

    fn describe(&self) -> String {
        match self {
            AttrType::Bool => "bool".to_string(),
            AttrType::String => "string".to_string(),
            AttrType::Number => "number".to_string(),
            AttrType::List => "list".to_string(),
            AttrType::Enum { choices } => format!("one of {choices:?}"),
        }
    }
}

/// A declared, ownable attribute.
///
/// `sources` lists the override layers that may supply a value, most
/// specific first. `normalizer`, if set, runs on every value found in a
/// layer (not on the hard-coded default, which is taken as already
/// normalized).
#[derive(Debug, Clone)]
pub struct AttributeSpec {
    pub name: String,
    pub owner: Owner,
    pub value_type: AttrType,
    pub default: AttrValue,
    pub sources: Vec<SourceLayer>,
    pub normalizer: Option<fn(AttrValue) -> AttrValue>,
}

impl AttributeSpec {
    /// A spec with the standard source order
    /// (CLI > front matter > config file > fragment default > template default).
    pub fn new(
        name: impl Into<String>,
        owner: Owner,
        value_type: AttrType,
        default: AttrValue,
    ) -> Self {
        AttributeSpec {
            name: name.into(),
            owner,
            value_type,
            default,
            sources: SourceLayer::standard_order().to_vec(),
            normalizer: None,
        }
    }

    pub fn with_sources(mut self, sources: Vec<SourceLayer>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_normalizer(mut self, normalizer: fn(AttrValue) -> AttrValue) -> Self {
        self.normalizer = Some(normalizer);
        self
    }
}
