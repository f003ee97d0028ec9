//! Override source layers.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::value::{AttrValue, RawValue};

/// An override layer an attribute spec may read from, most specific first
/// in [`SourceLayer::standard_order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceLayer {
    Cli,
    FrontMatter,
    ConfigFile,
    FragmentDefault,
    TemplateDefault,
}

impl SourceLayer {
    /// CLI > front matter > config file > fragment default > template default.
    pub fn standard_order() -> [SourceLayer; 5] {
        [
            SourceLayer::Cli,
            SourceLayer::FrontMatter,
            SourceLayer::ConfigFile,
            SourceLayer::FragmentDefault,
            SourceLayer::TemplateDefault,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceLayer::Cli => "cli",
            SourceLayer::FrontMatter => "front_matter",
            SourceLayer::ConfigFile => "config_file",
            SourceLayer::FragmentDefault => "fragment_default",
            SourceLayer::TemplateDefault => "template_default",
        }
    }
}

/// The raw override maps for one document render, plus the manifest
/// default layers the resolver fills in per activation round.
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    pub cli: RawValue,
    pub front_matter: RawValue,
    pub config_file: RawValue,

    /// Fragments the caller explicitly requested active.
    pub requested_fragments: Vec<String>,

    /// Defaults contributed by the template manifest.
    pub template_defaults: IndexMap<String, AttrValue>,

    /// Defaults contributed by active fragment manifests, in activation
    /// order (later fragments do not override earlier ones; first wins,
    /// matching declaration order determinism).
    pub fragment_defaults: IndexMap<String, AttrValue>,
}

impl SourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value an individual layer supplies for `name`, if any.
    pub fn layer_value(&self, layer: SourceLayer, name: &str) -> Option<AttrValue> {
        match layer {
            SourceLayer::Cli => self.cli.lookup(name).cloned(),
            SourceLayer::FrontMatter => self.front_matter.lookup(name).cloned(),
            SourceLayer::ConfigFile => self.config_file.lookup(name).cloned(),
            SourceLayer::FragmentDefault => self.fragment_defaults.get(name).cloned(),
            SourceLayer::TemplateDefault => self.template_defaults.get(name).cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_order_is_most_specific_first() {
        let order = SourceLayer::standard_order();
        assert_eq!(order[0], SourceLayer::Cli);
        assert_eq!(order[4], SourceLayer::TemplateDefault);
    }

    #[test]
    fn layer_values_come_from_the_right_map() {
        let mut sources = SourceSet::new();
        sources.cli = RawValue::map([("lang", RawValue::value("de"))]);
        sources
            .template_defaults
            .insert("lang".to_string(), AttrValue::from("en"));

        assert_eq!(
            sources.layer_value(SourceLayer::Cli, "lang"),
            Some(AttrValue::from("de"))
        );
        assert_eq!(
            sources.layer_value(SourceLayer::TemplateDefault, "lang"),
            Some(AttrValue::from("en"))
        );
        assert_eq!(sources.layer_value(SourceLayer::FrontMatter, "lang"), None);
    }
}
