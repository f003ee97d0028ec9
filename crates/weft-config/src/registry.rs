//! The attribute ownership registry.

use indexmap::IndexMap;

use crate::error::{ConfigError, Result};
use crate::source::SourceSet;
use crate::spec::AttributeSpec;
use crate::value::AttrValue;

/// Registry of attribute specs, enforcing single ownership per name.
///
/// Registration order is preserved; `resolve_all` iterates in that order
/// so resolved maps are deterministic.
#[derive(Debug, Clone, Default)]
pub struct AttributeRegistry {
    specs: IndexMap<String, AttributeSpec>,
}

impl AttributeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a spec.
    ///
    /// Re-registering a name under the same owner is idempotent (the later
    /// spec replaces the earlier). A different owner is an
    /// [`ConfigError::OwnershipConflict`] regardless of registration order.
    /// A declared default must pass the spec's own type check (`Null`
    /// meaning "no default" is always allowed), so a mis-declared manifest
    /// fails here rather than leaking an untyped value downstream.
    pub fn register(&mut self, spec: AttributeSpec) -> Result<()> {
        if !matches!(spec.default, AttrValue::Null) {
            spec.value_type.check(&spec.name, &spec.default)?;
        }
        if let Some(existing) = self.specs.get(&spec.name) {
            if existing.owner != spec.owner {
                return Err(ConfigError::OwnershipConflict {
                    name: spec.name.clone(),
                    existing: existing.owner.clone(),
                    incoming: spec.owner.clone(),
                });
            }
        }
        self.specs.insert(spec.name.clone(), spec);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&AttributeSpec> {
        self.specs.get(name)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.specs.keys().map(String::as_str)
    }

    /// Resolve one attribute against the source layers.
    ///
    /// Walks the spec's `sources` in declared order and takes the first
    /// present value, normalized and validated. Falls back to the spec
    /// default when no layer supplies a value.
    pub fn resolve(&self, name: &str, sources: &SourceSet) -> Result<AttrValue> {
        let spec = self
            .specs
            .get(name)
            .ok_or_else(|| ConfigError::UnknownAttribute(name.to_string()))?;

        for layer in &spec.sources {
            if let Some(found) = sources.layer_value(*layer, name) {
                let value = match spec.normalizer {
                    Some(normalize) => normalize(found),
                    None => found,
                };
                spec.value_type.check(name, &value)?;
                return Ok(value);
            }
        }
        Ok(spec.default.clone())
    }

    /// Resolve every registered attribute, in registration order.
    pub fn resolve_all(&self, sources: &SourceSet) -> Result<IndexMap<String, AttrValue>> {
        let mut resolved = IndexMap::with_capacity(self.specs.len());
        for name in self.specs.keys() {
            let value = self.resolve(name, sources)?;
            resolved.insert(name.clone(), value);
        }
        Ok(resolved)
    }
}
