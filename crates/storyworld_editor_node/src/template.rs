// SPDX-License-Identifier: MIT OR Apache-2.0
//! Named templates that produce a node's sub-controls.

use crate::drag::{DropRegion, RegionKind};
use crate::field::{Button, KindSelection, TextField};
use indexmap::IndexMap;

/// Name of the built-in object row template
pub const OBJECT_NODE_TEMPLATE: &str = "objectNode";

/// The sub-controls a template renders for one node
#[derive(Debug)]
pub struct NodeFragment {
    /// Name input
    pub name: TextField,
    /// Description input
    pub description: TextField,
    /// Delete affordance
    pub delete: Button,
    /// Actor/Item/Scenery selectors
    pub kinds: KindSelection,
    /// Drop here to become a sibling
    pub sibling_region: DropRegion,
    /// Drop here to become a child
    pub child_region: DropRegion,
}

impl NodeFragment {
    /// Region by kind
    pub fn region(&self, kind: RegionKind) -> &DropRegion {
        match kind {
            RegionKind::Sibling => &self.sibling_region,
            RegionKind::Child => &self.child_region,
        }
    }
}

/// Produces fresh node fragments
pub trait NodeTemplate {
    /// Template name used for lookup
    fn name(&self) -> &str;

    /// Render a new fragment
    fn render(&self) -> NodeFragment;
}

/// The standard object row: name, description, delete, three kinds, two drop regions
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectNodeTemplate;

impl NodeTemplate for ObjectNodeTemplate {
    fn name(&self) -> &str {
        OBJECT_NODE_TEMPLATE
    }

    fn render(&self) -> NodeFragment {
        NodeFragment {
            name: TextField::new("js-name"),
            description: TextField::new("js-description"),
            delete: Button::new("js-delete"),
            kinds: KindSelection::default(),
            sibling_region: DropRegion::new(RegionKind::Sibling),
            child_region: DropRegion::new(RegionKind::Child),
        }
    }
}

/// Template lookup failure
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// No template registered under this name
    #[error("Template not found: {0}")]
    NotFound(String),
}

/// Registry of available templates
pub struct TemplateRegistry {
    templates: IndexMap<String, Box<dyn NodeTemplate>>,
}

impl TemplateRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            templates: IndexMap::new(),
        }
    }

    /// Create a registry holding the built-in templates
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ObjectNodeTemplate);
        registry
    }

    /// Register a template under its own name, replacing any previous one
    pub fn register(&mut self, template: impl NodeTemplate + 'static) {
        self.templates.insert(template.name().to_string(), Box::new(template));
    }

    /// Get a template by name
    pub fn get(&self, name: &str) -> Result<&dyn NodeTemplate, TemplateError> {
        self.templates
            .get(name)
            .map(|t| t.as_ref())
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))
    }

    /// Names of all registered templates
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fragment_is_complete() {
        let registry = TemplateRegistry::with_defaults();
        let fragment = registry.get(OBJECT_NODE_TEMPLATE).unwrap().render();

        assert_eq!(fragment.name.value(), "");
        assert_eq!(fragment.kinds.highlighted_count(), 1);
        assert_eq!(fragment.sibling_region.kind, RegionKind::Sibling);
        assert_eq!(fragment.child_region.kind, RegionKind::Child);
    }

    #[test]
    fn test_unknown_template() {
        let registry = TemplateRegistry::new();
        assert!(matches!(registry.get("objectNode"), Err(TemplateError::NotFound(_))));
        assert_eq!(registry.names().count(), 0);
    }

    #[test]
    fn test_defaults_register_object_node() {
        let registry = TemplateRegistry::default();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec![OBJECT_NODE_TEMPLATE]);
    }
}
