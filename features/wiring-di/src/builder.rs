use std::sync::Arc;

use crate::{
    container::Context,
    definition::{Definition, DefinitionSource},
    errors::ContextError,
    hierarchy::TypeHierarchy,
    initiator::ContextInitiator,
    properties::{NoProperties, PropertySource},
    types::Injectable,
};

/// Collects definitions, the property source and the type hierarchy
///
/// Building happens once; the resulting [`Context`] is read only.
pub struct ContextBuilder {
    /// Registered definitions, in registration order
    pub(crate) definitions: Vec<Definition>,
    pub(crate) properties: Arc<dyn PropertySource>,
    pub(crate) hierarchy: TypeHierarchy,
}
impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextBuilder {
    pub fn new() -> Self {
        ContextBuilder {
            definitions: Vec::new(),
            properties: Arc::new(NoProperties),
            hierarchy: TypeHierarchy::new(),
        }
    }
}
impl ContextBuilder {
    pub fn with_properties(mut self, properties: impl PropertySource + 'static) -> Self {
        self.properties = Arc::new(properties);
        self
    }

    pub fn with_shared_properties(mut self, properties: Arc<dyn PropertySource>) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_hierarchy(mut self, hierarchy: TypeHierarchy) -> Self {
        self.hierarchy = hierarchy;
        self
    }

    pub fn add_definition(mut self, definition: Definition) -> Self {
        self.definitions.push(definition);
        self
    }

    pub fn add_definitions(mut self, definitions: impl IntoIterator<Item = Definition>) -> Self {
        self.definitions.extend(definitions);
        self
    }

    pub fn add_source(self, source: &dyn DefinitionSource) -> Self {
        self.add_definitions(source.definitions())
    }

    /// Registers an already created value
    pub fn add_instance<T: Injectable>(self, instance: T) -> Self {
        self.add_definition(Definition::instance(instance))
    }

    pub fn build(self) -> Result<Context, ContextError> {
        let ContextBuilder {
            definitions,
            properties,
            hierarchy,
        } = self;

        ContextInitiator::new(properties, hierarchy).initiate(definitions)
    }
}
