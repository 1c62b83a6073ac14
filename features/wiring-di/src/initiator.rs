use std::sync::Arc;

use crate::{
    args::{Args, Resolved},
    container::Context,
    definition::{Definition, Dependency, Identifier, PropertyIdentifier},
    dependency_graph::DependencyGraph,
    errors::{ContextError, InjectError},
    hierarchy::TypeHierarchy,
    matcher::Matcher,
    properties::{PropertySource, PropertyValue},
    registry::{Registry, SingleMatch},
    types::{DynError, Instance},
};

/// Drives construction of a [`Context`]
///
/// Construction is sequential: every definition is built after everything ordered before it.
pub(crate) struct ContextInitiator {
    properties: Arc<dyn PropertySource>,
    hierarchy: TypeHierarchy,
    registry: Registry,
}
impl ContextInitiator {
    pub(crate) fn new(properties: Arc<dyn PropertySource>, hierarchy: TypeHierarchy) -> Self {
        ContextInitiator {
            properties,
            hierarchy,
            registry: Registry::default(),
        }
    }

    pub fn initiate(self, definitions: Vec<Definition>) -> Result<Context, ContextError> {
        let result = self.try_initiate(definitions);
        if let Err(e) = &result {
            tracing::error!("Context construction failed: {e}");
        }
        result
    }

    fn try_initiate(mut self, definitions: Vec<Definition>) -> Result<Context, ContextError> {
        tracing::debug!("Initializing context with {} definitions", definitions.len());

        // Drop everything whose conditions fail
        let mut enabled = Vec::with_capacity(definitions.len());
        let mut disabled = Vec::new();
        for definition in definitions {
            if definition.is_enabled(self.properties.as_ref()) {
                enabled.push(definition);
            } else {
                tracing::debug!("Definition for {} is disabled", definition.identifier);
                disabled.push(definition.identifier);
            }
        }

        // Build and check Graph
        let graph = DependencyGraph::new(enabled, Matcher::new(&self.hierarchy));
        tracing::debug!(
            "Dependency graph has {} nodes and {} edges",
            graph.len(),
            graph.edge_count()
        );

        graph.check()?;

        let order = graph.order().map_err(|remaining| ContextError::Unsortable {
            remaining: remaining
                .into_iter()
                .map(|index| graph.nodes()[index].identifier.clone())
                .collect(),
        })?;
        tracing::debug!("Constructing {} definitions in order", order.len());

        for index in &order {
            let definition = &graph.nodes()[*index];
            let instance = self.construct(definition)?;

            tracing::debug!("Constructed instance of {}", definition.identifier);
            self.registry.register(definition.identifier.clone(), instance);
        }

        let order = order
            .into_iter()
            .map(|index| graph.nodes()[index].identifier.clone())
            .collect();

        tracing::debug!("Context ready with {} instances", self.registry.len());

        Ok(Context::new(
            self.registry,
            self.hierarchy,
            graph,
            order,
            disabled,
        ))
    }

    /// Resolves all dependencies of `definition` and invokes its factory
    fn construct(&self, definition: &Definition) -> Result<Instance, ContextError> {
        let values = definition
            .dependencies
            .iter()
            .map(|dependency| self.resolve(definition, dependency))
            .collect::<Result<Vec<_>, _>>()?;

        let args = Args::new(values, &self.hierarchy);

        definition
            .construct(&args)
            .map_err(|error| self.factory_error(definition, error))
    }

    /// A property that coerced to its kind but doesn't fit the factory's type is still
    /// an invalid property, not a factory failure
    fn factory_error(&self, definition: &Definition, error: DynError) -> ContextError {
        if let Some(InjectError::PropertyConversion { index, .. }) = error.downcast_ref::<InjectError>() {
            if let Some(Dependency::Property(property)) = definition.dependencies.get(*index) {
                if let Some(value) = self.raw_property(property) {
                    return ContextError::InvalidPropertyType {
                        key: property.key.clone(),
                        expected: property.kind,
                        value,
                        required_by: definition.identifier.clone(),
                    };
                }
            }
        }

        ContextError::FactoryFailed {
            product: definition.identifier.clone(),
            error: Arc::new(error),
        }
    }

    /// Value from the source, falling back to the declared default
    fn raw_property(&self, property: &PropertyIdentifier) -> Option<String> {
        self.properties
            .lookup(&property.key)
            .or_else(|| property.default.clone())
    }

    fn resolve(
        &self,
        definition: &Definition,
        dependency: &Dependency,
    ) -> Result<Resolved, ContextError> {
        match dependency {
            Dependency::Property(property) => {
                self.resolve_property(&definition.identifier, property)
            }
            Dependency::Single(requested) => {
                match self.registry.find_single(&self.hierarchy, requested) {
                    SingleMatch::One(instance) => Ok(Resolved::Single(instance.clone())),
                    SingleMatch::None => Err(ContextError::MissingDependency {
                        dependency: dependency.clone(),
                        required_by: definition.identifier.clone(),
                    }),
                    SingleMatch::Many(candidates) => Err(ContextError::AmbiguousDependency {
                        dependency: dependency.clone(),
                        required_by: definition.identifier.clone(),
                        candidates,
                    }),
                }
            }
            Dependency::List(requested) => {
                Ok(self.registry.find_list(&self.hierarchy, requested))
            }
        }
    }

    fn resolve_property(
        &self,
        required_by: &Identifier,
        property: &PropertyIdentifier,
    ) -> Result<Resolved, ContextError> {
        let Some(raw) = self.raw_property(property) else {
            if property.required {
                return Err(ContextError::MissingProperty {
                    key: property.key.clone(),
                    required_by: required_by.clone(),
                });
            }
            return Ok(Resolved::Property(None));
        };

        let value: PropertyValue = property.kind.coerce(&raw).ok_or_else(|| {
            ContextError::InvalidPropertyType {
                key: property.key.clone(),
                expected: property.kind,
                value: raw.clone(),
                required_by: required_by.clone(),
            }
        })?;

        Ok(Resolved::Property(Some(value)))
    }
}
