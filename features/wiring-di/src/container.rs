use std::{any::type_name, fmt::Debug, sync::Arc};

use crate::{
    args::{self, Resolved},
    builder::ContextBuilder,
    definition::{Identifier, ListIdentifier},
    dependency_graph::DependencyGraph,
    errors::{InjectError, ResolveError},
    hierarchy::TypeHierarchy,
    registry::{Registry, SingleMatch},
    types::Instance,
};

/// Context holding all constructed singletons
///
/// Cheap to clone and never mutated after construction, so it can be shared freely between threads.
#[derive(Clone)]
pub struct Context(Arc<ContextInner>);
struct ContextInner {
    registry: Registry,
    hierarchy: TypeHierarchy,
    graph: DependencyGraph,
    order: Vec<Identifier>,
    disabled: Vec<Identifier>,
}
impl Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (identifier, _) in self.0.registry.entries() {
            map.entry(&identifier.to_string(), &"enabled");
        }
        for identifier in &self.0.disabled {
            map.entry(&identifier.to_string(), &"disabled");
        }
        map.finish()
    }
}

impl Context {
    pub fn builder() -> ContextBuilder {
        ContextBuilder::new()
    }

    pub(crate) fn new(
        registry: Registry,
        hierarchy: TypeHierarchy,
        graph: DependencyGraph,
        order: Vec<Identifier>,
        disabled: Vec<Identifier>,
    ) -> Self {
        Self(Arc::new(ContextInner {
            registry,
            hierarchy,
            graph,
            order,
            disabled,
        }))
    }

    /// Number of registered instances
    pub fn size(&self) -> usize {
        self.0.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Singular lookup, `None` if nothing matches
    ///
    /// More than one match is an error, just as it would be during construction
    pub fn find(&self, identifier: &Identifier) -> Result<Option<Instance>, ResolveError> {
        match self.0.registry.find_single(&self.0.hierarchy, identifier) {
            SingleMatch::None => Ok(None),
            SingleMatch::One(instance) => Ok(Some(instance.clone())),
            SingleMatch::Many(candidates) => Err(ResolveError::Ambiguous {
                requested: identifier.clone(),
                candidates,
            }),
        }
    }

    /// Singular lookup, failing if nothing matches
    pub fn get(&self, identifier: &Identifier) -> Result<Instance, ResolveError> {
        self.find(identifier)?
            .ok_or_else(|| ResolveError::Missing(identifier.clone()))
    }

    /// List lookup, an empty list if nothing matches
    pub fn find_list(&self, identifier: &ListIdentifier) -> Vec<Instance> {
        match self.0.registry.find_list(&self.0.hierarchy, identifier) {
            Resolved::Elements(instances) | Resolved::WholeList(instances) => instances,
            Resolved::Single(_) | Resolved::Property(_) => Vec::new(),
        }
    }

    /// Attempts to get the single instance of `T`
    pub fn require<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, ResolveError> {
        let instance = self.get(&Identifier::of::<T>())?;
        self.cast(&instance)
    }

    /// Attempts to get the single instance of `T` registered under `name`
    pub fn require_named<T: ?Sized + Send + Sync + 'static>(
        &self,
        name: &str,
    ) -> Result<Arc<T>, ResolveError> {
        let instance = self.get(&Identifier::named::<T>(name))?;
        self.cast(&instance)
    }

    /// Like [`Context::require`] but `None` if nothing is registered
    pub fn try_require<T: ?Sized + Send + Sync + 'static>(
        &self,
    ) -> Result<Option<Arc<T>>, ResolveError> {
        self.find(&Identifier::of::<T>())?
            .map(|instance| self.cast(&instance))
            .transpose()
    }

    /// All instances assignable to `T`, or the provided `Vec<Arc<T>>` if there are none
    pub fn require_all<T: ?Sized + Send + Sync + 'static>(
        &self,
    ) -> Result<Vec<Arc<T>>, ResolveError> {
        let resolved = self
            .0
            .registry
            .find_list(&self.0.hierarchy, &ListIdentifier::of::<T>());

        args::Args::new(vec![resolved], &self.0.hierarchy)
            .list::<T>(0)
            .map_err(|e| downcast_error::<T>(e))
    }

    /// Registered identifiers and instances, in construction order
    pub fn entries(&self) -> impl Iterator<Item = (&Identifier, &Instance)> {
        self.0
            .registry
            .entries()
            .iter()
            .map(|(identifier, instance)| (identifier, instance))
    }

    /// Identifiers in the order they were constructed
    pub fn order(&self) -> &[Identifier] {
        &self.0.order
    }

    /// Identifiers excluded by their conditions
    pub fn disabled(&self) -> &[Identifier] {
        &self.0.disabled
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.0.graph
    }

    pub fn hierarchy(&self) -> &TypeHierarchy {
        &self.0.hierarchy
    }

    fn cast<T: ?Sized + Send + Sync + 'static>(
        &self,
        instance: &Instance,
    ) -> Result<Arc<T>, ResolveError> {
        args::cast(&self.0.hierarchy, instance).map_err(|e| downcast_error::<T>(e))
    }
}

fn downcast_error<T: ?Sized>(error: InjectError) -> ResolveError {
    match error {
        InjectError::DowncastFailed {
            required_type,
            actual_type,
        } => ResolveError::DowncastFailed {
            required_type,
            actual_type,
        },
        _ => ResolveError::DowncastFailed {
            required_type: type_name::<T>(),
            actual_type: "unknown",
        },
    }
}
