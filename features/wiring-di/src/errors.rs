use std::sync::Arc;

use thiserror::Error;

use crate::{
    definition::{Dependency, Identifier},
    dependency_graph::CycleErrors,
    properties::PropertyKind,
    types::DynError,
};

/// Errors a factory can hit while reading its arguments
#[derive(Error, Debug, Clone)]
pub enum InjectError {
    /// The factory asked for more arguments than it declared
    #[error("Argument {index} requested but only {len} dependencies were declared")]
    IndexOutOfRange { index: usize, len: usize },
    /// The declared dependency has another shape than the one requested
    #[error("Argument {index} is not a {expected} dependency")]
    ShapeMismatch { index: usize, expected: &'static str },
    /// The resolved instance can't be viewed as the requested type
    #[error("Failed to downcast, required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        required_type: &'static str,
        actual_type: &'static str,
    },
    /// Optional property without value read as required
    #[error("Property at argument {index} has no value")]
    PropertyAbsent { index: usize },
    /// The coerced property can't be converted into the requested type
    #[error("Property at argument {index} is {actual}, can't be read as '{required_type}'")]
    PropertyConversion {
        index: usize,
        actual: PropertyKind,
        required_type: &'static str,
    },
}

/// Errors when looking up instances in a ready [`Context`](crate::Context)
#[derive(Error, Debug, Clone)]
pub enum ResolveError {
    /// Nothing registered matches the identifier
    #[error("No instance matches '{0}'")]
    Missing(Identifier),
    /// More than one instance matches a singular lookup
    #[error("'{requested}' is ambiguous, candidates: {}", join(.candidates))]
    Ambiguous {
        requested: Identifier,
        candidates: Vec<Identifier>,
    },
    #[error("Failed to downcast, required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        required_type: &'static str,
        actual_type: &'static str,
    },
}

/// Errors while constructing a [`Context`](crate::Context)
///
/// All of them abort construction, no partial context is ever returned.
#[derive(Error, Debug, Clone)]
pub enum ContextError {
    /// A singular dependency matched more than one candidate
    #[error(
        "'{required_by}' needs '{dependency}' but it is ambiguous, candidates: {}",
        join(.candidates)
    )]
    AmbiguousDependency {
        dependency: Dependency,
        required_by: Identifier,
        candidates: Vec<Identifier>,
    },
    /// A singular dependency matched nothing
    #[error("'{required_by}' needs '{dependency}' but it is missing")]
    MissingDependency {
        dependency: Dependency,
        required_by: Identifier,
    },
    /// The graph has one or more cycles
    #[error(transparent)]
    CyclicDependency(#[from] CycleErrors),
    /// A required property has no value and no default
    #[error("'{required_by}' needs property '{key}' but it is not set")]
    MissingProperty { key: String, required_by: Identifier },
    /// A property value doesn't fit the declared shape
    #[error("'{required_by}' needs property '{key}' as {expected}, got '{value}'")]
    InvalidPropertyType {
        key: String,
        expected: PropertyKind,
        value: String,
        required_by: Identifier,
    },
    /// A factory failed to build
    #[error("Factory for '{product}' failed - error: {error}")]
    FactoryFailed {
        product: Identifier,
        error: Arc<DynError>,
    },
    /// The sorter could not order every node
    #[error("Could not order definitions, unsorted: {}", join(.remaining))]
    Unsortable { remaining: Vec<Identifier> },
}

impl ContextError {
    /// Cycles reported, empty for any other error
    pub fn cycles(&self) -> &[crate::dependency_graph::Cycle] {
        match self {
            ContextError::CyclicDependency(errors) => &errors.cycles,
            _ => &[],
        }
    }
}

fn join(identifiers: &[Identifier]) -> String {
    identifiers
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
