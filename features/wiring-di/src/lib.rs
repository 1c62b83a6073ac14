//! Wiring DI builds a fully wired set of singletons from a flat list of definitions.
//!
//! The container consists of three parts:
//! 1. [`Definition`]s describe what a singleton provides, what it depends on and how to build it
//! 2. The [`ContextBuilder`] collects them together with a [`PropertySource`] and a [`TypeHierarchy`]
//! 3. Building resolves the graph, checks for cycles and constructs every singleton in
//!    dependency order, producing a read only [`Context`]
//!
//! # Examples
//!
//! ```rust
//! use std::{collections::HashMap, sync::Arc};
//! use wiring_di::{Context, Definition, Dependency, DynError, PropertyKind, TypeHierarchy};
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct English {
//!     name: String,
//! }
//! impl Greeter for English {
//!     fn greet(&self) -> String {
//!         format!("Hello {}", self.name)
//!     }
//! }
//!
//! struct Greetings {
//!     greeters: Vec<Arc<dyn Greeter>>,
//!     repeat: u32,
//! }
//!
//! let properties = HashMap::from([("greeting.repeat".to_string(), "2".to_string())]);
//!
//! let context = Context::builder()
//!     .with_properties(properties)
//!     .with_hierarchy(TypeHierarchy::new().with::<English, dyn Greeter>(|english| english))
//!     .add_definition(
//!         Definition::builder::<English>()
//!             .factory(|_| Ok::<_, DynError>(English { name: "World".into() })),
//!     )
//!     .add_definition(
//!         Definition::builder::<Greetings>()
//!             .depends_on(Dependency::list::<dyn Greeter>())
//!             .depends_on(Dependency::property_of("greeting.repeat", PropertyKind::Integer))
//!             .factory(|args| {
//!                 Ok::<_, DynError>(Greetings {
//!                     greeters: args.list::<dyn Greeter>(0)?,
//!                     repeat: args.property(1)?,
//!                 })
//!             }),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let greetings = context.require::<Greetings>().unwrap();
//! assert_eq!(greetings.greeters[0].greet(), "Hello World");
//! assert_eq!(greetings.repeat, 2);
//! ```

pub mod args;
pub mod builder;
pub mod container;
pub mod definition;
pub mod dependency_graph;
pub mod errors;
pub mod hierarchy;
pub mod matcher;
pub mod properties;
pub mod types;

mod initiator;
mod registry;

pub use args::{Args, Resolved};
pub use builder::ContextBuilder;
pub use container::Context;
pub use definition::{
    Condition, Definition, DefinitionBuilder, DefinitionSource, Dependency, Identifier,
    ListIdentifier, PropertyIdentifier,
};
pub use dependency_graph::{Cycle, CycleErrors, DependencyGraph};
pub use errors::{ContextError, InjectError, ResolveError};
pub use hierarchy::TypeHierarchy;
pub use matcher::{ListSelection, Matcher};
pub use properties::{FromProperty, NoProperties, PropertyKind, PropertySource, PropertyValue};
pub use types::{DynError, Injectable, Instance, TypeInfo};
