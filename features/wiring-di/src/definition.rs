use std::{
    fmt::{Debug, Display},
    hash::Hash,
    marker::PhantomData,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use crate::{
    args::Args,
    properties::{PropertyKind, PropertySource},
    types::{DynError, Injectable, Instance, TypeInfo},
};

/// Key a definition is registered and looked up by
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    pub type_info: TypeInfo,
    pub name: Option<String>,
}
impl Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}#{}", self.type_info, name),
            None => write!(f, "{}", self.type_info),
        }
    }
}
impl Identifier {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Identifier {
            type_info: TypeInfo::of::<T>(),
            name: None,
        }
    }

    pub fn named<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Identifier {
            type_info: TypeInfo::of::<T>(),
            name: Some(name.into()),
        }
    }
}

/// Request for zero or more instances of an element type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListIdentifier {
    /// Type each element must be assignable to
    pub element: TypeInfo,
    /// `Vec<Arc<Element>>`, the type a provider of the whole list declares
    pub list: TypeInfo,
    /// Name of a whole-list provider
    pub name: Option<String>,
    /// Name every element must carry
    pub element_name: Option<String>,
}
impl Display for ListIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}", self.element)?;
        if let Some(element_name) = &self.element_name {
            write!(f, "#{element_name}")?;
        }
        f.write_str("]")?;
        if let Some(name) = &self.name {
            write!(f, "#{name}")?;
        }
        Ok(())
    }
}
impl ListIdentifier {
    pub fn of<T: ?Sized + Send + Sync + 'static>() -> Self {
        ListIdentifier {
            element: TypeInfo::of::<T>(),
            list: TypeInfo::of::<Vec<Arc<T>>>(),
            name: None,
            element_name: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn element_named(mut self, element_name: impl Into<String>) -> Self {
        self.element_name = Some(element_name.into());
        self
    }
}

/// Property resolved from the [`PropertySource`] at construction time
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyIdentifier {
    pub key: String,
    pub required: bool,
    pub kind: PropertyKind,
    /// Raw value used if the source has none
    pub default: Option<String>,
}
impl Display for PropertyIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "property '{}' ({})", self.key, self.kind)
    }
}
impl PropertyIdentifier {
    pub fn new(key: impl Into<String>) -> Self {
        PropertyIdentifier {
            key: key.into(),
            required: true,
            kind: PropertyKind::Text,
            default: None,
        }
    }

    pub fn kind(mut self, kind: PropertyKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn default_value(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// A single declared dependency of a definition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Dependency {
    /// Exactly one instance
    Single(Identifier),
    /// Zero or more instances, never fails
    List(ListIdentifier),
    /// Value from the property source, never part of the graph
    Property(PropertyIdentifier),
}
impl Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dependency::Single(identifier) => Display::fmt(identifier, f),
            Dependency::List(list) => Display::fmt(list, f),
            Dependency::Property(property) => Display::fmt(property, f),
        }
    }
}
impl Dependency {
    pub fn single<T: ?Sized + 'static>() -> Self {
        Dependency::Single(Identifier::of::<T>())
    }

    pub fn named<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Dependency::Single(Identifier::named::<T>(name))
    }

    pub fn list<T: ?Sized + Send + Sync + 'static>() -> Self {
        Dependency::List(ListIdentifier::of::<T>())
    }

    /// Required text property
    pub fn property(key: impl Into<String>) -> Self {
        Dependency::Property(PropertyIdentifier::new(key))
    }

    /// Required property coerced into `kind`
    pub fn property_of(key: impl Into<String>, kind: PropertyKind) -> Self {
        Dependency::Property(PropertyIdentifier::new(key).kind(kind))
    }
}
impl From<Identifier> for Dependency {
    fn from(identifier: Identifier) -> Self {
        Dependency::Single(identifier)
    }
}
impl From<ListIdentifier> for Dependency {
    fn from(list: ListIdentifier) -> Self {
        Dependency::List(list)
    }
}
impl From<PropertyIdentifier> for Dependency {
    fn from(property: PropertyIdentifier) -> Self {
        Dependency::Property(property)
    }
}

type ConditionFn = Arc<dyn Fn(&dyn PropertySource) -> bool + Send + Sync>;

/// Gate deciding whether a definition takes part in the context at all
///
/// Conditions only see the property source, never other singletons.
#[derive(Clone)]
pub enum Condition {
    PropertyPresent(String),
    PropertyAbsent(String),
    PropertyEquals { key: String, value: String },
    Custom(ConditionFn),
}
impl Debug for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Condition::PropertyPresent(key) => f.debug_tuple("PropertyPresent").field(key).finish(),
            Condition::PropertyAbsent(key) => f.debug_tuple("PropertyAbsent").field(key).finish(),
            Condition::PropertyEquals { key, value } => f
                .debug_struct("PropertyEquals")
                .field("key", key)
                .field("value", value)
                .finish(),
            Condition::Custom(_) => f.write_str("Custom"),
        }
    }
}
impl Condition {
    pub fn present(key: impl Into<String>) -> Self {
        Condition::PropertyPresent(key.into())
    }

    pub fn absent(key: impl Into<String>) -> Self {
        Condition::PropertyAbsent(key.into())
    }

    pub fn equals(key: impl Into<String>, value: impl Into<String>) -> Self {
        Condition::PropertyEquals {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn custom(check: impl Fn(&dyn PropertySource) -> bool + Send + Sync + 'static) -> Self {
        Condition::Custom(Arc::new(check))
    }

    pub fn evaluate(&self, properties: &dyn PropertySource) -> bool {
        match self {
            Condition::PropertyPresent(key) => properties.lookup(key).is_some(),
            Condition::PropertyAbsent(key) => properties.lookup(key).is_none(),
            Condition::PropertyEquals { key, value } => {
                properties.lookup(key).as_deref() == Some(value.as_str())
            }
            Condition::Custom(check) => check(properties),
        }
    }
}

/// Process unique token of a definition, used for graph bookkeeping only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct DefinitionId(u64);
impl DefinitionId {
    fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(0);
        DefinitionId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

pub type Factory = Arc<dyn Fn(&Args<'_>) -> Result<Instance, DynError> + Send + Sync>;

/// Recipe for a single singleton: what it provides, what it needs and how to build it
///
/// Equality is identity based, two definitions providing the same identifier are distinct.
#[derive(Clone)]
pub struct Definition {
    id: DefinitionId,
    pub identifier: Identifier,
    /// Declaration order is the positional order of the factory's arguments
    pub dependencies: Vec<Dependency>,
    pub conditions: Vec<Condition>,
    factory: Factory,
}
impl Debug for Definition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Definition")
            .field("identifier", &self.identifier)
            .field("dependencies", &self.dependencies)
            .field("conditions", &self.conditions)
            .finish_non_exhaustive()
    }
}
impl PartialEq for Definition {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for Definition {}
impl Hash for Definition {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Definition {
    /// Starts a definition providing `T`
    pub fn builder<T: ?Sized + Send + Sync + 'static>() -> DefinitionBuilder<T> {
        DefinitionBuilder {
            identifier: Identifier::of::<T>(),
            dependencies: Vec::new(),
            conditions: Vec::new(),
            _product: PhantomData,
        }
    }

    /// Definition handing out an already constructed value
    pub fn instance<T: Injectable>(instance: T) -> Definition {
        Self::shared(Arc::new(instance))
    }

    /// Definition handing out an already shared value, keeping its identity
    pub fn shared<T: ?Sized + Send + Sync + 'static>(instance: Arc<T>) -> Definition {
        Definition::builder::<T>().factory_arc(move |_| Ok::<_, DynError>(instance.clone()))
    }

    /// True if every condition holds for `properties`
    pub fn is_enabled(&self, properties: &dyn PropertySource) -> bool {
        self.conditions
            .iter()
            .all(|condition| condition.evaluate(properties))
    }

    /// Invokes the factory with already resolved arguments
    pub fn construct(&self, args: &Args<'_>) -> Result<Instance, DynError> {
        (self.factory)(args)
    }
}

/// Typed builder for [`Definition`]
///
/// The type parameter fixes the provided type so the factory can't return anything else.
pub struct DefinitionBuilder<T: ?Sized> {
    identifier: Identifier,
    dependencies: Vec<Dependency>,
    conditions: Vec<Condition>,
    _product: PhantomData<fn() -> Arc<T>>,
}
impl<T: ?Sized + Send + Sync + 'static> DefinitionBuilder<T> {
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.identifier.name = Some(name.into());
        self
    }

    pub fn depends_on(mut self, dependency: impl Into<Dependency>) -> Self {
        self.dependencies.push(dependency.into());
        self
    }

    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Finishes the definition with a factory returning a shared value
    pub fn factory_arc<F, E>(self, factory: F) -> Definition
    where
        F: Fn(&Args<'_>) -> Result<Arc<T>, E> + Send + Sync + 'static,
        E: Into<DynError>,
    {
        let factory: Factory = Arc::new(move |args: &Args<'_>| {
            factory(args)
                .map(Instance::from_arc)
                .map_err(|e| e.into())
        });

        Definition {
            id: DefinitionId::next(),
            identifier: self.identifier,
            dependencies: self.dependencies,
            conditions: self.conditions,
            factory,
        }
    }
}
impl<T: Injectable> DefinitionBuilder<T> {
    /// Finishes the definition with a factory returning an owned value
    pub fn factory<F, E>(self, factory: F) -> Definition
    where
        F: Fn(&Args<'_>) -> Result<T, E> + Send + Sync + 'static,
        E: Into<DynError>,
    {
        self.factory_arc(move |args| factory(args).map(Arc::new))
    }
}

/// Supplies definitions to a context builder
///
/// Replaces global discovery: whatever generates definitions is handed in explicitly.
pub trait DefinitionSource {
    fn definitions(&self) -> Vec<Definition>;
}
impl DefinitionSource for Vec<Definition> {
    fn definitions(&self) -> Vec<Definition> {
        self.clone()
    }
}
impl DefinitionSource for [Definition] {
    fn definitions(&self) -> Vec<Definition> {
        self.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn properties(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn definitions_with_same_identifier_are_distinct() {
        let a = Definition::instance(1_u32);
        let b = Definition::instance(1_u32);

        assert_eq!(a.identifier, b.identifier);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn builder_keeps_declaration_order() {
        let definition = Definition::builder::<String>()
            .named("greeting")
            .depends_on(Dependency::single::<u32>())
            .depends_on(Dependency::property("greeting.text"))
            .depends_on(Dependency::list::<u8>())
            .factory(|_| Ok::<_, DynError>(String::new()));

        assert_eq!(
            definition.identifier,
            Identifier::named::<String>("greeting")
        );
        assert_eq!(
            definition.dependencies,
            vec![
                Dependency::single::<u32>(),
                Dependency::property("greeting.text"),
                Dependency::list::<u8>(),
            ]
        );
    }

    #[test]
    fn conditions_are_evaluated_against_properties() {
        let props = properties(&[("feature", "on")]);

        assert!(Condition::present("feature").evaluate(&props));
        assert!(!Condition::absent("feature").evaluate(&props));
        assert!(Condition::equals("feature", "on").evaluate(&props));
        assert!(!Condition::equals("feature", "off").evaluate(&props));
        assert!(Condition::custom(|p| p.lookup("missing").is_none()).evaluate(&props));
    }

    #[test]
    fn all_conditions_must_hold() {
        let definition = Definition::builder::<u8>()
            .condition(Condition::present("a"))
            .condition(Condition::present("b"))
            .factory(|_| Ok::<_, DynError>(1));

        assert!(!definition.is_enabled(&properties(&[("a", "1")])));
        assert!(definition.is_enabled(&properties(&[("a", "1"), ("b", "2")])));
    }

    #[test]
    fn identifiers_display_with_name() {
        assert_eq!(Identifier::named::<u8>("small").to_string(), "u8#small");
        assert_eq!(
            ListIdentifier::of::<u8>().element_named("e").named("l").to_string(),
            "[u8#e]#l"
        );
    }
}
