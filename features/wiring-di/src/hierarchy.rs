use std::{
    collections::{HashMap, HashSet, VecDeque},
    fmt::Debug,
    sync::Arc,
};

use crate::types::{Instance, TypeInfo};

type Upcast = Arc<dyn Fn(&Instance) -> Option<Instance> + Send + Sync>;

/// Manually maintained table of which types are assignable to which
///
/// Rust has no runtime subtyping, so every `Sub -> Super` relation is declared
/// together with the conversion that views a `Sub` as a `Super`.
/// Relations are transitive but never symmetric.
///
/// ```rust
/// use std::sync::Arc;
/// use wiring_di::{TypeHierarchy, TypeInfo};
///
/// trait Greeter: Send + Sync {}
/// struct English;
/// impl Greeter for English {}
///
/// let mut hierarchy = TypeHierarchy::new();
/// hierarchy.declare::<English, dyn Greeter>(|english| english);
///
/// assert!(hierarchy.is_subtype_of(TypeInfo::of::<English>(), TypeInfo::of::<dyn Greeter>()));
/// assert!(!hierarchy.is_subtype_of(TypeInfo::of::<dyn Greeter>(), TypeInfo::of::<English>()));
/// ```
#[derive(Clone, Default)]
pub struct TypeHierarchy {
    supertypes: HashMap<TypeInfo, Vec<(TypeInfo, Upcast)>>,
}
impl Debug for TypeHierarchy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (sub, supers) in &self.supertypes {
            let names: Vec<&str> = supers.iter().map(|(info, _)| info.type_name).collect();
            map.entry(&sub.type_name, &names);
        }
        map.finish()
    }
}

impl TypeHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares that `Sub` is assignable to `Super`
    ///
    /// `upcast` is usually just `|sub| sub`, letting the compiler coerce into a trait object.
    pub fn declare<Sub, Super>(&mut self, upcast: fn(Arc<Sub>) -> Arc<Super>) -> &mut Self
    where
        Sub: ?Sized + Send + Sync + 'static,
        Super: ?Sized + Send + Sync + 'static,
    {
        let cast: Upcast = Arc::new(move |instance: &Instance| {
            instance
                .downcast::<Sub>()
                .ok()
                .map(|sub| Instance::from_arc(upcast(sub)))
        });

        self.supertypes
            .entry(TypeInfo::of::<Sub>())
            .or_default()
            .push((TypeInfo::of::<Super>(), cast));
        self
    }

    /// Builder style version of [`TypeHierarchy::declare`]
    pub fn with<Sub, Super>(mut self, upcast: fn(Arc<Sub>) -> Arc<Super>) -> Self
    where
        Sub: ?Sized + Send + Sync + 'static,
        Super: ?Sized + Send + Sync + 'static,
    {
        self.declare(upcast);
        self
    }

    /// True if `candidate` equals `requested` or is declared (transitively) assignable to it
    pub fn is_subtype_of(&self, candidate: TypeInfo, requested: TypeInfo) -> bool {
        self.path(candidate, requested).is_some()
    }

    /// Views `instance` as `target`, following declared relations
    ///
    /// Returns `None` if the instance's type is not assignable to `target`
    pub fn upcast(&self, instance: &Instance, target: TypeInfo) -> Option<Instance> {
        let path = self.path(instance.info, target)?;

        let mut current = instance.clone();
        for cast in path {
            current = cast(&current)?;
        }
        Some(current)
    }

    /// Breadth first search for the shortest chain of casts from `from` to `to`
    fn path(&self, from: TypeInfo, to: TypeInfo) -> Option<Vec<&Upcast>> {
        if from == to {
            return Some(Vec::new());
        }

        let mut visited = HashSet::from([from]);
        let mut parents: HashMap<TypeInfo, (TypeInfo, &Upcast)> = HashMap::new();
        let mut queue = VecDeque::from([from]);

        while let Some(current) = queue.pop_front() {
            let Some(supers) = self.supertypes.get(&current) else {
                continue;
            };

            for (next, cast) in supers {
                if !visited.insert(*next) {
                    continue;
                }
                parents.insert(*next, (current, cast));

                if *next == to {
                    let mut chain = Vec::new();
                    let mut cursor = to;
                    while let Some((parent, cast)) = parents.get(&cursor) {
                        chain.push(*cast);
                        cursor = *parent;
                    }
                    chain.reverse();
                    return Some(chain);
                }

                queue.push_back(*next);
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Animal: Send + Sync {
        fn name(&self) -> &'static str;
    }
    trait Pet: Animal {
        fn into_animal(self: Arc<Self>) -> Arc<dyn Animal>;
    }
    struct Cat;
    impl Animal for Cat {
        fn name(&self) -> &'static str {
            "cat"
        }
    }
    impl Pet for Cat {
        fn into_animal(self: Arc<Self>) -> Arc<dyn Animal> {
            self
        }
    }

    fn hierarchy() -> TypeHierarchy {
        TypeHierarchy::new()
            .with::<Cat, dyn Pet>(|cat| cat)
            .with::<dyn Pet, dyn Animal>(|pet| pet.into_animal())
    }

    #[test]
    fn reflexive() {
        let hierarchy = TypeHierarchy::new();

        assert!(hierarchy.is_subtype_of(TypeInfo::of::<Cat>(), TypeInfo::of::<Cat>()));
    }

    #[test]
    fn transitive_but_not_symmetric() {
        let hierarchy = hierarchy();

        assert!(hierarchy.is_subtype_of(TypeInfo::of::<Cat>(), TypeInfo::of::<dyn Animal>()));
        assert!(!hierarchy.is_subtype_of(TypeInfo::of::<dyn Animal>(), TypeInfo::of::<Cat>()));
        assert!(!hierarchy.is_subtype_of(TypeInfo::of::<dyn Pet>(), TypeInfo::of::<Cat>()));
    }

    #[test]
    fn upcast_chains_casts_and_keeps_identity() {
        let hierarchy = hierarchy();
        let cat = Arc::new(Cat);
        let instance = Instance::from_arc(cat.clone());

        let animal = hierarchy
            .upcast(&instance, TypeInfo::of::<dyn Animal>())
            .unwrap()
            .downcast::<dyn Animal>()
            .unwrap();

        assert_eq!(animal.name(), "cat");
        assert!(std::ptr::addr_eq(Arc::as_ptr(&animal), Arc::as_ptr(&cat)));
    }

    #[test]
    fn upcast_to_unrelated_type_fails() {
        let hierarchy = hierarchy();
        let instance = Instance::new(5_u32);

        assert!(hierarchy
            .upcast(&instance, TypeInfo::of::<dyn Animal>())
            .is_none());
    }
}
