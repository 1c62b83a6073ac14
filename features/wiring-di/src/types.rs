use std::{
    any::{Any, TypeId},
    fmt::Debug,
    sync::Arc,
};

/// Errors returned by factories
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Instances are shared across threads once the context is ready,
/// so anything injectable needs to be Send + Sync + 'static
pub trait Injectable: Send + Sync + 'static {}
impl<T: Send + Sync + 'static> Injectable for T {}

/// Type erased, shared handle to a constructed singleton
///
/// The handle stores an `Arc<T>` where `T` may be unsized (e.g. a trait object),
/// so downcasting always hands out the very same allocation.
#[derive(Clone)]
pub struct Instance {
    pub info: TypeInfo,
    value: Arc<dyn Any + Send + Sync + 'static>,
}
impl Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Instance").field(&self.info.type_name).finish()
    }
}

impl Instance {
    pub fn new<T: Injectable>(instance: T) -> Self {
        Self::from_arc(Arc::new(instance))
    }

    /// Wraps an existing shared value, the value keeps its identity
    pub fn from_arc<T: ?Sized + Send + Sync + 'static>(instance: Arc<T>) -> Self {
        Instance {
            info: TypeInfo::of::<T>(),
            value: Arc::new(instance),
        }
    }

    /// Returns the shared value if this instance holds a `T`
    ///
    /// On failure the type name of the held value is returned
    pub fn downcast<T: ?Sized + 'static>(&self) -> Result<Arc<T>, &'static str> {
        match self.value.downcast_ref::<Arc<T>>() {
            Some(downcasted) => Ok(downcasted.clone()),
            None => Err(self.info.type_name),
        }
    }

    /// True if both handles point to the same constructed value
    pub fn same_instance(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

/// Type Name and Type Id
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
}
impl std::fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}
impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Speak: Send + Sync {
        fn speak(&self) -> &'static str;
    }
    struct Dog;
    impl Speak for Dog {
        fn speak(&self) -> &'static str {
            "woof"
        }
    }

    #[test]
    fn downcast_returns_same_allocation() {
        let instance = Instance::new(42_u32);

        let first = instance.downcast::<u32>().unwrap();
        let second = instance.clone().downcast::<u32>().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*first, 42);
    }

    #[test]
    fn downcast_to_wrong_type_reports_actual_type() {
        let instance = Instance::new(String::from("hello"));

        let err = instance.downcast::<u32>().unwrap_err();

        assert_eq!(err, std::any::type_name::<String>());
    }

    #[test]
    fn trait_objects_can_be_stored() {
        let dog: Arc<dyn Speak> = Arc::new(Dog);
        let instance = Instance::from_arc(dog);

        assert_eq!(instance.info, TypeInfo::of::<dyn Speak>());
        assert_eq!(instance.downcast::<dyn Speak>().unwrap().speak(), "woof");
        assert!(instance.downcast::<Dog>().is_err());
    }

    #[test]
    fn same_instance_compares_identity() {
        let a = Instance::new(1_u8);
        let b = Instance::new(1_u8);

        assert!(a.same_instance(&a.clone()));
        assert!(!a.same_instance(&b));
    }
}
