use std::{any::type_name, sync::Arc};

use crate::{
    errors::InjectError,
    hierarchy::TypeHierarchy,
    properties::{FromProperty, PropertyValue},
    types::{Instance, TypeInfo},
};

/// A dependency after resolution
#[derive(Debug, Clone)]
pub enum Resolved {
    Single(Instance),
    /// Every instance matching the element type, in construction order
    Elements(Vec<Instance>),
    /// Providers of the whole list type, concatenated
    WholeList(Vec<Instance>),
    /// `None` for an optional property without value
    Property(Option<PropertyValue>),
}

/// Resolved dependencies of a definition, in declaration order
///
/// Handed to the factory; the typed accessors apply declared upcasts so a factory
/// can ask for the type it declared even if a subtype was injected.
pub struct Args<'a> {
    values: Vec<Resolved>,
    hierarchy: &'a TypeHierarchy,
}

impl<'a> Args<'a> {
    pub fn new(values: Vec<Resolved>, hierarchy: &'a TypeHierarchy) -> Self {
        Self { values, hierarchy }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw resolved value at `index`
    pub fn get(&self, index: usize) -> Result<&Resolved, InjectError> {
        self.values.get(index).ok_or(InjectError::IndexOutOfRange {
            index,
            len: self.values.len(),
        })
    }

    /// The singular dependency at `index`, viewed as `T`
    pub fn single<T: ?Sized + Send + Sync + 'static>(
        &self,
        index: usize,
    ) -> Result<Arc<T>, InjectError> {
        match self.get(index)? {
            Resolved::Single(instance) => cast(self.hierarchy, instance),
            _ => Err(InjectError::ShapeMismatch {
                index,
                expected: "singular",
            }),
        }
    }

    /// The list dependency at `index`, each element viewed as `T`
    pub fn list<T: ?Sized + Send + Sync + 'static>(
        &self,
        index: usize,
    ) -> Result<Vec<Arc<T>>, InjectError> {
        match self.get(index)? {
            Resolved::Elements(instances) => instances
                .iter()
                .map(|instance| cast(self.hierarchy, instance))
                .collect(),
            Resolved::WholeList(providers) => {
                let mut elements = Vec::new();
                for provider in providers {
                    let list = cast::<Vec<Arc<T>>>(self.hierarchy, provider)?;
                    elements.extend(list.iter().cloned());
                }
                Ok(elements)
            }
            _ => Err(InjectError::ShapeMismatch {
                index,
                expected: "list",
            }),
        }
    }

    /// The property at `index`, failing if it has no value
    pub fn property<T: FromProperty>(&self, index: usize) -> Result<T, InjectError> {
        self.optional_property(index)?
            .ok_or(InjectError::PropertyAbsent { index })
    }

    /// The property at `index`, `None` if an optional property had no value
    pub fn optional_property<T: FromProperty>(
        &self,
        index: usize,
    ) -> Result<Option<T>, InjectError> {
        let value = match self.get(index)? {
            Resolved::Property(value) => value,
            _ => {
                return Err(InjectError::ShapeMismatch {
                    index,
                    expected: "property",
                })
            }
        };

        value
            .as_ref()
            .map(|value| {
                T::from_property(value).ok_or(InjectError::PropertyConversion {
                    index,
                    actual: value.kind(),
                    required_type: type_name::<T>(),
                })
            })
            .transpose()
    }
}

/// Views `instance` as `T`, upcasting along the hierarchy if needed
pub(crate) fn cast<T: ?Sized + Send + Sync + 'static>(
    hierarchy: &TypeHierarchy,
    instance: &Instance,
) -> Result<Arc<T>, InjectError> {
    let failed = || InjectError::DowncastFailed {
        required_type: type_name::<T>(),
        actual_type: instance.info.type_name,
    };

    if let Ok(value) = instance.downcast::<T>() {
        return Ok(value);
    }

    hierarchy
        .upcast(instance, TypeInfo::of::<T>())
        .ok_or_else(failed)?
        .downcast::<T>()
        .map_err(|_| failed())
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Shape: Send + Sync {
        fn sides(&self) -> u32;
    }
    struct Square;
    impl Shape for Square {
        fn sides(&self) -> u32 {
            4
        }
    }
    struct Triangle;
    impl Shape for Triangle {
        fn sides(&self) -> u32 {
            3
        }
    }

    fn hierarchy() -> TypeHierarchy {
        TypeHierarchy::new()
            .with::<Square, dyn Shape>(|square| square)
            .with::<Triangle, dyn Shape>(|triangle| triangle)
    }

    #[test]
    fn single_upcasts_to_declared_type() {
        let hierarchy = hierarchy();
        let args = Args::new(vec![Resolved::Single(Instance::new(Square))], &hierarchy);

        let shape = args.single::<dyn Shape>(0).unwrap();

        assert_eq!(shape.sides(), 4);
        assert!(args.single::<Square>(0).is_ok());
        assert!(matches!(
            args.single::<Triangle>(0),
            Err(InjectError::DowncastFailed { .. })
        ));
    }

    #[test]
    fn list_reads_elements_and_whole_lists() {
        let hierarchy = hierarchy();
        let whole: Vec<Arc<dyn Shape>> = vec![Arc::new(Triangle), Arc::new(Square)];
        let args = Args::new(
            vec![
                Resolved::Elements(vec![Instance::new(Square), Instance::new(Triangle)]),
                Resolved::WholeList(vec![Instance::new(whole)]),
                Resolved::Elements(Vec::new()),
            ],
            &hierarchy,
        );

        let elements: Vec<u32> = args
            .list::<dyn Shape>(0)
            .unwrap()
            .iter()
            .map(|shape| shape.sides())
            .collect();
        let whole: Vec<u32> = args
            .list::<dyn Shape>(1)
            .unwrap()
            .iter()
            .map(|shape| shape.sides())
            .collect();

        assert_eq!(elements, vec![4, 3]);
        assert_eq!(whole, vec![3, 4]);
        assert!(args.list::<dyn Shape>(2).unwrap().is_empty());
    }

    #[test]
    fn properties_convert_or_report() {
        let hierarchy = TypeHierarchy::new();
        let args = Args::new(
            vec![
                Resolved::Property(Some(PropertyValue::Integer(8080))),
                Resolved::Property(None),
                Resolved::Single(Instance::new(1_u8)),
            ],
            &hierarchy,
        );

        assert_eq!(args.property::<u16>(0).unwrap(), 8080);
        assert!(matches!(
            args.property::<bool>(0),
            Err(InjectError::PropertyConversion { .. })
        ));
        assert_eq!(args.optional_property::<String>(1).unwrap(), None);
        assert!(matches!(
            args.property::<String>(1),
            Err(InjectError::PropertyAbsent { index: 1 })
        ));
        assert!(matches!(
            args.property::<String>(2),
            Err(InjectError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            args.single::<u8>(3),
            Err(InjectError::IndexOutOfRange { index: 3, len: 3 })
        ));
    }
}
