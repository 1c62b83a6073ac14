use std::{
    collections::{BTreeMap, HashMap},
    fmt::Display,
    sync::Arc,
};

/// Key/value source the container reads property dependencies and conditions from
///
/// Implementations live outside of this crate (see `wiring-config`),
/// plain maps work out of the box.
pub trait PropertySource: Send + Sync {
    /// Returns the raw value for `key`, or `None` if the source does not know it
    fn lookup(&self, key: &str) -> Option<String>;
}

impl PropertySource for HashMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}
impl PropertySource for BTreeMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}
impl<T: PropertySource + ?Sized> PropertySource for Arc<T> {
    fn lookup(&self, key: &str) -> Option<String> {
        (**self).lookup(key)
    }
}
impl<T: PropertySource + ?Sized> PropertySource for Box<T> {
    fn lookup(&self, key: &str) -> Option<String> {
        (**self).lookup(key)
    }
}
impl<T: PropertySource + ?Sized> PropertySource for &T {
    fn lookup(&self, key: &str) -> Option<String> {
        (**self).lookup(key)
    }
}

/// Source without any properties
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProperties;
impl PropertySource for NoProperties {
    fn lookup(&self, _key: &str) -> Option<String> {
        None
    }
}

/// Shape a property value is coerced into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PropertyKind {
    /// Verbatim string
    #[default]
    Text,
    /// Signed 64 bit integer
    Integer,
    /// 64 bit float
    Float,
    /// `true` or `false`, case insensitive
    Boolean,
    /// Comma separated list, items are trimmed and empty items dropped
    List,
}
impl Display for PropertyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PropertyKind::Text => "text",
            PropertyKind::Integer => "integer",
            PropertyKind::Float => "float",
            PropertyKind::Boolean => "boolean",
            PropertyKind::List => "list",
        };
        f.write_str(name)
    }
}

impl PropertyKind {
    /// Coerces a raw value into this shape
    ///
    /// Returns `None` if the raw value does not fit the shape
    pub fn coerce(&self, raw: &str) -> Option<PropertyValue> {
        match self {
            PropertyKind::Text => Some(PropertyValue::Text(raw.to_string())),
            PropertyKind::Integer => raw.trim().parse().ok().map(PropertyValue::Integer),
            PropertyKind::Float => raw.trim().parse().ok().map(PropertyValue::Float),
            PropertyKind::Boolean => {
                let raw = raw.trim();
                if raw.eq_ignore_ascii_case("true") {
                    Some(PropertyValue::Boolean(true))
                } else if raw.eq_ignore_ascii_case("false") {
                    Some(PropertyValue::Boolean(false))
                } else {
                    None
                }
            }
            PropertyKind::List => Some(PropertyValue::List(
                raw.split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect(),
            )),
        }
    }
}

/// A coerced property value
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    List(Vec<String>),
}

impl PropertyValue {
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::Text(_) => PropertyKind::Text,
            PropertyValue::Integer(_) => PropertyKind::Integer,
            PropertyValue::Float(_) => PropertyKind::Float,
            PropertyValue::Boolean(_) => PropertyKind::Boolean,
            PropertyValue::List(_) => PropertyKind::List,
        }
    }
}

/// Conversion from a coerced property into a factory argument
pub trait FromProperty: Sized {
    fn from_property(value: &PropertyValue) -> Option<Self>;
}

impl FromProperty for PropertyValue {
    fn from_property(value: &PropertyValue) -> Option<Self> {
        Some(value.clone())
    }
}
impl FromProperty for String {
    fn from_property(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Text(text) => Some(text.clone()),
            PropertyValue::Integer(number) => Some(number.to_string()),
            PropertyValue::Float(number) => Some(number.to_string()),
            PropertyValue::Boolean(flag) => Some(flag.to_string()),
            PropertyValue::List(items) => Some(items.join(",")),
        }
    }
}
impl FromProperty for bool {
    fn from_property(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Boolean(flag) => Some(*flag),
            _ => None,
        }
    }
}
impl FromProperty for f64 {
    fn from_property(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Float(number) => Some(*number),
            PropertyValue::Integer(number) => Some(*number as f64),
            _ => None,
        }
    }
}
impl FromProperty for Vec<String> {
    fn from_property(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::List(items) => Some(items.clone()),
            _ => None,
        }
    }
}

macro_rules! integer_from_property {
    ($($int:ty),*) => {
        $(
            impl FromProperty for $int {
                fn from_property(value: &PropertyValue) -> Option<Self> {
                    match value {
                        PropertyValue::Integer(number) => (*number).try_into().ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}
integer_from_property!(i64, i32, u16, u32, u64, usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerces_each_kind() {
        assert_eq!(
            PropertyKind::Integer.coerce(" 8080 "),
            Some(PropertyValue::Integer(8080))
        );
        assert_eq!(
            PropertyKind::Float.coerce("0.5"),
            Some(PropertyValue::Float(0.5))
        );
        assert_eq!(
            PropertyKind::Boolean.coerce("TRUE"),
            Some(PropertyValue::Boolean(true))
        );
        assert_eq!(
            PropertyKind::Text.coerce(" padded "),
            Some(PropertyValue::Text(" padded ".to_string()))
        );
        assert_eq!(
            PropertyKind::List.coerce("a, b,,c "),
            Some(PropertyValue::List(vec![
                "a".to_string(),
                "b".to_string(),
                "c".to_string()
            ]))
        );
    }

    #[test]
    fn rejects_values_of_wrong_shape() {
        assert_eq!(PropertyKind::Integer.coerce("eighty"), None);
        assert_eq!(PropertyKind::Boolean.coerce("yes"), None);
        assert_eq!(PropertyKind::Float.coerce(""), None);
    }

    #[test]
    fn integers_convert_with_range_checks() {
        let port = PropertyValue::Integer(8080);
        let negative = PropertyValue::Integer(-1);

        assert_eq!(u16::from_property(&port), Some(8080));
        assert_eq!(u16::from_property(&negative), None);
        assert_eq!(i32::from_property(&negative), Some(-1));
        assert_eq!(bool::from_property(&port), None);
    }

    #[test]
    fn maps_are_sources() {
        let mut map = HashMap::new();
        map.insert("a".to_string(), "1".to_string());
        let shared: Arc<dyn PropertySource> = Arc::new(map);

        assert_eq!(shared.lookup("a").as_deref(), Some("1"));
        assert_eq!(shared.lookup("b"), None);
        assert_eq!(NoProperties.lookup("a"), None);
    }
}
