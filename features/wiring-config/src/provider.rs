use std::collections::BTreeMap;

use wiring_di::PropertySource;

use crate::errors::PropertyError;

/// An in memory registry of properties
///
/// Properties can be registered and retrieved by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyMap {
    properties: BTreeMap<String, String>,
}

impl PropertyMap {
    /// Initializes an empty property map
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieve the raw value of a property
    pub fn get_property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Add a property to the registry.
    ///
    /// If the key is already registered, it will return a
    /// [`PropertyError`] and leave the existing value untouched
    pub fn add_property(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<&mut Self, PropertyError> {
        let key = key.into();
        if key.is_empty() {
            return Err(PropertyError::EmptyKey);
        }

        if self.properties.contains_key(&key) {
            return Err(PropertyError::AlreadyRegistered(key));
        }

        self.properties.insert(key, value.into());
        Ok(self)
    }

    /// Can optionally add a property to the registry.
    ///
    /// If the value provided is `Some(value)`, it will be the same as calling [`PropertyMap::add_property`]
    /// If the value provided is `None`, then the function just returns `Ok(self)` for chaining
    pub fn maybe_add_property(
        &mut self,
        key: impl Into<String>,
        value: Option<impl Into<String>>,
    ) -> Result<&mut Self, PropertyError> {
        match value {
            Some(v) => self.add_property(key, v),
            None => Ok(self),
        }
    }

    /// Sets a property, replacing any existing value
    ///
    /// Returns the replaced value
    pub fn set_property(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.properties.insert(key.into(), value.into())
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl PropertySource for PropertyMap {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get_property(key).map(str::to_string)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyMap {
    /// Later pairs overwrite earlier ones
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = PropertyMap::new();
        for (key, value) in iter {
            map.set_property(key, value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_rejects_duplicates() {
        let mut map = PropertyMap::new();
        map.add_property("server.port", "8080").unwrap();

        let err = map.add_property("server.port", "9090").unwrap_err();

        assert_eq!(err, PropertyError::AlreadyRegistered("server.port".into()));
        assert_eq!(map.get_property("server.port"), Some("8080"));
    }

    #[test]
    fn add_rejects_empty_keys() {
        let mut map = PropertyMap::new();

        assert_eq!(map.add_property("", "x").unwrap_err(), PropertyError::EmptyKey);
    }

    #[test]
    fn maybe_add_skips_none() {
        let mut map = PropertyMap::new();
        map.maybe_add_property("a", Some("1"))
            .unwrap()
            .maybe_add_property("b", None::<String>)
            .unwrap();

        assert_eq!(map.len(), 1);
        assert_eq!(map.lookup("a").as_deref(), Some("1"));
        assert_eq!(map.lookup("b"), None);
    }

    #[test]
    fn set_overwrites() {
        let mut map: PropertyMap = [("a", "1")].into_iter().collect();

        assert_eq!(map.set_property("a", "2"), Some("1".to_string()));
        assert_eq!(map.get_property("a"), Some("2"));
    }
}
