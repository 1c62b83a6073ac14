use std::{fmt::Debug, sync::Arc};

use wiring_di::PropertySource;

/// Ordered stack of sources, the first source knowing a key wins
#[derive(Clone, Default)]
pub struct LayeredProperties {
    layers: Vec<Arc<dyn PropertySource>>,
}
impl Debug for LayeredProperties {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayeredProperties")
            .field("layers", &self.layers.len())
            .finish()
    }
}

impl LayeredProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a layer with lower priority than all existing ones
    pub fn with_layer(mut self, layer: impl PropertySource + 'static) -> Self {
        self.layers.push(Arc::new(layer));
        self
    }

    pub fn push_shared(&mut self, layer: Arc<dyn PropertySource>) -> &mut Self {
        self.layers.push(layer);
        self
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl PropertySource for LayeredProperties {
    fn lookup(&self, key: &str) -> Option<String> {
        self.layers.iter().find_map(|layer| layer.lookup(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::PropertyMap;

    #[test]
    fn first_layer_wins() {
        let overrides: PropertyMap = [("port", "9090")].into_iter().collect();
        let defaults: PropertyMap = [("port", "8080"), ("host", "localhost")]
            .into_iter()
            .collect();

        let layered = LayeredProperties::new()
            .with_layer(overrides)
            .with_layer(defaults);

        assert_eq!(layered.lookup("port").as_deref(), Some("9090"));
        assert_eq!(layered.lookup("host").as_deref(), Some("localhost"));
        assert_eq!(layered.lookup("missing"), None);
    }
}
