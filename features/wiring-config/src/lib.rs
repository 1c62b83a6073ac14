//! Wiring Config provides the property sources a wiring context reads its properties from.
//!
//! Wiring Config consists of the following components:
//!
//! 1. Provider - an in memory registry of properties, adding and retrieving them
//! 2. Env - properties backed by environment variables
//! 3. Layered - stacking sources so earlier ones override later ones
//! 4. Errors - for property registration errors
//!
//! # Examples
//!
//! ```rust
//! use wiring_config::{EnvProperties, LayeredProperties, PropertyMap};
//! use wiring_di::PropertySource;
//!
//! let mut defaults = PropertyMap::new();
//! defaults
//!     .add_property("server.host", "localhost")
//!     .unwrap()
//!     .add_property("server.port", "8080")
//!     .unwrap();
//!
//! let properties = LayeredProperties::new()
//!     .with_layer(EnvProperties::with_prefix("MY_APP"))
//!     .with_layer(defaults);
//!
//! assert!(properties.lookup("server.host").is_some());
//! ```

pub mod env;
pub mod errors;
pub mod layered;
pub mod provider;

pub use env::EnvProperties;
pub use errors::PropertyError;
pub use layered::LayeredProperties;
pub use provider::PropertyMap;
