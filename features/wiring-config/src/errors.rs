/// Errors when trying to register a property
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    /// The key is already registered
    #[error("The property '{0}' is already registered")]
    AlreadyRegistered(String),
    /// Keys must not be empty
    #[error("Property keys must not be empty")]
    EmptyKey,
}
