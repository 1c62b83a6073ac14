use wiring_di::PropertySource;

/// Reads properties from process environment variables
///
/// `server.port` with prefix `APP` is read from `APP_SERVER_PORT`.
#[derive(Debug, Clone, Default)]
pub struct EnvProperties {
    prefix: String,
}

impl EnvProperties {
    /// Variables are read without prefix
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Name of the environment variable backing `key`
    pub fn variable_name(&self, key: &str) -> String {
        let key: String = key
            .chars()
            .map(|c| match c {
                '.' | '-' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect();

        if self.prefix.is_empty() {
            key
        } else {
            format!("{}_{}", self.prefix.to_ascii_uppercase(), key)
        }
    }
}

impl PropertySource for EnvProperties {
    fn lookup(&self, key: &str) -> Option<String> {
        std::env::var(self.variable_name(key)).ok()
    }
}
