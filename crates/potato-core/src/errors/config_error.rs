/// Configuration and input loading errors. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse config: {message}")]
    Parse { message: String },

    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("no annotation schemes configured")]
    NoSchemas,

    #[error("duplicate annotation scheme: {name}")]
    DuplicateSchema { name: String },

    #[error("unknown annotation scheme: {name}")]
    UnknownSchema { name: String },

    #[error("missing required field: {field}")]
    MissingField { field: String },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("unsupported format: {format}")]
    UnsupportedFormat { format: String },

    #[error("duplicate instance id: {id}")]
    DuplicateInstance { id: String },
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse {
            message: e.to_string(),
        }
    }
}
