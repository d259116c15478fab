use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Lookup failed during {operation}: {message}")]
    Lookup { operation: String, message: String },

    #[error("Registration failed for instance {instance_id} on service {service_id}: {message}")]
    Registration {
        service_id: String,
        instance_id: String,
        message: String,
    },

    #[error("Invalid event: {message}")]
    InvalidEvent { message: String },

    #[error("Instance {instance_id} has no private address")]
    MissingAddress { instance_id: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl SyncError {
    pub fn lookup(operation: impl Into<String>, message: impl std::fmt::Display) -> Self {
        SyncError::Lookup {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    /// 致命錯誤會中止整個調用，交由觸發端重試或告警
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SyncError::Registration { .. })
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
