use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("duplicate: {0}")]
    Duplicate(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid permission '{permission}': {reason}")]
    InvalidPermission { permission: String, reason: String },

    #[error("database error: {0}")]
    Database(String),

    // Config
    #[error("configuration error: {0}")]
    Config(String),

    #[error("configuration file not found at {0}; run `gatehouse init` first")]
    ConfigNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(String),

    #[error("TOML serialization error: {0}")]
    TomlSer(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub(crate) fn invalid_permission(permission: &str, reason: &str) -> Self {
        AuthError::InvalidPermission {
            permission: permission.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<rusqlite::Error> for AuthError {
    fn from(e: rusqlite::Error) -> Self {
        AuthError::Database(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
