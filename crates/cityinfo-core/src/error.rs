use thiserror::Error;

/// Application-wide error types for CityInfo.
#[derive(Error, Debug)]
pub enum AppError {
    /// Credentials or bearer token were rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Request input failed validation (bad upload, malformed query).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The requested API version is not served by the route.
    #[error("Unsupported API version: {0}")]
    UnsupportedApiVersion(String),

    /// The requested resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Seed or stored data violates a model constraint.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Token could not be signed or decoded.
    #[error("Token error: {0}")]
    TokenError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Configuration is missing or malformed.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Returns true if this error was caused by the client rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::Unauthorized(_)
                | AppError::Validation(_)
                | AppError::UnsupportedApiVersion(_)
                | AppError::NotFound(_)
        )
    }
}
