use thiserror::Error;

/// Core error types for CareOps operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid route configuration: {0}")]
    InvalidRouteConfig(String),

    #[error("Route not found: {0}")]
    RouteNotFound(String),

    #[error("Unknown component: {0}")]
    UnknownComponent(String),

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid search filter: {message}")]
    InvalidFilter { message: String },

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("UUID error: {0}")]
    UuidError(#[from] uuid::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CoreError {
    /// Create a new InvalidRouteConfig error
    pub fn invalid_route_config(message: impl Into<String>) -> Self {
        Self::InvalidRouteConfig(message.into())
    }

    /// Create a new RouteNotFound error
    pub fn route_not_found(path: impl Into<String>) -> Self {
        Self::RouteNotFound(path.into())
    }

    /// Create a new UnknownComponent error
    pub fn unknown_component(name: impl Into<String>) -> Self {
        Self::UnknownComponent(name.into())
    }

    /// Create a new UnknownTable error
    pub fn unknown_table(table: impl Into<String>) -> Self {
        Self::UnknownTable(table.into())
    }

    /// Create a new InvalidIdentifier error
    pub fn invalid_identifier(name: impl Into<String>) -> Self {
        Self::InvalidIdentifier(name.into())
    }

    /// Create a new InvalidFilter error
    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::InvalidFilter {
            message: message.into(),
        }
    }

    /// Create a new Backend error
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    /// Create a new Configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Check if this error is a client error (4xx category)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::RouteNotFound(_)
                | Self::UnknownTable(_)
                | Self::InvalidIdentifier(_)
                | Self::InvalidFilter { .. }
                | Self::JsonError(_)
        )
    }

    /// Check if this error is a server error (5xx category)
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRouteConfig(_)
                | Self::UnknownComponent(_)
                | Self::Backend(_)
                | Self::Configuration(_)
                | Self::UuidError(_)
        )
    }

    /// Get error category for logging/monitoring
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidRouteConfig(_) | Self::UnknownComponent(_) | Self::Configuration(_) => {
                ErrorCategory::Configuration
            }
            Self::RouteNotFound(_) | Self::UnknownTable(_) => ErrorCategory::NotFound,
            Self::InvalidIdentifier(_) | Self::InvalidFilter { .. } => ErrorCategory::Validation,
            Self::Backend(_) => ErrorCategory::Backend,
            Self::JsonError(_) => ErrorCategory::Serialization,
            Self::UuidError(_) => ErrorCategory::System,
        }
    }
}

/// Error categories for monitoring and classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Backend,
    Serialization,
    System,
    Configuration,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::NotFound => write!(f, "not_found"),
            Self::Backend => write!(f, "backend"),
            Self::Serialization => write!(f, "serialization"),
            Self::System => write!(f, "system"),
            Self::Configuration => write!(f, "configuration"),
        }
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
