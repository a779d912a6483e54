//! Provisioning error types

use thiserror::Error;

/// Provisioning errors
#[derive(Error, Debug)]
pub enum CloudError {
    /// A declared value is malformed (bad CIDR, empty logical name, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A logical resource name or output name was registered twice in one run
    #[error("Duplicate {scope} name: {name}")]
    DuplicateName { scope: NameScope, name: String },

    #[error("Output not resolved yet: {0}")]
    OutputPending(String),

    #[error("Output resolution failed: {name}: {message}")]
    OutputFailed { name: String, message: String },

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("State file error: {0}")]
    StateError(String),

    #[error("Lock acquisition failed: {0}")]
    LockError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Namespace a duplicate name collided in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameScope {
    Resource,
    Output,
}

impl std::fmt::Display for NameScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NameScope::Resource => write!(f, "resource"),
            NameScope::Output => write!(f, "output"),
        }
    }
}

impl CloudError {
    pub fn is_validation(&self) -> bool {
        matches!(self, CloudError::Validation(_))
    }

    pub fn is_duplicate_name(&self) -> bool {
        matches!(self, CloudError::DuplicateName { .. })
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
