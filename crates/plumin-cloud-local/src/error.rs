//! Local provider error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LocalError {
    #[error("Network not found: {0}")]
    NetworkNotFound(String),

    #[error("Network already exists: {0}")]
    AlreadyExists(String),

    #[error("Unsupported resource kind: {0}")]
    UnsupportedKind(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    CloudError(#[from] plumin_cloud::CloudError),
}

impl From<LocalError> for plumin_cloud::CloudError {
    fn from(err: LocalError) -> Self {
        match err {
            LocalError::CloudError(e) => e,
            LocalError::NetworkNotFound(name) => plumin_cloud::CloudError::ResourceNotFound(name),
            LocalError::UnsupportedKind(kind) => plumin_cloud::CloudError::InvalidConfig(format!(
                "local provider does not support {}",
                kind
            )),
            other => plumin_cloud::CloudError::ApiError(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, LocalError>;
