use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "Project file not found. Looked in:\n\
        - current directory: plumin.local.yaml, plumin.yaml\n\
        - ./.plumin/ directory\n\
        - ~/.config/plumin/plumin.yaml\n\
        Set PLUMIN_CONFIG_PATH to point at a file directly"
    )]
    ProjectFileNotFound,

    #[error("Failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid project file {}: {message}", path.display())]
    Invalid { path: PathBuf, message: String },

    #[error("Invalid stack name {0:?}: must be a single directory name")]
    InvalidStack(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
