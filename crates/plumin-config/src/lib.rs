pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Directory holding run state when the project file does not name one
pub const DEFAULT_STATE_DIR: &str = ".plumin";

const CANDIDATES: [&str; 2] = ["plumin.local.yaml", "plumin.yaml"];

/// Find the project file
///
/// Search order:
/// 1. PLUMIN_CONFIG_PATH env var (direct path)
/// 2. current directory: plumin.local.yaml, plumin.yaml
/// 3. ./.plumin/ directory, same order
/// 4. ~/.config/plumin/plumin.yaml (global)
pub fn find_project_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var("PLUMIN_CONFIG_PATH") {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
        tracing::warn!(
            "PLUMIN_CONFIG_PATH points at missing file {}",
            path.display()
        );
    }

    let current_dir = std::env::current_dir()?;

    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    let plumin_dir = current_dir.join(DEFAULT_STATE_DIR);
    if plumin_dir.is_dir() {
        for filename in &CANDIDATES {
            let path = plumin_dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("plumin").join("plumin.yaml");
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::ProjectFileNotFound)
}

/// Contents of `plumin.yaml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name
    pub name: String,

    /// Stack (environment) name
    #[serde(default = "default_stack")]
    pub stack: String,

    /// State directory, relative to the project file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,
}

fn default_stack() -> String {
    "dev".to_string()
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "create-vpc".to_string(),
            stack: default_stack(),
            state_dir: None,
        }
    }
}

impl ProjectConfig {
    /// State directory for a project rooted at `project_dir`
    pub fn state_dir_path(&self, project_dir: &Path) -> PathBuf {
        match &self.state_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => project_dir.join(dir),
            None => project_dir.join(DEFAULT_STATE_DIR),
        }
    }
}

/// Load and validate a project file
pub fn load_project(path: &Path) -> Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: ProjectConfig =
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    if config.name.trim().is_empty() {
        return Err(ConfigError::Invalid {
            path: path.to_path_buf(),
            message: "name must not be empty".to_string(),
        });
    }
    validate_stack_name(&config.stack).map_err(|e| ConfigError::Invalid {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    tracing::debug!(
        "Loaded project {} (stack {}) from {}",
        config.name,
        config.stack,
        path.display()
    );
    Ok(config)
}

/// Check that a stack name can be used as one directory under the state dir
pub fn validate_stack_name(name: &str) -> Result<()> {
    if name.trim().is_empty() || name.contains(['/', '\\']) {
        return Err(ConfigError::InvalidStack(name.to_string()));
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(ConfigError::InvalidStack(name.to_string())),
    }
}

/// Directory a project file belongs to
///
/// A file inside `.plumin/` belongs to the directory above it.
pub fn project_root(project_file: &Path) -> PathBuf {
    let parent = project_file.parent().unwrap_or_else(|| Path::new("."));
    match parent.file_name() {
        Some(name) if name == DEFAULT_STATE_DIR => {
            parent.parent().unwrap_or(parent).to_path_buf()
        }
        _ => parent.to_path_buf(),
    }
}
