//! Project discovery and engine wiring

use anyhow::Context;
use plumin_cloud::{Deployment, Engine, ProvisioningContext, StateManager};
use plumin_cloud_local::{CLOUD_FILE, LocalProvider};
use plumin_config::{ConfigError, ProjectConfig};
use std::path::PathBuf;

pub struct Project {
    pub config: ProjectConfig,
    pub root: PathBuf,
    pub state_dir: PathBuf,
}

impl Project {
    /// Load the project file, or fall back to the built-in project in the
    /// current directory
    pub fn discover(stack: Option<String>) -> anyhow::Result<Self> {
        let (mut config, root) = match plumin_config::find_project_file() {
            Ok(path) => {
                let config = plumin_config::load_project(&path)?;
                (config, plumin_config::project_root(&path))
            }
            Err(ConfigError::ProjectFileNotFound) => {
                tracing::debug!("No project file found, using defaults");
                let root = std::env::current_dir().context("cannot read current directory")?;
                (ProjectConfig::default(), root)
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(stack) = stack {
            config.stack = stack;
        }
        plumin_config::validate_stack_name(&config.stack)?;
        let state_dir = config.state_dir_path(&root).join(&config.stack);

        Ok(Self {
            config,
            root,
            state_dir,
        })
    }

    /// Run the program and collect its declarations
    pub fn deployment(&self) -> anyhow::Result<Deployment> {
        let mut ctx = ProvisioningContext::new(&self.config.name, &self.config.stack);
        crate::program::create_vpc(&mut ctx)?;
        Ok(ctx.finalize())
    }

    pub async fn engine(&self) -> anyhow::Result<Engine> {
        let provider = LocalProvider::open(self.state_dir.join(CLOUD_FILE))
            .await
            .with_context(|| format!("cannot open local cloud in {}", self.state_dir.display()))?;
        Ok(Engine::new(
            Box::new(provider),
            StateManager::with_state_dir(&self.state_dir),
        ))
    }
}
