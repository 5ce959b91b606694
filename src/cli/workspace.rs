//! Where a command finds its project.

use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::config::{load_config, ProjectConfig};
use crate::error::Result;
use crate::registry::Registry;
use crate::runner::Engine;
use crate::tasks::TaskCatalog;

/// Project root plus the global flags that select configuration.
#[derive(Debug, Clone)]
pub struct Workspace {
    project_root: PathBuf,
    config_path: Option<PathBuf>,
    org: Option<String>,
}

impl Workspace {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            config_path: None,
            org: None,
        }
    }

    /// Use an explicit config file instead of discovering `orgflow.yml`.
    pub fn with_config(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    /// Select the org exposed to expressions.
    pub fn with_org(mut self, org: Option<String>) -> Self {
        self.org = org;
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn org(&self) -> Option<&str> {
        self.org.as_deref()
    }

    /// Load and merge the layered project configuration.
    pub fn load_config(&self) -> Result<ProjectConfig> {
        load_config(&self.project_root, self.config_path.as_deref())
    }

    /// Build an engine over `config` with the built-in task catalog.
    pub fn engine(&self, config: &ProjectConfig) -> Result<Engine> {
        let registry = Registry::from_config(config)?;
        Ok(Engine::new(registry, TaskCatalog::with_builtins()))
    }

    /// The `{project, org, services}` tree for the selected org.
    pub fn external_config(&self, config: &ProjectConfig) -> Result<Value> {
        config.external_config(self.org())
    }
}
