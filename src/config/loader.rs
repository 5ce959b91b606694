//! Configuration file discovery and loading.
//!
//! This module handles finding and loading `orgflow.yml` files from
//! various locations in the correct priority order.

use crate::config::merger::merge_configs;
use crate::config::schema::ProjectConfig;
use crate::error::{OrgflowError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Project file name.
pub const CONFIG_FILE: &str = "orgflow.yml";

/// Local, uncommitted override file name.
pub const LOCAL_CONFIG_FILE: &str = "orgflow.local.yml";

/// Paths to configuration files in priority order (later overrides earlier).
///
/// Merge order:
/// 1. User global config (`~/.orgflow/orgflow.yml`)
/// 2. Project config (`orgflow.yml`)
/// 3. Local overrides (`orgflow.local.yml`)
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// User's global config: ~/.orgflow/orgflow.yml
    pub user_global: Option<PathBuf>,

    /// Project config: orgflow.yml
    pub project: Option<PathBuf>,

    /// Local overrides: orgflow.local.yml
    pub project_local: Option<PathBuf>,

    /// Where the project config was expected, for error reporting.
    expected: PathBuf,
}

impl ConfigPaths {
    /// Discover config files for the given project root.
    pub fn discover(project_root: &Path) -> Self {
        Self {
            user_global: Self::find_user_global(),
            project: existing(project_root.join(CONFIG_FILE)),
            project_local: existing(project_root.join(LOCAL_CONFIG_FILE)),
            expected: project_root.join(CONFIG_FILE),
        }
    }

    /// Use `path` as the project config instead of discovering one.
    ///
    /// The user global config still applies; local overrides do not.
    pub fn explicit(path: &Path) -> Self {
        Self {
            user_global: Self::find_user_global(),
            project: existing(path.to_path_buf()),
            project_local: None,
            expected: path.to_path_buf(),
        }
    }

    /// Find user's global config at ~/.orgflow/orgflow.yml
    fn find_user_global() -> Option<PathBuf> {
        existing(dirs::home_dir()?.join(".orgflow").join(CONFIG_FILE))
    }

    /// Returns all existing config paths in merge order.
    pub fn all_existing(&self) -> Vec<&PathBuf> {
        [&self.user_global, &self.project, &self.project_local]
            .into_iter()
            .flatten()
            .collect()
    }

    /// Check if any project config exists.
    pub fn has_project_config(&self) -> bool {
        self.project.is_some()
    }
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    if path.exists() {
        Some(path)
    } else {
        None
    }
}

/// Find the project root by walking up from `start`.
///
/// Looks for:
/// 1. an `orgflow.yml` file (primary indicator)
/// 2. a `.git` directory (fallback)
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        if current.join(CONFIG_FILE).is_file() {
            return Some(current);
        }

        if current.join(".git").exists() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load a single config file and parse it into ProjectConfig.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<ProjectConfig> {
    parse_config(&read(path)?, path)
}

/// Parse YAML content into ProjectConfig.
///
/// `source_path` is only used for error reporting.
pub fn parse_config(content: &str, source_path: &Path) -> Result<ProjectConfig> {
    serde_yaml::from_str(content).map_err(|e| OrgflowError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load a config file as raw YAML Value (for merging).
pub fn load_config_value(path: &Path) -> Result<serde_yaml::Value> {
    serde_yaml::from_str(&read(path)?).map_err(|e| OrgflowError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            OrgflowError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            OrgflowError::Io(e)
        }
    })
}

/// Load and merge every existing file in `paths`.
///
/// # Errors
///
/// Returns `ConfigNotFound` if no project config exists.
/// Returns `ConfigParseError` if any config file is invalid, or if the
/// merged result does not match the schema.
pub fn load_merged_config(paths: &ConfigPaths) -> Result<ProjectConfig> {
    if !paths.has_project_config() {
        return Err(OrgflowError::ConfigNotFound {
            path: paths.expected.clone(),
        });
    }

    let configs = paths
        .all_existing()
        .into_iter()
        .map(|path| load_config_value(path))
        .collect::<Result<Vec<_>>>()?;

    let merged = merge_configs(&configs);

    serde_yaml::from_value(merged).map_err(|e| OrgflowError::ConfigParseError {
        path: paths.expected.clone(),
        message: format!("Failed to parse merged config: {}", e),
    })
}

/// Load config with optional path override.
///
/// With `config_override`, that file replaces the discovered project config.
pub fn load_config(project_root: &Path, config_override: Option<&Path>) -> Result<ProjectConfig> {
    let paths = match config_override {
        Some(path) => ConfigPaths::explicit(path),
        None => ConfigPaths::discover(project_root),
    };
    load_merged_config(&paths)
}
