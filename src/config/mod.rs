//! Configuration loading, parsing, and validation for orgflow.
//!
//! This module handles all aspects of configuration:
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Deep merging in [`merger`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use orgflow::config::{load_config, validate};
//! use orgflow::tasks::TaskCatalog;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(
//!     temp.path().join("orgflow.yml"),
//!     "tasks:\n  hello: { class_path: orgflow.tasks.Log }\n",
//! )
//! .unwrap();
//!
//! let config = load_config(temp.path(), None).unwrap();
//! validate(&config, &TaskCatalog::with_builtins()).unwrap();
//! assert!(config.tasks.contains_key("hello"));
//! ```
//!
//! # Configuration File Locations
//!
//! orgflow discovers and merges configuration in this order:
//! 1. User global config (`~/.orgflow/orgflow.yml`)
//! 2. Project config (`orgflow.yml`)
//! 3. Local overrides (`orgflow.local.yml`)

pub mod loader;
pub mod merger;
pub mod schema;
pub mod validator;

pub use schema::{FlowConfig, ProjectConfig, StepConfig, StepsConfig, TaskConfig};

pub use loader::{
    find_project_root, load_config, load_config_file, load_config_value, load_merged_config,
    parse_config, ConfigPaths, CONFIG_FILE, LOCAL_CONFIG_FILE,
};

pub use merger::{deep_merge, merge_configs};

pub use validator::{validate, validate_config, ValidationError};
