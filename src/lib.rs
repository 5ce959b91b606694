//! orgflow - Declarative task and flow orchestration.
//!
//! orgflow reads named tasks and ordered flows from `orgflow.yml`, expands
//! flows (nested flows included) into a flat plan, and runs that plan one
//! step at a time. Steps can read the outputs of earlier steps through
//! `^^task.attribute` backreferences and can be gated on `when` conditions.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, merging, and validation
//! - [`context`] - Run context and the result store
//! - [`error`] - Error types and result aliases
//! - [`expr`] - Option expressions and `when` conditions
//! - [`flow`] - Flow expansion into a plan
//! - [`registry`] - Task and flow definitions
//! - [`runner`] - Plan execution
//! - [`shell`] - Shell command execution
//! - [`tasks`] - Task implementations and the catalog
//! - [`ui`] - Terminal output
//!
//! # Example
//!
//! ```
//! use orgflow::config::parse_config;
//! use orgflow::registry::{Registry, TaskOverrides};
//! use orgflow::runner::{Engine, RunOptions, RunStatus};
//! use orgflow::tasks::TaskCatalog;
//! use std::path::Path;
//!
//! let yaml = r#"
//! tasks:
//!   version: { class_path: orgflow.tasks.Emit, options: { number: "2.0" } }
//!   announce: { class_path: orgflow.tasks.Log, options: { message: ^^version.number } }
//! flows:
//!   release:
//!     steps:
//!       1: { task: version }
//!       2: { task: announce, when: "^^version.number == '2.0'" }
//! "#;
//!
//! let config = parse_config(yaml, Path::new("orgflow.yml")).unwrap();
//! let engine = Engine::new(Registry::from_config(&config).unwrap(), TaskCatalog::with_builtins());
//! let result = engine
//!     .run_flow("release", &TaskOverrides::new(), serde_yaml::Value::Null, &RunOptions::default())
//!     .unwrap();
//!
//! assert_eq!(result.status, RunStatus::Succeeded);
//! assert_eq!(result.steps[1].outputs["message"], "2.0");
//! ```
//!
//! For file-based config loading, see the integration tests.

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod expr;
pub mod flow;
pub mod registry;
pub mod runner;
pub mod shell;
pub mod tasks;
pub mod ui;

pub use error::{OrgflowError, Result};
