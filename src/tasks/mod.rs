//! Task capability and the catalog that binds implementation references.
//!
//! The engine never knows what a task does. Each [`TaskDefinition`] names an
//! implementation reference (its `class_path`), and a [`TaskCatalog`] maps
//! that reference to an object implementing [`Task`]. The catalog is built
//! once at startup and consulted at plan time, so a flow that names an
//! unbound implementation is rejected before anything runs.
//!
//! # Example
//!
//! ```
//! use orgflow::tasks::{Task, TaskCatalog, TaskContext};
//! use orgflow::context::Outputs;
//! use orgflow::registry::OptionMap;
//!
//! struct Greet;
//!
//! impl Task for Greet {
//!     fn execute(&self, options: &OptionMap, _ctx: &TaskContext<'_>) -> orgflow::Result<Outputs> {
//!         let mut outputs = Outputs::new();
//!         outputs.insert("greeting".into(), format!("hello {:?}", options.get("name")).into());
//!         Ok(outputs)
//!     }
//! }
//!
//! let catalog = TaskCatalog::with_builtins().register("acme.Greet", Greet);
//! assert!(catalog.get("acme.Greet").is_some());
//! assert!(catalog.get("orgflow.tasks.Log").is_some());
//! ```
//!
//! [`TaskDefinition`]: crate::registry::TaskDefinition

pub mod builtin;
pub mod catalog;

pub use builtin::{CommandTask, EmitTask, LogTask};
pub use catalog::TaskCatalog;

use std::path::Path;

use serde_yaml::Value;

use crate::context::{Outputs, StepPath};
use crate::error::Result;
use crate::registry::OptionMap;

/// What a task sees of the run while it executes.
#[derive(Debug, Clone, Copy)]
pub struct TaskContext<'a> {
    /// Path of the step being executed.
    pub step: &'a StepPath,
    /// Task name as declared in the registry.
    pub task: &'a str,
    /// External configuration tree.
    pub config: &'a Value,
    /// Directory commands should run in, if the caller set one.
    pub working_dir: Option<&'a Path>,
}

/// A unit of work the engine can invoke.
///
/// Any error returned from [`execute`](Self::execute) is a task failure and
/// is subject to the step's `ignore_failure` flag.
pub trait Task: Send + Sync {
    /// Run with fully resolved options.
    fn execute(&self, options: &OptionMap, ctx: &TaskContext<'_>) -> Result<Outputs>;

    /// Option names this task accepts, or `None` if it does not say.
    ///
    /// When `Some`, override keys outside the list are rejected at plan time.
    fn accepted_options(&self) -> Option<&[&str]> {
        None
    }
}
