//! Command-line interface for orgflow.
//!
//! This module provides the CLI argument parsing using clap's derive macros
//! and command implementations.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations
//! - [`options`] - `-o KEY=VALUE` parsing
//! - [`workspace`] - Project root and config selection

pub mod args;
pub mod commands;
pub mod options;
pub mod workspace;

pub use args::{
    Cli, Commands, CompletionsArgs, LintArgs, ListArgs, PlanArgs, RunArgs, TaskArgs,
};
pub use commands::{Command, CommandDispatcher, CommandResult};
pub use options::{parse_flow_overrides, parse_task_options};
pub use workspace::Workspace;
