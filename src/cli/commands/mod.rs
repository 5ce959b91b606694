//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. Every command that reads the
//! project goes through the same [`Workspace`](crate::cli::Workspace), so
//! `--config`, `--project` and `--org` apply uniformly.

pub mod completions;
pub mod dispatcher;
pub mod display;
pub mod lint;
pub mod list;
pub mod plan;
pub mod run;
pub mod task;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
