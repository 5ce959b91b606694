//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use crate::cli::args::{Cli, Commands};
use crate::cli::workspace::Workspace;
use crate::config::ProjectConfig;
use crate::error::{OrgflowError, Result};
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Exit code when no project configuration exists.
pub const EXIT_NO_CONFIG: i32 = 2;

/// Load the project config, reporting a missing file through `ui`.
///
/// Returns `Ok(None)` when there is no config to load.
pub(crate) fn load_project(
    workspace: &Workspace,
    ui: &mut dyn UserInterface,
) -> Result<Option<ProjectConfig>> {
    match workspace.load_config() {
        Ok(config) => Ok(Some(config)),
        Err(OrgflowError::ConfigNotFound { path }) => {
            ui.error(&format!("No configuration found at {}", path.display()));
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    workspace: Workspace,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given workspace.
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Dispatch and execute a command.
    ///
    /// Routes the CLI subcommand to the appropriate command implementation
    /// and executes it.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &cli.command {
            Commands::Plan(args) => {
                let cmd = super::plan::PlanCommand::new(&self.workspace, args.clone());
                cmd.execute(ui)
            }
            Commands::Run(args) => {
                let cmd = super::run::RunCommand::new(&self.workspace, args.clone());
                cmd.execute(ui)
            }
            Commands::Task(args) => {
                let cmd = super::task::TaskCommand::new(&self.workspace, args.clone());
                cmd.execute(ui)
            }
            Commands::List(args) => {
                let cmd = super::list::ListCommand::new(&self.workspace, args.clone());
                cmd.execute(ui)
            }
            Commands::Lint(args) => {
                let cmd = super::lint::LintCommand::new(&self.workspace, args.clone());
                cmd.execute(ui)
            }
            Commands::Completions(args) => {
                let cmd = super::completions::CompletionsCommand::new(args.clone());
                cmd.execute(ui)
            }
        }
    }
}
