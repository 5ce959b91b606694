//! Task command implementation.
//!
//! The `orgflow task` command runs one task outside of any flow.

use crate::cli::args::TaskArgs;
use crate::cli::options::parse_task_options;
use crate::cli::workspace::Workspace;
use crate::error::Result;
use crate::runner::{CancelToken, RunOptions, StepStatus};
use crate::shell::install_interrupt_handler;
use crate::ui::UserInterface;

use super::display::to_json;
use super::dispatcher::{load_project, Command, CommandResult, EXIT_NO_CONFIG};
use super::run::EXIT_CANCELLED;

/// The task command implementation.
pub struct TaskCommand {
    workspace: Workspace,
    args: TaskArgs,
}

impl TaskCommand {
    /// Create a new task command.
    pub fn new(workspace: &Workspace, args: TaskArgs) -> Self {
        Self {
            workspace: workspace.clone(),
            args,
        }
    }
}

impl Command for TaskCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(config) = load_project(&self.workspace, ui)? else {
            return Ok(CommandResult::failure(EXIT_NO_CONFIG));
        };

        let engine = self.workspace.engine(&config)?;
        let options = parse_task_options(&self.args.options)?;
        let external = self.workspace.external_config(&config)?;

        let cancel = CancelToken::new();
        install_interrupt_handler(cancel.clone());
        let run_options = RunOptions {
            cancel,
            working_dir: Some(self.workspace.project_root().to_path_buf()),
            ..RunOptions::default()
        };

        if !self.args.json {
            ui.show_header(&self.args.name);
        }

        let record = engine.run_task(&self.args.name, &options, external, &run_options)?;

        if self.args.json {
            ui.output(&to_json(&record)?);
        } else {
            ui.show_step_result(&record);
        }

        match record.status {
            StepStatus::Succeeded => Ok(CommandResult::success()),
            StepStatus::Skipped => Ok(CommandResult::failure(EXIT_CANCELLED)),
            StepStatus::Failed => Ok(CommandResult::failure(1)),
        }
    }
}
