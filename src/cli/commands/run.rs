//! Run command implementation.
//!
//! The `orgflow run` command resolves a flow and executes it step by step.

use tracing::debug;

use crate::cli::args::RunArgs;
use crate::cli::options::parse_flow_overrides;
use crate::cli::workspace::Workspace;
use crate::error::Result;
use crate::runner::{CancelToken, RunOptions, RunProgress, RunStatus, StepExecutor};
use crate::shell::install_interrupt_handler;
use crate::ui::UserInterface;

use super::display::to_json;
use super::dispatcher::{load_project, Command, CommandResult, EXIT_NO_CONFIG};

/// Exit code for a run cancelled by SIGINT.
pub const EXIT_CANCELLED: i32 = 130;

/// Map a run's final status to a process exit code.
pub fn exit_code(status: RunStatus) -> i32 {
    match status {
        RunStatus::Succeeded => 0,
        RunStatus::CompletedWithErrors | RunStatus::Aborted => 1,
        RunStatus::Cancelled => EXIT_CANCELLED,
    }
}

/// The run command implementation.
pub struct RunCommand {
    workspace: Workspace,
    args: RunArgs,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(workspace: &Workspace, args: RunArgs) -> Self {
        Self {
            workspace: workspace.clone(),
            args,
        }
    }

    pub fn args(&self) -> &RunArgs {
        &self.args
    }
}

impl Command for RunCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(config) = load_project(&self.workspace, ui)? else {
            return Ok(CommandResult::failure(EXIT_NO_CONFIG));
        };

        let engine = self.workspace.engine(&config)?;
        let overrides = parse_flow_overrides(&self.args.options)?;
        let external = self.workspace.external_config(&config)?;
        let plan = engine.resolve_flow(&self.args.flow, &overrides)?;

        for name in &self.args.skip {
            if !plan.iter().any(|step| &step.task == name) {
                ui.warning(&format!(
                    "--skip '{}' matches no step in flow '{}'",
                    name, plan.name
                ));
            }
        }

        let cancel = CancelToken::new();
        if !install_interrupt_handler(cancel.clone()) {
            debug!("Interrupt handler already installed; Ctrl-C will not cancel this run");
        }

        let options = RunOptions {
            skip: self.args.skip.iter().cloned().collect(),
            cancel,
            working_dir: Some(self.workspace.project_root().to_path_buf()),
        };

        let json = self.args.json;
        if !json {
            ui.show_header(&plan.name);
        }

        let result = StepExecutor::new(engine.catalog()).run_with_progress(
            &plan,
            external,
            &options,
            |event| {
                if json {
                    return;
                }
                match event {
                    RunProgress::StepStarting { step, index, total } => {
                        ui.show_step_start(index + 1, total, &step.path.to_string(), &step.task)
                    }
                    RunProgress::StepFinished { record } | RunProgress::StepSkipped { record } => {
                        ui.show_step_result(record)
                    }
                }
            },
        );

        if json {
            ui.output(&to_json(&result)?);
        } else {
            ui.show_run_summary(&result);
        }

        match exit_code(result.status) {
            0 => Ok(CommandResult::success()),
            code => Ok(CommandResult::failure(code)),
        }
    }
}
