//! Plan command implementation.
//!
//! The `orgflow plan` command expands a flow and prints the resulting steps
//! without running anything.

use crate::cli::args::PlanArgs;
use crate::cli::options::parse_flow_overrides;
use crate::cli::workspace::Workspace;
use crate::error::Result;
use crate::ui::UserInterface;

use super::display::{show_plan, theme_for, to_json};
use super::dispatcher::{load_project, Command, CommandResult, EXIT_NO_CONFIG};

/// The plan command implementation.
pub struct PlanCommand {
    workspace: Workspace,
    args: PlanArgs,
}

impl PlanCommand {
    /// Create a new plan command.
    pub fn new(workspace: &Workspace, args: PlanArgs) -> Self {
        Self {
            workspace: workspace.clone(),
            args,
        }
    }
}

impl Command for PlanCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(config) = load_project(&self.workspace, ui)? else {
            return Ok(CommandResult::failure(EXIT_NO_CONFIG));
        };

        let engine = self.workspace.engine(&config)?;
        let overrides = parse_flow_overrides(&self.args.options)?;
        let plan = engine.resolve_flow(&self.args.flow, &overrides)?;

        if self.args.json {
            ui.output(&to_json(&plan)?);
            return Ok(CommandResult::success());
        }

        let label = if plan.len() == 1 { "step" } else { "steps" };
        ui.show_header(&format!("{} · {} {}", plan.name, plan.len(), label));

        let theme = theme_for(ui);
        show_plan(ui, &plan, &theme);

        Ok(CommandResult::success())
    }
}
