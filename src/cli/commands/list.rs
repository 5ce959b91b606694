//! List command implementation.
//!
//! The `orgflow list` command lists tasks (grouped by `group`) and flows.

use std::collections::BTreeMap;

use serde_json::json;

use crate::cli::args::ListArgs;
use crate::cli::workspace::Workspace;
use crate::error::Result;
use crate::registry::{Registry, TaskDefinition};
use crate::ui::theme::OrgflowTheme;
use crate::ui::UserInterface;

use super::display::{theme_for, to_json};
use super::dispatcher::{load_project, Command, CommandResult, EXIT_NO_CONFIG};

/// Heading for tasks without a `group`.
const UNGROUPED: &str = "Other";

/// The list command implementation.
pub struct ListCommand {
    workspace: Workspace,
    args: ListArgs,
}

impl ListCommand {
    /// Create a new list command.
    pub fn new(workspace: &Workspace, args: ListArgs) -> Self {
        Self {
            workspace: workspace.clone(),
            args,
        }
    }

    fn show_tasks(&self, ui: &mut dyn UserInterface, registry: &Registry, theme: &OrgflowTheme) {
        let mut groups: BTreeMap<&str, Vec<&TaskDefinition>> = BTreeMap::new();
        for task in registry.tasks() {
            groups
                .entry(task.group.as_deref().unwrap_or(UNGROUPED))
                .or_default()
                .push(task);
        }

        ui.message(&format!("  {}", theme.key.apply_to("Tasks:")));
        for (group, tasks) in groups {
            ui.message(&format!("    {}", theme.info.apply_to(group)));
            for task in tasks {
                let description = task
                    .description
                    .as_deref()
                    .map(|d| format!(" {}", theme.dim.apply_to(d)))
                    .unwrap_or_default();
                ui.message(&format!(
                    "      {}{}",
                    theme.highlight.apply_to(&task.name),
                    description
                ));
            }
        }
    }

    fn show_flows(&self, ui: &mut dyn UserInterface, registry: &Registry, theme: &OrgflowTheme) {
        ui.message(&format!("  {}", theme.key.apply_to("Flows:")));
        for flow in registry.flows() {
            let targets: Vec<_> = flow.steps().iter().filter_map(|s| s.target_name()).collect();
            ui.message(&format!(
                "    {}{} {}",
                theme.highlight.apply_to(&flow.name),
                theme.dim.apply_to(":"),
                theme.dim.apply_to(targets.join(" → ")),
            ));
            if let Some(desc) = &flow.description {
                ui.message(&format!("      {}", theme.dim.apply_to(desc)));
            }
        }
    }

    fn as_json(&self, registry: &Registry) -> serde_json::Value {
        let tasks: Vec<_> = registry
            .tasks()
            .map(|task| {
                json!({
                    "name": task.name,
                    "class_path": task.implementation,
                    "group": task.group,
                    "description": task.description,
                })
            })
            .collect();
        let flows: Vec<_> = registry
            .flows()
            .map(|flow| {
                json!({
                    "name": flow.name,
                    "description": flow.description,
                    "steps": flow.steps().len(),
                })
            })
            .collect();

        let mut out = serde_json::Map::new();
        if !self.args.flows_only {
            out.insert("tasks".to_string(), tasks.into());
        }
        if !self.args.tasks_only {
            out.insert("flows".to_string(), flows.into());
        }
        out.into()
    }
}

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(config) = load_project(&self.workspace, ui)? else {
            return Ok(CommandResult::failure(EXIT_NO_CONFIG));
        };
        let registry = Registry::from_config(&config)?;

        if self.args.json {
            ui.output(&to_json(&self.as_json(&registry))?);
            return Ok(CommandResult::success());
        }

        let theme = theme_for(ui);

        if !self.args.flows_only {
            self.show_tasks(ui, &registry, &theme);
            if !self.args.tasks_only {
                ui.message("");
            }
        }
        if !self.args.tasks_only {
            self.show_flows(ui, &registry, &theme);
        }

        Ok(CommandResult::success())
    }
}
