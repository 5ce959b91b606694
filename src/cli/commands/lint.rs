//! Lint command implementation.
//!
//! The `orgflow lint` command expands every flow as a dry run and reports
//! every configuration problem at once.

use serde_json::json;

use crate::cli::args::LintArgs;
use crate::cli::workspace::Workspace;
use crate::config::{validate_config, ValidationError};
use crate::error::Result;
use crate::tasks::TaskCatalog;
use crate::ui::UserInterface;

use super::display::to_json;
use super::dispatcher::{load_project, Command, CommandResult, EXIT_NO_CONFIG};

/// The lint command implementation.
pub struct LintCommand {
    workspace: Workspace,
    args: LintArgs,
}

impl LintCommand {
    /// Create a new lint command.
    pub fn new(workspace: &Workspace, args: LintArgs) -> Self {
        Self {
            workspace: workspace.clone(),
            args,
        }
    }
}

fn describe(error: &ValidationError) -> String {
    let subject = match (&error.task, &error.flow) {
        (Some(task), _) => format!("task '{}': ", task),
        (None, Some(flow)) => format!("flow '{}': ", flow),
        (None, None) => String::new(),
    };
    format!("[{}] {}{}", error.rule, subject, error.message)
}

impl Command for LintCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(config) = load_project(&self.workspace, ui)? else {
            return Ok(CommandResult::failure(EXIT_NO_CONFIG));
        };

        let errors = validate_config(&config, &TaskCatalog::with_builtins());

        if self.args.json {
            let report: Vec<_> = errors
                .iter()
                .map(|e| {
                    json!({
                        "rule": e.rule,
                        "message": e.message,
                        "task": e.task,
                        "flow": e.flow,
                    })
                })
                .collect();
            ui.output(&to_json(&report)?);
        } else if errors.is_empty() {
            ui.success(&format!(
                "{} task(s) and {} flow(s) are valid",
                config.tasks.len(),
                config.flows.len()
            ));
        } else {
            for error in &errors {
                ui.error(&describe(error));
            }
            ui.message(&format!("{} problem(s) found", errors.len()));
        }

        if errors.is_empty() {
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    fn execute(config: &str, json: bool) -> (CommandResult, MockUI) {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("orgflow.yml"), config).unwrap();
        let mut ui = MockUI::new();
        let result = LintCommand::new(&Workspace::new(temp.path()), LintArgs { json })
            .execute(&mut ui)
            .unwrap();
        (result, ui)
    }

    #[test]
    fn clean_config_passes() {
        let (result, ui) = execute(
            "tasks:\n  a: { class_path: orgflow.tasks.Log }\nflows:\n  f:\n    steps:\n      1: { task: a }\n",
            false,
        );
        assert!(result.success);
        assert!(ui.has_success("1 task(s) and 1 flow(s) are valid"));
    }

    #[test]
    fn reports_every_error() {
        let config = r#"
tasks:
  a: { class_path: acme.Missing }
flows:
  f:
    steps:
      1: { task: nope }
  g:
    steps:
      1: { flow: g }
"#;
        let (result, ui) = execute(config, false);

        assert_eq!(result.exit_code, 1);
        assert_eq!(ui.errors().len(), 3);
        assert!(ui.has_error("[unknown-implementation] task 'a'"));
        assert!(ui.has_error("[unknown-task] flow 'f'"));
        assert!(ui.has_error("[circular-flow] flow 'g'"));
        assert!(ui.has_message("3 problem(s) found"));
    }

    #[test]
    fn json_report() {
        let (result, ui) = execute("tasks:\n  a: { class_path: acme.Missing }\n", true);

        assert!(!result.success);
        let json: serde_json::Value = serde_json::from_str(&ui.outputs()[0]).unwrap();
        assert_eq!(json[0]["rule"], "unknown-implementation");
        assert_eq!(json[0]["task"], "a");
        assert!(json[0]["flow"].is_null());
    }
}
