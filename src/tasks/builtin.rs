//! Built-in tasks.
//!
//! | Implementation | Options | Outputs |
//! |---|---|---|
//! | `orgflow.tasks.Log` | `message` | `message` |
//! | `orgflow.tasks.Emit` | any | the options, verbatim |
//! | `orgflow.tasks.Command` | `command`, `env`, `dir` | `stdout`, `exit_code` |

use std::collections::BTreeMap;

use serde_yaml::Value;
use tracing::{debug, info};

use crate::context::Outputs;
use crate::error::{OrgflowError, Result};
use crate::registry::OptionMap;
use crate::shell::{execute_checked, CommandOptions};

use super::{Task, TaskContext};

/// Logs `message` and outputs it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTask;

impl LogTask {
    pub const IMPLEMENTATION: &'static str = "orgflow.tasks.Log";
}

impl Task for LogTask {
    fn execute(&self, options: &OptionMap, ctx: &TaskContext<'_>) -> Result<Outputs> {
        let message = options
            .get("message")
            .map(scalar_to_string)
            .unwrap_or_default();
        info!("[{}] {}", ctx.task, message);

        let mut outputs = Outputs::new();
        outputs.insert("message".to_string(), Value::String(message));
        Ok(outputs)
    }

    fn accepted_options(&self) -> Option<&[&str]> {
        Some(&["message"])
    }
}

/// Returns its options as outputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmitTask;

impl EmitTask {
    pub const IMPLEMENTATION: &'static str = "orgflow.tasks.Emit";
}

impl Task for EmitTask {
    fn execute(&self, options: &OptionMap, _ctx: &TaskContext<'_>) -> Result<Outputs> {
        Ok(options.clone())
    }
}

/// Runs `command` through the platform shell.
///
/// A non-zero exit status fails the task. `stdout` is trimmed of trailing
/// whitespace so it can be fed to later steps through a backreference.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandTask;

impl CommandTask {
    pub const IMPLEMENTATION: &'static str = "orgflow.tasks.Command";
}

impl Task for CommandTask {
    fn execute(&self, options: &OptionMap, ctx: &TaskContext<'_>) -> Result<Outputs> {
        let command = match options.get("command") {
            Some(Value::String(command)) if !command.trim().is_empty() => command.clone(),
            Some(other) => {
                return Err(OrgflowError::InvalidOptionValue {
                    option: "command".to_string(),
                    message: format!("expected a non-empty string, got {:?}", other),
                })
            }
            None => {
                return Err(OrgflowError::TaskFailed {
                    task: ctx.task.to_string(),
                    message: "no command given".to_string(),
                })
            }
        };

        let mut env = BTreeMap::new();
        if let Some(vars) = options.get("env") {
            let Some(vars) = vars.as_mapping() else {
                return Err(OrgflowError::InvalidOptionValue {
                    option: "env".to_string(),
                    message: "expected a mapping of variable names to values".to_string(),
                });
            };
            for (key, value) in vars {
                env.insert(scalar_to_string(key), scalar_to_string(value));
            }
        }

        let cwd = match options.get("dir") {
            Some(dir) => {
                let dir = std::path::PathBuf::from(scalar_to_string(dir));
                Some(match ctx.working_dir {
                    Some(base) if dir.is_relative() => base.join(dir),
                    _ => dir,
                })
            }
            None => ctx.working_dir.map(|p| p.to_path_buf()),
        };

        debug!("Running `{}` for step {}", command, ctx.step);
        let result = execute_checked(
            ctx.task,
            &command,
            &CommandOptions {
                cwd,
                env,
                capture: true,
            },
        )?;

        let mut outputs = Outputs::new();
        outputs.insert(
            "stdout".to_string(),
            Value::String(result.stdout.trim_end().to_string()),
        );
        outputs.insert(
            "exit_code".to_string(),
            Value::from(result.exit_code.unwrap_or_default()),
        );
        Ok(outputs)
    }

    fn accepted_options(&self) -> Option<&[&str]> {
        Some(&["command", "env", "dir"])
    }
}

/// Render a scalar the way it was written; collections fall back to YAML.
pub(crate) fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::StepPath;

    fn run(task: &dyn Task, options: OptionMap) -> Result<Outputs> {
        let step = StepPath::root();
        let config = Value::Null;
        let ctx = TaskContext {
            step: &step,
            task: "under_test",
            config: &config,
            working_dir: None,
        };
        task.execute(&options, &ctx)
    }

    fn options(yaml: &str) -> OptionMap {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn log_outputs_message() {
        let outputs = run(&LogTask, options("message: hello")).unwrap();
        assert_eq!(outputs["message"], "hello");
    }

    #[test]
    fn log_renders_non_string_message() {
        let outputs = run(&LogTask, options("message: 42")).unwrap();
        assert_eq!(outputs["message"], "42");
    }

    #[test]
    fn emit_returns_options() {
        let outputs = run(&EmitTask, options("a: 1\nb: [x, y]")).unwrap();
        assert_eq!(outputs, options("a: 1\nb: [x, y]"));
        assert!(EmitTask.accepted_options().is_none());
    }

    #[test]
    fn command_captures_stdout() {
        let outputs = run(&CommandTask, options("command: echo hi")).unwrap();
        assert_eq!(outputs["stdout"], "hi");
        assert_eq!(outputs["exit_code"], 0);
    }

    #[test]
    #[cfg(unix)]
    fn command_passes_env() {
        let outputs = run(
            &CommandTask,
            options("command: echo $GREETING\nenv: { GREETING: hey }"),
        )
        .unwrap();
        assert_eq!(outputs["stdout"], "hey");
    }

    #[test]
    fn command_non_zero_exit_fails() {
        let err = run(&CommandTask, options("command: exit 4")).unwrap_err();
        assert!(matches!(err, OrgflowError::TaskFailed { .. }));
    }

    #[test]
    fn command_requires_command() {
        let err = run(&CommandTask, OptionMap::new()).unwrap_err();
        assert!(err.to_string().contains("no command"));
        assert!(run(&CommandTask, options("command: ''")).is_err());
    }

    #[test]
    fn introspectable_tasks_list_options() {
        assert_eq!(LogTask.accepted_options(), Some(&["message"][..]));
        assert!(CommandTask
            .accepted_options()
            .unwrap()
            .contains(&"command"));
    }
}
