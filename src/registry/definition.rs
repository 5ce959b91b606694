//! Task and flow definitions.
//!
//! These are the validated, in-memory forms of the `tasks:` and `flows:`
//! sections of a project file. They carry option values exactly as declared;
//! dynamic forms (`$...`, `^^...`) are interpreted later by the flow
//! resolver and executor.

use std::collections::BTreeMap;

use serde_yaml::Value;

use crate::error::{OrgflowError, Result};

use super::position::Position;

/// Option name to raw (unresolved) value.
pub type OptionMap = BTreeMap<String, Value>;

/// Task name to option map, as supplied to a flow invocation.
pub type TaskOverrides = BTreeMap<String, OptionMap>;

/// The literal used in a step to disable it (`task: None`).
pub const DISABLED_MARKER: &str = "None";

/// An atomic named operation with declared default options.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDefinition {
    /// Unique task name.
    pub name: String,
    /// Opaque implementation reference, bound by the task catalog.
    pub implementation: String,
    /// Default options, overridden by flow steps and invocations.
    pub options: OptionMap,
    /// Display group.
    pub group: Option<String>,
    /// Display description.
    pub description: Option<String>,
}

impl TaskDefinition {
    /// Create a task with no default options.
    pub fn new(name: impl Into<String>, implementation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            implementation: implementation.into(),
            options: OptionMap::new(),
            group: None,
            description: None,
        }
    }

    /// Add a default option.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Set the display group.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Set the display description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// What a step invokes.
#[derive(Debug, Clone, PartialEq)]
pub enum StepTarget {
    /// Run a task with per-step option overrides.
    Task { name: String, options: OptionMap },
    /// Splice in a sub-flow, with overrides keyed by the task they apply to.
    Flow {
        name: String,
        options: TaskOverrides,
    },
    /// A step switched off by `task: None`; it expands to nothing.
    Disabled,
}

/// One positioned entry in a flow, before expansion.
#[derive(Debug, Clone, PartialEq)]
pub struct StepSpec {
    pub position: Position,
    pub target: StepTarget,
    /// Gating expression source, parsed during expansion.
    pub when: Option<String>,
    /// `None` inherits from the invoking step.
    pub ignore_failure: Option<bool>,
}

impl StepSpec {
    /// A step that runs a task.
    pub fn task(position: impl Into<Position>, name: impl Into<String>) -> Self {
        Self {
            position: position.into(),
            target: StepTarget::Task {
                name: name.into(),
                options: OptionMap::new(),
            },
            when: None,
            ignore_failure: None,
        }
    }

    /// A step that splices in a sub-flow.
    pub fn flow(position: impl Into<Position>, name: impl Into<String>) -> Self {
        Self {
            position: position.into(),
            target: StepTarget::Flow {
                name: name.into(),
                options: TaskOverrides::new(),
            },
            when: None,
            ignore_failure: None,
        }
    }

    /// A disabled step.
    pub fn disabled(position: impl Into<Position>) -> Self {
        Self {
            position: position.into(),
            target: StepTarget::Disabled,
            when: None,
            ignore_failure: None,
        }
    }

    /// Override an option of the task this step runs.
    ///
    /// Has no effect on flow or disabled steps; use [`StepSpec::with_task_option`].
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if let StepTarget::Task { options, .. } = &mut self.target {
            options.insert(key.into(), value.into());
        }
        self
    }

    /// Override an option of `task` anywhere inside the sub-flow this step invokes.
    pub fn with_task_option(
        mut self,
        task: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        if let StepTarget::Flow { options, .. } = &mut self.target {
            options
                .entry(task.into())
                .or_default()
                .insert(key.into(), value.into());
        }
        self
    }

    /// Gate the step on a condition.
    pub fn when(mut self, expression: impl Into<String>) -> Self {
        self.when = Some(expression.into());
        self
    }

    /// Set the step's `ignore_failure` flag explicitly.
    pub fn ignore_failure(mut self, ignore: bool) -> Self {
        self.ignore_failure = Some(ignore);
        self
    }

    /// Name of the referenced task or flow, if any.
    pub fn target_name(&self) -> Option<&str> {
        match &self.target {
            StepTarget::Task { name, .. } | StepTarget::Flow { name, .. } => Some(name),
            StepTarget::Disabled => None,
        }
    }
}

/// A named, ordered composition of task and flow invocations.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowDefinition {
    pub name: String,
    pub description: Option<String>,
    steps: Vec<StepSpec>,
}

impl FlowDefinition {
    /// Create a flow, ordering its steps by position.
    ///
    /// # Errors
    ///
    /// Returns `DuplicatePosition` if two steps share a position.
    pub fn new(name: impl Into<String>, steps: Vec<StepSpec>) -> Result<Self> {
        let name = name.into();
        let mut steps = steps;
        steps.sort_by(|a, b| a.position.cmp(&b.position));

        if let Some(pair) = steps.windows(2).find(|w| w[0].position == w[1].position) {
            return Err(OrgflowError::DuplicatePosition {
                flow: name,
                position: pair[1].position.to_string(),
            });
        }

        Ok(Self {
            name,
            description: None,
            steps,
        })
    }

    /// Set the display description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Steps in ascending position order.
    pub fn steps(&self) -> &[StepSpec] {
        &self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_steps_are_sorted_numerically() {
        let flow = FlowDefinition::new(
            "f",
            vec![
                StepSpec::task(3, "c"),
                StepSpec::task(1, "a"),
                StepSpec::task("1.5".parse::<Position>().unwrap(), "inserted"),
                StepSpec::task(2, "b"),
            ],
        )
        .unwrap();

        let names: Vec<_> = flow.steps().iter().filter_map(|s| s.target_name()).collect();
        assert_eq!(names, vec!["a", "inserted", "b", "c"]);
    }

    #[test]
    fn duplicate_positions_are_rejected() {
        let err = FlowDefinition::new(
            "f",
            vec![
                StepSpec::task(1, "a"),
                StepSpec::task("1.0".parse::<Position>().unwrap(), "b"),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, OrgflowError::DuplicatePosition { ref flow, .. } if flow == "f"));
    }

    #[test]
    fn with_option_only_applies_to_task_steps() {
        let task = StepSpec::task(1, "deploy").with_option("path", "src");
        let flow = StepSpec::flow(2, "sub").with_option("path", "src");

        match task.target {
            StepTarget::Task { options, .. } => assert_eq!(options["path"], "src"),
            _ => panic!("expected task step"),
        }
        match flow.target {
            StepTarget::Flow { options, .. } => assert!(options.is_empty()),
            _ => panic!("expected flow step"),
        }
    }

    #[test]
    fn with_task_option_groups_by_task() {
        let step = StepSpec::flow(1, "sub")
            .with_task_option("deploy", "path", "src")
            .with_task_option("deploy", "check_only", true);

        match step.target {
            StepTarget::Flow { options, .. } => {
                assert_eq!(options["deploy"].len(), 2);
            }
            _ => panic!("expected flow step"),
        }
    }

    #[test]
    fn ignore_failure_defaults_to_inherit() {
        assert_eq!(StepSpec::task(1, "a").ignore_failure, None);
        assert_eq!(
            StepSpec::task(1, "a").ignore_failure(true).ignore_failure,
            Some(true)
        );
    }
}
