//! Task and flow registry.
//!
//! The [`Registry`] is the immutable, validated form of the declarative
//! input. It is built once per invocation, either from a parsed
//! [`ProjectConfig`] or programmatically through [`RegistryBuilder`], and
//! is read-only thereafter.
//!
//! # Example
//!
//! ```
//! use orgflow::registry::{FlowDefinition, Registry, StepSpec, TaskDefinition};
//!
//! let registry = Registry::builder()
//!     .task(TaskDefinition::new("deploy", "orgflow.tasks.Log").with_option("message", "hi"))
//!     .flow(FlowDefinition::new("ci", vec![StepSpec::task(1, "deploy")]).unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert!(registry.task("deploy").is_some());
//! assert_eq!(registry.flow("ci").unwrap().steps().len(), 1);
//! ```

pub mod definition;
pub mod position;

pub use definition::{
    FlowDefinition, OptionMap, StepSpec, StepTarget, TaskDefinition, TaskOverrides,
    DISABLED_MARKER,
};
pub use position::Position;

use std::collections::BTreeMap;

use crate::config::schema::{FlowConfig, ProjectConfig, StepConfig, TaskConfig};
use crate::error::{OrgflowError, Result};

/// Immutable collection of task and flow definitions.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    tasks: BTreeMap<String, TaskDefinition>,
    flows: BTreeMap<String, FlowDefinition>,
}

impl Registry {
    /// Start building a registry programmatically.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Build a registry from a parsed project file.
    ///
    /// Stops at the first structural error. Use
    /// [`crate::config::validate`] to collect every problem at once.
    pub fn from_config(config: &ProjectConfig) -> Result<Self> {
        let mut builder = Self::builder();
        for (name, task) in &config.tasks {
            builder = builder.task(task_from_config(name, task)?);
        }
        for (name, flow) in &config.flows {
            builder = builder.flow(flow_from_config(name, flow)?);
        }
        builder.build()
    }

    /// Look up a task by name.
    pub fn task(&self, name: &str) -> Option<&TaskDefinition> {
        self.tasks.get(name)
    }

    /// Look up a flow by name.
    pub fn flow(&self, name: &str) -> Option<&FlowDefinition> {
        self.flows.get(name)
    }

    /// All tasks, ordered by name.
    pub fn tasks(&self) -> impl Iterator<Item = &TaskDefinition> {
        self.tasks.values()
    }

    /// All flows, ordered by name.
    pub fn flows(&self) -> impl Iterator<Item = &FlowDefinition> {
        self.flows.values()
    }
}

/// Collects definitions and rejects duplicate names on [`build`](Self::build).
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    tasks: Vec<TaskDefinition>,
    flows: Vec<FlowDefinition>,
}

impl RegistryBuilder {
    /// Add a task definition.
    pub fn task(mut self, task: TaskDefinition) -> Self {
        self.tasks.push(task);
        self
    }

    /// Add a flow definition.
    pub fn flow(mut self, flow: FlowDefinition) -> Self {
        self.flows.push(flow);
        self
    }

    /// Finish the registry.
    ///
    /// # Errors
    ///
    /// Returns `ConfigValidationError` on a duplicate task or flow name.
    pub fn build(self) -> Result<Registry> {
        let mut registry = Registry::default();

        for task in self.tasks {
            if registry.tasks.contains_key(&task.name) {
                return Err(OrgflowError::ConfigValidationError {
                    message: format!("Duplicate task name '{}'", task.name),
                });
            }
            registry.tasks.insert(task.name.clone(), task);
        }

        for flow in self.flows {
            if registry.flows.contains_key(&flow.name) {
                return Err(OrgflowError::ConfigValidationError {
                    message: format!("Duplicate flow name '{}'", flow.name),
                });
            }
            registry.flows.insert(flow.name.clone(), flow);
        }

        Ok(registry)
    }
}

/// Convert a `tasks:` entry.
pub fn task_from_config(name: &str, config: &TaskConfig) -> Result<TaskDefinition> {
    let implementation =
        config
            .class_path
            .clone()
            .ok_or_else(|| OrgflowError::ConfigValidationError {
                message: format!("Task '{}' has no class_path", name),
            })?;

    Ok(TaskDefinition {
        name: name.to_string(),
        implementation,
        options: config.options.clone(),
        group: config.group.clone(),
        description: config.description.clone(),
    })
}

/// Convert a `flows:` entry.
pub fn flow_from_config(name: &str, config: &FlowConfig) -> Result<FlowDefinition> {
    let steps = config
        .steps
        .iter()
        .map(|(position, step)| step_from_config(name, *position, step))
        .collect::<Result<Vec<_>>>()?;

    let mut flow = FlowDefinition::new(name, steps)?;
    flow.description = config.description.clone();
    Ok(flow)
}

fn step_from_config(flow: &str, position: Position, config: &StepConfig) -> Result<StepSpec> {
    let malformed = |message: String| OrgflowError::MalformedStep {
        flow: flow.to_string(),
        position: position.to_string(),
        message,
    };

    let is_disabled = |name: &Option<String>| name.as_deref() == Some(DISABLED_MARKER);

    let target = match (&config.task, &config.flow) {
        (Some(_), Some(_)) if is_disabled(&config.task) || is_disabled(&config.flow) => {
            StepTarget::Disabled
        }
        (Some(_), Some(_)) => {
            return Err(malformed(
                "a step must reference either a task or a flow, not both".to_string(),
            ))
        }
        (None, None) => {
            return Err(malformed(
                "a step must reference a task or a flow".to_string(),
            ))
        }
        (Some(name), None) | (None, Some(name)) if name == DISABLED_MARKER => StepTarget::Disabled,
        (Some(name), None) => StepTarget::Task {
            name: name.clone(),
            options: config.options.clone(),
        },
        (None, Some(name)) => {
            let mut overrides = TaskOverrides::new();
            for (task, value) in &config.options {
                let Some(mapping) = value.as_mapping() else {
                    return Err(malformed(format!(
                        "options for flow steps must be keyed by task name; '{}' is not a mapping",
                        task
                    )));
                };
                let mut options = OptionMap::new();
                for (key, value) in mapping {
                    let Some(key) = key.as_str() else {
                        return Err(malformed(format!(
                            "option names for task '{}' must be strings",
                            task
                        )));
                    };
                    options.insert(key.to_string(), value.clone());
                }
                overrides.insert(task.clone(), options);
            }
            StepTarget::Flow {
                name: name.clone(),
                options: overrides,
            }
        }
    };

    Ok(StepSpec {
        position,
        target,
        when: config.when.clone(),
        ignore_failure: config.ignore_failure,
    })
}
