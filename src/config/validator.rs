//! Configuration validation rules.
//!
//! This module validates configuration for correctness:
//! - Tasks must name an implementation the catalog knows
//! - Flow steps must reference existing tasks and flows
//! - Steps must be well formed and uniquely positioned
//! - No circular flow inclusion allowed
//! - Conditions and backreferences must parse and bind

use crate::config::schema::ProjectConfig;
use crate::error::{OrgflowError, Result};
use crate::flow::FlowResolver;
use crate::registry::{flow_from_config, task_from_config, Registry, TaskOverrides};
use crate::tasks::TaskCatalog;

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
    /// Task name if error is task-specific
    pub task: Option<String>,
    /// Flow name if error is flow-specific
    pub flow: Option<String>,
}

impl ValidationError {
    fn for_task(task: &str, err: &OrgflowError) -> Self {
        Self {
            rule: rule_for(err).to_string(),
            message: err.to_string(),
            task: Some(task.to_string()),
            flow: None,
        }
    }

    fn for_flow(flow: &str, err: &OrgflowError) -> Self {
        Self {
            rule: rule_for(err).to_string(),
            message: err.to_string(),
            task: None,
            flow: Some(flow.to_string()),
        }
    }
}

fn rule_for(err: &OrgflowError) -> &'static str {
    match err {
        OrgflowError::UnknownTask { .. } => "unknown-task",
        OrgflowError::UnknownFlow { .. } => "unknown-flow",
        OrgflowError::CircularFlow { .. } => "circular-flow",
        OrgflowError::MalformedStep { .. } => "malformed-step",
        OrgflowError::DuplicatePosition { .. } => "duplicate-position",
        OrgflowError::UnknownOption { .. } => "unknown-option",
        OrgflowError::UnknownImplementation { .. } => "unknown-implementation",
        OrgflowError::UnresolvedBackreference { .. } => "unresolved-backreference",
        OrgflowError::InvalidOptionValue { .. } => "invalid-option",
        OrgflowError::ConditionSyntax { .. } => "condition-syntax",
        _ => "invalid-config",
    }
}

/// Validate a configuration and return all errors.
///
/// This function collects all validation errors rather than stopping
/// at the first one, allowing users to fix multiple issues at once.
/// Every flow is expanded against `catalog` as a dry run.
pub fn validate_config(config: &ProjectConfig, catalog: &TaskCatalog) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut builder = Registry::builder();

    if let Some(org) = &config.default_org {
        if !config.orgs.contains_key(org) {
            errors.push(ValidationError {
                rule: "unknown-org".to_string(),
                message: format!("default_org '{}' is not defined under orgs", org),
                task: None,
                flow: None,
            });
        }
    }

    for (name, task) in &config.tasks {
        match task_from_config(name, task) {
            Ok(definition) => {
                if !catalog.contains(&definition.implementation) {
                    let err = OrgflowError::UnknownImplementation {
                        task: name.clone(),
                        implementation: definition.implementation.clone(),
                    };
                    errors.push(ValidationError::for_task(name, &err));
                }
                builder = builder.task(definition);
            }
            Err(err) => errors.push(ValidationError::for_task(name, &err)),
        }
    }

    let mut buildable = Vec::new();
    for (name, flow) in &config.flows {
        match flow_from_config(name, flow) {
            Ok(definition) => {
                buildable.push(name);
                builder = builder.flow(definition);
            }
            Err(err) => errors.push(ValidationError::for_flow(name, &err)),
        }
    }

    let registry = match builder.build() {
        Ok(registry) => registry,
        Err(err) => {
            errors.push(ValidationError {
                rule: rule_for(&err).to_string(),
                message: err.to_string(),
                task: None,
                flow: None,
            });
            return errors;
        }
    };

    // Implementation problems are already reported per task.
    let resolver = FlowResolver::new(&registry).with_catalog(catalog);
    for name in buildable {
        match resolver.resolve(name, &TaskOverrides::new()) {
            Ok(_) | Err(OrgflowError::UnknownImplementation { .. }) => {}
            Err(err) => errors.push(ValidationError::for_flow(name, &err)),
        }
    }

    errors
}

/// Validate and return a Result.
///
/// # Errors
///
/// Returns `ConfigValidationError` if any validation rules fail.
pub fn validate(config: &ProjectConfig, catalog: &TaskCatalog) -> Result<()> {
    let errors = validate_config(config, catalog);

    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        Err(OrgflowError::ConfigValidationError {
            message: messages.join("; "),
        })
    }
}
