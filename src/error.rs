//! Error types for orgflow operations.
//!
//! This module defines [`OrgflowError`], the error type used throughout the
//! crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Configuration errors describe a defect in the declarative input. They are
//!   always fatal and are raised at plan time wherever possible.
//! - `TaskFailed` (and any other error returned by a task implementation) is a
//!   per-step failure governed by `ignore_failure`.
//! - `RunAborted` is the summary handed back when a run halts early.
//! - Use `OrgflowError::Other` (via `anyhow`) for unexpected errors.

use std::path::PathBuf;
use thiserror::Error;

use crate::runner::StepRecord;

/// Core error type for orgflow operations.
#[derive(Debug, Error)]
pub enum OrgflowError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// A step or invocation references a task that is not in the registry.
    #[error("Unknown task '{name}' (referenced by {referenced_by})")]
    UnknownTask { name: String, referenced_by: String },

    /// A step or invocation references a flow that is not in the registry.
    #[error("Unknown flow '{name}' (referenced by {referenced_by})")]
    UnknownFlow { name: String, referenced_by: String },

    /// A flow includes itself, directly or transitively.
    #[error("Circular flow inclusion detected: {cycle}")]
    CircularFlow { cycle: String },

    /// A step specification is structurally invalid.
    #[error("Malformed step {position} in flow '{flow}': {message}")]
    MalformedStep {
        flow: String,
        position: String,
        message: String,
    },

    /// Two steps in one flow share a position.
    #[error("Duplicate step position {position} in flow '{flow}'")]
    DuplicatePosition { flow: String, position: String },

    /// An override key the task implementation does not accept.
    #[error("Task '{task}' does not accept option '{option}'")]
    UnknownOption { task: String, option: String },

    /// A task's implementation reference is not bound in the task catalog.
    #[error("Task '{task}' uses unknown implementation '{implementation}'")]
    UnknownImplementation {
        task: String,
        implementation: String,
    },

    /// A dotted attribute path is absent from the external configuration.
    #[error("Missing configuration attribute: {path}")]
    MissingAttribute { path: String },

    /// A backreference cannot be satisfied.
    #[error("Cannot resolve backreference '{reference}' in step {step}: {reason}")]
    UnresolvedBackreference {
        reference: String,
        step: String,
        reason: String,
    },

    /// An option value could not be parsed.
    #[error("Invalid value for option '{option}': {message}")]
    InvalidOptionValue { option: String, message: String },

    /// A gating expression is syntactically invalid.
    #[error("Invalid condition '{expression}': {message}")]
    ConditionSyntax { expression: String, message: String },

    /// A task implementation reported failure.
    #[error("Task '{task}' failed: {message}")]
    TaskFailed { task: String, message: String },

    /// A non-tolerated failure halted the run.
    #[error("Run aborted at step {step}: {reason}")]
    RunAborted {
        step: String,
        reason: String,
        results: Vec<StepRecord>,
    },

    /// A step identifier was written to the result store twice.
    #[error("Result for step {step} already recorded")]
    ResultAlreadyRecorded { step: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OrgflowError {
    /// Whether this error describes a defect in the declarative input or
    /// external configuration (as opposed to a task failing at runtime).
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            OrgflowError::ConfigNotFound { .. }
                | OrgflowError::ConfigParseError { .. }
                | OrgflowError::ConfigValidationError { .. }
                | OrgflowError::UnknownTask { .. }
                | OrgflowError::UnknownFlow { .. }
                | OrgflowError::CircularFlow { .. }
                | OrgflowError::MalformedStep { .. }
                | OrgflowError::DuplicatePosition { .. }
                | OrgflowError::UnknownOption { .. }
                | OrgflowError::UnknownImplementation { .. }
                | OrgflowError::MissingAttribute { .. }
                | OrgflowError::UnresolvedBackreference { .. }
                | OrgflowError::InvalidOptionValue { .. }
        )
    }

    /// Step records gathered before an aborted run halted.
    pub fn partial_results(&self) -> Option<&[StepRecord]> {
        match self {
            OrgflowError::RunAborted { results, .. } => Some(results),
            _ => None,
        }
    }
}

/// Result type alias for orgflow operations.
pub type Result<T> = std::result::Result<T, OrgflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_not_found_displays_path() {
        let err = OrgflowError::ConfigNotFound {
            path: PathBuf::from("/foo/orgflow.yml"),
        };
        assert!(err.to_string().contains("/foo/orgflow.yml"));
    }

    #[test]
    fn unknown_task_displays_name_and_referrer() {
        let err = OrgflowError::UnknownTask {
            name: "deploy".into(),
            referenced_by: "flow 'dev_org' step 2".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("deploy"));
        assert!(msg.contains("dev_org"));
    }

    #[test]
    fn circular_flow_displays_cycle() {
        let err = OrgflowError::CircularFlow {
            cycle: "a -> b -> a".into(),
        };
        assert!(err.to_string().contains("a -> b -> a"));
    }

    #[test]
    fn condition_syntax_displays_expression() {
        let err = OrgflowError::ConditionSyntax {
            expression: "org.scratch and".into(),
            message: "unexpected end of expression".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("org.scratch and"));
        assert!(msg.contains("unexpected end"));
    }

    #[test]
    fn configuration_errors_are_classified() {
        assert!(OrgflowError::MissingAttribute {
            path: "org.edition".into()
        }
        .is_configuration_error());
        assert!(OrgflowError::CircularFlow { cycle: "a".into() }.is_configuration_error());
        assert!(!OrgflowError::TaskFailed {
            task: "deploy".into(),
            message: "boom".into()
        }
        .is_configuration_error());
        assert!(!OrgflowError::ConditionSyntax {
            expression: "(".into(),
            message: "x".into()
        }
        .is_configuration_error());
    }

    #[test]
    fn run_aborted_exposes_partial_results() {
        let err = OrgflowError::RunAborted {
            step: "2".into(),
            reason: "boom".into(),
            results: Vec::new(),
        };
        assert_eq!(err.partial_results().map(|r| r.len()), Some(0));
        assert!(OrgflowError::ConfigValidationError {
            message: "x".into()
        }
        .partial_results()
        .is_none());
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: OrgflowError = io_err.into();
        assert!(matches!(err, OrgflowError::Io(_)));
    }
}
