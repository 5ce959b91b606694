//! Output of flow expansion.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::context::StepPath;
use crate::expr::{Condition, OptionExpr, ReferenceCandidate};

/// A `when:` expression together with the steps it governs.
///
/// `scope` is the path of the step that declared the expression. For a task
/// step that is the step itself; for a flow step it is the prefix shared by
/// every step the sub-flow expanded into.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Gate {
    pub scope: StepPath,
    pub condition: Condition,
}

/// One concrete task invocation in a resolved flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpandedStep {
    /// Positions from the root flow down to this step.
    pub path: StepPath,
    /// Task name.
    pub task: String,
    /// Implementation reference of the task.
    pub implementation: String,
    /// Merged options, not yet resolved.
    pub options: BTreeMap<String, OptionExpr>,
    /// Inherited or declared `ignore_failure`.
    pub ignore_failure: bool,
    /// Gates to pass, outermost first.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub gates: Vec<Gate>,
    /// Enclosing flow names, outermost first.
    pub flows: Vec<String>,
}

impl ExpandedStep {
    /// Name of the innermost enclosing flow, if any.
    pub fn flow(&self) -> Option<&str> {
        self.flows.last().map(String::as_str)
    }

    /// Whether a `when:` expression governs this step.
    pub fn is_conditional(&self) -> bool {
        !self.gates.is_empty()
    }
}

impl ReferenceCandidate for ExpandedStep {
    fn path(&self) -> &StepPath {
        &self.path
    }

    fn task_name(&self) -> &str {
        &self.task
    }

    fn enclosing_flows(&self) -> &[String] {
        &self.flows
    }
}

/// A flow expanded into its execution order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    /// Name of the flow (or single task) that was resolved.
    pub name: String,
    pub steps: Vec<ExpandedStep>,
}

impl Plan {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExpandedStep> {
        self.steps.iter()
    }

    /// Step paths in execution order.
    pub fn paths(&self) -> Vec<String> {
        self.steps.iter().map(|s| s.path.to_string()).collect()
    }
}

impl<'a> IntoIterator for &'a Plan {
    type Item = &'a ExpandedStep;
    type IntoIter = std::slice::Iter<'a, ExpandedStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}
