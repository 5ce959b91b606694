//! Append-only store of step outputs for one run.

use std::collections::BTreeMap;

use serde_yaml::Value;

use crate::error::{OrgflowError, Result};

use super::step_path::StepPath;

/// Output mapping captured from a task.
pub type Outputs = BTreeMap<String, Value>;

/// Outputs of completed steps, keyed by step path.
///
/// Only steps that succeeded are recorded; skipped and failed steps leave no
/// entry. Each path can be written exactly once.
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    entries: BTreeMap<StepPath, Outputs>,
    order: Vec<StepPath>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outputs of a succeeded step.
    ///
    /// # Errors
    ///
    /// Returns `ResultAlreadyRecorded` if `step` already has an entry.
    pub fn record(&mut self, step: StepPath, outputs: Outputs) -> Result<()> {
        if self.entries.contains_key(&step) {
            return Err(OrgflowError::ResultAlreadyRecorded {
                step: step.to_string(),
            });
        }
        self.order.push(step.clone());
        self.entries.insert(step, outputs);
        Ok(())
    }

    /// Outputs of `step`, if it completed.
    pub fn get(&self, step: &StepPath) -> Option<&Outputs> {
        self.entries.get(step)
    }

    pub fn contains(&self, step: &StepPath) -> bool {
        self.entries.contains_key(step)
    }

    /// Recorded steps in completion order.
    pub fn completed(&self) -> &[StepPath] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
