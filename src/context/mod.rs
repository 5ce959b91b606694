//! Per-run execution context.
//!
//! An [`ExecutionContext`] pairs the read-only external configuration tree
//! (`project`, `org`, `services`) with the [`ResultStore`] that accumulates
//! step outputs as the run progresses. One context is created per run and
//! dropped when the run ends; it is never shared between runs.

pub mod results;
pub mod step_path;

pub use results::{Outputs, ResultStore};
pub use step_path::StepPath;

use serde_yaml::{Mapping, Value};

use crate::error::Result;

/// External configuration plus the outputs of steps completed so far.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    config: Value,
    results: ResultStore,
}

impl ExecutionContext {
    /// Create a context for a fresh run.
    pub fn new(config: Value) -> Self {
        Self {
            config,
            results: ResultStore::new(),
        }
    }

    /// A context with an empty configuration tree.
    pub fn empty() -> Self {
        Self::new(Value::Mapping(Mapping::new()))
    }

    /// The external configuration tree.
    pub fn config(&self) -> &Value {
        &self.config
    }

    /// Outputs recorded so far.
    pub fn results(&self) -> &ResultStore {
        &self.results
    }

    /// Record a succeeded step's outputs.
    pub fn record(&mut self, step: StepPath, outputs: Outputs) -> Result<()> {
        self.results.record(step, outputs)
    }

    /// Consume the context, keeping the recorded outputs.
    pub fn into_results(self) -> ResultStore {
        self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Position;

    #[test]
    fn context_starts_with_no_results() {
        let ctx = ExecutionContext::empty();
        assert!(ctx.results().is_empty());
        assert!(ctx.config().as_mapping().unwrap().is_empty());
    }

    #[test]
    fn record_writes_through_to_store() {
        let mut ctx = ExecutionContext::empty();
        let step = StepPath::root().child(Position::from(1));
        ctx.record(step.clone(), Outputs::new()).unwrap();
        assert!(ctx.results().contains(&step));
        assert!(ctx.record(step, Outputs::new()).is_err());
    }
}
