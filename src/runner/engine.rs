//! Top-level entry points: plan, run a flow, run a single task.

use serde_yaml::Value;

use crate::context::StepPath;
use crate::error::Result;
use crate::flow::{FlowResolver, Plan};
use crate::registry::{OptionMap, Registry, TaskOverrides};
use crate::tasks::TaskCatalog;

use super::executor::{RunOptions, RunProgress, StepExecutor};
use super::result::{RunResult, StepRecord};

/// A registry paired with the catalog that implements its tasks.
///
/// # Example
///
/// ```
/// use orgflow::registry::{FlowDefinition, Registry, StepSpec, TaskDefinition, TaskOverrides};
/// use orgflow::runner::{Engine, RunOptions, RunStatus};
/// use orgflow::tasks::TaskCatalog;
///
/// let registry = Registry::builder()
///     .task(TaskDefinition::new("version", "orgflow.tasks.Emit").with_option("number", "1.2"))
///     .task(TaskDefinition::new("announce", "orgflow.tasks.Log")
///         .with_option("message", "^^version.number"))
///     .flow(FlowDefinition::new("release", vec![
///         StepSpec::task(1, "version"),
///         StepSpec::task(2, "announce"),
///     ]).unwrap())
///     .build()
///     .unwrap();
///
/// let engine = Engine::new(registry, TaskCatalog::with_builtins());
/// let result = engine
///     .run_flow("release", &TaskOverrides::new(), serde_yaml::Value::Null, &RunOptions::default())
///     .unwrap();
///
/// assert_eq!(result.status, RunStatus::Succeeded);
/// assert_eq!(result.steps[1].outputs["message"], "1.2");
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    registry: Registry,
    catalog: TaskCatalog,
}

impl Engine {
    pub fn new(registry: Registry, catalog: TaskCatalog) -> Self {
        Self { registry, catalog }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn catalog(&self) -> &TaskCatalog {
        &self.catalog
    }

    fn resolver(&self) -> FlowResolver<'_> {
        FlowResolver::new(&self.registry).with_catalog(&self.catalog)
    }

    /// Expand `flow` without running anything.
    pub fn resolve_flow(&self, flow: &str, overrides: &TaskOverrides) -> Result<Plan> {
        self.resolver().resolve(flow, overrides)
    }

    /// Resolve and run `flow`.
    ///
    /// # Errors
    ///
    /// Plan-time configuration errors are returned before any step runs. A
    /// run halted by a failure that was not tolerated is returned as
    /// `RunAborted`, carrying every record gathered so far.
    pub fn run_flow(
        &self,
        flow: &str,
        overrides: &TaskOverrides,
        config: Value,
        options: &RunOptions,
    ) -> Result<RunResult> {
        self.run_flow_with_progress(flow, overrides, config, options, |_| {})
    }

    /// [`run_flow`](Self::run_flow) with a progress callback.
    pub fn run_flow_with_progress(
        &self,
        flow: &str,
        overrides: &TaskOverrides,
        config: Value,
        options: &RunOptions,
        on_progress: impl FnMut(RunProgress<'_>),
    ) -> Result<RunResult> {
        let plan = self.resolve_flow(flow, overrides)?;
        StepExecutor::new(&self.catalog)
            .run_with_progress(&plan, config, options, on_progress)
            .into_result()
    }

    /// Run one task outside of any flow.
    ///
    /// `options` win over the task's declared defaults. A task failure is
    /// reported in the returned record, not as an error, and a run cancelled
    /// before the task started yields a `Skipped` record.
    pub fn run_task(
        &self,
        task: &str,
        options: &OptionMap,
        config: Value,
        run_options: &RunOptions,
    ) -> Result<StepRecord> {
        let plan = self.resolver().resolve_task(task, options)?;
        let result = StepExecutor::new(&self.catalog).run(&plan, config, run_options);
        if let Some(record) = result.steps.into_iter().next() {
            return Ok(record);
        }

        // Only cancellation ends a one-step run without a record.
        let path = plan
            .steps
            .first()
            .map(|step| step.path.clone())
            .unwrap_or_else(StepPath::root);
        Ok(StepRecord::skipped(path, task, "cancelled before it started"))
    }
}
