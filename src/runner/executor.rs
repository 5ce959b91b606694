//! Sequential plan execution.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde_yaml::Value;
use tracing::{error, info, warn};

use crate::context::{ExecutionContext, StepPath};
use crate::error::{OrgflowError, Result};
use crate::flow::{ExpandedStep, Plan};
use crate::registry::OptionMap;
use crate::tasks::{TaskCatalog, TaskContext};

use super::cancel::CancelToken;
use super::result::{RunResult, RunStatus, StepRecord};

/// Progress events emitted during a run.
#[derive(Debug)]
pub enum RunProgress<'a> {
    /// A step is about to start.
    StepStarting {
        step: &'a ExpandedStep,
        index: usize,
        total: usize,
    },
    /// A step finished, successfully or not.
    StepFinished { record: &'a StepRecord },
    /// A step was skipped.
    StepSkipped { record: &'a StepRecord },
}

/// Options for running a plan.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Task names whose steps are skipped without evaluating their gates.
    pub skip: BTreeSet<String>,
    /// Checked before each step starts.
    pub cancel: CancelToken,
    /// Working directory handed to tasks.
    pub working_dir: Option<PathBuf>,
}

/// How a step ended, from the executor's point of view.
enum Outcome {
    Continue,
    Tolerated,
    Abort,
}

/// Runs a [`Plan`] one step at a time.
///
/// Per step: `--skip` match or a false gate ends in `Skipped`; otherwise the
/// options are resolved, the task runs, and the step ends in `Succeeded`
/// (outputs recorded) or `Failed`. A failed step with `ignore_failure`
/// degrades the run to `CompletedWithErrors`; any other failure stops the
/// run. Errors raised while preparing a step (option resolution, gate
/// evaluation) always stop the run.
#[derive(Debug, Clone, Copy)]
pub struct StepExecutor<'a> {
    catalog: &'a TaskCatalog,
}

impl<'a> StepExecutor<'a> {
    pub fn new(catalog: &'a TaskCatalog) -> Self {
        Self { catalog }
    }

    /// Run `plan` against `config`.
    pub fn run(&self, plan: &Plan, config: Value, options: &RunOptions) -> RunResult {
        self.run_with_progress(plan, config, options, |_| {})
    }

    /// Run `plan` with a progress callback.
    pub fn run_with_progress(
        &self,
        plan: &Plan,
        config: Value,
        options: &RunOptions,
        mut on_progress: impl FnMut(RunProgress<'_>),
    ) -> RunResult {
        let started_at = Utc::now();
        let start = Instant::now();
        let total = plan.len();

        let mut ctx = ExecutionContext::new(config);
        let mut gate_decisions: BTreeMap<StepPath, bool> = BTreeMap::new();
        let mut records: Vec<StepRecord> = Vec::with_capacity(total);
        let mut status = RunStatus::Succeeded;

        for (index, step) in plan.iter().enumerate() {
            if options.cancel.is_cancelled() {
                info!("Run of '{}' cancelled before step {}", plan.name, step.path);
                status = RunStatus::Cancelled;
                break;
            }

            if options.skip.contains(&step.task) {
                let record = StepRecord::skipped(step.path.clone(), &step.task, "skipped by --skip");
                on_progress(RunProgress::StepSkipped { record: &record });
                records.push(record);
                continue;
            }

            match passes_gates(step, &ctx, &mut gate_decisions) {
                Ok(Some(false_gate)) => {
                    let record = StepRecord::skipped(
                        step.path.clone(),
                        &step.task,
                        format!("condition '{}' is false", false_gate),
                    );
                    info!("Skipping step {} ({}): condition false", step.path, step.task);
                    on_progress(RunProgress::StepSkipped { record: &record });
                    records.push(record);
                    continue;
                }
                Ok(None) => {}
                Err(e) => {
                    error!("Step {} ({}) cannot run: {}", step.path, step.task, e);
                    let record = StepRecord::failed(step.path.clone(), &step.task, &e, Duration::ZERO);
                    on_progress(RunProgress::StepFinished { record: &record });
                    records.push(record);
                    status = RunStatus::Aborted;
                    break;
                }
            }

            on_progress(RunProgress::StepStarting { step, index, total });
            let (record, outcome) = self.run_step(step, &mut ctx, options);
            on_progress(RunProgress::StepFinished { record: &record });
            records.push(record);

            match outcome {
                Outcome::Continue => {}
                Outcome::Tolerated => status = RunStatus::CompletedWithErrors,
                Outcome::Abort => {
                    status = if options.cancel.is_cancelled() {
                        RunStatus::Cancelled
                    } else {
                        RunStatus::Aborted
                    };
                    break;
                }
            }
        }

        info!("Run of '{}' {}", plan.name, status);
        RunResult {
            flow: plan.name.clone(),
            status,
            steps: records,
            started_at,
            duration: start.elapsed(),
        }
    }

    fn run_step(
        &self,
        step: &ExpandedStep,
        ctx: &mut ExecutionContext,
        options: &RunOptions,
    ) -> (StepRecord, Outcome) {
        let start = Instant::now();
        let fatal = |e: OrgflowError, start: Instant| {
            error!("Step {} ({}) cannot run: {}", step.path, step.task, e);
            (
                StepRecord::failed(step.path.clone(), &step.task, &e, start.elapsed()),
                Outcome::Abort,
            )
        };

        let resolved = match resolve_options(step, ctx) {
            Ok(resolved) => resolved,
            Err(e) => return fatal(e, start),
        };

        let Some(task) = self.catalog.get(&step.implementation) else {
            let e = OrgflowError::UnknownImplementation {
                task: step.task.clone(),
                implementation: step.implementation.clone(),
            };
            return fatal(e, start);
        };

        info!("Running step {} ({})", step.path, step.task);
        let result = {
            let task_ctx = TaskContext {
                step: &step.path,
                task: &step.task,
                config: ctx.config(),
                working_dir: options.working_dir.as_deref(),
            };
            task.execute(&resolved, &task_ctx)
        };

        match result {
            Ok(outputs) => {
                if let Err(e) = ctx.record(step.path.clone(), outputs.clone()) {
                    return fatal(e, start);
                }
                (
                    StepRecord::succeeded(step.path.clone(), &step.task, outputs, start.elapsed()),
                    Outcome::Continue,
                )
            }
            Err(e) => {
                let record = StepRecord::failed(step.path.clone(), &step.task, &e, start.elapsed());
                if step.ignore_failure {
                    warn!("Step '{}' errored: {}", step.task, e);
                    (record, Outcome::Tolerated)
                } else {
                    error!("Step '{}' failed: {}", step.task, e);
                    (record, Outcome::Abort)
                }
            }
        }
    }
}

/// Check a step's gates, outermost first.
///
/// Each gate is evaluated at most once per run; later steps in the same
/// scope reuse the decision. Returns the source of the first false gate.
fn passes_gates(
    step: &ExpandedStep,
    ctx: &ExecutionContext,
    decisions: &mut BTreeMap<StepPath, bool>,
) -> Result<Option<String>> {
    for gate in &step.gates {
        let passed = match decisions.get(&gate.scope) {
            Some(passed) => *passed,
            None => {
                let passed = gate.condition.evaluate(ctx, &step.path)?;
                decisions.insert(gate.scope.clone(), passed);
                passed
            }
        };
        if !passed {
            return Ok(Some(gate.condition.source().to_string()));
        }
    }
    Ok(None)
}

/// Materialize a step's options against the context as it stands now.
fn resolve_options(step: &ExpandedStep, ctx: &ExecutionContext) -> Result<OptionMap> {
    step.options
        .iter()
        .map(|(key, expr)| Ok((key.clone(), expr.resolve(ctx, &step.path)?)))
        .collect()
}
