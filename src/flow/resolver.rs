//! Recursive flow expansion.

use std::collections::BTreeMap;

use tracing::debug;

use crate::context::StepPath;
use crate::error::{OrgflowError, Result};
use crate::expr::{Backreference, Condition, OptionExpr};
use crate::registry::{OptionMap, Position, Registry, StepTarget, TaskOverrides};
use crate::tasks::TaskCatalog;

use super::expanded::{ExpandedStep, Gate, Plan};

/// Expands flows from a [`Registry`] into [`Plan`]s.
///
/// Expansion is pure: the same registry and overrides always produce the
/// same plan. Gating expressions are parsed but not evaluated, and option
/// values are parsed but not resolved; both happen when the step runs.
#[derive(Debug, Clone, Copy)]
pub struct FlowResolver<'a> {
    registry: &'a Registry,
    catalog: Option<&'a TaskCatalog>,
}

/// Inherited state while descending into sub-flows.
#[derive(Debug, Clone, Default)]
struct Frame {
    path: StepPath,
    flows: Vec<String>,
    overrides: TaskOverrides,
    ignore_failure: Option<bool>,
    gates: Vec<Gate>,
}

impl<'a> FlowResolver<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            catalog: None,
        }
    }

    /// Also check implementation references and accepted option names.
    pub fn with_catalog(mut self, catalog: &'a TaskCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Expand `flow` into its execution order.
    ///
    /// `overrides` are invocation-level options keyed by task name; they win
    /// over every option declared in the registry.
    ///
    /// # Errors
    ///
    /// Any configuration error detectable without running: unknown names,
    /// cycles, malformed expressions, backreferences to steps that are not
    /// positioned earlier, and (with a catalog) unknown implementations or
    /// option names.
    pub fn resolve(&self, flow: &str, overrides: &TaskOverrides) -> Result<Plan> {
        let root = Frame {
            overrides: overrides.clone(),
            ..Frame::default()
        };

        let mut steps = Vec::new();
        let mut stack = Vec::new();
        self.expand_flow(flow, "invocation", &root, &mut stack, &mut steps)?;
        bind_references(&mut steps)?;

        debug!("Resolved flow '{}' into {} step(s)", flow, steps.len());
        Ok(Plan {
            name: flow.to_string(),
            steps,
        })
    }

    /// Plan a single task outside of any flow, at path `1`.
    pub fn resolve_task(&self, task: &str, options: &OptionMap) -> Result<Plan> {
        let mut overrides = TaskOverrides::new();
        overrides.insert(task.to_string(), options.clone());
        let frame = Frame {
            overrides,
            ..Frame::default()
        };

        let step = self.expand_task(
            task,
            "invocation",
            &OptionMap::new(),
            frame.path.child(Position::from(1)),
            &frame,
            false,
            Vec::new(),
        )?;

        let mut steps = vec![step];
        bind_references(&mut steps)?;
        Ok(Plan {
            name: task.to_string(),
            steps,
        })
    }

    fn expand_flow(
        &self,
        name: &str,
        referenced_by: &str,
        frame: &Frame,
        stack: &mut Vec<String>,
        out: &mut Vec<ExpandedStep>,
    ) -> Result<()> {
        let flow = self
            .registry
            .flow(name)
            .ok_or_else(|| OrgflowError::UnknownFlow {
                name: name.to_string(),
                referenced_by: referenced_by.to_string(),
            })?;

        if let Some(start) = stack.iter().position(|f| f == name) {
            let mut cycle = stack[start..].to_vec();
            cycle.push(name.to_string());
            return Err(OrgflowError::CircularFlow {
                cycle: cycle.join(" -> "),
            });
        }
        stack.push(name.to_string());

        let mut flows = frame.flows.clone();
        flows.push(name.to_string());

        for spec in flow.steps() {
            let path = frame.path.child(spec.position);
            let referenced_by = format!("flow '{}' step {}", name, spec.position);
            let ignore_failure = spec.ignore_failure.or(frame.ignore_failure);

            let mut gates = frame.gates.clone();
            if let Some(when) = &spec.when {
                gates.push(Gate {
                    scope: path.clone(),
                    condition: Condition::parse(when)?,
                });
            }

            match &spec.target {
                StepTarget::Disabled => {
                    debug!("Step {} of flow '{}' is disabled", spec.position, name);
                }
                StepTarget::Task { name: task, options } => {
                    let inner = Frame {
                        flows: flows.clone(),
                        ..frame.clone()
                    };
                    let step = self.expand_task(
                        task,
                        &referenced_by,
                        options,
                        path,
                        &inner,
                        ignore_failure.unwrap_or(false),
                        gates,
                    )?;
                    out.push(step);
                }
                StepTarget::Flow {
                    name: sub_flow,
                    options,
                } => {
                    debug!("Splicing flow '{}' into '{}' at {}", sub_flow, name, path);
                    let child = Frame {
                        path,
                        flows: flows.clone(),
                        overrides: merge_overrides(options, &frame.overrides),
                        ignore_failure,
                        gates,
                    };
                    self.expand_flow(sub_flow, &referenced_by, &child, stack, out)?;
                }
            }
        }

        stack.pop();
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn expand_task(
        &self,
        name: &str,
        referenced_by: &str,
        step_options: &OptionMap,
        path: StepPath,
        frame: &Frame,
        ignore_failure: bool,
        gates: Vec<Gate>,
    ) -> Result<ExpandedStep> {
        let task = self
            .registry
            .task(name)
            .ok_or_else(|| OrgflowError::UnknownTask {
                name: name.to_string(),
                referenced_by: referenced_by.to_string(),
            })?;

        let inherited = frame.overrides.get(name);
        self.check_override_keys(
            name,
            &task.implementation,
            step_options.keys().chain(inherited.into_iter().flat_map(|o| o.keys())),
        )?;

        // Task default < step override < invoking overrides.
        let mut merged = task.options.clone();
        merged.extend(step_options.clone());
        if let Some(inherited) = inherited {
            merged.extend(inherited.clone());
        }

        let options = merged
            .iter()
            .map(|(key, value)| Ok((key.clone(), OptionExpr::parse(key, value)?)))
            .collect::<Result<BTreeMap<_, _>>>()?;

        debug!(
            "Step {} runs task '{}' with options {:?}",
            path,
            name,
            options.keys().collect::<Vec<_>>()
        );

        Ok(ExpandedStep {
            path,
            task: name.to_string(),
            implementation: task.implementation.clone(),
            options,
            ignore_failure,
            gates,
            flows: frame.flows.clone(),
        })
    }

    fn check_override_keys<'k>(
        &self,
        task: &str,
        implementation: &str,
        keys: impl Iterator<Item = &'k String>,
    ) -> Result<()> {
        let Some(catalog) = self.catalog else {
            return Ok(());
        };

        let bound = catalog
            .get(implementation)
            .ok_or_else(|| OrgflowError::UnknownImplementation {
                task: task.to_string(),
                implementation: implementation.to_string(),
            })?;

        match bound.accepted_options() {
            Some(accepted) => {
                for key in keys {
                    if !accepted.contains(&key.as_str()) {
                        return Err(OrgflowError::UnknownOption {
                            task: task.to_string(),
                            option: key.clone(),
                        });
                    }
                }
            }
            None => {
                for key in keys {
                    debug!("Passing option '{}' to task '{}' unchecked", key, task);
                }
            }
        }
        Ok(())
    }
}

/// Overrides for a sub-flow: the invoking step's own, with anything inherited
/// from further out taking precedence key by key.
fn merge_overrides(declared: &TaskOverrides, inherited: &TaskOverrides) -> TaskOverrides {
    let mut merged = declared.clone();
    for (task, options) in inherited {
        merged
            .entry(task.clone())
            .or_default()
            .extend(options.clone());
    }
    merged
}

/// Bind every backreference to the latest matching step before it.
///
/// Option references see the steps before their own step. Gate references
/// see the steps before the first step of the gate's scope, because the gate
/// is evaluated once, before that step runs.
fn bind_references(steps: &mut [ExpandedStep]) -> Result<()> {
    for index in 0..steps.len() {
        let (earlier, rest) = steps.split_at_mut(index);
        let step = &mut rest[0];
        let path = step.path.clone();

        for expr in step.options.values_mut() {
            if let Some(reference) = expr.backreference_mut() {
                reference.bind(&*earlier, &path)?;
            }
        }

        for gate in &mut step.gates {
            let first = earlier
                .iter()
                .position(|s| s.path.starts_with(&gate.scope))
                .unwrap_or(index);
            let visible = &earlier[..first];
            gate.condition
                .for_each_backreference_mut(&mut |reference: &mut Backreference| {
                    reference.bind(visible, &path)
                })?;
        }
    }
    Ok(())
}
