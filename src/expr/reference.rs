//! Backreferences to the outputs of earlier steps.
//!
//! `^^deploy.package_id` reads the `package_id` output of the most recent
//! `deploy` step positioned before the referencing step. When the same task
//! appears in several sub-flows, `^^release.deploy.package_id` narrows the
//! match to a `deploy` step inside an instance of the `release` flow.
//!
//! References are written by name but bound to a concrete [`StepPath`] at
//! plan time, so a reference to a step that is never declared, or that is
//! only positioned later, is rejected before the run starts.

use std::fmt;

use serde_yaml::Value;

use crate::context::{ResultStore, StepPath};
use crate::error::{OrgflowError, Result};

use super::path::lookup_segments;

/// A `^^` reference, optionally bound to the step it reads from.
#[derive(Debug, Clone, PartialEq)]
pub struct Backreference {
    raw: String,
    segments: Vec<String>,
    target: Option<BoundTarget>,
}

/// The step a reference resolved to, and the key path within its outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundTarget {
    pub step: StepPath,
    pub key: Vec<String>,
}

/// A candidate step a reference can be bound against.
pub trait ReferenceCandidate {
    fn path(&self) -> &StepPath;
    fn task_name(&self) -> &str;
    /// Names of the flows enclosing this step, outermost first.
    fn enclosing_flows(&self) -> &[String];
}

impl Backreference {
    /// Parse the part after `^^`.
    ///
    /// At least a step name and one output key are required.
    pub fn parse(body: &str) -> Option<Self> {
        let segments: Vec<String> = body.split('.').map(str::to_string).collect();
        if segments.len() < 2 || segments.iter().any(|s| s.is_empty()) {
            return None;
        }
        Some(Self {
            raw: format!("^^{}", body),
            segments,
            target: None,
        })
    }

    /// The reference as written, including the `^^` prefix.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The bound target, once [`bind`](Self::bind) has succeeded.
    pub fn target(&self) -> Option<&BoundTarget> {
        self.target.as_ref()
    }

    /// Bind to the latest matching step among `earlier`, which must be the
    /// steps positioned before the referencing one, in execution order.
    ///
    /// A plain task name is tried first; if no earlier step runs that task,
    /// the first segment is treated as an enclosing flow name.
    pub fn bind<C: ReferenceCandidate>(&mut self, earlier: &[C], referencing: &StepPath) -> Result<()> {
        let first = &self.segments[0];

        let by_task = earlier
            .iter()
            .rev()
            .find(|c| c.task_name() == first)
            .map(|c| (c.path().clone(), self.segments[1..].to_vec()));

        let by_flow = || {
            if self.segments.len() < 3 {
                return None;
            }
            let task = &self.segments[1];
            earlier
                .iter()
                .rev()
                .find(|c| c.task_name() == task && c.enclosing_flows().iter().any(|f| f == first))
                .map(|c| (c.path().clone(), self.segments[2..].to_vec()))
        };

        match by_task.or_else(by_flow) {
            Some((step, key)) => {
                self.target = Some(BoundTarget { step, key });
                Ok(())
            }
            None => Err(OrgflowError::UnresolvedBackreference {
                reference: self.raw.clone(),
                step: referencing.to_string(),
                reason: format!("no step named '{}' is positioned before this step", first),
            }),
        }
    }

    /// Read the referenced value from `results`.
    ///
    /// # Errors
    ///
    /// `UnresolvedBackreference` if the reference was never bound, the
    /// target step did not succeed (skipped, failed, or not yet run), or the
    /// output key is absent.
    pub fn resolve(&self, results: &ResultStore, referencing: &StepPath) -> Result<Value> {
        let unresolved = |reason: String| OrgflowError::UnresolvedBackreference {
            reference: self.raw.clone(),
            step: referencing.to_string(),
            reason,
        };

        let target = self
            .target
            .as_ref()
            .ok_or_else(|| unresolved("reference was not bound to a step".to_string()))?;

        let outputs = results.get(&target.step).ok_or_else(|| {
            unresolved(format!(
                "step {} has not completed successfully in this run",
                target.step
            ))
        })?;

        let (head, rest) = target
            .key
            .split_first()
            .ok_or_else(|| unresolved("no output key given".to_string()))?;

        outputs
            .get(head)
            .and_then(|value| lookup_segments(value, rest))
            .cloned()
            .ok_or_else(|| {
                unresolved(format!(
                    "step {} produced no output '{}'",
                    target.step,
                    target.key.join(".")
                ))
            })
    }
}

impl fmt::Display for Backreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Outputs;
    use crate::registry::Position;

    struct Candidate {
        path: StepPath,
        task: String,
        flows: Vec<String>,
    }

    impl ReferenceCandidate for Candidate {
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

    fn candidate(positions: &[u32], task: &str, flows: &[&str]) -> Candidate {
        Candidate {
            path: StepPath::from(positions.iter().map(|p| Position::from(*p)).collect::<Vec<_>>()),
            task: task.to_string(),
            flows: flows.iter().map(|f| f.to_string()).collect(),
        }
    }

    #[test]
    fn parse_requires_step_and_key() {
        assert!(Backreference::parse("deploy.package_id").is_some());
        assert!(Backreference::parse("deploy").is_none());
        assert!(Backreference::parse("deploy.").is_none());
        assert!(Backreference::parse(".key").is_none());
    }

    #[test]
    fn binds_to_latest_earlier_step_with_task_name() {
        let earlier = vec![
            candidate(&[1], "deploy", &["root"]),
            candidate(&[2], "test", &["root"]),
            candidate(&[3], "deploy", &["root"]),
        ];
        let mut reference = Backreference::parse("deploy.package_id").unwrap();
        reference.bind(&earlier, &StepPath::root()).unwrap();

        let target = reference.target().unwrap();
        assert_eq!(target.step.to_string(), "3");
        assert_eq!(target.key, vec!["package_id"]);
    }

    #[test]
    fn flow_qualified_reference_narrows_match() {
        let earlier = vec![
            candidate(&[1, 1], "deploy", &["root", "release"]),
            candidate(&[2, 1], "deploy", &["root", "beta"]),
        ];
        let mut reference = Backreference::parse("release.deploy.package_id").unwrap();
        reference.bind(&earlier, &StepPath::root()).unwrap();
        assert_eq!(reference.target().unwrap().step.to_string(), "1/1");
    }

    #[test]
    fn unknown_name_fails_to_bind() {
        let earlier = vec![candidate(&[1], "deploy", &["root"])];
        let mut reference = Backreference::parse("publish.version").unwrap();
        let err = reference.bind(&earlier, &StepPath::root()).unwrap_err();
        assert!(matches!(err, OrgflowError::UnresolvedBackreference { .. }));
    }

    #[test]
    fn resolves_recorded_output() {
        let earlier = vec![candidate(&[1], "deploy", &["root"])];
        let mut reference = Backreference::parse("deploy.result.id").unwrap();
        reference.bind(&earlier, &StepPath::root()).unwrap();

        let mut results = ResultStore::new();
        let mut outputs = Outputs::new();
        outputs.insert(
            "result".to_string(),
            serde_yaml::from_str("{id: 42}").unwrap(),
        );
        results.record(earlier[0].path.clone(), outputs).unwrap();

        let value = reference.resolve(&results, &StepPath::root()).unwrap();
        assert_eq!(value, Value::from(42));
    }

    #[test]
    fn resolving_unrecorded_step_fails() {
        let earlier = vec![candidate(&[1], "deploy", &["root"])];
        let mut reference = Backreference::parse("deploy.id").unwrap();
        reference.bind(&earlier, &StepPath::root()).unwrap();

        let err = reference
            .resolve(&ResultStore::new(), &StepPath::root())
            .unwrap_err();
        assert!(err.to_string().contains("has not completed"));
    }

    #[test]
    fn resolving_missing_key_fails() {
        let earlier = vec![candidate(&[1], "deploy", &["root"])];
        let mut reference = Backreference::parse("deploy.id").unwrap();
        reference.bind(&earlier, &StepPath::root()).unwrap();

        let mut results = ResultStore::new();
        results.record(earlier[0].path.clone(), Outputs::new()).unwrap();

        let err = reference.resolve(&results, &StepPath::root()).unwrap_err();
        assert!(err.to_string().contains("produced no output"));
    }
}
