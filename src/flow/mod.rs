//! Flow expansion.
//!
//! A [`FlowResolver`] turns a named flow into a [`Plan`]: a flat, totally
//! ordered list of [`ExpandedStep`]s with sub-flows spliced in place, options
//! merged, `ignore_failure` inherited and backreferences bound. A plan is
//! rebuilt for every run since invocation overrides differ between runs.
//!
//! # Example
//!
//! ```
//! use orgflow::flow::FlowResolver;
//! use orgflow::registry::{FlowDefinition, Registry, StepSpec, TaskDefinition, TaskOverrides};
//!
//! let registry = Registry::builder()
//!     .task(TaskDefinition::new("deploy", "orgflow.tasks.Emit"))
//!     .task(TaskDefinition::new("test", "orgflow.tasks.Emit"))
//!     .flow(FlowDefinition::new("ci", vec![
//!         StepSpec::flow(1, "build"),
//!         StepSpec::task(2, "test"),
//!     ]).unwrap())
//!     .flow(FlowDefinition::new("build", vec![StepSpec::task(1, "deploy")]).unwrap())
//!     .build()
//!     .unwrap();
//!
//! let plan = FlowResolver::new(&registry).resolve("ci", &TaskOverrides::new()).unwrap();
//! assert_eq!(plan.paths(), vec!["1/1", "2"]);
//! ```

pub mod expanded;
pub mod resolver;

pub use expanded::{ExpandedStep, Gate, Plan};
pub use resolver::FlowResolver;
