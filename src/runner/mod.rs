//! Plan execution.
//!
//! [`StepExecutor`] walks a resolved [`Plan`](crate::flow::Plan) strictly in
//! order, one step at a time, and [`Engine`] ties resolution and execution
//! together behind the three public entry points: `resolve_flow`,
//! `run_flow` and `run_task`.

pub mod cancel;
pub mod engine;
pub mod executor;
pub mod result;

pub use cancel::CancelToken;
pub use engine::Engine;
pub use executor::{RunOptions, RunProgress, StepExecutor};
pub use result::{RunResult, RunStatus, StepRecord, StepStatus};
