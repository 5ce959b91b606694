//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! interactions for later assertion.
//!
//! # Example
//!
//! ```
//! use orgflow::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.message("Resolving flow");
//! ui.error("Unknown flow 'ci'");
//!
//! assert!(ui.has_message("Resolving flow"));
//! assert!(ui.has_error("Unknown flow"));
//! ```

use crate::runner::{RunResult, RunStatus, StepRecord, StepStatus};

use super::{OutputMode, UserInterface};

/// Mock UI implementation for testing.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    messages: Vec<String>,
    outputs: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    headers: Vec<String>,
    steps_started: Vec<(usize, usize, String)>,
    step_results: Vec<(String, StepStatus)>,
    summaries: Vec<(String, RunStatus)>,
}

impl MockUI {
    /// Create a new MockUI with Normal output mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new MockUI with a specific output mode.
    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Machine-readable output, one entry per call.
    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// `(current, total, task)` for every announced step.
    pub fn steps_started(&self) -> &[(usize, usize, String)] {
        &self.steps_started
    }

    /// `(path, status)` for every reported step.
    pub fn step_results(&self) -> &[(String, StepStatus)] {
        &self.step_results
    }

    /// `(flow, status)` for every summarized run.
    pub fn summaries(&self) -> &[(String, RunStatus)] {
        &self.summaries
    }

    /// Check if any message contains the given text.
    pub fn has_message(&self, msg: &str) -> bool {
        self.messages.iter().any(|m| m.contains(msg))
    }

    pub fn has_success(&self, msg: &str) -> bool {
        self.successes.iter().any(|m| m.contains(msg))
    }

    pub fn has_warning(&self, msg: &str) -> bool {
        self.warnings.iter().any(|m| m.contains(msg))
    }

    pub fn has_error(&self, msg: &str) -> bool {
        self.errors.iter().any(|m| m.contains(msg))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn output(&mut self, text: &str) {
        self.outputs.push(text.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn show_step_start(&mut self, current: usize, total: usize, _path: &str, task: &str) {
        self.steps_started.push((current, total, task.to_string()));
    }

    fn show_step_result(&mut self, record: &StepRecord) {
        self.step_results
            .push((record.path.to_string(), record.status));
    }

    fn show_run_summary(&mut self, result: &RunResult) {
        self.summaries.push((result.flow.clone(), result.status));
    }

    fn is_interactive(&self) -> bool {
        false
    }
}
