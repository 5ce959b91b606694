//! Terminal output.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for styled terminal output
//! - [`MockUI`] for capturing output in tests
//!
//! # Example
//!
//! ```
//! use orgflow::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.show_header("dev_org");
//! ui.success("Done!");
//! assert!(ui.has_success("Done!"));
//! ```

pub mod mock;
pub mod output;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use output::OutputMode;
pub use terminal::{create_ui, format_duration, TerminalUI};
pub use theme::{should_use_colors, OrgflowTheme};

use crate::runner::{RunResult, StepRecord};

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Display a message to the user.
    fn message(&mut self, msg: &str);

    /// Write machine-readable output (JSON), regardless of output mode.
    fn output(&mut self, text: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message.
    fn error(&mut self, msg: &str);

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);

    /// Announce a step about to run (`current` is 1-based).
    fn show_step_start(&mut self, current: usize, total: usize, path: &str, task: &str);

    /// Show the terminal state of one step.
    fn show_step_result(&mut self, record: &StepRecord);

    /// Show the per-step table and overall status of a finished run.
    fn show_run_summary(&mut self, result: &RunResult);

    /// Check if running in an interactive terminal.
    fn is_interactive(&self) -> bool;
}
