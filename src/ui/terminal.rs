//! Styled terminal UI.

use console::Term;
use std::io::Write;
use std::time::Duration;

use crate::runner::{RunResult, StepRecord, StepStatus};
use crate::shell::is_ci;

use super::{should_use_colors, OrgflowTheme, OutputMode, UserInterface};

/// Terminal UI implementation.
///
/// Status goes to stdout, errors to stderr.
pub struct TerminalUI {
    term: Term,
    err: Term,
    theme: OrgflowTheme,
    mode: OutputMode,
}

impl TerminalUI {
    /// Create a new terminal UI.
    pub fn new(mode: OutputMode) -> Self {
        let theme = if should_use_colors() {
            OrgflowTheme::new()
        } else {
            OrgflowTheme::plain()
        };

        Self {
            term: Term::stdout(),
            err: Term::stderr(),
            theme,
            mode,
        }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        writeln!(self.term, "{}", msg).ok();
    }

    fn output(&mut self, text: &str) {
        writeln!(self.term, "{}", text).ok();
    }

    fn success(&mut self, msg: &str) {
        writeln!(self.term, "{}", self.theme.format_success(msg)).ok();
    }

    fn warning(&mut self, msg: &str) {
        writeln!(self.err, "{}", self.theme.format_warning(msg)).ok();
    }

    fn error(&mut self, msg: &str) {
        writeln!(self.err, "{}", self.theme.format_error(msg)).ok();
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_progress() {
            writeln!(self.term, "\n{}\n", self.theme.format_header(title)).ok();
        }
    }

    fn show_step_start(&mut self, current: usize, total: usize, path: &str, task: &str) {
        if self.mode.shows_progress() {
            writeln!(
                self.term,
                "  {} {} {}",
                self.theme
                    .step_number
                    .apply_to(format!("[{}/{}]", current, total)),
                self.theme.highlight.apply_to(task),
                self.theme.dim.apply_to(format!("({})", path)),
            )
            .ok();
        }
    }

    fn show_step_result(&mut self, record: &StepRecord) {
        if !self.mode.shows_progress() {
            return;
        }

        let detail = match record.status {
            StepStatus::Succeeded => self
                .theme
                .duration
                .apply_to(format_duration(record.duration))
                .to_string(),
            StepStatus::Skipped => self
                .theme
                .dim
                .apply_to(record.reason.as_deref().unwrap_or("skipped"))
                .to_string(),
            StepStatus::Failed => self
                .theme
                .error
                .apply_to(record.error.as_deref().unwrap_or("failed"))
                .to_string(),
        };

        writeln!(
            self.term,
            "    {} {} {}",
            self.theme.format_status(record.status),
            record.task,
            detail
        )
        .ok();

        if self.mode.shows_step_outputs() {
            for (key, value) in &record.outputs {
                let rendered = serde_json::to_string(value).unwrap_or_default();
                writeln!(
                    self.term,
                    "      {} {}",
                    self.theme.key.apply_to(format!("{}:", key)),
                    self.theme.dim.apply_to(rendered)
                )
                .ok();
            }
        }
    }

    fn show_run_summary(&mut self, result: &RunResult) {
        let b = &self.theme.border;

        if self.mode.shows_progress() {
            writeln!(self.term).ok();
            writeln!(
                self.term,
                "  {} {}",
                b.apply_to("┌─"),
                b.apply_to("Summary ──────────────────────────")
            )
            .ok();

            for step in &result.steps {
                writeln!(
                    self.term,
                    "  {} {} {:<8} {:<24} {}",
                    b.apply_to("│"),
                    self.theme.format_status(step.status),
                    self.theme.step_number.apply_to(step.path.to_string()),
                    step.task,
                    self.theme.duration.apply_to(format_duration(step.duration)),
                )
                .ok();
            }

            let skipped = result
                .steps
                .iter()
                .filter(|s| s.status == StepStatus::Skipped)
                .count();
            writeln!(
                self.term,
                "  {}",
                b.apply_to("├────────────────────────────────────")
            )
            .ok();
            writeln!(
                self.term,
                "  {} Total: {} {} {} run {} {} skipped",
                b.apply_to("│"),
                self.theme
                    .duration
                    .apply_to(format_duration(result.duration)),
                self.theme.dim.apply_to("·"),
                result.steps.len() - skipped,
                self.theme.dim.apply_to("·"),
                skipped,
            )
            .ok();
            writeln!(
                self.term,
                "  {}",
                b.apply_to("└────────────────────────────────────")
            )
            .ok();
        }

        writeln!(
            self.term,
            "{}",
            self.theme.format_run_status(&result.flow, result.status)
        )
        .ok();
    }

    fn is_interactive(&self) -> bool {
        self.term.is_term() && !is_ci()
    }
}

/// Create the terminal UI for `mode`.
pub fn create_ui(mode: OutputMode) -> Box<dyn UserInterface> {
    Box::new(TerminalUI::new(mode))
}

/// Format a duration for display.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", d.as_millis())
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = secs / 60.0;
        format!("{:.1}m", mins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_ui_output_mode() {
        let ui = TerminalUI::new(OutputMode::Quiet);
        assert_eq!(ui.output_mode(), OutputMode::Quiet);
    }

    #[test]
    fn create_ui_respects_mode() {
        let ui = create_ui(OutputMode::Verbose);
        assert_eq!(ui.output_mode(), OutputMode::Verbose);
    }

    #[test]
    fn format_duration_scales_units() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1.5m");
    }
}
