//! Visual theme and styling.

use console::Style;

use crate::runner::{RunStatus, StepStatus};

/// orgflow's visual theme.
#[derive(Debug, Clone)]
pub struct OrgflowTheme {
    /// Style for success messages (green).
    pub success: Style,
    /// Style for warning messages (orange).
    pub warning: Style,
    /// Style for error messages (red bold).
    pub error: Style,
    /// Style for informational/running elements (cyan).
    pub info: Style,
    /// Style for dim/secondary text.
    pub dim: Style,
    /// Style for highlighted/important text (bold).
    pub highlight: Style,
    /// Style for headers (cyan bold).
    pub header: Style,
    /// Style for step paths and counters (dim).
    pub step_number: Style,
    /// Style for durations (dim).
    pub duration: Style,
    /// Style for key labels in key-value displays (bold).
    pub key: Style,
    /// Style for box-drawing borders (dim).
    pub border: Style,
}

impl Default for OrgflowTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl OrgflowTheme {
    /// Create the default theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            info: Style::new().cyan(),
            dim: Style::new().dim(),
            highlight: Style::new().bold(),
            header: Style::new().bold().cyan(),
            step_number: Style::new().dim(),
            duration: Style::new().dim(),
            key: Style::new().bold(),
            border: Style::new().dim(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            highlight: Style::new(),
            header: Style::new(),
            step_number: Style::new(),
            duration: Style::new(),
            key: Style::new(),
            border: Style::new(),
        }
    }

    /// Format a success message (icon + text in green).
    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    /// Format a warning message (icon + text in orange).
    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    /// Format an error message (icon + text in red bold).
    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    /// Format a header banner.
    pub fn format_header(&self, title: &str) -> String {
        format!("{} {}", self.header.apply_to("▶"), self.highlight.apply_to(title))
    }

    /// The status icon, colored by outcome.
    pub fn format_status(&self, status: StepStatus) -> String {
        let style = match status {
            StepStatus::Succeeded => &self.success,
            StepStatus::Failed => &self.error,
            StepStatus::Skipped => &self.dim,
        };
        style.apply_to(status.display_char()).to_string()
    }

    /// A run's final status line.
    pub fn format_run_status(&self, flow: &str, status: RunStatus) -> String {
        let msg = format!("{} {}", flow, status);
        match status {
            RunStatus::Succeeded => self.format_success(&msg),
            RunStatus::CompletedWithErrors | RunStatus::Cancelled => self.format_warning(&msg),
            RunStatus::Aborted => self.format_error(&msg),
        }
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // Check NO_COLOR env var (https://no-color.org/)
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    console::Term::stdout().is_term()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_formats_messages() {
        let theme = OrgflowTheme::plain();
        assert_eq!(theme.format_success("Complete"), "✓ Complete");
        assert_eq!(theme.format_warning("Caution"), "⚠ Caution");
        assert_eq!(theme.format_error("Failed"), "✗ Failed");
    }

    #[test]
    fn theme_formats_header() {
        let theme = OrgflowTheme::plain();
        let msg = theme.format_header("dev_org");
        assert!(msg.contains("dev_org"));
    }

    #[test]
    fn theme_formats_status_icons() {
        let theme = OrgflowTheme::plain();
        assert_eq!(theme.format_status(StepStatus::Succeeded), "✓");
        assert_eq!(theme.format_status(StepStatus::Skipped), "⊘");
        assert_eq!(theme.format_status(StepStatus::Failed), "✗");
    }

    #[test]
    fn theme_formats_run_status() {
        let theme = OrgflowTheme::plain();
        assert_eq!(
            theme.format_run_status("ci", RunStatus::Aborted),
            "✗ ci aborted"
        );
        assert_eq!(
            theme.format_run_status("ci", RunStatus::CompletedWithErrors),
            "⚠ ci completed with errors"
        );
    }

    #[test]
    fn default_impl_matches_new() {
        let default = OrgflowTheme::default();
        let new = OrgflowTheme::new();
        assert_eq!(default.format_success("test"), new.format_success("test"));
    }
}
