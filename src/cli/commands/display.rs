//! Shared rendering helpers for plans and JSON output.

use serde::Serialize;
use serde_yaml::Value;

use crate::error::Result;
use crate::flow::Plan;
use crate::ui::{should_use_colors, OrgflowTheme, UserInterface};

/// Serialize `value` as pretty JSON.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value).map_err(anyhow::Error::from)?)
}

/// Colored theme for an interactive terminal, plain otherwise.
pub fn theme_for(ui: &dyn UserInterface) -> OrgflowTheme {
    if ui.is_interactive() && should_use_colors() {
        OrgflowTheme::new()
    } else {
        OrgflowTheme::plain()
    }
}

/// Render an option value on one line.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

/// Print each expanded step with its flags and unresolved options.
pub fn show_plan(ui: &mut dyn UserInterface, plan: &Plan, theme: &OrgflowTheme) {
    for step in plan {
        let mut line = format!(
            "  {:<10} {}",
            theme.step_number.apply_to(step.path.to_string()),
            theme.highlight.apply_to(&step.task)
        );

        if !step.flows.is_empty() {
            line.push_str(&format!(
                " {}",
                theme.dim.apply_to(format!("[{}]", step.flows.join(" > ")))
            ));
        }
        if step.ignore_failure {
            line.push_str(&format!(" {}", theme.warning.apply_to("ignore_failure")));
        }
        ui.message(&line);

        for gate in &step.gates {
            ui.message(&format!(
                "      {} {} {}",
                theme.key.apply_to("when"),
                gate.condition.source(),
                theme.dim.apply_to(format!("(scope {})", gate.scope))
            ));
        }

        for (key, expr) in &step.options {
            let when = if expr.is_dynamic() {
                format!(" {}", theme.dim.apply_to("(at run time)"))
            } else {
                String::new()
            };
            ui.message(&format!(
                "      {} {}{}",
                theme.key.apply_to(format!("{}:", key)),
                render_value(&expr.to_value()),
                when
            ));
        }
    }
}
