//! Option value expressions.
//!
//! Every option value is parsed once, at plan time, into an [`OptionExpr`]:
//!
//! - `$project.package.namespace` (or `$project_config.project__package__namespace`)
//!   reads an attribute of the external configuration; the path must start
//!   at `project`, `org`, `services` or one of their `_config` aliases
//! - `^^deploy.package_id` reads an output of an earlier step
//! - anything else is a literal and is passed through unchanged
//!
//! Only whole string values are interpreted; there is no substitution inside
//! larger strings and a resolved value is never parsed again. A leading `$$`
//! or `^^^` escapes the sigil and yields a literal starting with `$` or `^^`.

use serde::{Serialize, Serializer};
use serde_yaml::Value;

use crate::context::{ExecutionContext, StepPath};
use crate::error::{OrgflowError, Result};

use super::path::{is_config_path, AttributePath};
use super::reference::Backreference;

/// A parsed option value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionExpr {
    /// Used as-is.
    Literal(Value),
    /// Attribute of the external configuration tree.
    Config(AttributePath),
    /// Output of an earlier step.
    Backref(Backreference),
}

impl OptionExpr {
    /// Parse a raw option value.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOptionValue` for a malformed `$` path or `^^` reference.
    pub fn parse(option: &str, value: &Value) -> Result<Self> {
        let Value::String(text) = value else {
            return Ok(OptionExpr::Literal(value.clone()));
        };

        let invalid = |message: &str| OrgflowError::InvalidOptionValue {
            option: option.to_string(),
            message: format!("{} in '{}'", message, text),
        };

        if let Some(escaped) = text.strip_prefix("$$") {
            return Ok(OptionExpr::Literal(Value::String(format!("${}", escaped))));
        }
        if let Some(escaped) = text.strip_prefix("^^^") {
            return Ok(OptionExpr::Literal(Value::String(format!("^^{}", escaped))));
        }

        if let Some(body) = text.strip_prefix("^^") {
            return Backreference::parse(body)
                .map(OptionExpr::Backref)
                .ok_or_else(|| invalid("a backreference needs a step name and an output key"));
        }

        if let Some(body) = text.strip_prefix('$') {
            // "$100", "$HOME/bin" and "$CLI deploy" are ordinary text.
            if !is_config_path(body) {
                return Ok(OptionExpr::Literal(value.clone()));
            }
            return AttributePath::parse(body)
                .map(OptionExpr::Config)
                .ok_or_else(|| invalid("malformed attribute path"));
        }

        Ok(OptionExpr::Literal(value.clone()))
    }

    /// Produce the concrete value for a step about to run.
    pub fn resolve(&self, ctx: &ExecutionContext, step: &StepPath) -> Result<Value> {
        match self {
            OptionExpr::Literal(value) => Ok(value.clone()),
            OptionExpr::Config(path) => path.lookup(ctx.config()).cloned(),
            OptionExpr::Backref(reference) => reference.resolve(ctx.results(), step),
        }
    }

    /// Whether the value is only known at run time.
    pub fn is_dynamic(&self) -> bool {
        !matches!(self, OptionExpr::Literal(_))
    }

    pub fn backreference_mut(&mut self) -> Option<&mut Backreference> {
        match self {
            OptionExpr::Backref(reference) => Some(reference),
            _ => None,
        }
    }

    /// Source-like rendering used in plan output.
    pub fn to_value(&self) -> Value {
        match self {
            OptionExpr::Literal(value) => value.clone(),
            OptionExpr::Config(path) => Value::String(format!("${}", path.raw())),
            OptionExpr::Backref(reference) => Value::String(reference.raw().to_string()),
        }
    }
}

impl Serialize for OptionExpr {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Outputs;
    use crate::expr::reference::ReferenceCandidate;
    use crate::registry::Position;

    fn parse(raw: &str) -> Result<OptionExpr> {
        OptionExpr::parse("opt", &Value::String(raw.to_string()))
    }

    fn ctx() -> ExecutionContext {
        ExecutionContext::new(
            serde_yaml::from_str("project:\n  package:\n    namespace: acme\n").unwrap(),
        )
    }

    #[test]
    fn non_strings_are_literals() {
        let expr = OptionExpr::parse("n", &Value::from(5)).unwrap();
        assert_eq!(expr, OptionExpr::Literal(Value::from(5)));
        assert!(!expr.is_dynamic());
    }

    #[test]
    fn plain_strings_are_literals() {
        assert_eq!(
            parse("src/main").unwrap(),
            OptionExpr::Literal(Value::from("src/main"))
        );
        assert_eq!(parse("$100").unwrap(), OptionExpr::Literal(Value::from("$100")));
    }

    #[test]
    fn shell_variables_are_literals() {
        for raw in ["$HOME/bin/deploy --flag", "$SFDX_CLI deploy", "$HOME/x", "$PATH"] {
            let expr = parse(raw).unwrap();
            assert_eq!(expr, OptionExpr::Literal(Value::from(raw)));
            assert!(!expr.is_dynamic());
        }
    }

    #[test]
    fn dollar_prefix_is_config_path() {
        let expr = parse("$project.package.namespace").unwrap();
        assert!(matches!(expr, OptionExpr::Config(_)));
        assert!(expr.is_dynamic());
        assert_eq!(
            expr.resolve(&ctx(), &StepPath::root()).unwrap(),
            Value::from("acme")
        );
    }

    #[test]
    fn project_config_prefix_is_config_path() {
        let expr = parse("$project_config.project__package__namespace").unwrap();
        assert_eq!(
            expr.resolve(&ctx(), &StepPath::root()).unwrap(),
            Value::from("acme")
        );
    }

    #[test]
    fn missing_config_attribute_fails_at_resolve() {
        let expr = parse("$project.package.api_version").unwrap();
        let err = expr.resolve(&ctx(), &StepPath::root()).unwrap_err();
        assert!(matches!(err, OrgflowError::MissingAttribute { .. }));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn escapes_yield_literals() {
        assert_eq!(
            parse("$$project.name").unwrap(),
            OptionExpr::Literal(Value::from("$project.name"))
        );
        assert_eq!(
            parse("^^^deploy.id").unwrap(),
            OptionExpr::Literal(Value::from("^^deploy.id"))
        );
    }

    #[test]
    fn malformed_forms_are_rejected() {
        assert!(matches!(
            parse("^^deploy"),
            Err(OrgflowError::InvalidOptionValue { .. })
        ));
        assert!(matches!(
            parse("$project..name"),
            Err(OrgflowError::InvalidOptionValue { .. })
        ));
    }

    #[test]
    fn resolved_value_is_not_parsed_again() {
        let ctx = ExecutionContext::new(
            serde_yaml::from_str("project:\n  trick: '$project.trick'\n").unwrap(),
        );
        let expr = parse("$project.trick").unwrap();
        assert_eq!(
            expr.resolve(&ctx, &StepPath::root()).unwrap(),
            Value::from("$project.trick")
        );
    }

    struct Earlier(StepPath);

    impl ReferenceCandidate for Earlier {
        fn path(&self) -> &StepPath {
            &self.0
        }
        fn task_name(&self) -> &str {
            "deploy"
        }
        fn enclosing_flows(&self) -> &[String] {
            &[]
        }
    }

    #[test]
    fn backreference_resolves_through_context() {
        let step = StepPath::root().child(Position::from(1));
        let mut expr = parse("^^deploy.package_id").unwrap();
        expr.backreference_mut()
            .unwrap()
            .bind(&[Earlier(step.clone())], &StepPath::root())
            .unwrap();

        let mut ctx = ctx();
        let mut outputs = Outputs::new();
        outputs.insert("package_id".to_string(), Value::from("04t000"));
        ctx.record(step, outputs).unwrap();

        assert_eq!(
            expr.resolve(&ctx, &StepPath::root()).unwrap(),
            Value::from("04t000")
        );
    }

    #[test]
    fn renders_source_form() {
        assert_eq!(
            parse("$project.name").unwrap().to_value(),
            Value::from("$project.name")
        );
        assert_eq!(parse("^^a.b").unwrap().to_value(), Value::from("^^a.b"));
    }
}
