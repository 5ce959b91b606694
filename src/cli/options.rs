//! `-o` option parsing.
//!
//! Values are read as YAML scalars, so `-o deploy__check_only=true` passes a
//! boolean and `-o retries=3` an integer. Anything that does not parse, or
//! parses to a collection, is kept as the raw string.

use serde_yaml::Value;

use crate::error::{OrgflowError, Result};
use crate::registry::{OptionMap, TaskOverrides};

/// Parse `TASK__KEY=VALUE` pairs into per-task overrides.
pub fn parse_flow_overrides(raw: &[String]) -> Result<TaskOverrides> {
    let mut overrides = TaskOverrides::new();
    for pair in raw {
        let (key, value) = split_pair(pair)?;
        let (task, option) = key
            .split_once("__")
            .filter(|(task, option)| !task.is_empty() && !option.is_empty())
            .ok_or_else(|| OrgflowError::InvalidOptionValue {
                option: key.to_string(),
                message: "expected TASK__KEY=VALUE".to_string(),
            })?;
        overrides
            .entry(task.to_string())
            .or_default()
            .insert(option.to_string(), parse_scalar(value));
    }
    Ok(overrides)
}

/// Parse `KEY=VALUE` pairs for a single task.
pub fn parse_task_options(raw: &[String]) -> Result<OptionMap> {
    raw.iter()
        .map(|pair| {
            let (key, value) = split_pair(pair)?;
            Ok((key.to_string(), parse_scalar(value)))
        })
        .collect()
}

fn split_pair(pair: &str) -> Result<(&str, &str)> {
    pair.split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| OrgflowError::InvalidOptionValue {
            option: pair.to_string(),
            message: "expected KEY=VALUE".to_string(),
        })
}

fn parse_scalar(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::String(String::new());
    }
    match serde_yaml::from_str::<Value>(raw) {
        Ok(value @ (Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Null)) => value,
        _ => Value::String(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flow_overrides_group_by_task() {
        let overrides = parse_flow_overrides(&strings(&[
            "deploy__check_only=true",
            "deploy__path=force-app",
            "test__retries=3",
        ]))
        .unwrap();

        assert_eq!(overrides["deploy"]["check_only"], Value::Bool(true));
        assert_eq!(overrides["deploy"]["path"], "force-app");
        assert_eq!(overrides["test"]["retries"], 3);
    }

    #[test]
    fn option_names_may_contain_double_underscore() {
        let overrides = parse_flow_overrides(&strings(&["deploy__a__b=1"])).unwrap();
        assert!(overrides["deploy"].contains_key("a__b"));
    }

    #[test]
    fn flow_override_requires_task_prefix() {
        let err = parse_flow_overrides(&strings(&["check_only=true"])).unwrap_err();
        assert!(matches!(err, OrgflowError::InvalidOptionValue { .. }));
    }

    #[test]
    fn pair_requires_equals() {
        assert!(parse_task_options(&strings(&["message"])).is_err());
        assert!(parse_task_options(&strings(&["=x"])).is_err());
    }

    #[test]
    fn values_parse_as_scalars() {
        let options = parse_task_options(&strings(&[
            "a=1.5",
            "b=false",
            "c=hello world",
            "d=",
            "e=[1, 2]",
            "f=x=y",
            "g=null",
        ]))
        .unwrap();

        assert_eq!(options["a"], 1.5);
        assert_eq!(options["b"], Value::Bool(false));
        assert_eq!(options["c"], "hello world");
        assert_eq!(options["d"], "");
        assert_eq!(options["e"], "[1, 2]");
        assert_eq!(options["f"], "x=y");
        assert_eq!(options["g"], Value::Null);
    }
}
