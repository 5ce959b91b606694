//! Deep merge algorithm for YAML configuration values.
//!
//! orgflow supports configuration layering where later configs override
//! earlier ones. This module implements the merge semantics.
//!
//! # Merge Rules
//!
//! - Objects are merged recursively
//! - Arrays are replaced entirely (not merged)
//! - Null values in overlay delete the corresponding key from base
//! - Scalars in overlay replace scalars in base
//! - Numeric keys match by value, so an overlay step `2.0` lands on base step `2`

use serde_yaml::{Mapping, Value};

use crate::registry::Position;

/// Deep merge two YAML values.
///
/// Later values override earlier values at the point of conflict.
/// Objects are merged recursively. Arrays are replaced entirely.
/// Null values in overlay delete the corresponding key from base.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            let mut result = base_map.clone();

            for (key, overlay_value) in overlay_map {
                let key = matching_key(base_map, key);

                if overlay_value.is_null() {
                    result.remove(&key);
                } else if let Some(base_value) = base_map.get(&key) {
                    result.insert(key, deep_merge(base_value, overlay_value));
                } else {
                    result.insert(key, overlay_value.clone());
                }
            }

            Value::Mapping(result)
        }

        (_, overlay) => overlay.clone(),
    }
}

/// The key in `base` that `key` refers to.
///
/// Exact matches win; otherwise a numeric key matches a base key holding
/// the same number.
fn matching_key(base: &Mapping, key: &Value) -> Value {
    if base.contains_key(key) {
        return key.clone();
    }

    let Ok(position) = Position::from_yaml(key) else {
        return key.clone();
    };

    base.keys()
        .find(|candidate| Position::from_yaml(candidate).is_ok_and(|p| p == position))
        .cloned()
        .unwrap_or_else(|| key.clone())
}

/// Merge multiple configs in order (later overrides earlier).
///
/// Empty files parse to null and are treated as "no changes".
pub fn merge_configs(configs: &[Value]) -> Value {
    configs
        .iter()
        .filter(|config| !config.is_null())
        .fold(Value::Mapping(Mapping::new()), |acc, config| {
            deep_merge(&acc, config)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn deep_merge_replaces_at_conflict_point() {
        let base = yaml(
            r#"
tasks:
  deploy:
    class_path: orgflow.tasks.Command
    options:
      command: "sfdx deploy"
"#,
        );
        let overlay = yaml(
            r#"
tasks:
  deploy:
    options:
      command: "sfdx deploy --check"
"#,
        );

        let result = deep_merge(&base, &overlay);

        assert_eq!(
            result["tasks"]["deploy"]["options"]["command"],
            "sfdx deploy --check"
        );
        assert_eq!(result["tasks"]["deploy"]["class_path"], "orgflow.tasks.Command");
    }

    #[test]
    fn arrays_are_replaced_not_merged() {
        let base = yaml("paths:\n  - a\n  - b\n");
        let overlay = yaml("paths:\n  - c\n");

        let result = deep_merge(&base, &overlay);
        let paths = result["paths"].as_sequence().unwrap();

        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0], "c");
    }

    #[test]
    fn null_removes_inherited_value() {
        let base = yaml("orgs:\n  dev: { scratch: true }\n  qa: { scratch: true }\n");
        let overlay = yaml("orgs:\n  qa: null\n");

        let result = deep_merge(&base, &overlay);

        assert!(result["orgs"].get("qa").is_none());
        assert_eq!(result["orgs"]["dev"]["scratch"], true);
    }

    #[test]
    fn numeric_keys_match_by_value() {
        let base = yaml(
            r#"
steps:
  1: { task: deploy }
  2: { task: test, ignore_failure: true }
"#,
        );
        let overlay = yaml(
            r#"
steps:
  "2.0": { task: lint }
  1.5: { task: format }
"#,
        );

        let result = deep_merge(&base, &overlay);
        let steps = result["steps"].as_mapping().unwrap();

        assert_eq!(steps.len(), 3);
        assert_eq!(result["steps"][2]["task"], "lint");
        assert_eq!(result["steps"][2]["ignore_failure"], true);
    }

    #[test]
    fn null_numeric_key_removes_step() {
        let base = yaml("steps:\n  1: { task: a }\n  2: { task: b }\n");
        let overlay = yaml("steps:\n  '1': null\n");

        let result = deep_merge(&base, &overlay);
        let steps = result["steps"].as_mapping().unwrap();

        assert_eq!(steps.len(), 1);
        assert_eq!(result["steps"][2]["task"], "b");
    }

    #[test]
    fn scalar_overlay_replaces_mapping_base() {
        let base = yaml("project:\n  name: demo\n");
        let overlay = yaml("project: disabled\n");

        let result = deep_merge(&base, &overlay);
        assert_eq!(result["project"], "disabled");
    }

    #[test]
    fn merge_configs_merges_multiple_in_order() {
        let configs = vec![yaml("a: 1\nb: 2"), yaml("b: 3\nc: 4"), yaml("c: 5")];

        let result = merge_configs(&configs);

        assert_eq!(result["a"], 1);
        assert_eq!(result["b"], 3);
        assert_eq!(result["c"], 5);
    }

    #[test]
    fn merge_configs_ignores_empty_layers() {
        let configs = vec![yaml("a: 1"), Value::Null];
        let result = merge_configs(&configs);
        assert_eq!(result["a"], 1);
    }

    #[test]
    fn merge_empty_configs_returns_empty() {
        let result = merge_configs(&[]);
        assert!(result.as_mapping().unwrap().is_empty());
    }
}
