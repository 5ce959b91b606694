//! Integration tests for configuration loading, layering and validation.

use orgflow::config::{
    load_config, load_merged_config, validate, validate_config, ConfigPaths, CONFIG_FILE,
    LOCAL_CONFIG_FILE,
};
use orgflow::registry::Registry;
use orgflow::tasks::TaskCatalog;
use orgflow::OrgflowError;
use std::fs;
use tempfile::TempDir;

const BASE: &str = r#"
project:
  name: demo
  package: { namespace: acme }
default_org: dev
orgs:
  dev: { scratch: true }
tasks:
  deploy:
    class_path: orgflow.tasks.Emit
    group: Deployment
    options: { path: src }
  test:
    class_path: orgflow.tasks.Log
    options: { message: $project.package.namespace }
flows:
  ci:
    description: Deploy and test
    steps:
      1: { task: deploy }
      2: { task: test }
"#;

fn project(base: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(CONFIG_FILE), base).unwrap();
    temp
}

#[test]
fn loads_project_file() {
    let temp = project(BASE);

    let config = load_config(temp.path(), None).unwrap();

    assert_eq!(config.tasks.len(), 2);
    assert_eq!(config.default_org.as_deref(), Some("dev"));
    validate(&config, &TaskCatalog::with_builtins()).unwrap();
}

#[test]
fn local_file_layers_over_project() {
    let temp = project(BASE);
    fs::write(
        temp.path().join(LOCAL_CONFIG_FILE),
        r#"
tasks:
  deploy:
    options: { path: force-app }
flows:
  ci:
    steps:
      1.5: { task: test, options: { message: between } }
"#,
    )
    .unwrap();

    let config = load_config(temp.path(), None).unwrap();
    let registry = Registry::from_config(&config).unwrap();

    assert_eq!(
        registry.task("deploy").unwrap().options["path"],
        serde_yaml::Value::from("force-app")
    );
    assert_eq!(registry.task("deploy").unwrap().group.as_deref(), Some("Deployment"));
    assert_eq!(registry.flow("ci").unwrap().steps().len(), 3);
}

#[test]
fn user_global_file_is_lowest_precedence() {
    let home = TempDir::new().unwrap();
    let temp = project(BASE);
    let global = home.path().join("orgflow.yml");
    fs::write(
        &global,
        "tasks:\n  deploy: { options: { path: global, extra: true } }\n",
    )
    .unwrap();

    let mut paths = ConfigPaths::discover(temp.path());
    paths.user_global = Some(global);
    let config = load_merged_config(&paths).unwrap();

    let options = &config.tasks["deploy"].options;
    assert_eq!(options["path"], serde_yaml::Value::from("src"));
    assert_eq!(options["extra"], serde_yaml::Value::from(true));
}

#[test]
fn missing_project_file_is_reported() {
    let temp = TempDir::new().unwrap();

    let err = load_config(temp.path(), None).unwrap_err();

    assert!(matches!(err, OrgflowError::ConfigNotFound { .. }));
}

#[test]
fn explicit_config_skips_discovery() {
    let temp = project("tasks: {}\n");
    let other = temp.path().join("ci.yml");
    fs::write(&other, BASE).unwrap();

    let config = load_config(temp.path(), Some(&other)).unwrap();

    assert!(config.flows.contains_key("ci"));
}

#[test]
fn malformed_yaml_is_a_parse_error() {
    let temp = project("tasks: [unclosed\n");

    let err = load_config(temp.path(), None).unwrap_err();

    assert!(matches!(err, OrgflowError::ConfigParseError { .. }));
}

#[test]
fn validation_collects_all_problems() {
    let temp = project(
        r#"
default_org: missing
tasks:
  a: { class_path: acme.Nope }
  b: { class_path: orgflow.tasks.Log }
flows:
  f:
    steps:
      1: { task: b, when: "((" }
  g:
    steps:
      1: { task: a }
  loop:
    steps:
      1: { flow: loop }
"#,
    );
    let config = load_config(temp.path(), None).unwrap();

    let rules: Vec<_> = validate_config(&config, &TaskCatalog::with_builtins())
        .into_iter()
        .map(|e| e.rule)
        .collect();

    assert!(rules.contains(&"unknown-org".to_string()));
    assert!(rules.contains(&"unknown-implementation".to_string()));
    assert!(rules.contains(&"circular-flow".to_string()));
    assert!(rules.contains(&"condition-syntax".to_string()));
}
