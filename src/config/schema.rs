//! Configuration schema definitions for orgflow.
//!
//! This module contains the struct definitions that map to the
//! `orgflow.yml` file format.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::registry::Position;

/// Root configuration structure for orgflow.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project attributes, exposed to expressions as `project`
    #[serde(skip_serializing_if = "Value::is_null")]
    pub project: Value,

    /// Org used when none is selected on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_org: Option<String>,

    /// Named target environments; the selected one is exposed as `org`
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub orgs: BTreeMap<String, Value>,

    /// Service attribute bags, exposed as `services`
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub services: BTreeMap<String, Value>,

    /// Task definitions
    pub tasks: BTreeMap<String, TaskConfig>,

    /// Flow definitions
    pub flows: BTreeMap<String, FlowConfig>,
}

/// A task entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    /// Implementation reference resolved by the task catalog
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_path: Option<String>,

    /// Default options
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, Value>,

    /// Display group
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    /// Display description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A flow entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Display description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Steps keyed by numeric position
    pub steps: StepsConfig,
}

/// A step entry inside a flow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StepConfig {
    /// Task to run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,

    /// Flow to splice in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,

    /// Option overrides; for flow steps, keyed by task name
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, Value>,

    /// Gating expression
    #[serde(skip_serializing_if = "Option::is_none")]
    pub when: Option<String>,

    /// Continue the run if this step fails
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_failure: Option<bool>,
}

/// Steps of a flow in declaration order.
///
/// YAML step keys may be integers, floats, or numeric strings, so the
/// mapping is read key-by-key instead of through a string-keyed map.
/// Duplicate positions are preserved here and rejected when the registry
/// is built.
#[derive(Debug, Clone, Default)]
pub struct StepsConfig(pub Vec<(Position, StepConfig)>);

impl StepsConfig {
    /// Iterate over steps in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &(Position, StepConfig)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for StepsConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StepsVisitor;

        impl<'de> Visitor<'de> for StepsVisitor {
            type Value = StepsConfig;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping of numeric positions to steps")
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<StepsConfig, E> {
                Ok(StepsConfig::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<StepsConfig, A::Error> {
                let mut steps = Vec::new();
                while let Some((key, step)) = map.next_entry::<Value, StepConfig>()? {
                    let position =
                        Position::from_yaml(&key).map_err(serde::de::Error::custom)?;
                    steps.push((position, step));
                }
                Ok(StepsConfig(steps))
            }
        }

        deserializer.deserialize_any(StepsVisitor)
    }
}

impl Serialize for StepsConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (position, step) in &self.0 {
            map.serialize_entry(&position.value(), step)?;
        }
        map.end()
    }
}

impl ProjectConfig {
    /// Build the external configuration tree seen by option and condition
    /// expressions: `{project, org, services}`.
    ///
    /// `org` is the attribute bag of the named org, falling back to
    /// `default_org`, or an empty mapping when neither is set.
    pub fn external_config(&self, org: Option<&str>) -> crate::Result<Value> {
        let org_name = org.or(self.default_org.as_deref());
        let org_value = match org_name {
            Some(name) => self.orgs.get(name).cloned().ok_or_else(|| {
                crate::OrgflowError::ConfigValidationError {
                    message: format!("Unknown org '{}'", name),
                }
            })?,
            None => Value::Mapping(Mapping::new()),
        };

        let mut services = Mapping::new();
        for (name, attrs) in &self.services {
            services.insert(Value::String(name.clone()), attrs.clone());
        }

        let mut root = Mapping::new();
        root.insert(
            Value::String("project".to_string()),
            if self.project.is_null() {
                Value::Mapping(Mapping::new())
            } else {
                self.project.clone()
            },
        );
        root.insert(Value::String("org".to_string()), org_value);
        root.insert(
            Value::String("services".to_string()),
            Value::Mapping(services),
        );
        Ok(Value::Mapping(root))
    }
}
