//! Dotted attribute paths into the external configuration tree.
//!
//! `project.package.namespace` walks mappings key by key. Two legacy
//! spellings are accepted and normalized when the path is parsed:
//!
//! - `project_config` names the tree root and `org_config` names `org`
//! - `__` separates segments like `.` does, so
//!   `project_config.project__package__namespace` is `project.package.namespace`
//!
//! A numeric segment indexes into a sequence.

use std::fmt;

use serde_yaml::Value;

use crate::error::{OrgflowError, Result};

/// First segments an option value may start with to be read as a path.
const OPTION_ROOTS: &[&str] = &["project_config", "org_config", "project", "org", "services"];

/// Whether `raw` is shaped like a path into the external configuration.
///
/// The first segment must be a known root and every segment an identifier
/// or a sequence index, so `HOME/bin/deploy` and `SFDX_CLI deploy` are not.
/// Empty segments pass here and are rejected by [`AttributePath::parse`].
pub fn is_config_path(raw: &str) -> bool {
    let segments: Vec<&str> = raw.split('.').flat_map(|part| part.split("__")).collect();
    let Some(head) = segments.first() else {
        return false;
    };
    OPTION_ROOTS.contains(head) && segments.iter().all(|s| is_segment(s))
}

fn is_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        None => true,
        Some(c) if c.is_ascii_digit() => segment.chars().all(|c| c.is_ascii_digit()),
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        Some(_) => false,
    }
}

/// A parsed, normalized attribute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributePath {
    raw: String,
    segments: Vec<String>,
}

impl AttributePath {
    /// Parse a dotted path.
    ///
    /// Returns `None` if the path is empty or has an empty segment.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut segments: Vec<String> = Vec::new();
        for part in raw.split('.') {
            if part.is_empty() {
                return None;
            }
            for piece in part.split("__") {
                if piece.is_empty() {
                    return None;
                }
                segments.push(piece.to_string());
            }
        }

        let head = segments.first().cloned()?;
        match head.as_str() {
            "project_config" => {
                segments.remove(0);
            }
            "org_config" => segments[0] = "org".to_string(),
            _ => {}
        }

        if segments.is_empty() {
            return None;
        }

        Some(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The path as written.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Normalized segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Look the path up in `root`.
    ///
    /// # Errors
    ///
    /// Returns `MissingAttribute` if any segment is absent.
    pub fn lookup<'a>(&self, root: &'a Value) -> Result<&'a Value> {
        lookup_segments(root, &self.segments).ok_or_else(|| OrgflowError::MissingAttribute {
            path: self.raw.clone(),
        })
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Walk `segments` down from `root`, returning `None` on the first miss.
pub fn lookup_segments<'a>(root: &'a Value, segments: &[String]) -> Option<&'a Value> {
    let mut current = root;
    for segment in segments {
        current = match current {
            Value::Mapping(map) => map.get(segment.as_str())?,
            Value::Sequence(items) => items.get(segment.parse::<usize>().ok()?)?,
            Value::Tagged(tagged) => lookup_segments(&tagged.value, std::slice::from_ref(segment))?,
            _ => return None,
        };
    }
    Some(current)
}
