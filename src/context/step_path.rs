//! Stable step identifiers.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::registry::Position;

/// Sequence of positions from the root flow down to a step.
///
/// Two expansions of the same task inside sibling sub-flows get distinct
/// paths (`1/2` and `3/2`), so the path, not the task name, identifies a
/// step within a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepPath(Vec<Position>);

impl StepPath {
    /// The empty path of the root flow itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// Path of the step at `position` below this one.
    pub fn child(&self, position: Position) -> Self {
        let mut positions = self.0.clone();
        positions.push(position);
        Self(positions)
    }

    pub fn positions(&self) -> &[Position] {
        &self.0
    }

    /// Nesting depth; top-level steps have depth 1.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Whether this path is `prefix` or lies below it.
    pub fn starts_with(&self, prefix: &StepPath) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl From<Vec<Position>> for StepPath {
    fn from(positions: Vec<Position>) -> Self {
        Self(positions)
    }
}

impl fmt::Display for StepPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        let parts: Vec<String> = self.0.iter().map(|p| p.to_string()).collect();
        f.write_str(&parts.join("/"))
    }
}

impl Serialize for StepPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
