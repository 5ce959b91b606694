//! Real-valued step positions.
//!
//! Steps in a flow are keyed by a number rather than an index so that a step
//! can be declared "between" two existing ones (`1.5` runs after `1` and
//! before `2`) without renumbering its siblings. Comparison is numeric:
//! `3.1 < 4` and `10 > 9`, regardless of how the key was written.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Serialize, Serializer};
use serde_yaml::Value;

use crate::error::{OrgflowError, Result};

/// A totally ordered, densely insertable step key.
#[derive(Debug, Clone, Copy)]
pub struct Position(f64);

impl Position {
    /// Create a position from a finite number.
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(OrgflowError::ConfigValidationError {
                message: format!("Step position must be a finite number, got {}", value),
            });
        }
        // Adding 0.0 folds -0.0 into 0.0 so both hash and compare alike.
        Ok(Self(value + 0.0))
    }

    /// The numeric value of this position.
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Parse a position from a YAML mapping key.
    ///
    /// Accepts integers, floats, and strings holding a number.
    pub fn from_yaml(key: &Value) -> Result<Self> {
        match key {
            Value::Number(n) => match n.as_f64() {
                Some(v) => Self::new(v),
                None => Err(invalid_position(&format!("{:?}", n))),
            },
            Value::String(s) => s.parse(),
            other => Err(invalid_position(&format!("{:?}", other))),
        }
    }
}

fn invalid_position(raw: &str) -> OrgflowError {
    OrgflowError::ConfigValidationError {
        message: format!("Invalid step position '{}': expected a number", raw),
    }
}

impl FromStr for Position {
    type Err = OrgflowError;

    fn from_str(s: &str) -> Result<Self> {
        let value: f64 = s.trim().parse().map_err(|_| invalid_position(s))?;
        Self::new(value)
    }
}

impl From<u32> for Position {
    fn from(value: u32) -> Self {
        Self(f64::from(value))
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Position {}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for Position {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
