//! Effective stage arguments and typed accessors

use crate::core::error::ArgumentError;
use serde_json::{Map, Value};

/// Arguments resolved for one stage: declared defaults, then global
/// settings, then the entry's own `args`, later layers winning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageArgs {
    values: Map<String, Value>,
}

impl StageArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer `overrides` on top; `null` values count as absent
    pub fn overlay(&mut self, overrides: &Map<String, Value>) {
        for (key, value) in overrides {
            if !value.is_null() {
                self.values.insert(key.clone(), value.clone());
            }
        }
    }

    /// Builder form of [`StageArgs::overlay`]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn require(&self, key: &'static str) -> Result<&Value, ArgumentError> {
        self.values.get(key).ok_or(ArgumentError::Missing { key })
    }

    fn number(&self, key: &'static str) -> Result<f64, ArgumentError> {
        let value = self.require(key)?;
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed
            .filter(|n| n.is_finite())
            .ok_or_else(|| ArgumentError::NotANumber {
                key,
                value: display_value(value),
            })
    }

    /// A finite number greater than zero
    pub fn positive_f64(&self, key: &'static str) -> Result<f64, ArgumentError> {
        let n = self.number(key)?;
        if n > 0.0 {
            Ok(n)
        } else {
            Err(ArgumentError::OutOfRange {
                key,
                value: n.to_string(),
                expected: "a positive number",
            })
        }
    }

    /// A whole number greater than or equal to zero
    pub fn non_negative_usize(&self, key: &'static str) -> Result<usize, ArgumentError> {
        let n = self.number(key)?;
        if n >= 0.0 && n.fract() == 0.0 && n <= u32::MAX as f64 {
            Ok(n as usize)
        } else {
            Err(ArgumentError::OutOfRange {
                key,
                value: n.to_string(),
                expected: "a non-negative integer",
            })
        }
    }

    /// A whole number greater than zero
    pub fn positive_usize(&self, key: &'static str) -> Result<usize, ArgumentError> {
        match self.non_negative_usize(key) {
            Ok(0) => Err(ArgumentError::OutOfRange {
                key,
                value: "0".to_string(),
                expected: "a positive integer",
            }),
            Err(ArgumentError::OutOfRange { value, .. }) => Err(ArgumentError::OutOfRange {
                key,
                value,
                expected: "a positive integer",
            }),
            other => other,
        }
    }

    /// A string with at least one character
    pub fn non_empty_str(&self, key: &'static str) -> Result<&str, ArgumentError> {
        match self.require(key)? {
            Value::String(s) if !s.is_empty() => Ok(s),
            _ => Err(ArgumentError::NotAString { key }),
        }
    }
}

impl From<Map<String, Value>> for StageArgs {
    fn from(values: Map<String, Value>) -> Self {
        let mut args = StageArgs::new();
        args.overlay(&values);
        args
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
