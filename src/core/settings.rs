//! Global settings consulted for stage arguments missing from the configuration

use crate::core::error::ConfigError;
use crate::stages::StageKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Application-wide defaults for stage arguments
///
/// Each field fills exactly one stage argument when the configuration
/// entry leaves it out. A field set to `null` contributes nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlobalSettings {
    /// `ArcExpander.length`
    pub arc_segment_length: Option<f64>,

    /// `DecimalProcessor.decimals`
    pub max_decimal_length: Option<u32>,

    /// `FeedOverrideProcessor.speed`
    pub override_speed_value: Option<f64>,

    /// `CommandLengthProcessor.commandLength`
    pub max_command_length: Option<u32>,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            arc_segment_length: Some(1.3),
            max_decimal_length: Some(4),
            override_speed_value: Some(60.0),
            max_command_length: Some(50),
        }
    }
}

impl GlobalSettings {
    /// Settings with no values at all
    pub fn empty() -> Self {
        Self {
            arc_segment_length: None,
            max_decimal_length: None,
            override_speed_value: None,
            max_command_length: None,
        }
    }

    /// Load settings from a JSON or YAML file (chosen by extension)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if crate::core::config::is_yaml_path(path) {
            Self::from_yaml(&content)
        } else {
            Self::from_json(&content)
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// The argument overlay these settings provide for a stage
    pub fn overlay_for(&self, kind: StageKind) -> Map<String, Value> {
        let mut overlay = Map::new();
        let entry = match kind {
            StageKind::ArcExpander => self.arc_segment_length.map(|v| ("length", Value::from(v))),
            StageKind::DecimalProcessor => {
                self.max_decimal_length.map(|v| ("decimals", Value::from(v)))
            }
            StageKind::FeedOverrideProcessor => {
                self.override_speed_value.map(|v| ("speed", Value::from(v)))
            }
            StageKind::CommandLengthProcessor => {
                self.max_command_length.map(|v| ("commandLength", Value::from(v)))
            }
            _ => None,
        };
        if let Some((key, value)) = entry {
            overlay.insert(key.to_string(), value);
        }
        overlay
    }
}
