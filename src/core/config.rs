//! Pipeline configuration documents (JSON or YAML)

use crate::core::error::{ConfigError, LoadError};
use crate::core::settings::GlobalSettings;
use crate::core::Pipeline;
use crate::stages::StageKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

const GRBL_PROFILE: &str = include_str!("../profiles/grbl.json");

/// One entry of a configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StageSpec {
    /// Registered stage identifier
    pub name: String,

    /// Disabled entries produce no stage
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Argument failures on optional entries drop the entry instead of failing the load
    #[serde(default)]
    pub optional: bool,

    /// Stage-specific arguments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Map<String, Value>>,
}

fn default_enabled() -> bool {
    true
}

impl StageSpec {
    /// An enabled, non-optional entry with no arguments
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            optional: false,
            args: None,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn arg(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.args
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.into());
        self
    }
}

/// Stage lists grouped by where they run relative to the command parser
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GroupsDocument")]
pub struct StageSpecGroups {
    /// Stages run before the parser sees a command
    #[serde(rename = "Front")]
    pub front: Vec<StageSpec>,

    /// Stages run after the parser
    #[serde(rename = "End")]
    pub end: Vec<StageSpec>,

    /// User-authored pattern removers
    #[serde(rename = "Custom")]
    pub custom: Vec<StageSpec>,
}

/// Groups as written; unknown keys are rejected and at least one group is required
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct GroupsDocument {
    #[serde(rename = "Front")]
    front: Option<Vec<StageSpec>>,
    #[serde(rename = "End")]
    end: Option<Vec<StageSpec>>,
    #[serde(rename = "Custom")]
    custom: Option<Vec<StageSpec>>,
}

impl TryFrom<GroupsDocument> for StageSpecGroups {
    type Error = String;

    fn try_from(document: GroupsDocument) -> Result<Self, Self::Error> {
        if document.front.is_none() && document.end.is_none() && document.custom.is_none() {
            return Err("expected at least one of `Front`, `End`, `Custom`".to_string());
        }
        Ok(Self {
            front: document.front.unwrap_or_default(),
            end: document.end.unwrap_or_default(),
            custom: document.custom.unwrap_or_default(),
        })
    }
}

/// A user-editable row of the custom pattern table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomRow {
    pub enabled: bool,
    pub pattern: String,
}

impl StageSpecGroups {
    /// All specs in pipeline order: front, custom, end
    pub fn pipeline_specs(&self) -> Vec<StageSpec> {
        self.front
            .iter()
            .chain(self.custom.iter())
            .chain(self.end.iter())
            .cloned()
            .collect()
    }

    /// Append a custom pattern remover. Empty patterns are ignored.
    pub fn add_custom_pattern(&mut self, pattern: &str, enabled: bool) -> bool {
        if pattern.is_empty() {
            return false;
        }
        self.custom.push(custom_spec(pattern, enabled));
        true
    }

    pub fn remove_custom(&mut self, index: usize) -> Option<StageSpec> {
        (index < self.custom.len()).then(|| self.custom.remove(index))
    }

    pub fn set_custom_enabled(&mut self, index: usize, enabled: bool) -> bool {
        match self.custom.get_mut(index) {
            Some(spec) => {
                spec.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Custom entries as editor rows
    pub fn custom_rows(&self) -> Vec<CustomRow> {
        self.custom
            .iter()
            .map(|spec| CustomRow {
                enabled: spec.enabled,
                pattern: spec
                    .args
                    .as_ref()
                    .and_then(|args| args.get("pattern"))
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            })
            .collect()
    }

    /// Replace the custom list with edited rows, discarding empty patterns
    pub fn replace_custom_rows<I>(&mut self, rows: I)
    where
        I: IntoIterator<Item = CustomRow>,
    {
        self.custom = rows
            .into_iter()
            .filter(|row| !row.pattern.is_empty())
            .map(|row| custom_spec(&row.pattern, row.enabled))
            .collect();
    }
}

fn custom_spec(pattern: &str, enabled: bool) -> StageSpec {
    StageSpec::new(StageKind::PatternRemover.name())
        .enabled(enabled)
        .optional(true)
        .arg("pattern", pattern)
}

/// A configuration document: a bare list of stages or grouped lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigDocument {
    List(Vec<StageSpec>),
    Groups(StageSpecGroups),
}

impl ConfigDocument {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a document from a file; `.yaml`/`.yml` are YAML, anything else JSON
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if is_yaml_path(path) {
            Self::from_yaml(&content)
        } else {
            Self::from_json(&content)
        }
    }

    /// Specs in pipeline order
    pub fn specs(&self) -> Vec<StageSpec> {
        match self {
            ConfigDocument::List(specs) => specs.clone(),
            ConfigDocument::Groups(groups) => groups.pipeline_specs(),
        }
    }

    /// The document as groups; a bare list becomes the front group
    pub fn into_groups(self) -> StageSpecGroups {
        match self {
            ConfigDocument::List(front) => StageSpecGroups {
                front,
                ..StageSpecGroups::default()
            },
            ConfigDocument::Groups(groups) => groups,
        }
    }
}

pub(crate) fn is_yaml_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Stage configuration for one firmware variant and where it is stored
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigProfile {
    /// Firmware name, e.g. "GRBL"
    pub firmware: String,

    /// Where the document is persisted (None for shipped defaults)
    pub location: Option<PathBuf>,

    pub groups: StageSpecGroups,
}

impl ConfigProfile {
    /// Read a profile document from disk
    pub fn from_file<P: AsRef<Path>>(firmware: &str, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let groups = ConfigDocument::from_file(path)?.into_groups();
        Ok(Self {
            firmware: firmware.to_string(),
            location: Some(path.to_path_buf()),
            groups,
        })
    }

    /// The profile shipped with the application for a firmware
    pub fn shipped(firmware: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            firmware: firmware.to_string(),
            location: None,
            groups: shipped_groups(firmware)?,
        })
    }

    /// Replace the stage lists with the shipped defaults
    pub fn restore_defaults(&mut self) -> Result<(), ConfigError> {
        self.groups = shipped_groups(&self.firmware)?;
        Ok(())
    }

    /// Serialized document for the persistence layer
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(&self.groups)?)
    }

    /// Build a fresh pipeline from this profile
    pub fn build(&self, settings: Option<&GlobalSettings>) -> Result<Pipeline, LoadError> {
        crate::execution::load_groups(&self.groups, settings)
    }
}

fn shipped_groups(firmware: &str) -> Result<StageSpecGroups, ConfigError> {
    if firmware.eq_ignore_ascii_case("grbl") {
        Ok(ConfigDocument::from_json(GRBL_PROFILE)?.into_groups())
    } else {
        Err(ConfigError::UnknownFirmware(firmware.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_defaults() {
        let doc = ConfigDocument::from_json(r#"[{ "name": "CommentProcessor" }]"#).unwrap();
        let specs = doc.specs();
        assert_eq!(specs.len(), 1);
        assert!(specs[0].enabled);
        assert!(!specs[0].optional);
        assert!(specs[0].args.is_none());
    }

    #[test]
    fn test_null_args_parse_as_absent() {
        let doc =
            ConfigDocument::from_json(r#"[{ "name": "M30Processor", "args": null }]"#).unwrap();
        assert!(doc.specs()[0].args.is_none());
    }

    #[test]
    fn test_groups_document_order() {
        let json = r#"{
            "Front": [{ "name": "CommentProcessor" }],
            "End": [{ "name": "CommandLengthProcessor", "args": { "commandLength": 50 } }],
            "Custom": [{ "name": "PatternRemover", "optional": true, "args": { "pattern": "T\\d+" } }]
        }"#;
        let names: Vec<String> = ConfigDocument::from_json(json)
            .unwrap()
            .specs()
            .into_iter()
            .map(|spec| spec.name)
            .collect();
        assert_eq!(
            names,
            vec!["CommentProcessor", "PatternRemover", "CommandLengthProcessor"]
        );
    }

    #[test]
    fn test_yaml_document() {
        let yaml = r#"
- name: ArcExpander
  optional: true
  args:
    length: 0.5
- name: WhitespaceProcessor
  enabled: false
"#;
        let specs = ConfigDocument::from_yaml(yaml).unwrap().specs();
        assert_eq!(specs.len(), 2);
        assert!(specs[0].optional);
        assert_eq!(
            specs[0].args.as_ref().and_then(|a| a.get("length")),
            Some(&Value::from(0.5))
        );
        assert!(!specs[1].enabled);
    }

    #[test]
    fn test_malformed_document_is_config_error() {
        assert!(ConfigDocument::from_json(r#"[{ "enabled": true }]"#).is_err());
        assert!(ConfigDocument::from_json("not json").is_err());
    }

    #[test]
    fn test_misshaped_documents_are_rejected() {
        for json in [
            r#"{ "name": "DoesNotExist" }"#,
            r#"{ "front": [{ "name": "Bogus" }] }"#,
            r#"{ "Front": [], "Extra": [] }"#,
            r#"[{ "name": "CommentProcessor", "enabeld": false }]"#,
            "{}",
        ] {
            assert!(
                matches!(ConfigDocument::from_json(json), Err(ConfigError::Json(_))),
                "{} should not parse",
                json
            );
        }
        assert!(ConfigDocument::from_yaml("front:\n  - name: Bogus\n").is_err());
    }

    #[test]
    fn test_partial_groups_document() {
        let groups = ConfigDocument::from_json(r#"{ "End": [{ "name": "WhitespaceProcessor" }] }"#)
            .unwrap()
            .into_groups();
        assert!(groups.front.is_empty());
        assert!(groups.custom.is_empty());
        assert_eq!(groups.end.len(), 1);
    }

    #[test]
    fn test_custom_row_editing() {
        let mut groups = StageSpecGroups::default();
        assert!(groups.add_custom_pattern("T\\d+", true));
        assert!(!groups.add_custom_pattern("", true));
        assert!(groups.add_custom_pattern("M6", true));
        assert!(groups.set_custom_enabled(1, false));
        assert!(!groups.set_custom_enabled(5, false));

        let rows = groups.custom_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], CustomRow { enabled: false, pattern: "M6".to_string() });
        assert!(groups.custom.iter().all(|spec| spec.optional));

        assert!(groups.remove_custom(0).is_some());
        assert!(groups.remove_custom(3).is_none());
        assert_eq!(groups.custom.len(), 1);
    }

    #[test]
    fn test_replace_custom_rows_discards_empty_patterns() {
        let mut groups = StageSpecGroups::default();
        groups.replace_custom_rows(vec![
            CustomRow { enabled: true, pattern: "G28".to_string() },
            CustomRow { enabled: true, pattern: String::new() },
        ]);
        assert_eq!(groups.custom.len(), 1);
        assert_eq!(groups.custom[0].name, "PatternRemover");
    }

    #[test]
    fn test_shipped_profile_and_restore() {
        let mut profile = ConfigProfile::shipped("GRBL").unwrap();
        assert!(!profile.groups.front.is_empty());
        let shipped = profile.groups.clone();

        profile.groups.front.clear();
        profile.groups.add_custom_pattern("T1", true);
        profile.restore_defaults().unwrap();
        assert_eq!(profile.groups, shipped);

        assert!(matches!(
            ConfigProfile::shipped("Smoothie"),
            Err(ConfigError::UnknownFirmware(_))
        ));
    }

    #[test]
    fn test_profile_round_trips_through_json() {
        let profile = ConfigProfile::shipped("grbl").unwrap();
        let json = profile.to_json_pretty().unwrap();
        let parsed = ConfigDocument::from_json(&json).unwrap().into_groups();
        assert_eq!(parsed, profile.groups);
    }
}
