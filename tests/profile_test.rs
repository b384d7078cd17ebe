//! Configuration files, profiles and global settings on disk

mod helpers;

use gcode_pipeline::core::{
    ConfigDocument, ConfigError, ConfigProfile, CustomRow, GlobalSettings, StageSpec,
};
use gcode_pipeline::execution::{load_groups, load_specs};
use gcode_pipeline::stages::StageKind;
use helpers::*;

#[test]
fn test_shipped_grbl_profile_builds() {
    let profile = ConfigProfile::shipped("GRBL").unwrap();
    let pipeline = profile.build(None).unwrap();
    assert_eq!(
        pipeline.kinds(),
        vec![
            StageKind::CommentProcessor,
            StageKind::M30Processor,
            StageKind::DecimalProcessor,
            StageKind::CommandSplitter,
            StageKind::WhitespaceProcessor,
            StageKind::CommandLengthProcessor,
        ]
    );
}

#[test]
fn test_enabling_custom_rows_adds_pattern_removers() {
    let mut profile = ConfigProfile::shipped("GRBL").unwrap();
    let rows: Vec<CustomRow> = profile
        .groups
        .custom_rows()
        .into_iter()
        .map(|row| CustomRow { enabled: true, ..row })
        .collect();
    profile.groups.replace_custom_rows(rows);

    let mut pipeline = profile.build(None).unwrap();
    let kinds = pipeline.kinds();
    assert_eq!(kinds.iter().filter(|k| **k == StageKind::PatternRemover).count(), 2);

    let output = pipeline.run(["T1", "M6", "G0 X1"]).unwrap();
    assert_eq!(output, vec!["G0X1"]);
}

#[test]
fn test_profile_from_json_file() {
    let file = temp_file(
        r#"{
            "Front": [{ "name": "CommentProcessor" }],
            "Custom": [{ "name": "PatternRemover", "optional": true, "args": { "pattern": "^M6" } }]
        }"#,
        ".json",
    );
    let profile = ConfigProfile::from_file("GRBL", file.path()).unwrap();
    assert_eq!(profile.location.as_deref(), Some(file.path()));
    assert!(profile.groups.end.is_empty());

    let mut pipeline = profile.build(None).unwrap();
    assert_eq!(pipeline.run(["M6 T2", "G0 X1 (x)"]).unwrap(), vec!["G0 X1"]);
}

#[test]
fn test_yaml_list_document_from_file() {
    let file = temp_file(
        r#"
- name: CommentProcessor
- name: DecimalProcessor
- name: CommandLengthProcessor
  optional: true
"#,
        ".yaml",
    );
    let document = ConfigDocument::from_file(file.path()).unwrap();
    let settings = GlobalSettings {
        max_decimal_length: Some(1),
        ..GlobalSettings::empty()
    };

    // No commandLength from settings: the optional entry is dropped
    let mut pipeline = load_specs(&document.specs(), Some(&settings)).unwrap();
    assert_eq!(
        pipeline.kinds(),
        vec![StageKind::CommentProcessor, StageKind::DecimalProcessor]
    );
    assert_eq!(pipeline.run(["G1 X1.26"]).unwrap(), vec!["G1 X1.3"]);
}

#[test]
fn test_settings_file_fills_missing_arguments() {
    let file = temp_file(
        r#"{ "arcSegmentLength": 0.5, "overrideSpeedValue": 80 }"#,
        ".json",
    );
    let settings = GlobalSettings::from_file(file.path()).unwrap();
    assert_eq!(settings.arc_segment_length, Some(0.5));
    assert_eq!(settings.max_command_length, Some(50));

    let groups = ConfigDocument::List(vec![StageSpec::new("FeedOverrideProcessor")]).into_groups();
    let mut pipeline = load_groups(&groups, Some(&settings)).unwrap();
    assert_eq!(pipeline.run(["G1 X1 F10"]).unwrap(), vec!["G1 X1 F80"]);
}

#[test]
fn test_missing_file_is_io_error() {
    assert!(matches!(
        ConfigDocument::from_file("/nonexistent/pipeline.json"),
        Err(ConfigError::Io { .. })
    ));
}

#[test]
fn test_saved_profile_reloads_identically() {
    let mut profile = ConfigProfile::shipped("GRBL").unwrap();
    profile.groups.add_custom_pattern("G28", true);
    let file = temp_file(&profile.to_json_pretty().unwrap(), ".json");

    let reloaded = ConfigProfile::from_file("GRBL", file.path()).unwrap();
    assert_eq!(reloaded.groups, profile.groups);
}
