//! Test utility functions for gcode-pipeline
#![allow(dead_code)]

use gcode_pipeline::core::{Pipeline, StageSpec};
use gcode_pipeline::execution;
use gcode_pipeline::stages::StageKind;
use std::io::Write;
use tempfile::NamedTempFile;

/// Every registered stage with a valid argument, in registry order
pub fn all_processor_specs() -> Vec<StageSpec> {
    vec![
        StageSpec::new("ArcExpander").arg("length", 1.5),
        StageSpec::new("CommandSplitter"),
        StageSpec::new("CommentProcessor"),
        StageSpec::new("DecimalProcessor").arg("decimals", 5),
        StageSpec::new("FeedOverrideProcessor").arg("speed", 60.0),
        StageSpec::new("M30Processor"),
        StageSpec::new("PatternRemover").arg("pattern", "WHAT"),
        StageSpec::new("CommandLengthProcessor").arg("commandLength", 20),
        StageSpec::new("WhitespaceProcessor"),
    ]
}

/// Load a pipeline from specs, panicking on failure
pub fn pipeline_of(specs: &[StageSpec]) -> Pipeline {
    execution::load(specs).unwrap_or_else(|e| panic!("pipeline should load: {}", e))
}

/// Run every record through a freshly reset pipeline
pub fn run_all(pipeline: &mut Pipeline, input: &[&str]) -> Vec<String> {
    pipeline
        .run(input.iter().copied())
        .unwrap_or_else(|e| panic!("run should succeed: {}", e))
}

pub fn kinds(pipeline: &Pipeline) -> Vec<StageKind> {
    pipeline.kinds()
}

/// Write `content` to a temp file with the given extension
pub fn temp_file(content: &str, extension: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(extension)
        .tempfile()
        .expect("create temp file");
    file.write_all(content.as_bytes()).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}
