//! gcode-pipeline - configurable G-code command processing pipelines

pub mod cli;
pub mod core;
pub mod execution;
pub mod stages;

// Re-export commonly used types
pub use core::{
    ConfigDocument, ConfigProfile, GlobalSettings, LoadError, Pipeline, RuntimeProcessingError,
    StageArgs, StageSpec, StageSpecGroups, StreamContext,
};
pub use execution::{load, load_groups, load_json, load_with_settings};
pub use stages::{Stage, StageKind};
