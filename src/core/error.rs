//! Error types for loading and running pipelines

use crate::stages::StageKind;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to read or parse a configuration document
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("no shipped profile for firmware '{0}'")]
    UnknownFirmware(String),
}

/// A stage argument that could not be resolved or was rejected
#[derive(Debug, Error)]
pub enum ArgumentError {
    #[error("missing required argument '{key}'")]
    Missing { key: &'static str },

    #[error("argument '{key}' is not a number: {value}")]
    NotANumber { key: &'static str, value: String },

    #[error("argument '{key}' is out of range: {value} (expected {expected})")]
    OutOfRange {
        key: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("argument '{key}' must be a non-empty string")]
    NotAString { key: &'static str },

    #[error("argument 'pattern' is not a valid regular expression: {source}")]
    InvalidPattern {
        #[source]
        source: regex::Error,
    },
}

/// Load-time failure. No partial pipeline is ever returned alongside one.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unknown stage '{name}'")]
    UnknownStage { name: String },

    #[error("invalid arguments for stage '{name}': {cause}")]
    InvalidArgument {
        name: String,
        #[source]
        cause: ArgumentError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// What a stage reports about a record it cannot transform
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProcessError {
    #[error("malformed command: {0}")]
    Malformed(String),

    #[error("command length {length} exceeds maximum {max}")]
    TooLong { length: usize, max: usize },
}

/// A record was rejected while a pipeline was running
#[derive(Debug, Clone, PartialEq, Error)]
#[error("stage {stage} (position {position}) rejected '{record}': {cause}")]
pub struct RuntimeProcessingError {
    /// The rejecting stage
    pub stage: StageKind,

    /// Zero-based position of the stage in the pipeline
    pub position: usize,

    /// The record as it reached the stage
    pub record: String,

    #[source]
    pub cause: ProcessError,
}

/// Failure while streaming records from a reader to a writer
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("failed to read input: {0}")]
    Read(#[source] std::io::Error),

    #[error("failed to write output: {0}")]
    Write(#[source] std::io::Error),

    #[error(transparent)]
    Rejected(#[from] RuntimeProcessingError),
}
