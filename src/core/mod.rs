//! Core domain models
//!
//! Configuration documents, global settings, stage arguments, errors, the
//! stream context handed to stages, and the pipeline itself.

pub mod args;
pub mod config;
pub mod context;
pub mod error;
pub mod gcode;
pub mod pipeline;
pub mod settings;

pub use args::StageArgs;
pub use config::*;
pub use context::*;
pub use error::*;
pub use pipeline::*;
pub use settings::GlobalSettings;
