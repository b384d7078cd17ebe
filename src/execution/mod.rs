//! Pipeline loading and execution

pub mod executor;
pub mod loader;

pub use loader::{
    effective_args, load, load_groups, load_json, load_specs, load_with_settings, resolve,
    resolve_all, Resolution, SkipReason,
};
