//! Pipeline loader - builds stage instances from configuration entries

use crate::core::{
    ArgumentError, ConfigDocument, GlobalSettings, LoadError, Pipeline, StageArgs, StageSpec,
    StageSpecGroups,
};
use crate::stages::{self, Registration, Stage};
use tracing::{debug, info, warn};

/// Outcome for one configuration entry that did not fail the load
#[derive(Debug)]
pub enum Resolution {
    /// The entry produced a stage
    Included(Box<dyn Stage>),
    /// The entry produced nothing
    Skipped(SkipReason),
}

/// Why an entry produced no stage
#[derive(Debug)]
pub enum SkipReason {
    Disabled,
    /// Construction failed on an optional entry
    InvalidOptional(ArgumentError),
}

/// Load a pipeline using only explicit arguments and stage defaults
pub fn load(specs: &[StageSpec]) -> Result<Pipeline, LoadError> {
    load_specs(specs, None)
}

/// Load a pipeline, filling missing arguments from global settings
pub fn load_with_settings(
    specs: &[StageSpec],
    settings: &GlobalSettings,
) -> Result<Pipeline, LoadError> {
    load_specs(specs, Some(settings))
}

/// Load a pipeline from grouped lists (front, custom, end)
pub fn load_groups(
    groups: &StageSpecGroups,
    settings: Option<&GlobalSettings>,
) -> Result<Pipeline, LoadError> {
    load_specs(&groups.pipeline_specs(), settings)
}

/// Load a pipeline from JSON document text (a list or grouped lists)
pub fn load_json(json: &str, settings: Option<&GlobalSettings>) -> Result<Pipeline, LoadError> {
    let document = ConfigDocument::from_json(json)?;
    load_specs(&document.specs(), settings)
}

/// Load a pipeline from an ordered list of entries
pub fn load_specs(
    specs: &[StageSpec],
    settings: Option<&GlobalSettings>,
) -> Result<Pipeline, LoadError> {
    let stages: Vec<Box<dyn Stage>> = resolve_all(specs, settings)?
        .into_iter()
        .filter_map(|resolution| match resolution {
            Resolution::Included(stage) => Some(stage),
            Resolution::Skipped(_) => None,
        })
        .collect();

    info!(
        "Loaded pipeline with {} of {} configured stages",
        stages.len(),
        specs.len()
    );
    Ok(Pipeline::new(stages))
}

/// Resolve every entry, one outcome per entry in document order
///
/// Every name is checked against the registry before anything is built,
/// so an unknown stage fails the load even when its entry is disabled or
/// optional. Entries are then resolved in order; the first non-optional
/// construction failure aborts the load.
pub fn resolve_all(
    specs: &[StageSpec],
    settings: Option<&GlobalSettings>,
) -> Result<Vec<Resolution>, LoadError> {
    let registrations = specs
        .iter()
        .map(|spec| {
            stages::lookup(&spec.name).ok_or_else(|| LoadError::UnknownStage {
                name: spec.name.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    specs.iter().zip(registrations).enumerate().try_fold(
        Vec::with_capacity(specs.len()),
        |mut resolutions, (index, (spec, registration))| {
            let resolution = resolve(spec, registration, settings)?;
            match &resolution {
                Resolution::Included(_) => {
                    debug!("Entry {}: constructed {}", index, spec.name);
                }
                Resolution::Skipped(SkipReason::Disabled) => {
                    debug!("Entry {}: {} is disabled, skipping", index, spec.name);
                }
                Resolution::Skipped(SkipReason::InvalidOptional(cause)) => {
                    warn!(
                        "Entry {}: dropping optional stage {}: {}",
                        index, spec.name, cause
                    );
                }
            }
            resolutions.push(resolution);
            Ok::<_, LoadError>(resolutions)
        },
    )
}

/// Resolve one entry whose name is already known to the registry
pub fn resolve(
    spec: &StageSpec,
    registration: &Registration,
    settings: Option<&GlobalSettings>,
) -> Result<Resolution, LoadError> {
    if !spec.enabled {
        return Ok(Resolution::Skipped(SkipReason::Disabled));
    }

    let args = effective_args(spec, registration, settings);
    match (registration.construct)(&args) {
        Ok(stage) => Ok(Resolution::Included(stage)),
        Err(cause) if spec.optional => Ok(Resolution::Skipped(SkipReason::InvalidOptional(cause))),
        Err(cause) => Err(LoadError::InvalidArgument {
            name: spec.name.clone(),
            cause,
        }),
    }
}

/// Declared defaults, overlaid by settings, overlaid by the entry's own args
pub fn effective_args(
    spec: &StageSpec,
    registration: &Registration,
    settings: Option<&GlobalSettings>,
) -> StageArgs {
    let mut args = (registration.defaults)();
    if let Some(settings) = settings {
        args.overlay(&settings.overlay_for(registration.kind));
    }
    if let Some(explicit) = &spec.args {
        args.overlay(explicit);
    }
    args
}
