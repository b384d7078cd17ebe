//! Pipeline domain model

use crate::core::context::StreamContext;
use crate::stages::{Stage, StageKind};

/// An ordered sequence of constructed stages, fixed after loading
///
/// Owns its stage instances and the stream context of the current run.
/// Build a separate pipeline for every independent stream.
#[derive(Debug, Default)]
pub struct Pipeline {
    pub(crate) stages: Vec<Box<dyn Stage>>,

    pub(crate) context: StreamContext,
}

impl Pipeline {
    /// Create a pipeline from stages in execution order
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self {
            stages,
            context: StreamContext::new(),
        }
    }

    /// Number of stages
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage kinds in execution order
    pub fn kinds(&self) -> Vec<StageKind> {
        self.stages.iter().map(|stage| stage.kind()).collect()
    }

    pub fn stages(&self) -> &[Box<dyn Stage>] {
        &self.stages
    }

    /// Context of the current run
    pub fn context(&self) -> &StreamContext {
        &self.context
    }
}
