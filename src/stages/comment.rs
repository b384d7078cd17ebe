//! Comment removal

use crate::core::{gcode, ArgumentError, ProcessError, StageArgs, StreamContext};
use crate::stages::{Stage, StageKind};

/// Removes `( ... )` and `; ...` comments; drops commands left empty
#[derive(Debug, Default)]
pub struct CommentProcessor;

impl CommentProcessor {
    pub fn new() -> Self {
        Self
    }
}

pub(crate) fn construct(_args: &StageArgs) -> Result<Box<dyn Stage>, ArgumentError> {
    Ok(Box::new(CommentProcessor::new()))
}

impl Stage for CommentProcessor {
    fn kind(&self) -> StageKind {
        StageKind::CommentProcessor
    }

    fn process(
        &mut self,
        record: &str,
        _context: &StreamContext,
    ) -> Result<Vec<String>, ProcessError> {
        let code = gcode::strip_comments(record);
        let command = code.split_whitespace().collect::<Vec<_>>().join(" ");
        if command.is_empty() {
            Ok(vec![])
        } else {
            Ok(vec![command])
        }
    }
}
