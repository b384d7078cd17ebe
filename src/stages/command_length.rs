//! Maximum command length enforcement

use crate::core::{ArgumentError, ProcessError, StageArgs, StreamContext};
use crate::stages::{Stage, StageKind};

pub(crate) const COMMAND_LENGTH: &str = "commandLength";

/// Rejects commands longer than the controller's line buffer allows
#[derive(Debug)]
pub struct CommandLengthProcessor {
    max_length: usize,
}

impl CommandLengthProcessor {
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

pub(crate) fn construct(args: &StageArgs) -> Result<Box<dyn Stage>, ArgumentError> {
    Ok(Box::new(CommandLengthProcessor::new(
        args.positive_usize(COMMAND_LENGTH)?,
    )))
}

impl Stage for CommandLengthProcessor {
    fn kind(&self) -> StageKind {
        StageKind::CommandLengthProcessor
    }

    fn process(
        &mut self,
        record: &str,
        _context: &StreamContext,
    ) -> Result<Vec<String>, ProcessError> {
        let length = record.chars().count();
        if length > self.max_length {
            return Err(ProcessError::TooLong {
                length,
                max: self.max_length,
            });
        }
        Ok(vec![record.to_string()])
    }
}
