//! Program end handling (M2 / M30)

use crate::core::{gcode, ArgumentError, ProcessError, StageArgs, StreamContext};
use crate::stages::{Stage, StageKind};
use tracing::debug;

/// Passes the first program-end command, then suppresses the rest of the run
#[derive(Debug, Default)]
pub struct M30Processor {
    ended: bool,
    suppressed: usize,
}

impl M30Processor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a program end has been seen in this run
    pub fn has_ended(&self) -> bool {
        self.ended
    }
}

pub(crate) fn construct(_args: &StageArgs) -> Result<Box<dyn Stage>, ArgumentError> {
    Ok(Box::new(M30Processor::new()))
}

fn is_program_end(record: &str) -> bool {
    gcode::line_words(record)
        .iter()
        .any(|&(letter, value)| letter == 'M' && (value == 2.0 || value == 30.0))
}

impl Stage for M30Processor {
    fn kind(&self) -> StageKind {
        StageKind::M30Processor
    }

    fn process(
        &mut self,
        record: &str,
        _context: &StreamContext,
    ) -> Result<Vec<String>, ProcessError> {
        if self.ended {
            self.suppressed += 1;
            debug!(
                "Suppressing command #{} after program end: {}",
                self.suppressed, record
            );
            return Ok(vec![]);
        }
        if is_program_end(record) {
            debug!("Program end reached: {}", record);
            self.ended = true;
        }
        Ok(vec![record.to_string()])
    }

    fn reset(&mut self) {
        self.ended = false;
        self.suppressed = 0;
    }
}
