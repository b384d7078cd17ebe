//! Whitespace removal

use crate::core::gcode::{self, Segment};
use crate::core::{ArgumentError, ProcessError, StageArgs, StreamContext};
use crate::stages::{Stage, StageKind};

/// Removes whitespace outside comments; drops commands left empty
#[derive(Debug, Default)]
pub struct WhitespaceProcessor;

impl WhitespaceProcessor {
    pub fn new() -> Self {
        Self
    }
}

pub(crate) fn construct(_args: &StageArgs) -> Result<Box<dyn Stage>, ArgumentError> {
    Ok(Box::new(WhitespaceProcessor::new()))
}

impl Stage for WhitespaceProcessor {
    fn kind(&self) -> StageKind {
        StageKind::WhitespaceProcessor
    }

    fn process(
        &mut self,
        record: &str,
        _context: &StreamContext,
    ) -> Result<Vec<String>, ProcessError> {
        let mut command = String::with_capacity(record.len());
        for segment in gcode::segments(record) {
            match segment {
                Segment::Code(code) => {
                    command.extend(code.chars().filter(|c| !c.is_whitespace()));
                }
                Segment::Comment(comment) => command.push_str(comment),
            }
        }

        if command.is_empty() {
            Ok(vec![])
        } else {
            Ok(vec![command])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn squeeze(record: &str) -> Vec<String> {
        WhitespaceProcessor::new()
            .process(record, &StreamContext::new())
            .unwrap()
    }

    #[test]
    fn test_removes_whitespace_between_words() {
        assert_eq!(squeeze("  G1 X 1.5  Y2\t"), vec!["G1X1.5Y2"]);
    }

    #[test]
    fn test_keeps_comment_text() {
        assert_eq!(squeeze("G0 X1 (tool change here)"), vec!["G0X1(tool change here)"]);
    }

    #[test]
    fn test_blank_lines_are_dropped() {
        assert!(squeeze(" \t ").is_empty());
    }
}
