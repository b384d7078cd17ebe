//! Splitting of overlong commands into sequential commands

use crate::core::gcode::{self, Segment};
use crate::core::{ArgumentError, ProcessError, StageArgs, StreamContext};
use crate::stages::{Stage, StageKind};

/// Commands longer than this are split
pub const SPLIT_THRESHOLD: usize = 50;

/// Splits long commands at their G and M words
///
/// Parameter words stay with the code word before them and comments stay
/// with the code they follow. A command with nothing to split at passes
/// through unchanged.
#[derive(Debug, Default)]
pub struct CommandSplitter;

impl CommandSplitter {
    pub fn new() -> Self {
        Self
    }
}

pub(crate) fn construct(_args: &StageArgs) -> Result<Box<dyn Stage>, ArgumentError> {
    Ok(Box::new(CommandSplitter::new()))
}

#[derive(Default)]
struct Group<'a> {
    parts: Vec<&'a str>,
    has_code: bool,
}

fn split(record: &str) -> Vec<Group<'_>> {
    let mut groups: Vec<Group<'_>> = Vec::new();

    for segment in gcode::segments(record) {
        match segment {
            Segment::Code(code) => {
                for word in gcode::words(code) {
                    let is_code = matches!(word.letter, 'G' | 'M');
                    let starts_group = match groups.last() {
                        None => true,
                        Some(current) => is_code && current.has_code,
                    };
                    if starts_group {
                        groups.push(Group::default());
                    }
                    if let Some(current) = groups.last_mut() {
                        current.parts.push(word.raw);
                        current.has_code |= is_code;
                    }
                }
            }
            Segment::Comment(comment) => match groups.last_mut() {
                Some(current) => current.parts.push(comment),
                None => groups.push(Group {
                    parts: vec![comment],
                    has_code: false,
                }),
            },
        }
    }

    groups
}

impl Stage for CommandSplitter {
    fn kind(&self) -> StageKind {
        StageKind::CommandSplitter
    }

    fn process(
        &mut self,
        record: &str,
        _context: &StreamContext,
    ) -> Result<Vec<String>, ProcessError> {
        if record.chars().count() <= SPLIT_THRESHOLD {
            return Ok(vec![record.to_string()]);
        }

        let groups = split(record);
        if groups.len() < 2 {
            return Ok(vec![record.to_string()]);
        }
        Ok(groups.iter().map(|group| group.parts.join(" ")).collect())
    }
}
