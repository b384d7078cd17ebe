//! Drop commands matching a user-supplied regular expression

use crate::core::{ArgumentError, ProcessError, StageArgs, StreamContext};
use crate::stages::{Stage, StageKind};
use regex::Regex;

pub(crate) const PATTERN: &str = "pattern";

/// Drops every command whose text matches `pattern`
#[derive(Debug)]
pub struct PatternRemover {
    pattern: Regex,
}

impl PatternRemover {
    pub fn new(pattern: &str) -> Result<Self, ArgumentError> {
        if pattern.is_empty() {
            return Err(ArgumentError::NotAString { key: PATTERN });
        }
        let pattern = Regex::new(pattern).map_err(|source| ArgumentError::InvalidPattern { source })?;
        Ok(Self { pattern })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

pub(crate) fn construct(args: &StageArgs) -> Result<Box<dyn Stage>, ArgumentError> {
    Ok(Box::new(PatternRemover::new(args.non_empty_str(PATTERN)?)?))
}

impl Stage for PatternRemover {
    fn kind(&self) -> StageKind {
        StageKind::PatternRemover
    }

    fn process(
        &mut self,
        record: &str,
        _context: &StreamContext,
    ) -> Result<Vec<String>, ProcessError> {
        if self.pattern.is_match(record) {
            Ok(vec![])
        } else {
            Ok(vec![record.to_string()])
        }
    }
}
