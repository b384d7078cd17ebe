//! Numeric precision rounding

use crate::core::gcode::{self, Segment};
use crate::core::{ArgumentError, ProcessError, StageArgs, StreamContext};
use crate::stages::{Stage, StageKind};

pub(crate) const DECIMALS: &str = "decimals";

const DEFAULT_DECIMALS: usize = 4;

/// Rounds word values carrying more than `decimals` fractional digits
///
/// Command words (G, M, N) are never rounded so that codes such as
/// `G38.2` survive. Comments are left untouched.
#[derive(Debug)]
pub struct DecimalProcessor {
    decimals: usize,
}

impl DecimalProcessor {
    pub fn new(decimals: usize) -> Self {
        Self { decimals }
    }

    fn round_code(&self, code: &str) -> String {
        let mut result = String::with_capacity(code.len());
        let mut last = 0;

        for word in gcode::words(code) {
            let is_command = matches!(word.letter, 'G' | 'M' | 'N');
            if is_command || fraction_digits(word.number_text()) <= self.decimals {
                continue;
            }
            result.push_str(&code[last..word.offset]);
            result.push_str(&word.raw[..1]);
            result.push_str(&gcode::format_number(word.value, self.decimals));
            last = word.offset + word.raw.len();
        }

        result.push_str(&code[last..]);
        result
    }
}

pub(crate) fn defaults() -> StageArgs {
    StageArgs::new().with(DECIMALS, DEFAULT_DECIMALS)
}

pub(crate) fn construct(args: &StageArgs) -> Result<Box<dyn Stage>, ArgumentError> {
    Ok(Box::new(DecimalProcessor::new(
        args.non_negative_usize(DECIMALS)?,
    )))
}

fn fraction_digits(number: &str) -> usize {
    number
        .split_once('.')
        .map(|(_, fraction)| fraction.len())
        .unwrap_or(0)
}

impl Stage for DecimalProcessor {
    fn kind(&self) -> StageKind {
        StageKind::DecimalProcessor
    }

    fn process(
        &mut self,
        record: &str,
        _context: &StreamContext,
    ) -> Result<Vec<String>, ProcessError> {
        let command = gcode::segments(record)
            .into_iter()
            .map(|segment| match segment {
                Segment::Code(code) => self.round_code(code),
                Segment::Comment(comment) => comment.to_string(),
            })
            .collect();
        Ok(vec![command])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round(decimals: usize, record: &str) -> String {
        let mut output = DecimalProcessor::new(decimals)
            .process(record, &StreamContext::new())
            .unwrap();
        assert_eq!(output.len(), 1);
        output.remove(0)
    }

    #[test]
    fn test_rounds_long_values_only() {
        assert_eq!(round(4, "G1 X1.234567 Y2.5 F100"), "G1 X1.2346 Y2.5 F100");
    }

    #[test]
    fn test_trailing_zeros_trimmed() {
        assert_eq!(round(2, "G1 X1.00001 Y-0.999"), "G1 X1 Y-1");
    }

    #[test]
    fn test_zero_decimals() {
        assert_eq!(round(0, "G1 X10.6 Y3.2"), "G1 X11 Y3");
    }

    #[test]
    fn test_command_words_and_comments_untouched() {
        assert_eq!(
            round(0, "G38.2 Z-10.55 (X1.23456)"),
            "G38.2 Z-11 (X1.23456)"
        );
    }

    #[test]
    fn test_default_precision() {
        let stage = construct(&defaults()).unwrap();
        assert_eq!(stage.kind(), StageKind::DecimalProcessor);
        assert_eq!(round(DEFAULT_DECIMALS, "X0.123456"), "X0.1235");
    }
}
