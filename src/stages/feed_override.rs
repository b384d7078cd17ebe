//! Feed rate override

use crate::core::gcode::{self, Segment};
use crate::core::{ArgumentError, MotionMode, ProcessError, StageArgs, StreamContext};
use crate::stages::{Stage, StageKind};

pub(crate) const SPEED: &str = "speed";

/// Forces every feed value to `speed`
///
/// Existing F words are rewritten. Feed motions (G1/G2/G3, explicit or
/// modal) that carry no F word get one appended.
#[derive(Debug)]
pub struct FeedOverrideProcessor {
    speed: f64,
}

impl FeedOverrideProcessor {
    pub fn new(speed: f64) -> Self {
        Self { speed }
    }

    fn speed_text(&self) -> String {
        gcode::format_number(self.speed, 4)
    }
}

pub(crate) fn construct(args: &StageArgs) -> Result<Box<dyn Stage>, ArgumentError> {
    Ok(Box::new(FeedOverrideProcessor::new(args.positive_f64(SPEED)?)))
}

/// Whether the code moves at feed rate, given the modal motion before it
fn is_feed_motion(code: &str, modal: Option<MotionMode>) -> bool {
    let words = gcode::words(code);
    let explicit = words
        .iter()
        .filter(|word| word.letter == 'G')
        .filter_map(|word| MotionMode::from_code(word.value))
        .last();
    let has_motion_words = words
        .iter()
        .any(|word| matches!(word.letter, 'X' | 'Y' | 'Z' | 'I' | 'J' | 'K' | 'R'));

    match explicit {
        Some(mode) => mode.is_feed_motion(),
        None => has_motion_words && modal.is_some_and(MotionMode::is_feed_motion),
    }
}

impl Stage for FeedOverrideProcessor {
    fn kind(&self) -> StageKind {
        StageKind::FeedOverrideProcessor
    }

    fn process(
        &mut self,
        record: &str,
        context: &StreamContext,
    ) -> Result<Vec<String>, ProcessError> {
        let segments = gcode::segments(record);
        let code = gcode::strip_comments(record);
        let speed = self.speed_text();

        let has_feed = gcode::words(&code).iter().any(|word| word.letter == 'F');
        let append_at = if !has_feed && is_feed_motion(&code, context.machine.motion) {
            segments
                .iter()
                .rposition(|segment| matches!(segment, Segment::Code(c) if !c.trim().is_empty()))
        } else {
            None
        };

        let mut command = String::with_capacity(record.len() + speed.len() + 2);
        for (index, segment) in segments.iter().enumerate() {
            match segment {
                Segment::Code(code) => {
                    let mut last = 0;
                    for word in gcode::words(code).into_iter().filter(|w| w.letter == 'F') {
                        command.push_str(&code[last..word.offset]);
                        command.push_str(&word.raw[..1]);
                        command.push_str(&speed);
                        last = word.offset + word.raw.len();
                    }
                    let rest = &code[last..];
                    if append_at == Some(index) {
                        let trimmed = rest.trim_end();
                        command.push_str(trimmed);
                        command.push_str(" F");
                        command.push_str(&speed);
                        command.push_str(&rest[trimmed.len()..]);
                    } else {
                        command.push_str(rest);
                    }
                }
                Segment::Comment(comment) => command.push_str(comment),
            }
        }

        Ok(vec![command])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn override_feed(record: &str, context: &StreamContext) -> String {
        let mut output = FeedOverrideProcessor::new(250.0)
            .process(record, context)
            .unwrap();
        output.remove(0)
    }

    #[test]
    fn test_existing_feed_rewritten() {
        let context = StreamContext::new();
        assert_eq!(override_feed("G1 X1 F100", &context), "G1 X1 F250");
        assert_eq!(override_feed("F 20.5", &context), "F250");
    }

    #[test]
    fn test_feed_appended_to_feed_motion() {
        let context = StreamContext::new();
        assert_eq!(override_feed("G1 X1 Y2", &context), "G1 X1 Y2 F250");
        assert_eq!(
            override_feed("G2 X1 Y1 I1 ; arc", &context),
            "G2 X1 Y1 I1 F250 ; arc"
        );
    }

    #[test]
    fn test_rapids_and_non_motion_untouched() {
        let context = StreamContext::new();
        assert_eq!(override_feed("G0 X1", &context), "G0 X1");
        assert_eq!(override_feed("M3 S1000", &context), "M3 S1000");
    }

    #[test]
    fn test_modal_feed_motion_uses_context() {
        let mut context = StreamContext::new();
        context.commit("G1 X0");
        assert_eq!(override_feed("X5", &context), "X5 F250");

        context.commit("G0 X0");
        assert_eq!(override_feed("X5", &context), "X5");
    }

    #[test]
    fn test_speed_must_be_positive() {
        assert!(construct(&StageArgs::new().with(SPEED, 0)).is_err());
        assert!(construct(&StageArgs::new().with(SPEED, "fast")).is_err());
        assert!(construct(&StageArgs::new().with(SPEED, 4)).is_ok());
    }
}
