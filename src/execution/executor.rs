//! Pipeline executor - pushes records through the stage chain
//!
//! Each input record flows through the entire chain before the next one is
//! read. Within a record, every output of a stage is carried through all
//! downstream stages, in order, before its next sibling, and the stream
//! context advances as each command leaves the last stage.

use crate::core::{Pipeline, RuntimeProcessingError, StreamContext, StreamError};
use crate::stages::Stage;
use std::io::{BufRead, Write};
use tracing::{debug, error, trace};

/// Push one record through `stages`, collecting what leaves the last stage
fn push_through_stages(
    stages: &mut [Box<dyn Stage>],
    position: usize,
    record: String,
    context: &mut StreamContext,
    output: &mut Vec<String>,
) -> Result<(), RuntimeProcessingError> {
    let Some((stage, downstream)) = stages.split_first_mut() else {
        context.commit(&record);
        output.push(record);
        return Ok(());
    };

    let produced = match stage.process(&record, context) {
        Ok(produced) => produced,
        Err(cause) => {
            error!(
                "Stage {} (position {}) rejected line {}: {}",
                stage.kind(),
                position,
                context.line_number,
                cause
            );
            return Err(RuntimeProcessingError {
                stage: stage.kind(),
                position,
                record,
                cause,
            });
        }
    };

    for next in produced {
        push_through_stages(downstream, position + 1, next, context, output)?;
    }
    Ok(())
}

impl Pipeline {
    /// Clear all streaming state so the next record starts a fresh run
    pub fn reset(&mut self) {
        for stage in self.stages.iter_mut() {
            stage.reset();
        }
        self.context = StreamContext::new();
    }

    /// Process one live record within the current run
    pub fn process(&mut self, record: &str) -> Result<Vec<String>, RuntimeProcessingError> {
        self.context.line_number += 1;
        let mut output = Vec::new();
        push_through_stages(
            &mut self.stages,
            0,
            record.to_string(),
            &mut self.context,
            &mut output,
        )?;
        trace!(
            "Line {}: {:?} -> {} command(s)",
            self.context.line_number,
            record,
            output.len()
        );
        Ok(output)
    }

    /// Run a complete stream from a fresh state
    ///
    /// A runtime error aborts the run; the pipeline can be run again.
    pub fn run<I, S>(&mut self, input: I) -> Result<Vec<String>, RuntimeProcessingError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.reset();
        let mut output = Vec::new();
        for record in input {
            output.extend(self.process(record.as_ref())?);
        }
        debug!(
            "Processed {} record(s) into {} command(s)",
            self.context.line_number,
            output.len()
        );
        Ok(output)
    }

    /// Run a live stream: read lines, write each record's commands as soon
    /// as it has been processed, and flush before reading the next line
    ///
    /// `on_record` is called after every input line. Returns the number of
    /// commands written.
    pub fn stream<R, W, F>(
        &mut self,
        reader: R,
        writer: &mut W,
        mut on_record: F,
    ) -> Result<usize, StreamError>
    where
        R: BufRead,
        W: Write,
        F: FnMut(&StreamContext),
    {
        self.reset();
        let mut written = 0;
        for line in reader.lines() {
            let line = line.map_err(StreamError::Read)?;
            for command in self.process(&line)? {
                writeln!(writer, "{}", command).map_err(StreamError::Write)?;
                written += 1;
            }
            writer.flush().map_err(StreamError::Write)?;
            on_record(&self.context);
        }
        debug!(
            "Streamed {} line(s) into {} command(s)",
            self.context.line_number, written
        );
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ProcessError, StageArgs};
    use crate::stages::{CommentProcessor, StageKind};
    use std::io::Cursor;

    /// Captures output and counts flushes
    #[derive(Default)]
    struct FlushCounter {
        buffer: Vec<u8>,
        flushes: usize,
    }

    impl Write for FlushCounter {
        fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
            self.buffer.extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    /// Emits each record twice
    #[derive(Debug)]
    struct Duplicate;

    impl Stage for Duplicate {
        fn kind(&self) -> StageKind {
            StageKind::CommandSplitter
        }

        fn process(
            &mut self,
            record: &str,
            _context: &StreamContext,
        ) -> Result<Vec<String>, ProcessError> {
            Ok(vec![format!("{} a", record), format!("{} b", record)])
        }
    }

    /// Records the order in which it sees records
    #[derive(Debug, Default)]
    struct Numbering {
        seen: usize,
    }

    impl Stage for Numbering {
        fn kind(&self) -> StageKind {
            StageKind::WhitespaceProcessor
        }

        fn process(
            &mut self,
            record: &str,
            _context: &StreamContext,
        ) -> Result<Vec<String>, ProcessError> {
            self.seen += 1;
            Ok(vec![format!("{}:{}", self.seen, record)])
        }

        fn reset(&mut self) {
            self.seen = 0;
        }
    }

    #[test]
    fn test_empty_pipeline_passes_records_through() {
        let mut pipeline = Pipeline::default();
        let output = pipeline.run(["G1 X1", "G1 X2"]).unwrap();
        assert_eq!(output, vec!["G1 X1", "G1 X2"]);
    }

    #[test]
    fn test_fan_out_preserves_order() {
        let mut pipeline = Pipeline::new(vec![Box::new(Duplicate), Box::new(Numbering::default())]);
        let output = pipeline.run(["x", "y"]).unwrap();
        assert_eq!(output, vec!["1:x a", "2:x b", "3:y a", "4:y b"]);
    }

    #[test]
    fn test_fan_out_through_two_levels() {
        let mut pipeline = Pipeline::new(vec![Box::new(Duplicate), Box::new(Duplicate)]);
        let output = pipeline.run(["r"]).unwrap();
        assert_eq!(output, vec!["r a a", "r a b", "r b a", "r b b"]);
    }

    #[test]
    fn test_run_resets_stage_state() {
        let mut pipeline = Pipeline::new(vec![Box::new(Numbering::default())]);
        let first = pipeline.run(["a", "b"]).unwrap();
        let second = pipeline.run(["a", "b"]).unwrap();
        assert_eq!(first, second);
        assert_eq!(pipeline.context().line_number, 2);
    }

    #[test]
    fn test_dropped_records_stop_early() {
        let mut pipeline = Pipeline::new(vec![
            Box::new(CommentProcessor::new()),
            Box::new(Numbering::default()),
        ]);
        let output = pipeline.run(["(comment)", "G0 X1"]).unwrap();
        assert_eq!(output, vec!["1:G0 X1"]);
    }

    #[test]
    fn test_context_advances_between_records() {
        let mut pipeline = Pipeline::default();
        pipeline.run(["G0 X3 Y4", "G91"]).unwrap();
        assert_eq!(pipeline.context().machine.position, [3.0, 4.0, 0.0]);
        assert!(!pipeline.context().machine.absolute);
    }

    #[test]
    fn test_runtime_error_identifies_stage() {
        let limiter = crate::stages::command_length::construct(
            &StageArgs::new().with("commandLength", 5),
        )
        .unwrap();
        let mut pipeline = Pipeline::new(vec![Box::new(CommentProcessor::new()), limiter]);

        let error = pipeline
            .run(["G1 X1 ; fine", "G1 X100 Y100"])
            .unwrap_err();
        assert_eq!(error.stage, StageKind::CommandLengthProcessor);
        assert_eq!(error.position, 1);
        assert_eq!(error.record, "G1 X100 Y100");
        assert_eq!(error.cause, ProcessError::TooLong { length: 12, max: 5 });

        // The pipeline stays usable for a corrected stream
        assert_eq!(pipeline.run(["G1 X1"]).unwrap(), vec!["G1 X1"]);
    }

    #[test]
    fn test_stream_flushes_after_every_line() {
        let mut pipeline = Pipeline::new(vec![Box::new(CommentProcessor::new())]);
        let mut writer = FlushCounter::default();
        let mut seen = Vec::new();

        let written = pipeline
            .stream(
                Cursor::new("G0 X1 ; start\n(note)\nG1 X2\n"),
                &mut writer,
                |context| seen.push(context.line_number),
            )
            .unwrap();

        assert_eq!(written, 2);
        assert_eq!(String::from_utf8(writer.buffer).unwrap(), "G0 X1\nG1 X2\n");
        assert_eq!(writer.flushes, 3);
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn test_stream_stops_at_rejected_record() {
        let limiter = crate::stages::command_length::construct(
            &StageArgs::new().with("commandLength", 5),
        )
        .unwrap();
        let mut pipeline = Pipeline::new(vec![limiter]);
        let mut output = Vec::new();

        let error = pipeline
            .stream(Cursor::new("G0 X1\nG1 X100\nG0 X0\n"), &mut output, |_| {})
            .unwrap_err();
        assert!(matches!(error, StreamError::Rejected(ref e) if e.record == "G1 X100"));
        assert_eq!(String::from_utf8(output).unwrap(), "G0 X1\n");
    }
}
