//! Command processing stages and the registry that constructs them by name
//!
//! Every stage consumes one record and produces zero or more records, in
//! the order they should reach the next stage. A stage may keep streaming
//! state between records of one run; [`Stage::reset`] clears it.

pub mod arc_expander;
pub mod command_length;
pub mod command_splitter;
pub mod comment;
pub mod decimal;
pub mod feed_override;
pub mod pattern_remover;
pub mod program_end;
pub mod whitespace;

pub use arc_expander::ArcExpander;
pub use command_length::CommandLengthProcessor;
pub use command_splitter::CommandSplitter;
pub use comment::CommentProcessor;
pub use decimal::DecimalProcessor;
pub use feed_override::FeedOverrideProcessor;
pub use pattern_remover::PatternRemover;
pub use program_end::M30Processor;
pub use whitespace::WhitespaceProcessor;

use crate::core::{ArgumentError, ProcessError, StageArgs, StreamContext};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A constructed, ready-to-run transformer
pub trait Stage: Send + fmt::Debug {
    /// Which registered stage this is
    fn kind(&self) -> StageKind;

    /// Transform one record into zero or more records
    fn process(
        &mut self,
        record: &str,
        context: &StreamContext,
    ) -> Result<Vec<String>, ProcessError>;

    /// Forget any state carried between records
    fn reset(&mut self) {}
}

/// Identifiers of every stage the registry knows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageKind {
    ArcExpander,
    CommandSplitter,
    CommentProcessor,
    DecimalProcessor,
    FeedOverrideProcessor,
    M30Processor,
    PatternRemover,
    CommandLengthProcessor,
    WhitespaceProcessor,
}

impl StageKind {
    pub const ALL: [StageKind; 9] = [
        StageKind::ArcExpander,
        StageKind::CommandSplitter,
        StageKind::CommentProcessor,
        StageKind::DecimalProcessor,
        StageKind::FeedOverrideProcessor,
        StageKind::M30Processor,
        StageKind::PatternRemover,
        StageKind::CommandLengthProcessor,
        StageKind::WhitespaceProcessor,
    ];

    /// Name used in configuration documents
    pub fn name(self) -> &'static str {
        match self {
            StageKind::ArcExpander => "ArcExpander",
            StageKind::CommandSplitter => "CommandSplitter",
            StageKind::CommentProcessor => "CommentProcessor",
            StageKind::DecimalProcessor => "DecimalProcessor",
            StageKind::FeedOverrideProcessor => "FeedOverrideProcessor",
            StageKind::M30Processor => "M30Processor",
            StageKind::PatternRemover => "PatternRemover",
            StageKind::CommandLengthProcessor => "CommandLengthProcessor",
            StageKind::WhitespaceProcessor => "WhitespaceProcessor",
        }
    }

    /// The argument key the stage reads, if it takes one
    pub fn argument(self) -> Option<&'static str> {
        match self {
            StageKind::ArcExpander => Some(arc_expander::LENGTH),
            StageKind::DecimalProcessor => Some(decimal::DECIMALS),
            StageKind::FeedOverrideProcessor => Some(feed_override::SPEED),
            StageKind::PatternRemover => Some(pattern_remover::PATTERN),
            StageKind::CommandLengthProcessor => Some(command_length::COMMAND_LENGTH),
            _ => None,
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Builds a stage from its effective arguments
pub type Constructor = fn(&StageArgs) -> Result<Box<dyn Stage>, ArgumentError>;

/// A registry entry
pub struct Registration {
    pub kind: StageKind,

    /// Arguments the stage declares for itself, lowest precedence
    pub defaults: fn() -> StageArgs,

    pub construct: Constructor,
}

static REGISTRY: [Registration; 9] = [
    Registration {
        kind: StageKind::ArcExpander,
        defaults: StageArgs::new,
        construct: arc_expander::construct,
    },
    Registration {
        kind: StageKind::CommandSplitter,
        defaults: StageArgs::new,
        construct: command_splitter::construct,
    },
    Registration {
        kind: StageKind::CommentProcessor,
        defaults: StageArgs::new,
        construct: comment::construct,
    },
    Registration {
        kind: StageKind::DecimalProcessor,
        defaults: decimal::defaults,
        construct: decimal::construct,
    },
    Registration {
        kind: StageKind::FeedOverrideProcessor,
        defaults: StageArgs::new,
        construct: feed_override::construct,
    },
    Registration {
        kind: StageKind::M30Processor,
        defaults: StageArgs::new,
        construct: program_end::construct,
    },
    Registration {
        kind: StageKind::PatternRemover,
        defaults: StageArgs::new,
        construct: pattern_remover::construct,
    },
    Registration {
        kind: StageKind::CommandLengthProcessor,
        defaults: StageArgs::new,
        construct: command_length::construct,
    },
    Registration {
        kind: StageKind::WhitespaceProcessor,
        defaults: StageArgs::new,
        construct: whitespace::construct,
    },
];

/// Find the registration for a configuration name (case-sensitive)
pub fn lookup(name: &str) -> Option<&'static Registration> {
    REGISTRY.iter().find(|entry| entry.kind.name() == name)
}

/// Every registered stage
pub fn registrations() -> &'static [Registration] {
    &REGISTRY
}
