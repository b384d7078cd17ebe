//! CLI output formatting

use crate::core::{LoadError, RuntimeProcessingError};
use crate::execution::{Resolution, SkipReason};
use crate::stages::StageKind;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Create a spinner counting input lines of unknown total
pub fn create_spinner() -> ProgressBar {
    let progress = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {pos} line(s) {msg}")
    {
        progress.set_style(style);
    }
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Format one configuration entry's outcome for display
pub fn format_resolution(index: usize, name: &str, resolution: &Resolution) -> String {
    match resolution {
        Resolution::Included(_) => format!(
            "  {} {:>2} {}",
            CHECK,
            style(index).dim(),
            style(name).cyan()
        ),
        Resolution::Skipped(SkipReason::Disabled) => format!(
            "  {} {:>2} {} {}",
            INFO,
            style(index).dim(),
            style(name).dim(),
            style("(disabled)").dim()
        ),
        Resolution::Skipped(SkipReason::InvalidOptional(cause)) => format!(
            "  {} {:>2} {} {}",
            WARN,
            style(index).dim(),
            style(name).yellow(),
            style(format!("(optional, dropped: {})", cause)).dim()
        ),
    }
}

/// Format a registry entry for display
pub fn format_stage_kind(kind: StageKind) -> String {
    match kind.argument() {
        Some(key) => format!("  {} {}", style(kind).bold(), style(key).cyan()),
        None => format!("  {}", style(kind).bold()),
    }
}

/// Format a load failure for display
pub fn format_load_error(error: &LoadError) -> String {
    match error {
        LoadError::UnknownStage { name } => format!(
            "{} Unknown stage {}",
            CROSS,
            style(name).red().bold()
        ),
        LoadError::InvalidArgument { name, cause } => format!(
            "{} {}: {}",
            CROSS,
            style(name).red().bold(),
            style(cause).dim()
        ),
        LoadError::Config(cause) => format!("{} {}", CROSS, style(cause).red()),
    }
}

/// Format a runtime failure for display
pub fn format_runtime_error(error: &RuntimeProcessingError) -> String {
    format!(
        "{} {} (position {}) rejected {}\n  {}",
        CROSS,
        style(error.stage).red().bold(),
        error.position,
        style(format!("'{}'", error.record)).yellow(),
        style(&error.cause).dim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ProcessError;

    #[test]
    fn test_runtime_error_mentions_stage_and_record() {
        let error = RuntimeProcessingError {
            stage: StageKind::CommandLengthProcessor,
            position: 3,
            record: "G1 X100".to_string(),
            cause: ProcessError::TooLong { length: 7, max: 5 },
        };
        let text = console::strip_ansi_codes(&format_runtime_error(&error)).to_string();
        assert!(text.contains("CommandLengthProcessor"));
        assert!(text.contains("position 3"));
        assert!(text.contains("'G1 X100'"));
    }

    #[test]
    fn test_stage_kind_shows_argument_key() {
        let text = console::strip_ansi_codes(&format_stage_kind(StageKind::ArcExpander)).to_string();
        assert!(text.contains("ArcExpander"));
        assert!(text.contains("length"));
    }
}
