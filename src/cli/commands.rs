//! CLI command definitions

use clap::Args;

/// Run a G-code stream through a pipeline
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path to pipeline configuration file (JSON or YAML)
    #[arg(short, long)]
    pub config: String,

    /// Global settings file filling in missing stage arguments
    #[arg(short, long)]
    pub settings: Option<String>,

    /// G-code input file (stdin when omitted)
    #[arg(short, long)]
    pub input: Option<String>,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Validate a pipeline configuration
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to pipeline configuration file (JSON or YAML)
    #[arg(short, long)]
    pub config: String,

    /// Global settings file filling in missing stage arguments
    #[arg(short, long)]
    pub settings: Option<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// List registered stages
#[derive(Debug, Args, Clone)]
pub struct StagesCommand {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
