use gcode_pipeline::cli::commands::{RunCommand, StagesCommand, ValidateCommand};
use gcode_pipeline::cli::output::*;
use gcode_pipeline::cli::{Cli, Command};
use gcode_pipeline::core::{ConfigDocument, GlobalSettings, StreamError};
use gcode_pipeline::execution::{self, Resolution};
use gcode_pipeline::stages;

use anyhow::{Context, Result};
use std::fs;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging; stdout carries transformed G-code
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    // Execute command
    match &cli.command {
        Command::Run(cmd) => run_pipeline(cmd)?,
        Command::Validate(cmd) => validate_pipeline(cmd)?,
        Command::Stages(cmd) => list_stages(cmd)?,
    }

    Ok(())
}

fn load_settings(path: Option<&str>) -> Result<Option<GlobalSettings>> {
    path.map(|path| {
        GlobalSettings::from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path))
    })
    .transpose()
}

fn run_pipeline(cmd: &RunCommand) -> Result<()> {
    let document = ConfigDocument::from_file(&cmd.config)
        .with_context(|| format!("Failed to load pipeline config {}", cmd.config))?;
    let settings = load_settings(cmd.settings.as_deref())?;

    let mut pipeline = match execution::load_specs(&document.specs(), settings.as_ref()) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("{}", format_load_error(&e));
            std::process::exit(1);
        }
    };

    let reader: Box<dyn BufRead> = match &cmd.input {
        Some(path) => Box::new(BufReader::new(
            fs::File::open(path).with_context(|| format!("Failed to open input {}", path))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let writer: Box<dyn Write> = match &cmd.output {
        Some(path) => Box::new(
            fs::File::create(path).with_context(|| format!("Failed to create {}", path))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = BufWriter::new(writer);

    // Progress only when stdout is free for it
    let progress = cmd.output.as_ref().map(|_| {
        eprintln!(
            "{} Running {} stage(s)",
            ROCKET,
            style(pipeline.len()).cyan()
        );
        create_spinner()
    });

    let result = pipeline.stream(reader, &mut writer, |_| {
        if let Some(progress) = &progress {
            progress.inc(1);
        }
    });

    let written = match result {
        Ok(written) => written,
        Err(StreamError::Rejected(e)) => {
            if let Some(progress) = &progress {
                progress.abandon();
            }
            error!("{}", e);
            eprintln!("{}", format_runtime_error(&e));
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("Failed to stream G-code"),
    };

    if let Some(progress) = progress {
        progress.finish_and_clear();
        eprintln!(
            "{} Wrote {} command(s) from {} line(s) to {}",
            CHECK,
            style(written).cyan(),
            style(pipeline.context().line_number).cyan(),
            style(cmd.output.as_deref().unwrap_or_default()).bold()
        );
    }

    Ok(())
}

fn validate_pipeline(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating pipeline...", INFO);

    let document = match ConfigDocument::from_file(&cmd.config) {
        Ok(document) => document,
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(e).red());
            std::process::exit(1);
        }
    };
    let settings = load_settings(cmd.settings.as_deref())?;
    let specs = document.specs();

    let resolutions = match execution::resolve_all(&specs, settings.as_ref()) {
        Ok(resolutions) => resolutions,
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("{}", format_load_error(&e));
            std::process::exit(1);
        }
    };

    let mut kinds = Vec::new();
    for (index, (spec, resolution)) in specs.iter().zip(&resolutions).enumerate() {
        println!("{}", format_resolution(index, &spec.name, resolution));
        if let Resolution::Included(stage) = resolution {
            kinds.push(stage.kind());
        }
    }

    println!("{} Pipeline configuration is valid!", CHECK);
    println!(
        "  Stages: {} of {} entries",
        style(kinds.len()).cyan(),
        style(specs.len()).cyan()
    );

    if cmd.json {
        let data = serde_json::json!({ "stages": kinds });
        println!("\n{}", serde_json::to_string_pretty(&data)?);
    }
    Ok(())
}

fn list_stages(cmd: &StagesCommand) -> Result<()> {
    if cmd.json {
        let data: Vec<_> = stages::registrations()
            .iter()
            .map(|entry| {
                serde_json::json!({
                    "name": entry.kind.name(),
                    "argument": entry.kind.argument(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    println!("{} Registered stages:", INFO);
    for entry in stages::registrations() {
        println!("{}", format_stage_kind(entry.kind));
    }
    Ok(())
}
