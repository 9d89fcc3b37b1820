#![allow(clippy::print_stdout, clippy::print_stderr)]

use anyhow::{Context, bail};
use clap::{ArgAction, Parser};
use sealed_logger::Logger;
use sealed_pipeline::config::PipelineConfig;
use sealed_pipeline::{Pipeline, Value, run};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "pipeline")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Runs inputs through the sealed Start -> End stage pipeline")]
struct Cli {
    /// Inputs to run; falls back to `inputs` from the config file
    #[arg(allow_negative_numbers = true)]
    inputs: Vec<String>,
    /// Also run once with an absent input
    #[arg(long)]
    absent: bool,
    /// Print the registered stages with their ordinals and exit
    #[arg(long)]
    list: bool,
    /// Config file (defaults to an optional `pipeline.toml` in the working directory)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Raise the log level (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg = PipelineConfig::load(cli.config.as_deref())
        .context("Critical: Configuration is malformed")?;
    match cli.verbose {
        0 => {},
        1 => cfg.log.level = "debug".into(),
        _ => cfg.log.level = "trace".into(),
    }
    let _log = Logger::init(&cfg.log)?;

    if cli.list {
        for stage in sealed_enum::family::<Pipeline>()? {
            println!("{} {stage}", stage.ordinal());
        }
        return Ok(());
    }

    let mut inputs: Vec<Option<String>> = Vec::new();
    if cli.absent {
        inputs.push(None);
    }
    let given = if cli.inputs.is_empty() { cfg.inputs } else { cli.inputs };
    inputs.extend(given.into_iter().map(Some));
    if inputs.is_empty() {
        bail!("No inputs given; pass them as arguments, use --absent, or set `inputs` in the config");
    }

    let mut failures = 0usize;
    for input in &inputs {
        let label = Value::from(input.as_deref());
        match run(input.as_deref()) {
            Ok(value) => println!("{label} -> {value}"),
            Err(err) => {
                failures += 1;
                eprintln!("{label} -> error: {err}");
            },
        }
    }

    if failures > 0 {
        bail!("{failures} of {} inputs failed", inputs.len());
    }
    Ok(())
}
