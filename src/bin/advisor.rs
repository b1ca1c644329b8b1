use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colonist_advisor::cli::{
    CaptureError, load_capture, load_config, parse_hex, render_catalog, render_recommendation,
    render_summary,
};
use colonist_advisor::decoder;
use colonist_advisor::session::{IngestOutcome, Session, SessionConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "colonist-advisor")]
#[command(about = "Rebuild Colonist game state from captured frames and suggest moves")]
struct Cli {
    /// JSON file overriding session settings and scoring weights
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log every applied frame
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Feed a capture through a session and print the final state
    Replay {
        capture: PathBuf,

        /// Dump the model as JSON instead of a text summary
        #[arg(long)]
        json: bool,
    },
    /// List the distinct message shapes in a capture
    Catalog { capture: PathBuf },
    /// Decode one binary frame given as hex
    Decode { hex: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CaptureError> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => SessionConfig::default(),
    };

    match cli.command {
        Command::Replay { capture, json } => {
            let frames = load_capture(&capture)?.frames()?;
            let mut session = Session::new(config);
            let mut applied = 0usize;
            let mut dropped = 0usize;
            for frame in &frames {
                match session.ingest(frame) {
                    IngestOutcome::Applied { .. } => applied += 1,
                    IngestOutcome::Dropped => dropped += 1,
                    IngestOutcome::Heartbeat { .. } | IngestOutcome::Ignored => {}
                }
            }
            info!(frames = frames.len(), applied, dropped, "replay finished");

            if json {
                println!("{}", serde_json::to_string_pretty(session.get_model())?);
                return Ok(());
            }
            print!("{}", render_summary(session.get_model()));
            print!(
                "{}",
                render_recommendation(&session.get_strategic_recommendation())
            );
        }
        Command::Catalog { capture } => {
            let frames = load_capture(&capture)?.frames()?;
            let mut session = Session::new(config);
            for frame in &frames {
                session.ingest(frame);
            }
            print!("{}", render_catalog(session.catalog()));
        }
        Command::Decode { hex } => {
            let bytes = parse_hex(&hex)?;
            let value = decoder::try_decode(&bytes).inspect_err(|_| {
                error!(preview = %decoder::hex_preview(&bytes, 32), "frame does not decode");
            })?;
            println!("{}", serde_json::to_string_pretty(&value.to_json())?);
        }
    }
    Ok(())
}
