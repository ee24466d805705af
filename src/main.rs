//! termination-replay - Replays a recorded transcript through the termination policy

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use termination_policy::adapters::TracingTraceSink;
use termination_policy::application::{
    EvaluateTurnHandler, Pathway, Transcript, TranscriptReplayer,
};
use termination_policy::config::{AppConfig, LoggingConfig};
use termination_policy::domain::termination::TerminationEngine;

/// Replay a transcript and print one decision trace per assistant turn
#[derive(Parser, Debug)]
#[command(name = "termination-replay")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Transcript JSON file (array of {speaker, text} turns)
    transcript: PathBuf,

    /// Use the stateless single-shot check instead of the two-phase protocol
    #[arg(long)]
    legacy: bool,

    /// Override the configured turn floor
    #[arg(long)]
    turn_floor: Option<u32>,
}

fn init_logging(config: &LoggingConfig) {
    let filter = config.env_filter();
    if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load().context("Failed to load configuration")?;
    if let Some(floor) = args.turn_floor {
        config.policy.turn_floor = floor;
    }
    config.validate().context("Invalid configuration")?;
    init_logging(&config.logging);

    let engine = TerminationEngine::new(config.policy.to_policy_config()?);
    let handler = EvaluateTurnHandler::new(Arc::new(engine), Arc::new(TracingTraceSink::new()));

    let transcript = Transcript::from_file(&args.transcript)?;
    let pathway = if args.legacy {
        Pathway::Legacy
    } else {
        Pathway::TwoPhase
    };

    let (context, results) = TranscriptReplayer::new(&handler, pathway).replay(&transcript);
    for result in &results {
        println!("{}", result.trace.to_json());
    }

    tracing::info!(
        evaluations = results.len(),
        state = %context.state(),
        turn_count = context.turn_count(),
        "Replay finished"
    );
    Ok(())
}
