//! pd-screen: replay a recorded landmark stream through one screening session

mod args;
mod replay;

use std::fs::File;
use std::io::BufReader;

use anyhow::{Context, Result};
use clap::Parser;
use screening_session::{ScreeningConfig, ScreeningSession};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::args::Args;
use crate::replay::{read_frames, render, replay, replay_realtime, within_session};

/// Install the global subscriber; logs go to stderr so stdout carries only the result
fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.json_logs);

    info!("=== pd-screen v{} ===", env!("CARGO_PKG_VERSION"));

    let config = ScreeningConfig::load(args.config.as_deref())
        .context("loading screening configuration")?;
    let file = File::open(&args.input)
        .with_context(|| format!("opening {}", args.input.display()))?;
    let frames = within_session(
        read_frames(BufReader::new(file))?,
        config.session_duration_secs,
    );
    info!("Replaying {} frames from {}", frames.len(), args.input.display());

    let mut session = ScreeningSession::new(config)?;
    let session_id = session.session_id();
    let result = if args.realtime {
        let (result, reason) = replay_realtime(session, frames).await?;
        info!("Session ended: {:?}", reason);
        result
    } else {
        replay(&mut session, &frames).context("session already finalized")?
    };

    println!("{}", render(args.format, session_id, &result)?);
    Ok(())
}
