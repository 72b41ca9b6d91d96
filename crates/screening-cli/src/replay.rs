//! Recorded frame replay

use std::io::BufRead;
use std::time::Duration;

use anyhow::{Context, Result};
use face_signals::LandmarkFrame;
use screening_session::{
    encode_kv, HostMessage, ScreeningSession, SessionResult, SessionRunner, StopReason,
};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::args::OutputFormat;

/// Parse JSON-lines landmark frames; blank lines are skipped
pub fn read_frames<R: BufRead>(reader: R) -> Result<Vec<LandmarkFrame>> {
    let mut frames = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading line {}", number + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let frame: LandmarkFrame = serde_json::from_str(&line)
            .with_context(|| format!("invalid frame on line {}", number + 1))?;
        frames.push(frame);
    }
    debug!("Read {} frames", frames.len());
    Ok(frames)
}

/// Keep frames captured within the session window of the first frame
pub fn within_session(frames: Vec<LandmarkFrame>, duration_secs: u64) -> Vec<LandmarkFrame> {
    let Some(first) = frames.first().map(|f| f.timestamp_ms) else {
        return frames;
    };
    let limit_ms = duration_secs * 1000;
    let total = frames.len();
    let kept: Vec<_> = frames
        .into_iter()
        .filter(|f| f.timestamp_ms.saturating_sub(first) < limit_ms)
        .collect();
    if kept.len() < total {
        info!(
            "Dropped {} frames beyond the {} s session",
            total - kept.len(),
            duration_secs
        );
    }
    kept
}

/// Feed every frame immediately and finalize at end of input
pub fn replay(session: &mut ScreeningSession, frames: &[LandmarkFrame]) -> Option<SessionResult> {
    for frame in frames {
        session.on_frame(frame);
    }
    session.finalize()
}

/// Pace frames by their timestamps through the async runner
pub async fn replay_realtime(
    session: ScreeningSession,
    frames: Vec<LandmarkFrame>,
) -> Result<(SessionResult, StopReason)> {
    let first = frames.first().map(|f| f.timestamp_ms).unwrap_or(0);
    let handle = SessionRunner::spawn(session);
    let start = Instant::now();

    for frame in frames {
        let offset = Duration::from_millis(frame.timestamp_ms.saturating_sub(first));
        sleep_until(start + offset).await;
        if let Err(e) = handle.submit(frame).await {
            warn!("Session ended before input did: {}", e);
            break;
        }
    }

    Ok(handle.finish().await?)
}

/// Render the result in the requested output format
pub fn render(format: OutputFormat, session_id: Uuid, result: &SessionResult) -> Result<String> {
    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(result)?,
        OutputFormat::Kv => encode_kv(result),
        OutputFormat::Envelope => HostMessage::new(session_id, *result).to_json()?,
    };
    Ok(text)
}
