//! Async session runner
//!
//! Drives one session from a frame stream on a single task. The session ends
//! when the countdown reaches zero, an explicit stop arrives or the frame
//! stream closes; every path goes through the same one-shot finalize.

use std::time::Duration;

use face_signals::{LandmarkFrame, Vitals};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::result::SessionResult;
use crate::session::ScreeningSession;
use crate::SessionError;

/// Why a running session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Countdown reached zero
    Timeout,
    /// Explicit stop signal
    Stopped,
    /// Frame source closed
    StreamEnded,
}

/// Published once per countdown tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionProgress {
    pub remaining_secs: u64,
    pub frames_processed: u64,
    pub blink_count: u32,
    pub vitals: Vitals,
}

/// Owns a session for the duration of one run
#[derive(Debug)]
pub struct SessionRunner {
    session: ScreeningSession,
    progress: watch::Sender<SessionProgress>,
}

impl SessionRunner {
    pub fn new(session: ScreeningSession) -> (Self, watch::Receiver<SessionProgress>) {
        let (progress, rx) = watch::channel(SessionProgress {
            remaining_secs: session.config().session_duration_secs,
            ..Default::default()
        });
        (Self { session, progress }, rx)
    }

    pub fn session(&self) -> &ScreeningSession {
        &self.session
    }

    /// Run until timeout, stop or end of stream, then finalize.
    ///
    /// A stop sender dropped without sending does not end the session.
    pub async fn run(
        &mut self,
        mut frames: mpsc::Receiver<LandmarkFrame>,
        mut stop: oneshot::Receiver<()>,
    ) -> Result<(SessionResult, StopReason), SessionError> {
        if self.session.is_finalized() {
            return Err(SessionError::AlreadyFinalized);
        }

        let mut remaining = self.session.config().session_duration_secs;
        self.publish(remaining);

        let mut ticker = interval(Duration::from_secs(1));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately
        ticker.tick().await;

        let mut stop_armed = true;
        let reason = loop {
            tokio::select! {
                biased;

                signal = &mut stop, if stop_armed => match signal {
                    Ok(()) => break StopReason::Stopped,
                    Err(_) => {
                        debug!("Stop sender dropped; running to completion");
                        stop_armed = false;
                    }
                },

                _ = ticker.tick() => {
                    remaining = remaining.saturating_sub(1);
                    self.publish(remaining);
                    if remaining == 0 {
                        break StopReason::Timeout;
                    }
                }

                frame = frames.recv() => match frame {
                    Some(frame) => {
                        self.session.on_frame(&frame);
                    }
                    None => break StopReason::StreamEnded,
                },
            }
        };

        let result = self
            .session
            .finalize()
            .ok_or(SessionError::AlreadyFinalized)?;
        info!(
            "Session {} ended ({:?}) with {} s remaining",
            self.session.session_id(),
            reason,
            remaining
        );
        Ok((result, reason))
    }

    /// Spawn the runner on its own task
    pub fn spawn(session: ScreeningSession) -> SessionHandle {
        let buffer = session.config().frame_buffer.max(1);
        let (frames_tx, frames_rx) = mpsc::channel(buffer);
        let (stop_tx, stop_rx) = oneshot::channel();
        let (mut runner, progress) = SessionRunner::new(session);
        let task = tokio::spawn(async move { runner.run(frames_rx, stop_rx).await });

        SessionHandle {
            frames: frames_tx,
            stop: Some(stop_tx),
            progress,
            task,
        }
    }

    fn publish(&self, remaining_secs: u64) {
        let live = self.session.live();
        // No receivers left is fine; progress is advisory
        let _ = self.progress.send(SessionProgress {
            remaining_secs,
            frames_processed: live.frames_processed,
            blink_count: live.blink_count,
            vitals: live.vitals,
        });
    }
}

/// Handle to a spawned session
#[derive(Debug)]
pub struct SessionHandle {
    frames: mpsc::Sender<LandmarkFrame>,
    stop: Option<oneshot::Sender<()>>,
    progress: watch::Receiver<SessionProgress>,
    task: JoinHandle<Result<(SessionResult, StopReason), SessionError>>,
}

impl SessionHandle {
    /// Queue a frame; waits while the session is busy with the previous one
    pub async fn submit(&self, frame: LandmarkFrame) -> Result<(), SessionError> {
        self.frames
            .send(frame)
            .await
            .map_err(|_| SessionError::Task("session no longer accepts frames".into()))
    }

    /// Request an early stop; returns false if already requested or finished
    pub fn stop(&mut self) -> bool {
        match self.stop.take() {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }

    pub fn progress(&self) -> watch::Receiver<SessionProgress> {
        self.progress.clone()
    }

    /// Wait for the session to end by timeout or stop
    pub async fn join(self) -> Result<(SessionResult, StopReason), SessionError> {
        let SessionHandle {
            frames, stop, task, ..
        } = self;
        let outcome = task.await;
        drop(frames);
        drop(stop);
        outcome.map_err(|e| SessionError::Task(e.to_string()))?
    }

    /// Close the frame stream and wait for the result
    pub async fn finish(self) -> Result<(SessionResult, StopReason), SessionError> {
        let SessionHandle { frames, task, .. } = self;
        drop(frames);
        task.await.map_err(|e| SessionError::Task(e.to_string()))?
    }
}
