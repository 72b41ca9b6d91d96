use std::time::Duration;

use face_signals::{LandmarkFrame, LandmarkIndices, Point3};
use risk_scoring::{ColorTag, RiskLevel};
use screening_session::{
    ScreeningConfig, ScreeningSession, SessionError, SessionRunner, StopReason,
};
use tokio::sync::{mpsc, oneshot};

const FRAME_MS: u64 = 33;

/// Synthetic face with controllable eyes, mouth jitter and left-side droop
#[derive(Clone, Copy)]
struct Face {
    eyes_closed: bool,
    jitter: f64,
    droop: f64,
}

impl Face {
    fn neutral() -> Self {
        Self {
            eyes_closed: false,
            jitter: 0.0,
            droop: 0.0,
        }
    }

    fn frame(&self, timestamp_ms: u64) -> LandmarkFrame {
        let ix = LandmarkIndices::default();
        let mut points = vec![Point3::new(0.5, 0.5, 0.0); 478];
        points[ix.nose_bridge] = Point3::new(0.5, 0.40, 0.0);
        points[ix.chin] = Point3::new(0.5, 0.80, 0.0);
        points[ix.nose_tip] = Point3::new(0.5, 0.55, 0.0);

        let gap = if self.eyes_closed { 0.002 } else { 0.02 };
        points[ix.left_eye_upper] = Point3::new(0.40, 0.40 - gap, 0.0);
        points[ix.left_eye_lower] = Point3::new(0.40, 0.40, 0.0);
        points[ix.right_eye_upper] = Point3::new(0.60, 0.40 - gap, 0.0);
        points[ix.right_eye_lower] = Point3::new(0.60, 0.40, 0.0);

        points[ix.mouth_left] = Point3::new(0.42 + self.jitter, 0.68 + self.droop, 0.0);
        points[ix.mouth_right] = Point3::new(0.58, 0.68, 0.0);
        points[ix.upper_lip] = Point3::new(0.5, 0.66, 0.0);
        points[ix.lower_lip] = Point3::new(0.5, 0.70, 0.0);
        points[ix.left_eyebrow] = Point3::new(0.40, 0.33 + self.droop, 0.0);
        points[ix.right_eyebrow] = Point3::new(0.60, 0.33, 0.0);
        points[ix.left_cheek] = Point3::new(0.35, 0.55 + self.droop, 0.0);
        points[ix.right_cheek] = Point3::new(0.65, 0.55, 0.0);
        LandmarkFrame::new(timestamp_ms, points)
    }
}

/// 30 s at ~30 fps; `blinks` single-frame eye closures, alternating mouth jitter
fn recording(blinks: usize, jitter: f64, droop: f64) -> Vec<LandmarkFrame> {
    let closed: Vec<usize> = (0..blinks).map(|k| 10 + k * 28).collect();
    (0..900usize)
        .map(|i| {
            let face = Face {
                eyes_closed: closed.contains(&i),
                jitter: if i % 2 == 1 { jitter } else { 0.0 },
                droop,
            };
            face.frame(i as u64 * FRAME_MS)
        })
        .collect()
}

#[test]
fn healthy_session_scores_low() {
    let (mut session, mut rx) = ScreeningSession::with_channel(ScreeningConfig::default()).unwrap();
    for frame in recording(9, 0.024, 0.0) {
        session.on_frame(&frame);
    }
    let result = session.finalize().unwrap();

    assert_eq!(result.breakdown.blink_rate, 18.0);
    assert!((result.breakdown.motion_score - 3.0).abs() < 1e-6);
    assert!(result.breakdown.asymmetry < 1e-12);
    assert_eq!(result.risk_percentage, 0);
    assert_eq!(result.level, RiskLevel::Low);
    assert_eq!(result.color_tag, ColorTag::Green);
    assert_eq!(rx.try_recv().unwrap(), result);
}

#[test]
fn rigid_asymmetric_session_scores_high() {
    let mut session = ScreeningSession::new(ScreeningConfig::default()).unwrap();
    for frame in recording(4, 0.0064, 0.06) {
        session.on_frame(&frame);
    }
    let result = session.finalize().unwrap();

    // blink 8/min -> 28, motion 0.8 -> 26, asymmetry 0.06 -> 16
    assert_eq!(result.breakdown.blink_rate, 8.0);
    assert!((result.breakdown.motion_score - 0.8).abs() < 1e-6);
    assert!((result.breakdown.asymmetry - 0.06).abs() < 1e-9);
    assert_eq!(result.risk_percentage, 70);
    assert_eq!(result.level, RiskLevel::High);
    assert_eq!(result.color_tag, ColorTag::Red);

    let summary = session.summary().unwrap();
    assert_eq!(summary.frames_processed, 900);
    assert_eq!(summary.motion_samples, 899);
    assert_eq!(summary.asymmetry_samples, 899);
}

#[test]
fn blink_rate_is_twice_the_count_for_30s_sessions() {
    for blinks in [0usize, 1, 5, 15, 31] {
        let mut session = ScreeningSession::new(ScreeningConfig::default()).unwrap();
        for frame in recording(blinks, 0.0, 0.0) {
            session.on_frame(&frame);
        }
        let result = session.finalize().unwrap();
        assert_eq!(result.breakdown.blink_rate, blinks as f64 * 2.0, "{} blinks", blinks);
    }
}

#[test]
fn held_closed_eyes_count_once() {
    let mut session = ScreeningSession::new(ScreeningConfig::default()).unwrap();
    let closed = Face {
        eyes_closed: true,
        ..Face::neutral()
    };
    session.on_frame(&Face::neutral().frame(0));
    for i in 1..20u64 {
        session.on_frame(&closed.frame(i * FRAME_MS));
    }
    assert_eq!(session.live().blink_count, 1);
}

#[test]
fn no_face_frames_are_skipped() {
    let mut session = ScreeningSession::new(ScreeningConfig::default()).unwrap();
    for i in 0..30u64 {
        session.on_frame(&LandmarkFrame::empty(i * FRAME_MS));
    }
    let live = session.live();
    assert_eq!(live.frames_processed, 0);
    assert_eq!(live.frames_skipped, 30);

    let result = session.finalize().unwrap();
    assert_eq!(result.breakdown.motion_score, 1500.0);
    assert_eq!(result.breakdown.asymmetry, 0.02);
    assert!(result.vitals.breathing_rate.is_none());
    assert!(result.vitals.heart_rate.is_none());
}

#[test]
fn breathing_and_pulse_motion_reach_the_result() {
    let ix = LandmarkIndices::default();
    let (mut session, mut rx) = ScreeningSession::with_channel(ScreeningConfig::default()).unwrap();
    for i in 0..900u64 {
        let mut frame = Face::neutral().frame(i * FRAME_MS);
        // Nose tip steps every 45 frames (1485 ms); left cheek twitches every 5th
        if (i / 45) % 2 == 1 {
            frame.points[ix.nose_tip].y += 0.002;
        }
        if i % 5 == 0 {
            frame.points[ix.left_cheek].y += 0.001;
        }
        session.on_frame(&frame);
    }

    let live = session.live();
    // 18 twitch samples in the last 45: 18 * 4 bpm
    assert_eq!(live.vitals.heart_rate, Some(72.0));

    let result = session.finalize().unwrap();
    assert_eq!(result.vitals.breathing_rate, Some(60_000.0 / 1485.0));
    assert_eq!(result.vitals.heart_rate, Some(72.0));
    assert_eq!(rx.try_recv().unwrap().vitals, result.vitals);
}

#[test]
fn double_finalize_delivers_once() {
    let (mut session, mut rx) = ScreeningSession::with_channel(ScreeningConfig::default()).unwrap();
    let first = session.finalize();
    assert!(first.is_some());
    assert!(session.finalize().is_none());
    assert_eq!(rx.try_recv().ok(), first);
    assert!(rx.try_recv().is_err());
}

#[test]
fn new_session_resets_accumulators() {
    let (mut session, _first) = ScreeningSession::with_channel(ScreeningConfig::default()).unwrap();
    for frame in recording(12, 0.01, 0.06) {
        session.on_frame(&frame);
    }
    let first = session.finalize().unwrap();
    assert_eq!(first.breakdown.blink_rate, 24.0);

    let mut rx = session.restart();
    for frame in recording(9, 0.024, 0.0) {
        session.on_frame(&frame);
    }
    let second = session.finalize().unwrap();
    assert_eq!(second.breakdown.blink_rate, 18.0);
    assert!(second.breakdown.asymmetry < 1e-12);
    assert_eq!(rx.try_recv().unwrap(), second);
}

#[tokio::test(start_paused = true)]
async fn runner_times_out_after_duration() {
    let session = ScreeningSession::new(ScreeningConfig::default()).unwrap();
    let handle = SessionRunner::spawn(session);
    let progress = handle.progress();
    let started = tokio::time::Instant::now();

    for frame in recording(3, 0.0, 0.0).into_iter().take(120) {
        handle.submit(frame).await.unwrap();
    }

    let (result, reason) = handle.join().await.unwrap();
    assert_eq!(reason, StopReason::Timeout);
    assert!(started.elapsed() >= Duration::from_secs(30));
    assert_eq!(result.breakdown.blink_rate, 6.0);

    let last = *progress.borrow();
    assert_eq!(last.remaining_secs, 0);
    assert_eq!(last.blink_count, 3);
}

#[tokio::test(start_paused = true)]
async fn runner_stops_early_on_signal() {
    let session = ScreeningSession::new(ScreeningConfig::default()).unwrap();
    let mut handle = SessionRunner::spawn(session);
    let started = tokio::time::Instant::now();

    let frames = [false, true, false, true, false, false];
    for (i, closed) in frames.into_iter().enumerate() {
        let face = Face {
            eyes_closed: closed,
            ..Face::neutral()
        };
        handle.submit(face.frame(i as u64 * FRAME_MS)).await.unwrap();
    }
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(handle.stop());
    assert!(!handle.stop());

    let (result, reason) = handle.join().await.unwrap();
    assert_eq!(reason, StopReason::Stopped);
    assert!(started.elapsed() < Duration::from_secs(30));
    // Rate still uses the full configured duration
    assert_eq!(result.breakdown.blink_rate, 4.0);
}

#[tokio::test(start_paused = true)]
async fn runner_finalizes_at_end_of_stream() {
    let session = ScreeningSession::new(ScreeningConfig::with_duration(20)).unwrap();
    let handle = SessionRunner::spawn(session);
    for frame in recording(2, 0.0, 0.0).into_iter().take(300) {
        handle.submit(frame).await.unwrap();
    }
    let (result, reason) = handle.finish().await.unwrap();
    assert_eq!(reason, StopReason::StreamEnded);
    assert_eq!(result.breakdown.blink_rate, 6.0);
}

#[tokio::test(start_paused = true)]
async fn stop_after_timeout_is_ignored() {
    let (session, mut rx) = ScreeningSession::with_channel(ScreeningConfig::default()).unwrap();
    let (runner, _progress) = SessionRunner::new(session);
    let (_frames_tx, frames_rx) = mpsc::channel(1);
    let (stop_tx, stop_rx) = oneshot::channel();

    let task = tokio::spawn(async move {
        let mut runner = runner;
        let outcome = runner.run(frames_rx, stop_rx).await;
        (runner, outcome)
    });

    tokio::time::sleep(Duration::from_secs(31)).await;
    assert!(stop_tx.send(()).is_err());

    let (runner, outcome) = task.await.unwrap();
    let (result, reason) = outcome.unwrap();
    assert_eq!(reason, StopReason::Timeout);
    assert_eq!(rx.try_recv().unwrap(), result);
    assert!(runner.session().is_finalized());
}

#[tokio::test(start_paused = true)]
async fn dropped_stop_sender_does_not_end_session() {
    let session = ScreeningSession::new(ScreeningConfig::with_duration(10)).unwrap();
    let (mut runner, _progress) = SessionRunner::new(session);
    let (_frames_tx, frames_rx) = mpsc::channel(1);
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    drop(stop_tx);

    let started = tokio::time::Instant::now();
    let (_, reason) = runner.run(frames_rx, stop_rx).await.unwrap();
    assert_eq!(reason, StopReason::Timeout);
    assert!(started.elapsed() >= Duration::from_secs(10));
}

#[tokio::test(start_paused = true)]
async fn runner_refuses_finalized_session() {
    let mut session = ScreeningSession::new(ScreeningConfig::default()).unwrap();
    session.finalize();
    let (mut runner, _progress) = SessionRunner::new(session);
    let (_frames_tx, frames_rx) = mpsc::channel(1);
    let (_stop_tx, stop_rx) = oneshot::channel();

    let err = runner.run(frames_rx, stop_rx).await.unwrap_err();
    assert!(matches!(err, SessionError::AlreadyFinalized));
}
