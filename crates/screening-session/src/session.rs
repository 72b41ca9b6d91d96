//! Screening session: host entry points and one-shot result delivery

use std::fmt;

use face_signals::LandmarkFrame;
use metrics::{counter, histogram};
use risk_scoring::RiskScorer;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::aggregator::{FrameOutcome, LiveSnapshot, SessionAggregator, SessionSummary};
use crate::config::ScreeningConfig;
use crate::host::HostBridge;
use crate::result::SessionResult;
use crate::SessionError;

type ResultHandler = Box<dyn FnOnce(SessionResult) + Send + 'static>;

/// Where the finished result goes
enum Delivery {
    Channel(oneshot::Sender<SessionResult>),
    Handler(ResultHandler),
}

impl fmt::Debug for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delivery::Channel(_) => f.write_str("Channel"),
            Delivery::Handler(_) => f.write_str("Handler"),
        }
    }
}

/// One fixed-duration screening session
#[derive(Debug)]
pub struct ScreeningSession {
    id: Uuid,
    config: ScreeningConfig,
    aggregator: SessionAggregator,
    scorer: RiskScorer,
    delivery: Option<Delivery>,
    host: Option<HostBridge>,
    result: Option<SessionResult>,
    summary: Option<SessionSummary>,
}

impl ScreeningSession {
    /// Session whose result is only returned from [`finalize`](Self::finalize)
    pub fn new(config: ScreeningConfig) -> Result<Self, SessionError> {
        config.validate()?;
        let scorer = RiskScorer::new(config.scoring.clone())?;
        let session = Self {
            id: Uuid::new_v4(),
            aggregator: SessionAggregator::new(config.signals.clone()),
            scorer,
            config,
            delivery: None,
            host: None,
            result: None,
            summary: None,
        };
        session.log_start();
        Ok(session)
    }

    /// Session delivering its result on a one-shot channel
    pub fn with_channel(
        config: ScreeningConfig,
    ) -> Result<(Self, oneshot::Receiver<SessionResult>), SessionError> {
        let (tx, rx) = oneshot::channel();
        let mut session = Self::new(config)?;
        session.delivery = Some(Delivery::Channel(tx));
        Ok((session, rx))
    }

    /// Session delivering its result to a completion handler
    pub fn with_handler<F>(config: ScreeningConfig, handler: F) -> Result<Self, SessionError>
    where
        F: FnOnce(SessionResult) + Send + 'static,
    {
        let mut session = Self::new(config)?;
        session.delivery = Some(Delivery::Handler(Box::new(handler)));
        Ok(session)
    }

    /// Also push the encoded result to a host bridge
    pub fn with_host(mut self, bridge: HostBridge) -> Self {
        self.host = Some(bridge);
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &ScreeningConfig {
        &self.config
    }

    pub fn is_finalized(&self) -> bool {
        self.result.is_some()
    }

    /// Result of the current session, once finalized
    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    /// Aggregated signals the result was scored from
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    pub fn live(&self) -> LiveSnapshot {
        self.aggregator.live()
    }

    /// Process one detector frame; ignored once the session is finalized
    pub fn on_frame(&mut self, frame: &LandmarkFrame) -> FrameOutcome {
        if self.is_finalized() {
            return FrameOutcome::Ignored;
        }
        let outcome = self.aggregator.on_frame(frame);
        if let FrameOutcome::Processed { blink: true } = outcome {
            debug!(
                "Blink {} at {} ms",
                self.aggregator.live().blink_count,
                frame.timestamp_ms
            );
        }
        outcome
    }

    /// Score the session and deliver the result.
    ///
    /// Only the first call does anything; later calls return `None`.
    pub fn finalize(&mut self) -> Option<SessionResult> {
        if self.is_finalized() {
            debug!("Session {} already finalized", self.id);
            return None;
        }

        let summary = self
            .aggregator
            .summarize(self.config.session_duration_secs as f64);
        let assessment = self.scorer.score(
            summary.blink_rate,
            summary.motion_score,
            summary.asymmetry,
        );
        let result = SessionResult::new(&assessment, summary.vitals);
        self.summary = Some(summary);
        self.result = Some(result);

        info!(
            "Session {} finalized: risk {}% ({}), {} blinks over {} frames ({} skipped)",
            self.id,
            result.risk_percentage,
            result.level.as_str(),
            summary.blink_count,
            summary.frames_processed,
            summary.frames_skipped
        );
        counter!("screening_sessions_finalized_total").increment(1);
        histogram!("screening_risk_percentage").record(result.risk_percentage as f64);

        self.deliver(result);
        Some(result)
    }

    /// Start a new session on this object with a fresh delivery channel.
    ///
    /// Every accumulator is discarded; any earlier delivery target is dropped.
    pub fn restart(&mut self) -> oneshot::Receiver<SessionResult> {
        let (tx, rx) = oneshot::channel();
        self.aggregator.reset();
        self.id = Uuid::new_v4();
        self.result = None;
        self.summary = None;
        self.delivery = Some(Delivery::Channel(tx));
        self.log_start();
        rx
    }

    fn deliver(&mut self, result: SessionResult) {
        match self.delivery.take() {
            Some(Delivery::Channel(tx)) => {
                if tx.send(result).is_err() {
                    warn!("Result receiver for session {} dropped", self.id);
                }
            }
            Some(Delivery::Handler(handler)) => handler(result),
            None => {}
        }

        if let Some(host) = self.host.as_mut() {
            if let Err(e) = host.push(self.id, &result) {
                warn!("Failed to push result to host: {}", e);
            }
        }
    }

    fn log_start(&self) {
        info!(
            "Screening session {} started ({} s)",
            self.id, self.config.session_duration_secs
        );
    }
}
