//! Session state and the two gateway round-trips that drive it.

use crate::draw::surface::{DrawingSurface, Snapshot};
use crate::gateway::{AiGateway, DrawingRequest, JobRequest};
use crate::prompts::{self, Verdict};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

pub const GENERATION_ERROR_MESSAGE: &str =
    "Oh no! The job machine got jammed. Press START to try again.";
pub const ANALYSIS_ERROR_MESSAGE: &str =
    "Oops! I couldn't look at your drawing right now. Please try again.";
pub const DRAW_FIRST_MESSAGE: &str = "Please draw something first!";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub title: String,
    pub description: String,
}

/// Which operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorOrigin {
    Generation,
    Analysis,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionError {
    pub origin: ErrorOrigin,
    pub message: &'static str,
}

/// Guidance that is not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    DrawSomethingFirst,
}

impl Notice {
    pub fn message(self) -> &'static str {
        match self {
            Notice::DrawSomethingFirst => DRAW_FIRST_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub job: Option<Job>,
    pub loading: bool,
    pub analyzing: bool,
    pub error: Option<SessionError>,
    pub compliment: Option<String>,
    pub notice: Option<Notice>,
}

impl SessionState {
    pub fn is_busy(&self) -> bool {
        self.loading || self.analyzing
    }

    fn error_from(&self, origin: ErrorOrigin) -> Option<&'static str> {
        self.error
            .as_ref()
            .filter(|e| e.origin == origin)
            .map(|e| e.message)
    }

    /// Error shown in the status panel.
    pub fn generation_error(&self) -> Option<&'static str> {
        self.error_from(ErrorOrigin::Generation)
    }

    /// Error shown under the canvas.
    pub fn analysis_error(&self) -> Option<&'static str> {
        self.error_from(ErrorOrigin::Analysis)
    }

    pub fn verdict(&self) -> Option<Verdict> {
        self.compliment.as_deref().map(prompts::classify_remark)
    }
}

enum Reply {
    Job(anyhow::Result<Job>),
    Remark(anyhow::Result<String>),
}

/// Owns the session state. Gateway calls run on worker threads and their
/// replies are applied by [`Orchestrator::poll`] on the owning thread.
pub struct Orchestrator {
    state: SessionState,
    gateway: Arc<dyn AiGateway>,
    reply_tx: Sender<Reply>,
    reply_rx: Receiver<Reply>,
}

impl Orchestrator {
    pub fn new(gateway: Arc<dyn AiGateway>) -> Self {
        let (reply_tx, reply_rx) = channel();
        Self {
            state: SessionState::default(),
            gateway,
            reply_tx,
            reply_rx,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Starts a new round. Returns `false` if dropped by the busy guard.
    pub fn generate_job(&mut self, surface: &mut DrawingSurface) -> bool {
        if self.state.is_busy() {
            tracing::debug!("generate-job ignored while a request is pending");
            return false;
        }

        self.state.error = None;
        self.state.job = None;
        self.state.compliment = None;
        self.state.notice = None;
        surface.clear();
        self.state.loading = true;

        let request = JobRequest {
            instruction: prompts::JOB_INSTRUCTION.to_string(),
            schema: prompts::job_schema(),
        };
        let gateway = Arc::clone(&self.gateway);
        let tx = self.reply_tx.clone();
        std::thread::spawn(move || {
            let result = gateway.generate_job(&request);
            let _ = tx.send(Reply::Job(result));
        });
        tracing::info!("job generation requested");
        true
    }

    /// Sends the drawing off for judging. Returns `false` if dropped by the
    /// guard (no job yet, or a request is pending).
    pub fn check_drawing(&mut self, surface: &DrawingSurface) -> bool {
        let Some(job) = self.state.job.clone() else {
            return false;
        };
        if self.state.is_busy() {
            tracing::debug!("check-drawing ignored while a request is pending");
            return false;
        }

        self.state.error = None;
        self.state.compliment = None;
        self.state.notice = None;
        self.state.analyzing = true;

        let image = match surface.export_snapshot() {
            Ok(Snapshot::Image(image)) if image.inked => image,
            Ok(_) => {
                self.state.notice = Some(Notice::DrawSomethingFirst);
                self.state.analyzing = false;
                return true;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to export drawing snapshot");
                self.fail(ErrorOrigin::Analysis);
                self.state.analyzing = false;
                return true;
            }
        };

        let request = DrawingRequest {
            instruction: prompts::drawing_instruction(&job),
            png: image.png,
        };
        let gateway = Arc::clone(&self.gateway);
        let tx = self.reply_tx.clone();
        std::thread::spawn(move || {
            let result = gateway.describe_drawing(&request);
            let _ = tx.send(Reply::Remark(result));
        });
        tracing::info!(job = %job.title, "drawing analysis requested");
        true
    }

    /// Applies every reply that has arrived. Returns `true` if state changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.reply_rx.try_recv() {
                Ok(reply) => {
                    self.apply(reply);
                    changed = true;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        changed
    }

    /// Blocks until one reply arrives (or `timeout` passes) and applies it.
    pub fn wait_for_reply(&mut self, timeout: Duration) -> bool {
        match self.reply_rx.recv_timeout(timeout) {
            Ok(reply) => {
                self.apply(reply);
                true
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    fn apply(&mut self, reply: Reply) {
        match reply {
            Reply::Job(result) => {
                match result {
                    Ok(job) => {
                        tracing::info!(title = %job.title, "job generated");
                        self.state.job = Some(job);
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "job generation failed");
                        self.state.job = None;
                        self.fail(ErrorOrigin::Generation);
                    }
                }
                self.state.loading = false;
            }
            Reply::Remark(result) => {
                match result {
                    Ok(remark) => {
                        tracing::info!(%remark, "drawing judged");
                        self.state.compliment = Some(remark);
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "drawing analysis failed");
                        self.fail(ErrorOrigin::Analysis);
                    }
                }
                self.state.analyzing = false;
            }
        }
    }

    fn fail(&mut self, origin: ErrorOrigin) {
        let message = match origin {
            ErrorOrigin::Generation => GENERATION_ERROR_MESSAGE,
            ErrorOrigin::Analysis => ANALYSIS_ERROR_MESSAGE,
        };
        self.state.compliment = None;
        self.state.error = Some(SessionError { origin, message });
    }
}
