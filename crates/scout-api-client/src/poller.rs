//! Job status polling.
//!
//! Each call to [`JobStatusPoller::track`] starts one session: a spawned task
//! that fetches the job immediately and then once per interval until the job
//! reaches a terminal status or the session is cancelled.
//!
//! Session state machine: `Idle → Active → {TerminatedDone | TerminatedCancelled}`.
//! Both terminated states are absorbing.
//!
//! Fetches within a session never overlap. Ticks that fire while a fetch is
//! still running are skipped, so listeners always see snapshots in fetch order.
//! A failed fetch is reported through `on_error` and polling continues.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::Arc;
use std::time::Duration;

use scout_core::{Job, ScoutError, ScoutResult};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::{ApiClient, JobsApi};

/// Lifecycle of a poll session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Active,
    TerminatedDone,
    TerminatedCancelled,
}

impl PollState {
    pub fn is_terminated(&self) -> bool {
        matches!(
            self,
            PollState::TerminatedDone | PollState::TerminatedCancelled
        )
    }
}

impl Display for PollState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            PollState::Idle => write!(f, "idle"),
            PollState::Active => write!(f, "active"),
            PollState::TerminatedDone => write!(f, "done"),
            PollState::TerminatedCancelled => write!(f, "cancelled"),
        }
    }
}

/// Point-in-time view of a poll session.
#[derive(Debug, Clone)]
pub struct PollSession {
    pub job_id: String,
    pub interval: Duration,
    pub state: PollState,
    pub last_snapshot: Option<Job>,
    /// Error from the most recent fetch; cleared by the next successful one.
    pub last_error: Option<String>,
    pub fetch_count: u64,
}

/// Receives the results of a poll session.
///
/// Callbacks run on the session's task, one at a time and in fetch order.
/// None is invoked after the session is cancelled.
pub trait JobStatusListener: Send + Sync + 'static {
    /// Every successfully fetched snapshot, including the terminal one.
    fn on_update(&self, job: &Job);

    /// Exactly once, after `on_update`, when the job reaches a terminal status.
    fn on_terminal(&self, job: &Job);

    /// A fetch failed; polling continues.
    fn on_error(&self, error: &ScoutError) {
        tracing::warn!(error = %error, "Job status fetch failed");
    }
}

impl<T: JobStatusListener + ?Sized> JobStatusListener for Arc<T> {
    fn on_update(&self, job: &Job) {
        (**self).on_update(job)
    }

    fn on_terminal(&self, job: &Job) {
        (**self).on_terminal(job)
    }

    fn on_error(&self, error: &ScoutError) {
        (**self).on_error(error)
    }
}

/// Poll results as messages, for callers that prefer a channel to callbacks.
#[derive(Debug, Clone)]
pub enum PollEvent {
    Update(Job),
    Terminal(Job),
    Error(String),
}

/// Listener that forwards every callback into an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelListener {
    tx: mpsc::UnboundedSender<PollEvent>,
}

impl ChannelListener {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PollEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl JobStatusListener for ChannelListener {
    fn on_update(&self, job: &Job) {
        let _ = self.tx.send(PollEvent::Update(job.clone()));
    }

    fn on_terminal(&self, job: &Job) {
        let _ = self.tx.send(PollEvent::Terminal(job.clone()));
    }

    fn on_error(&self, error: &ScoutError) {
        let _ = self.tx.send(PollEvent::Error(error.to_string()));
    }
}

/// Starts poll sessions against a job API.
#[derive(Clone)]
pub struct JobStatusPoller {
    api: Arc<dyn JobsApi>,
}

impl JobStatusPoller {
    pub fn new(api: impl JobsApi + 'static) -> Self {
        Self { api: Arc::new(api) }
    }

    pub fn from_client(client: Arc<ApiClient>) -> Self {
        Self::new(client)
    }

    /// Start tracking `job_id`, fetching every `interval`.
    ///
    /// Must be called from within a tokio runtime. The session lives as long
    /// as the returned handle: dropping the handle cancels it.
    pub fn track<L: JobStatusListener>(
        &self,
        job_id: impl Into<String>,
        interval: Duration,
        listener: L,
    ) -> ScoutResult<PollHandle> {
        let job_id = job_id.into();
        if job_id.trim().is_empty() {
            return Err(ScoutError::Validation("Job id must not be empty".into()));
        }
        if interval.is_zero() {
            return Err(ScoutError::Validation(
                "Poll interval must be greater than 0".into(),
            ));
        }

        let (session_tx, session_rx) = watch::channel(PollSession {
            job_id: job_id.clone(),
            interval,
            state: PollState::Idle,
            last_snapshot: None,
            last_error: None,
            fetch_count: 0,
        });
        let token = CancellationToken::new();

        let task = tokio::spawn(run_session(
            self.api.clone(),
            job_id.clone(),
            interval,
            listener,
            token.clone(),
            session_tx,
        ));

        Ok(PollHandle {
            job_id,
            token,
            session: session_rx,
            task,
        })
    }

    /// Track a job and receive results as [`PollEvent`]s.
    pub fn track_events(
        &self,
        job_id: impl Into<String>,
        interval: Duration,
    ) -> ScoutResult<(PollHandle, mpsc::UnboundedReceiver<PollEvent>)> {
        let (listener, rx) = ChannelListener::channel();
        let handle = self.track(job_id, interval, listener)?;
        Ok((handle, rx))
    }
}

/// Owner's handle on a poll session. Dropping it cancels the session.
#[derive(Debug)]
pub struct PollHandle {
    job_id: String,
    token: CancellationToken,
    session: watch::Receiver<PollSession>,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Stop the session. Takes effect immediately: no further fetches are
    /// scheduled and a fetch already in flight is discarded.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Current state. A session whose task ended without publishing a
    /// terminated state (a listener panicked) reads as cancelled.
    pub fn state(&self) -> PollState {
        let state = self.session.borrow().state;
        if !state.is_terminated() && self.task.is_finished() {
            return PollState::TerminatedCancelled;
        }
        state
    }

    pub fn snapshot(&self) -> PollSession {
        self.session.borrow().clone()
    }

    pub fn is_finished(&self) -> bool {
        self.state().is_terminated()
    }

    /// Wait until the session reaches a terminated state and return it.
    pub async fn wait(&self) -> PollState {
        let mut rx = self.session.clone();
        let result = rx
            .wait_for(|session| session.state.is_terminated())
            .await
            .map(|session| session.state);

        match result {
            Ok(state) => state,
            Err(_) => {
                // The session task is gone without reaching a terminated state.
                let state = rx.borrow().state;
                if state.is_terminated() {
                    state
                } else {
                    tracing::warn!(job_id = %self.job_id, "Poll session ended abnormally");
                    PollState::TerminatedCancelled
                }
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        if !self.task.is_finished() {
            tracing::debug!(job_id = %self.job_id, "Poll handle dropped, cancelling session");
        }
        self.token.cancel();
    }
}

async fn run_session<L: JobStatusListener>(
    api: Arc<dyn JobsApi>,
    job_id: String,
    interval: Duration,
    listener: L,
    token: CancellationToken,
    session: watch::Sender<PollSession>,
) {
    // The first tick completes immediately.
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    session.send_modify(|s| s.state = PollState::Active);
    tracing::debug!(
        job_id = %job_id,
        interval_ms = interval.as_millis() as u64,
        "Poll session started"
    );

    let final_state = loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break PollState::TerminatedCancelled,
            _ = ticker.tick() => {}
        }

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => break PollState::TerminatedCancelled,
            result = api.get_job(&job_id) => result,
        };

        if token.is_cancelled() {
            break PollState::TerminatedCancelled;
        }

        match result {
            Ok(job) => {
                session.send_modify(|s| {
                    s.fetch_count += 1;
                    s.last_snapshot = Some(job.clone());
                    s.last_error = None;
                });
                tracing::debug!(job_id = %job_id, status = %job.status, "Job status fetched");
                listener.on_update(&job);

                if job.is_terminal() {
                    if token.is_cancelled() {
                        break PollState::TerminatedCancelled;
                    }
                    tracing::info!(job_id = %job_id, status = %job.status, "Job reached terminal status");
                    listener.on_terminal(&job);
                    break PollState::TerminatedDone;
                }
            }
            Err(err) => {
                session.send_modify(|s| {
                    s.fetch_count += 1;
                    s.last_error = Some(err.to_string());
                });
                listener.on_error(&err);
            }
        }
    };

    session.send_modify(|s| s.state = final_state);
    tracing::debug!(job_id = %job_id, state = %final_state, "Poll session ended");
}
