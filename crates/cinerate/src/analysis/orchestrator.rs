//! Starting analysis jobs and polling them to completion.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::api::Backend;
use crate::broadcast::{AnalysisEvent, AnalysisEventKind, AnalysisProgressBroadcaster};
use crate::busy::{BusyGuard, InFlight};
use crate::error::{ClientError, ClientResult};
use crate::models::AnalysisResult;

use super::job::AnalysisJob;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// How a poll loop ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The backend reported a terminal status.
    Finished(AnalysisJob),
    /// The consumer stopped polling; the backend job keeps running.
    Cancelled(AnalysisJob),
}

impl PollOutcome {
    pub fn job(&self) -> &AnalysisJob {
        match self {
            PollOutcome::Finished(job) | PollOutcome::Cancelled(job) => job,
        }
    }

    pub fn into_job(self) -> AnalysisJob {
        match self {
            PollOutcome::Finished(job) | PollOutcome::Cancelled(job) => job,
        }
    }
}

/// Drives analysis jobs through `Pending -> InProgress -> {Completed, Failed}`.
#[derive(Clone)]
pub struct AnalysisOrchestrator {
    backend: Arc<dyn Backend>,
    poll_interval: Duration,
    events: AnalysisProgressBroadcaster,
    watched: InFlight,
}

impl AnalysisOrchestrator {
    pub fn new(backend: Arc<dyn Backend>, poll_interval: Duration) -> Self {
        Self::with_broadcaster(backend, poll_interval, AnalysisProgressBroadcaster::default())
    }

    pub fn with_broadcaster(
        backend: Arc<dyn Backend>,
        poll_interval: Duration,
        events: AnalysisProgressBroadcaster,
    ) -> Self {
        Self {
            backend,
            poll_interval,
            events,
            watched: InFlight::default(),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn events(&self) -> &AnalysisProgressBroadcaster {
        &self.events
    }

    /// Whether a poll loop is running for `job_id`.
    pub fn is_watching(&self, job_id: &str) -> bool {
        self.watched.contains(job_id)
    }

    /// Starts an analysis of `document_id`, optionally against a criteria document.
    pub async fn start(
        &self,
        document_id: &str,
        criteria_document_id: Option<&str>,
    ) -> ClientResult<AnalysisJob> {
        let document_id = document_id.trim();
        if document_id.is_empty() {
            return Err(ClientError::validation("Document id must not be empty"));
        }
        let criteria_document_id = match criteria_document_id.map(str::trim) {
            Some("") => {
                return Err(ClientError::validation(
                    "Criteria document id must not be empty when given",
                ))
            }
            other => other,
        };

        let response = self
            .backend
            .analyze(document_id, criteria_document_id)
            .await?;
        if response.analysis_id.trim().is_empty() {
            return Err(ClientError::Protocol {
                endpoint: "analysis/analyze",
                reason: "empty analysis id".to_string(),
            });
        }
        debug!(
            "Backend accepted analysis {} with status {}",
            response.analysis_id, response.status
        );

        let job = AnalysisJob::new(
            response.analysis_id,
            document_id,
            criteria_document_id.map(str::to_string),
        );
        info!("Started analysis {} of document {}", job.id(), document_id);
        self.events.send(AnalysisEvent::from_job(
            &job,
            AnalysisEventKind::Started,
            "Analysis started",
        ));
        Ok(job)
    }

    /// Fetches and applies one status response. A terminal job is left as is
    /// without a request.
    pub async fn poll_once(&self, job: &mut AnalysisJob) -> ClientResult<()> {
        if job.is_terminal() {
            debug!("Analysis {} is {}, not polling", job.id(), job.status());
            return Ok(());
        }
        poll_step(self.backend.as_ref(), &self.events, job).await
    }

    /// Fetches the finalized result of a completed job.
    pub async fn fetch_result(&self, analysis_id: &str) -> ClientResult<AnalysisResult> {
        let analysis_id = analysis_id.trim();
        if analysis_id.is_empty() {
            return Err(ClientError::validation("Analysis id must not be empty"));
        }
        let result = self.backend.analysis_result(analysis_id).await?;
        if result.analysis_id != analysis_id {
            return Err(ClientError::Protocol {
                endpoint: "analysis/result",
                reason: format!(
                    "requested '{}', received '{}'",
                    analysis_id, result.analysis_id
                ),
            });
        }
        Ok(result)
    }

    /// Spawns the poll loop for `job`.
    ///
    /// At most one loop runs per job id; a second watch fails with
    /// [`ClientError::Busy`] until the first loop has ended.
    pub fn watch(&self, job: AnalysisJob) -> ClientResult<PollHandle> {
        let guard = self.watched.acquire(job.id())?;
        let (snapshot_tx, snapshot_rx) = watch::channel(job.clone());
        let token = CancellationToken::new();
        let job_id = job.id().to_string();

        let poll_loop = PollLoop {
            backend: Arc::clone(&self.backend),
            events: self.events.clone(),
            interval: self.poll_interval,
            token: token.clone(),
            snapshot_tx,
            _guard: guard,
        };
        let span = tracing::info_span!("analysis_poll", job_id = %job_id);
        let task = tokio::spawn(poll_loop.run(job).instrument(span));

        Ok(PollHandle {
            job_id,
            snapshot_rx,
            token,
            task,
        })
    }
}

/// Handle to a running poll loop.
///
/// Dropping the handle cancels the loop the same way [`PollHandle::cancel`]
/// does, which also frees the job id for another watch.
pub struct PollHandle {
    job_id: String,
    snapshot_rx: watch::Receiver<AnalysisJob>,
    token: CancellationToken,
    task: JoinHandle<ClientResult<PollOutcome>>,
}

impl PollHandle {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Latest applied state of the job.
    pub fn current(&self) -> AnalysisJob {
        self.snapshot_rx.borrow().clone()
    }

    /// A receiver notified on every applied update.
    pub fn subscribe(&self) -> watch::Receiver<AnalysisJob> {
        self.snapshot_rx.clone()
    }

    /// Stops local polling before the next tick. A request already sent
    /// completes and its response is applied.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the loop to end.
    pub async fn wait(mut self) -> ClientResult<PollOutcome> {
        match (&mut self.task).await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => Ok(PollOutcome::Cancelled(self.snapshot_rx.borrow().clone())),
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

struct PollLoop {
    backend: Arc<dyn Backend>,
    events: AnalysisProgressBroadcaster,
    interval: Duration,
    token: CancellationToken,
    snapshot_tx: watch::Sender<AnalysisJob>,
    _guard: BusyGuard,
}

impl PollLoop {
    async fn run(self, mut job: AnalysisJob) -> ClientResult<PollOutcome> {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await; // skip immediate first tick

        loop {
            if job.is_terminal() {
                info!("Analysis {} finished with status {}", job.id(), job.status());
                return Ok(PollOutcome::Finished(job));
            }

            tokio::select! {
                biased;
                _ = self.token.cancelled() => {
                    info!("Polling of analysis {} cancelled", job.id());
                    self.events.send(AnalysisEvent::from_job(
                        &job,
                        AnalysisEventKind::Cancelled,
                        "Polling cancelled",
                    ));
                    return Ok(PollOutcome::Cancelled(job));
                }
                _ = ticker.tick() => {}
            }

            poll_step(self.backend.as_ref(), &self.events, &mut job).await?;
            self.snapshot_tx.send_replace(job.clone());
        }
    }
}

async fn poll_step(
    backend: &dyn Backend,
    events: &AnalysisProgressBroadcaster,
    job: &mut AnalysisJob,
) -> ClientResult<()> {
    match backend.analysis_status(job.id()).await {
        Ok(response) => {
            job.apply(response);
            debug!(
                "Analysis {}: {} at {}% with {} scenes",
                job.id(),
                job.status(),
                job.progress(),
                job.scene_count()
            );
            events.send(AnalysisEvent::update(job));
            Ok(())
        }
        Err(e) => {
            warn!("Polling analysis {} failed: {}", job.id(), e);
            events.send(AnalysisEvent::poll_failed(job, &e.to_string()));
            Err(e)
        }
    }
}
