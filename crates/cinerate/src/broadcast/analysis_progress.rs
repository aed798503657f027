//! Analysis progress broadcaster for streaming job updates.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::analysis::AnalysisJob;
use crate::models::AnalysisStatus;

/// What happened to a job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisEventKind {
    Started,
    Progress,
    Completed,
    Failed,
    /// Local polling stopped by the consumer. The backend job is unaffected.
    Cancelled,
    /// A poll request failed and the loop stopped.
    PollFailed,
}

impl std::fmt::Display for AnalysisEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisEventKind::Started => write!(f, "Started"),
            AnalysisEventKind::Progress => write!(f, "Progress"),
            AnalysisEventKind::Completed => write!(f, "Completed"),
            AnalysisEventKind::Failed => write!(f, "Failed"),
            AnalysisEventKind::Cancelled => write!(f, "Cancelled"),
            AnalysisEventKind::PollFailed => write!(f, "Poll failed"),
        }
    }
}

/// Progress event for an analysis job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisEvent {
    pub job_id: String,
    pub kind: AnalysisEventKind,
    pub status: AnalysisStatus,
    /// Exposed progress, 0..=100.
    pub progress: u8,
    pub scene_count: usize,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisEvent {
    /// Creates an event describing the current state of `job`.
    pub fn from_job(job: &AnalysisJob, kind: AnalysisEventKind, message: &str) -> Self {
        Self {
            job_id: job.id().to_string(),
            kind,
            status: job.status(),
            progress: job.progress(),
            scene_count: job.scene_count(),
            message: message.to_string(),
            timestamp: Utc::now(),
            error: job.error().map(|e| e.to_string()),
        }
    }

    /// Creates the event for an applied status update.
    pub fn update(job: &AnalysisJob) -> Self {
        let (kind, message) = match job.status() {
            AnalysisStatus::Completed => (AnalysisEventKind::Completed, "Analysis completed"),
            AnalysisStatus::Failed => (AnalysisEventKind::Failed, "Analysis failed"),
            _ => (AnalysisEventKind::Progress, "Analysis in progress"),
        };
        Self::from_job(job, kind, message)
    }

    /// Creates a poll failure event.
    pub fn poll_failed(job: &AnalysisJob, error: &str) -> Self {
        let mut event = Self::from_job(job, AnalysisEventKind::PollFailed, "Polling stopped");
        event.error = Some(error.to_string());
        event
    }
}

/// Broadcasts analysis events to any number of subscribers.
#[derive(Clone)]
pub struct AnalysisProgressBroadcaster {
    sender: Arc<broadcast::Sender<AnalysisEvent>>,
}

impl AnalysisProgressBroadcaster {
    /// Creates a broadcaster with the specified channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Sends an event to all subscribers.
    pub fn send(&self, event: AnalysisEvent) {
        // No active receivers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AnalysisEvent> {
        self.sender.subscribe()
    }
}

impl Default for AnalysisProgressBroadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}
