//! Client-side state of one analysis job.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::Serialize;

use crate::api::StatusResponse;
use crate::models::{AnalysisStatus, RatingResult, SceneAssessment};

/// An analysis run as seen through its status responses.
///
/// Scenes are keyed by scene number and never removed; a later response for
/// the same number replaces the earlier assessment. Exposed progress never
/// decreases. Once the job reaches a terminal status it is frozen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisJob {
    id: String,
    document_id: String,
    criteria_document_id: Option<String>,
    status: AnalysisStatus,
    progress: u8,
    scenes: BTreeMap<u32, SceneAssessment>,
    rating_result: Option<RatingResult>,
    recommendations: Option<Vec<String>>,
    error: Option<String>,
    progress_regressions: u32,
    updated_at: DateTime<Utc>,
}

/// How a status response was treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// The job was already terminal; nothing changed.
    Frozen,
}

impl AnalysisJob {
    pub fn new(
        id: impl Into<String>,
        document_id: impl Into<String>,
        criteria_document_id: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            document_id: document_id.into(),
            criteria_document_id,
            status: AnalysisStatus::Pending,
            progress: 0,
            scenes: BTreeMap::new(),
            rating_result: None,
            recommendations: None,
            error: None,
            progress_regressions: 0,
            updated_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn criteria_document_id(&self) -> Option<&str> {
        self.criteria_document_id.as_deref()
    }

    pub fn status(&self) -> AnalysisStatus {
        self.status
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Progress in percent, never lower than any value exposed before.
    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Scene assessments in scene-number order.
    pub fn scenes(&self) -> impl Iterator<Item = &SceneAssessment> {
        self.scenes.values()
    }

    pub fn scene(&self, scene_number: u32) -> Option<&SceneAssessment> {
        self.scenes.get(&scene_number)
    }

    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    pub fn rating_result(&self) -> Option<&RatingResult> {
        self.rating_result.as_ref()
    }

    pub fn recommendations(&self) -> Option<&[String]> {
        self.recommendations.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Number of responses whose progress was lower than the exposed value.
    pub fn progress_regressions(&self) -> u32 {
        self.progress_regressions
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Applies one status response in arrival order.
    pub fn apply(&mut self, response: StatusResponse) -> ApplyOutcome {
        if self.is_terminal() {
            debug!(
                "Ignoring status for job {} already {}",
                self.id, self.status
            );
            return ApplyOutcome::Frozen;
        }

        if self.status.can_advance_to(response.status) {
            self.status = response.status;
        } else {
            warn!(
                "Job {}: backend reported {} after {}, keeping {}",
                self.id, response.status, self.status, self.status
            );
        }

        let reported = clamp_progress(response.progress);
        if reported < self.progress {
            self.progress_regressions += 1;
            warn!(
                "Job {}: progress went back from {} to {}",
                self.id, self.progress, reported
            );
        } else {
            self.progress = reported;
        }

        for scene in response.partial_scenes {
            self.scenes.insert(scene.scene_number, scene);
        }
        if response.rating_result.is_some() {
            self.rating_result = response.rating_result;
        }
        if response.recommendations.is_some() {
            self.recommendations = response.recommendations;
        }
        if response.error.is_some() {
            self.error = response.error;
        }

        self.updated_at = Utc::now();
        ApplyOutcome::Applied
    }
}

fn clamp_progress(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}
