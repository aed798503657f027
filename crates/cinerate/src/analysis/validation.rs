//! Best-effort secondary check of received scene assessments.

use std::sync::Arc;

use log::{info, warn};

use crate::api::Backend;
use crate::error::{ClientError, ClientResult};
use crate::models::{SceneAssessment, SceneValidation};

use super::job::AnalysisJob;

/// Result of a validation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationSummary {
    pub validations: Vec<SceneValidation>,
    /// Scenes whose check failed and was skipped, with the reason.
    pub skipped: Vec<(u32, String)>,
}

impl ValidationSummary {
    pub fn validated_count(&self) -> usize {
        self.validations.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Scenes the backend considers inconsistent with their rating.
    pub fn inconsistent(&self) -> impl Iterator<Item = &SceneValidation> {
        self.validations.iter().filter(|v| !v.consistent)
    }
}

/// Re-checks scenes one by one. A failing scene is logged and skipped; the
/// pass itself only fails on invalid input.
#[derive(Clone)]
pub struct SceneValidationPass {
    backend: Arc<dyn Backend>,
}

impl SceneValidationPass {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    pub async fn run(
        &self,
        analysis_id: &str,
        scenes: &[SceneAssessment],
    ) -> ClientResult<ValidationSummary> {
        if analysis_id.trim().is_empty() {
            return Err(ClientError::validation("Analysis id must not be empty"));
        }

        let mut summary = ValidationSummary::default();
        for scene in scenes {
            match self.backend.validate_scene(analysis_id, scene).await {
                Ok(validation) => summary.validations.push(validation),
                Err(e) => {
                    warn!(
                        "Skipping validation of scene {} in {}: {}",
                        scene.scene_number, analysis_id, e
                    );
                    summary.skipped.push((scene.scene_number, e.to_string()));
                }
            }
        }

        info!(
            "Validated {} scenes of {} ({} skipped)",
            summary.validated_count(),
            analysis_id,
            summary.skipped_count()
        );
        Ok(summary)
    }

    /// Validates every scene received so far for `job`.
    pub async fn run_for_job(&self, job: &AnalysisJob) -> ClientResult<ValidationSummary> {
        let scenes: Vec<SceneAssessment> = job.scenes().cloned().collect();
        self.run(job.id(), &scenes).await
    }
}
