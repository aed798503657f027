//! Analysis jobs, scene assessments and rating results.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an analysis job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl AnalysisStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AnalysisStatus::Completed | AnalysisStatus::Failed)
    }

    /// Position in the state machine, used to refuse backward transitions.
    fn rank(&self) -> u8 {
        match self {
            AnalysisStatus::Pending => 0,
            AnalysisStatus::InProgress => 1,
            AnalysisStatus::Completed | AnalysisStatus::Failed => 2,
        }
    }

    /// Whether moving from `self` to `next` is a forward (or idle) transition.
    pub fn can_advance_to(&self, next: AnalysisStatus) -> bool {
        !self.is_terminal() && next.rank() >= self.rank()
    }
}

impl std::fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisStatus::Pending => write!(f, "pending"),
            AnalysisStatus::InProgress => write!(f, "in_progress"),
            AnalysisStatus::Completed => write!(f, "completed"),
            AnalysisStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Severity of a content category within a scene or a whole script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    None,
    Mild,
    Moderate,
    Severe,
}

/// Age rating classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeRating {
    #[serde(rename = "0+")]
    ZeroPlus,
    #[serde(rename = "6+")]
    SixPlus,
    #[serde(rename = "12+")]
    TwelvePlus,
    #[serde(rename = "16+")]
    SixteenPlus,
    #[serde(rename = "18+")]
    EighteenPlus,
}

impl AgeRating {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgeRating::ZeroPlus => "0+",
            AgeRating::SixPlus => "6+",
            AgeRating::TwelvePlus => "12+",
            AgeRating::SixteenPlus => "16+",
            AgeRating::EighteenPlus => "18+",
        }
    }
}

impl std::fmt::Display for AgeRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

/// A citation of the criteria document backing a scene verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormativeReference {
    pub document_id: String,
    #[serde(default)]
    pub section: Option<String>,
    pub excerpt: String,
    #[serde(default)]
    pub relevance: Option<f64>,
}

/// Per-scene content classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneAssessment {
    pub scene_number: u32,
    #[serde(default)]
    pub heading: String,
    #[serde(default)]
    pub page_range: Option<PageRange>,
    #[serde(default)]
    pub categories: BTreeMap<String, Severity>,
    #[serde(default)]
    pub flagged_content: Vec<String>,
    pub age_rating: AgeRating,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub references: Option<Vec<NormativeReference>>,
}

/// Final verdict for a completed job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingResult {
    pub final_rating: AgeRating,
    #[serde(default)]
    pub target_rating: Option<AgeRating>,
    pub confidence: f64,
    #[serde(default)]
    pub problem_scenes_count: u32,
    #[serde(default)]
    pub categories_summary: BTreeMap<String, Severity>,
}

/// Finalized result of an analysis, fetched once the job completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub analysis_id: String,
    pub document_id: String,
    pub status: AnalysisStatus,
    pub rating_result: RatingResult,
    #[serde(default)]
    pub scene_assessments: Vec<SceneAssessment>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Outcome of the secondary check of one scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneValidation {
    pub scene_number: u32,
    pub consistent: bool,
    #[serde(default)]
    pub suggested_rating: Option<AgeRating>,
    #[serde(default)]
    pub notes: Option<String>,
}
