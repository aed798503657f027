//! Typed domain values decoded from backend responses.

pub mod analysis;
pub mod document;
pub mod health;
pub mod provider;

pub use analysis::{
    AgeRating, AnalysisResult, AnalysisStatus, NormativeReference, PageRange, RatingResult,
    SceneAssessment, SceneValidation, Severity,
};
pub use document::{Document, DocumentType, ProcessingStatus, StageStatus};
pub use health::{
    CheckOutcome, CheckStatus, CheckTarget, ErrorLogEntry, HealthReport, HealthService,
    OverallHealth, ServiceCheck,
};
pub use provider::{
    ConfigUpdate, Credential, LocalModel, ModelConfig, ModelOperation, ProviderConfiguration,
    ProviderId, ProviderSettings, ProviderStatus, RemoteModel, RemoteStatus,
};
