//! Analysis jobs: start, poll to completion, fetch and validate results.

pub mod job;
pub mod orchestrator;
pub mod validation;

pub use job::{AnalysisJob, ApplyOutcome};
pub use orchestrator::{AnalysisOrchestrator, PollHandle, PollOutcome, DEFAULT_POLL_INTERVAL};
pub use validation::{SceneValidationPass, ValidationSummary};
