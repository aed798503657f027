//! Broadcasting of analysis progress for real-time consumers.

pub mod analysis_progress;

pub use analysis_progress::{AnalysisEvent, AnalysisEventKind, AnalysisProgressBroadcaster};
