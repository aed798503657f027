//! Boundary to the analysis backend.

pub mod backend;
pub mod http;
pub mod types;

pub use backend::Backend;
pub use http::HttpBackend;
pub use types::{
    AnalyzeResponse, DocumentStatusResponse, StatusResponse, UploadRequest, UploadResponse,
    UploadStatus,
};
