//! Shared test utilities for cinerate integration tests.
//!
//! This module provides:
//! - `ScriptedBackend`, an in-memory backend that records every call
//! - Builders for backend payloads

pub mod backend;
pub mod builders;

pub use backend::ScriptedBackend;
pub use builders::*;
