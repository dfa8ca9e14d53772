//! Core domain models and configuration for Jakauma.
//!
//! This module contains the fundamental types shared by the analytics
//! pipeline and the upstream collaborator interfaces.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::EngineConfig;
pub use error::{JakaumaError, Result};
pub use types::{
    HttpInfo, RootCause, RootCauseEntity, RootCauseException, RootCauseService, TimeRange, TraceId,
    TraceSummary,
};
