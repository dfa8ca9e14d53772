//! Jakauma - approximate analytics over distributed-tracing populations.
//!
//! Jakauma answers questions like "what are the top error root causes in
//! this time window" without transferring or holding every matching trace
//! in memory. It estimates how large the matching population is, fetches it
//! through a paginated, windowed upstream API with bounded fan-out,
//! adaptively thins the in-memory population against a budget, and reduces
//! the final (possibly sampled) population into per-dimension frequency
//! counts and percentages.
//!
//! # Architecture
//!
//! Jakauma is built with a modular architecture:
//! - `client`: upstream collaborator interfaces (trace query, statistics)
//! - `analytics`: the sampling and aggregation pipeline
//! - `core`: domain models, configuration, and errors
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use jakauma_lib::analytics::{AnalyticsEngine, AnalyticsRequest};
//! use jakauma_lib::client::{StatisticsClient, TraceQueryClient};
//! use jakauma_lib::core::EngineConfig;
//!
//! # async fn run(
//! #     trace_client: Arc<dyn TraceQueryClient>,
//! #     stats_client: Arc<dyn StatisticsClient>,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let engine = AnalyticsEngine::new(trace_client, stats_client, EngineConfig::default());
//! let request: AnalyticsRequest = serde_json::from_str(
//!     r#"{
//!         "timeRange": { "from": "2020-09-16T00:00:00Z", "to": "2020-09-16T01:00:00Z" },
//!         "filterExpression": "responsetime > 5",
//!         "dimension": "getAnalyticsUrl"
//!     }"#,
//! )?;
//! let result = engine.run_analytics(request).await?;
//! for entry in &result.entries {
//!     println!("{}: {} ({:.2}%)", entry.key, entry.count, entry.percentage);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analytics;
pub mod client;
pub mod core;

// Re-export core types for convenience
pub use crate::core::{EngineConfig, JakaumaError, Result};
