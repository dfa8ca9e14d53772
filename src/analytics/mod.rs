//! Trace analytics sampling and aggregation pipeline.
//!
//! The engine runs four stages for one request: estimate the matching
//! population (precise mode only), fetch it through windowed paginated
//! rounds with bounded fan-out, thin the in-memory population whenever it
//! grows past the budget (adaptive mode only), and reduce the final
//! population into per-dimension counts.
//!
//! Either the whole pipeline completes and returns a complete
//! [`AggregationResult`], or it fails entirely; no partial result is
//! ever returned.

pub mod aggregate;
pub mod estimator;
pub mod fetcher;
pub mod sampler;
pub mod window;

pub use aggregate::{aggregate, AggregationEntry, AggregationResult, AnalyticsDimension};
pub use window::{FetchWindow, PageToken};

use crate::client::{StatisticsClient, TraceQueryClient};
use crate::core::{EngineConfig, JakaumaError, Result, TimeRange, TraceSummary};
use estimator::estimate_population;
use fetcher::run_round;
use sampler::AdaptiveSampler;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// Default in-memory population budget
const DEFAULT_BUDGET: usize = 10_000;

fn default_budget() -> usize {
    DEFAULT_BUDGET
}

/// One analytics request over a time range.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsRequest {
    /// Time range the population is matched in
    pub time_range: TimeRange,
    /// Filter expression; empty matches all records and enables precise
    /// sampling via the statistics aggregate
    #[serde(default)]
    pub filter_expression: String,
    /// Optional group the statistics aggregate is scoped to
    #[serde(default)]
    pub group: Option<String>,
    /// Maximum number of records held in memory
    #[serde(default = "default_budget")]
    pub budget: usize,
    /// Classification dimension of the result
    pub dimension: AnalyticsDimension,
}

impl AnalyticsRequest {
    /// Parses a request from its JSON payload.
    ///
    /// Rejected payloads surface as
    /// [`JakaumaError::MalformedRequest`] before any collaborator is
    /// contacted.
    pub fn from_json(raw: &[u8]) -> Result<Self> {
        let request: AnalyticsRequest =
            serde_json::from_slice(raw).map_err(|err| JakaumaError::malformed(err.to_string()))?;
        request.validate()?;
        Ok(request)
    }

    fn validate(&self) -> Result<()> {
        if self.time_range.from >= self.time_range.to {
            return Err(JakaumaError::malformed(format!(
                "time range start {} is not before end {}",
                self.time_range.from, self.time_range.to
            )));
        }
        if self.budget == 0 {
            return Err(JakaumaError::malformed("budget must be at least 1"));
        }
        Ok(())
    }
}

/// The analytics engine: a pure in-process pipeline over caller-supplied
/// collaborators. Holds no state between requests.
pub struct AnalyticsEngine {
    trace_client: Arc<dyn TraceQueryClient>,
    stats_client: Arc<dyn StatisticsClient>,
    config: EngineConfig,
}

impl AnalyticsEngine {
    /// Creates an engine over the given collaborators
    pub fn new(
        trace_client: Arc<dyn TraceQueryClient>,
        stats_client: Arc<dyn StatisticsClient>,
        config: EngineConfig,
    ) -> Self {
        Self {
            trace_client,
            stats_client,
            config,
        }
    }

    /// Parses and runs a request from its JSON payload
    pub async fn run_analytics_json(&self, raw: &[u8]) -> Result<AggregationResult> {
        let request = AnalyticsRequest::from_json(raw)?;
        self.run_analytics(request).await
    }

    /// Runs the full pipeline for one request.
    pub async fn run_analytics(&self, request: AnalyticsRequest) -> Result<AggregationResult> {
        debug!(dimension = ?request.dimension, range = %request.time_range, "running analytics");
        let population = self.collect_population(&request).await?;
        debug!(population = population.len(), "aggregating population");
        Ok(aggregate(&population, request.dimension))
    }

    /// Fetches the (possibly sampled) population for a request without
    /// aggregating it.
    ///
    /// When the filter expression is empty the sampling rate is computed
    /// exactly up front from the statistics aggregate and never adjusted;
    /// otherwise the engine starts at rate 1 and reacts to budget
    /// overshoot after each round by thinning in memory and halving the
    /// upstream rate.
    pub async fn collect_population(&self, request: &AnalyticsRequest) -> Result<Vec<TraceSummary>> {
        let mut sampling = 1.0f64;
        let mut adaptive = true;

        if request.filter_expression.is_empty() {
            // The statistics aggregate cannot evaluate filter expressions,
            // so a precise count is only available for match-all requests.
            let count = estimate_population(
                self.stats_client.as_ref(),
                &request.time_range,
                request.group.as_deref(),
            )
            .await?;
            sampling = (request.budget as f64 / count as f64).min(1.0);
            adaptive = false;
            debug!(count, budget = request.budget, sampling, "fixed sampling rate from estimate");
        }

        let mut windows: Vec<FetchWindow> = window::split(&request.time_range, self.config.fan_out)
            .into_iter()
            .map(|sub| FetchWindow::new(sub, sampling))
            .collect();

        let mut population: Vec<TraceSummary> = Vec::new();
        let mut sampler = AdaptiveSampler::new(self.config.sampling_seed);

        while windows.iter().any(|w| w.token.is_active()) {
            let pages =
                run_round(self.trace_client.as_ref(), &windows, &request.filter_expression).await?;

            // Merge after the round barrier: slot i belongs to window i.
            for (window, slot) in windows.iter_mut().zip(pages) {
                if let Some(page) = slot {
                    population.extend(page.summaries);
                    window.token.advance(page.next_token);
                }
            }

            if adaptive && population.len() > request.budget {
                let before = population.len();
                population = sampler.thin(population);
                for window in &mut windows {
                    window.sampling /= 2.0;
                }
                debug!(
                    before,
                    after = population.len(),
                    budget = request.budget,
                    sampling = windows.first().map(|w| w.sampling).unwrap_or(0.0),
                    "thinned over-budget population"
                );
            }
        }

        Ok(population)
    }
}
