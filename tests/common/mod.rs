//! Common test utilities: mock collaborators and fixtures.

use chrono::{DateTime, Utc};
use jakauma_lib::client::{
    StatisticsClient, StatsBucket, StatsPage, TracePage, TraceQuery, TraceQueryClient,
};
use jakauma_lib::core::{JakaumaError, Result, TimeRange, TraceId, TraceSummary};

/// In-memory trace query collaborator.
///
/// Paging is simulated through the trace ids: each trace carries a numeric
/// pseudo-token as its id, a fetch returns the traces matching the request
/// token, and the smallest higher token present in the window is handed
/// back as the continuation cursor. Token 0 is the first page.
pub struct MockTraceClient {
    traces: Vec<TraceSummary>,
    fail_inside: Option<DateTime<Utc>>,
}

impl MockTraceClient {
    pub fn new(batches: Vec<Vec<TraceSummary>>) -> Self {
        Self {
            traces: batches.into_iter().flatten().collect(),
            fail_inside: None,
        }
    }

    /// Makes every fetch whose window contains `instant` fail
    pub fn failing_inside(mut self, instant: DateTime<Utc>) -> Self {
        self.fail_inside = Some(instant);
        self
    }

    pub fn trace_count(&self) -> u64 {
        self.traces.len() as u64
    }
}

#[async_trait::async_trait]
impl TraceQueryClient for MockTraceClient {
    async fn fetch_traces(&self, range: &TimeRange, query: &TraceQuery) -> Result<TracePage> {
        if let Some(instant) = self.fail_inside {
            if range.contains(instant) {
                return Err(JakaumaError::upstream("simulated window failure"));
            }
        }

        let request_token = token_number(query.next_token.as_deref());
        let mut candidate = request_token;
        let mut summaries = Vec::new();
        for trace in &self.traces {
            if !range.contains(trace.matched_at) {
                continue;
            }
            let trace_token = token_number(Some(trace.id.as_str()));
            if trace_token == request_token {
                summaries.push(trace.clone());
            } else if trace_token > request_token
                && (trace_token < candidate || candidate == request_token)
            {
                candidate = trace_token;
            }
        }
        let next_token = if candidate == request_token {
            None
        } else {
            Some(candidate.to_string())
        };

        // Deterministic thinning instead of a probabilistic one so tests
        // are stable even with small counts.
        if query.sampling < 1.0 {
            let keep_every = (1.0 / query.sampling).floor() as usize;
            summaries = summaries
                .into_iter()
                .enumerate()
                .filter(|(index, _)| index % keep_every == 0)
                .map(|(_, trace)| trace)
                .collect();
        }

        Ok(TracePage {
            summaries,
            next_token,
        })
    }
}

fn token_number(token: Option<&str>) -> u64 {
    match token {
        None => 0,
        Some(token) => token.parse().expect("mock tokens are numeric"),
    }
}

/// Statistics collaborator answering with a fixed total in one page.
pub struct MockStatsClient {
    total: u64,
    fail: bool,
}

impl MockStatsClient {
    pub fn new(total: u64) -> Self {
        Self { total, fail: false }
    }

    pub fn failing() -> Self {
        Self {
            total: 0,
            fail: true,
        }
    }
}

#[async_trait::async_trait]
impl StatisticsClient for MockStatsClient {
    async fn fetch_aggregate_statistics(
        &self,
        _range: &TimeRange,
        _group: Option<&str>,
        _next_token: Option<&str>,
    ) -> Result<StatsPage> {
        if self.fail {
            return Err(JakaumaError::upstream("simulated statistics failure"));
        }
        Ok(StatsPage {
            buckets: vec![StatsBucket {
                total_count: self.total,
            }],
            next_token: None,
        })
    }
}

/// Builds `count` identical-shaped summaries matched at `at`, all carrying
/// the numeric pseudo-token `token` as their id.
pub fn make_traces(at: &str, token: u64, count: usize) -> Vec<TraceSummary> {
    let at = parse_time(at);
    (0..count)
        .map(|_| TraceSummary::new(TraceId::new(token.to_string()).unwrap(), at))
        .collect()
}

pub fn parse_time(at: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(at)
        .expect("valid RFC3339 timestamp")
        .with_timezone(&Utc)
}
