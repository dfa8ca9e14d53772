//! Upstream collaborator interfaces.
//!
//! The engine consumes two paginated upstream services: a trace query
//! service returning matched trace summaries, and a statistics aggregate
//! service returning per-bucket counts. Transport and authentication live
//! behind these traits; any failure surfaces as
//! [`JakaumaError::Upstream`](crate::core::JakaumaError::Upstream).

use crate::core::{Result, TimeRange, TraceSummary};

/// Parameters of one paginated trace fetch call.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceQuery {
    /// Filter expression restricting the matched population; `None` matches all
    pub filter_expression: Option<String>,
    /// Fraction of matching records the upstream should return, in `(0, 1]`
    pub sampling: f64,
    /// Continuation cursor from the previous page, absent on the first call
    pub next_token: Option<String>,
}

impl TraceQuery {
    /// Creates a first-page query. An empty filter expression is
    /// normalised to `None` (match all).
    pub fn new(filter_expression: &str, sampling: f64) -> Self {
        let filter_expression = if filter_expression.is_empty() {
            None
        } else {
            Some(filter_expression.to_string())
        };
        Self {
            filter_expression,
            sampling,
            next_token: None,
        }
    }

    /// Attaches a continuation cursor for a follow-up page
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.next_token = token;
        self
    }
}

/// One page of matched trace summaries.
#[derive(Debug, Clone, Default)]
pub struct TracePage {
    /// Matched records on this page, already down-sampled by the upstream
    pub summaries: Vec<TraceSummary>,
    /// Cursor for the next page; `None` means the window is exhausted
    pub next_token: Option<String>,
}

/// One statistics bucket with the number of records it covers.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsBucket {
    /// Number of matching records in this bucket
    pub total_count: u64,
}

/// One page of aggregate statistics buckets.
#[derive(Debug, Clone, Default)]
pub struct StatsPage {
    /// Buckets on this page
    pub buckets: Vec<StatsBucket>,
    /// Cursor for the next page; `None` means the last page
    pub next_token: Option<String>,
}

/// Trait for the trace query collaborator.
#[async_trait::async_trait]
pub trait TraceQueryClient: Send + Sync {
    /// Fetch one page of trace summaries matching `query` within `range`.
    async fn fetch_traces(&self, range: &TimeRange, query: &TraceQuery) -> Result<TracePage>;
}

/// Trait for the statistics aggregate collaborator.
///
/// The statistics endpoint counts all records in a range without
/// transferring them, but does not support filter expressions.
#[async_trait::async_trait]
pub trait StatisticsClient: Send + Sync {
    /// Fetch one page of aggregate statistics for `range`, optionally
    /// scoped to a named group.
    async fn fetch_aggregate_statistics(
        &self,
        range: &TimeRange,
        group: Option<&str>,
        next_token: Option<&str>,
    ) -> Result<StatsPage>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_normalised_to_none() {
        let query = TraceQuery::new("", 1.0);
        assert_eq!(query.filter_expression, None);

        let query = TraceQuery::new("responsetime > 5", 0.5);
        assert_eq!(query.filter_expression.as_deref(), Some("responsetime > 5"));
        assert_eq!(query.sampling, 0.5);
    }

    #[test]
    fn test_with_token() {
        let query = TraceQuery::new("", 1.0).with_token(Some("cursor-1".to_string()));
        assert_eq!(query.next_token.as_deref(), Some("cursor-1"));
    }
}
