use crate::core::error::{JakaumaError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a trace
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceId(String);

impl TraceId {
    /// Creates a new TraceId after validation
    pub fn new(id: String) -> Result<Self> {
        if id.is_empty() {
            return Err(JakaumaError::InvalidRecord("TraceId cannot be empty".to_string()));
        }
        if id.len() > 64 {
            return Err(JakaumaError::InvalidRecord(format!(
                "TraceId cannot exceed 64 characters, got {}",
                id.len()
            )));
        }
        Ok(TraceId(id))
    }

    /// Returns the string representation of the trace ID
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the inner string value
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Half-open time range `[from, to)` an analytics request covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Inclusive start of the range
    pub from: DateTime<Utc>,
    /// Exclusive end of the range
    pub to: DateTime<Utc>,
}

impl TimeRange {
    /// Creates a new time range
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// Returns the length of the range
    pub fn duration(&self) -> Duration {
        self.to - self.from
    }

    /// Returns true if the instant falls inside the range
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.from && instant < self.to
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.from.to_rfc3339(), self.to.to_rfc3339())
    }
}

/// HTTP metadata attached to a trace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpInfo {
    /// HTTP method of the traced request
    pub method: Option<String>,
    /// Full request URL
    pub url: Option<String>,
    /// Response status code
    pub status: Option<u16>,
    /// Client IP address
    pub client_ip: Option<String>,
}

/// Exception recorded along a root-cause path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootCauseException {
    /// Exception type name, when known
    pub name: Option<String>,
    /// Human-readable exception message, when known
    pub message: Option<String>,
}

/// One segment of a root-cause path within a service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootCauseEntity {
    /// Segment name (operation, downstream call, ...)
    pub name: String,
    /// Exceptions attributed to this segment; empty for response-time causes
    pub exceptions: Vec<RootCauseException>,
}

/// A named service implicated in a root cause
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootCauseService {
    /// Service name
    pub name: String,
    /// Service type (e.g. "api", "database")
    pub kind: String,
    /// Path of segments walked inside this service
    pub entity_path: Vec<RootCauseEntity>,
}

/// An attributed chain of services implicated in a trace's failure or latency
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootCause {
    /// Services along the cause chain, in order
    pub services: Vec<RootCauseService>,
}

/// One matched distributed-tracing record.
///
/// Immutable once fetched; the engine only ever counts, retains, or drops
/// whole summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceSummary {
    /// Unique identifier of the trace
    pub id: TraceId,
    /// Event time the trace matched the query window on
    pub matched_at: DateTime<Utc>,
    /// HTTP metadata, when the trace captured any
    #[serde(default)]
    pub http: Option<HttpInfo>,
    /// Root causes attributed to response time
    #[serde(default)]
    pub response_time_root_causes: Vec<RootCause>,
    /// Root causes attributed to errors (4xx)
    #[serde(default)]
    pub error_root_causes: Vec<RootCause>,
    /// Root causes attributed to faults (5xx)
    #[serde(default)]
    pub fault_root_causes: Vec<RootCause>,
    /// User identifiers associated with the trace
    #[serde(default)]
    pub users: Vec<String>,
}

impl TraceSummary {
    /// Creates a summary with no HTTP metadata, root causes, or users
    pub fn new(id: TraceId, matched_at: DateTime<Utc>) -> Self {
        Self {
            id,
            matched_at,
            http: None,
            response_time_root_causes: Vec::new(),
            error_root_causes: Vec::new(),
            fault_root_causes: Vec::new(),
            users: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_trace_id_validation() {
        assert!(TraceId::new(String::new()).is_err());
        assert!(TraceId::new("x".repeat(65)).is_err());
        let id = TraceId::new("1-581cf771-a006649127e371903a2de979".to_string()).unwrap();
        assert_eq!(id.as_str(), "1-581cf771-a006649127e371903a2de979");
    }

    #[test]
    fn test_time_range_contains_is_half_open() {
        let from = Utc.with_ymd_and_hms(2020, 9, 16, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2020, 9, 16, 0, 10, 0).unwrap();
        let range = TimeRange::new(from, to);
        assert!(range.contains(from));
        assert!(range.contains(to - Duration::seconds(1)));
        assert!(!range.contains(to));
        assert_eq!(range.duration(), Duration::minutes(10));
    }

    #[test]
    fn test_trace_summary_deserializes_with_defaults() {
        let summary: TraceSummary = serde_json::from_str(
            r#"{"id": "abc", "matchedAt": "2020-09-16T00:00:01Z"}"#,
        )
        .unwrap();
        assert_eq!(summary.id.as_str(), "abc");
        assert!(summary.http.is_none());
        assert!(summary.error_root_causes.is_empty());
        assert!(summary.users.is_empty());
    }
}
