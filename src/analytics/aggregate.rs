//! Categorical aggregation of a trace population.
//!
//! Reduces a (possibly sampled) population into per-key occurrence counts
//! and percentages along one classification dimension.

use crate::core::{RootCause, TraceSummary};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Classification dimension of an analytics request.
///
/// The serde names match the query types issued by callers. Adding a
/// dimension extends this enum and the exhaustive dispatch in
/// [`aggregate`]; there is no string-keyed fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnalyticsDimension {
    /// Last service of each response-time root cause
    #[serde(rename = "getAnalyticsRootCauseResponseTimeService")]
    RootCauseResponseTimeService,
    /// Full service path of each response-time root cause
    #[serde(rename = "getAnalyticsRootCauseResponseTimePath")]
    RootCauseResponseTimePath,
    /// Last service of each error root cause
    #[serde(rename = "getAnalyticsRootCauseErrorService")]
    RootCauseErrorService,
    /// Full service and exception path of each error root cause
    #[serde(rename = "getAnalyticsRootCauseErrorPath")]
    RootCauseErrorPath,
    /// First exception message of each error root cause
    #[serde(rename = "getAnalyticsRootCauseErrorMessage")]
    RootCauseErrorMessage,
    /// Last service of each fault root cause
    #[serde(rename = "getAnalyticsRootCauseFaultService")]
    RootCauseFaultService,
    /// Full service and exception path of each fault root cause
    #[serde(rename = "getAnalyticsRootCauseFaultPath")]
    RootCauseFaultPath,
    /// First exception message of each fault root cause
    #[serde(rename = "getAnalyticsRootCauseFaultMessage")]
    RootCauseFaultMessage,
    /// Request URL
    #[serde(rename = "getAnalyticsUrl")]
    Url,
    /// Associated user identifiers
    #[serde(rename = "getAnalyticsUser")]
    User,
    /// HTTP response status code
    #[serde(rename = "getAnalyticsStatusCode")]
    StatusCode,
}

impl AnalyticsDimension {
    /// Human-readable label for the dimension
    pub fn label(&self) -> &'static str {
        match self {
            Self::RootCauseResponseTimeService => "Response Time Root Cause",
            Self::RootCauseResponseTimePath => "Response Time Root Cause Path",
            Self::RootCauseErrorService => "Error Root Cause",
            Self::RootCauseErrorPath => "Error Root Cause Path",
            Self::RootCauseErrorMessage => "Error Root Cause Message",
            Self::RootCauseFaultService => "Fault Root Cause",
            Self::RootCauseFaultPath => "Fault Root Cause Path",
            Self::RootCauseFaultMessage => "Fault Root Cause Message",
            Self::Url => "URL",
            Self::User => "User",
            Self::StatusCode => "Status Code",
        }
    }
}

/// One aggregated key with its count and share of the total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationEntry {
    /// Classification key
    pub key: String,
    /// Number of contributions under this key
    pub count: u64,
    /// `count / total * 100`
    pub percentage: f64,
}

/// Aggregated frequency counts along one dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    /// Dimension the population was classified along
    pub dimension: AnalyticsDimension,
    /// Total number of contributions; denominator of every percentage
    pub total: u64,
    /// Entries ordered by descending count, then key
    pub entries: Vec<AggregationEntry>,
}

/// Occurrence tally shared by all dimensions.
struct Tally {
    counts: HashMap<String, u64>,
    total: u64,
}

impl Tally {
    fn new() -> Self {
        Self {
            counts: HashMap::new(),
            total: 0,
        }
    }

    fn add(&mut self, key: String) {
        *self.counts.entry(key).or_insert(0) += 1;
        self.total += 1;
    }

    fn into_result(self, dimension: AnalyticsDimension) -> AggregationResult {
        let total = self.total;
        let mut entries: Vec<AggregationEntry> = self
            .counts
            .into_iter()
            .map(|(key, count)| AggregationEntry {
                key,
                count,
                percentage: count as f64 / total as f64 * 100.0,
            })
            .collect();
        entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
        AggregationResult {
            dimension,
            total,
            entries,
        }
    }
}

/// Reduces `population` into per-key counts along `dimension`.
///
/// A record can contribute zero, one, or several keys depending on the
/// dimension (one per root cause or user, one per record otherwise). An
/// empty population yields `total == 0` and no entries, which is a valid
/// result, not an error.
pub fn aggregate(population: &[TraceSummary], dimension: AnalyticsDimension) -> AggregationResult {
    let mut tally = Tally::new();
    for summary in population {
        match dimension {
            AnalyticsDimension::RootCauseResponseTimeService => {
                tally_causes(&mut tally, &summary.response_time_root_causes, last_service_key);
            },
            AnalyticsDimension::RootCauseResponseTimePath => {
                tally_causes(&mut tally, &summary.response_time_root_causes, sub_path_key);
            },
            AnalyticsDimension::RootCauseErrorService => {
                tally_causes(&mut tally, &summary.error_root_causes, last_service_key);
            },
            AnalyticsDimension::RootCauseErrorPath => {
                tally_causes(&mut tally, &summary.error_root_causes, exception_path_key);
            },
            AnalyticsDimension::RootCauseErrorMessage => {
                tally_causes(&mut tally, &summary.error_root_causes, first_exception_message);
            },
            AnalyticsDimension::RootCauseFaultService => {
                tally_causes(&mut tally, &summary.fault_root_causes, last_service_key);
            },
            AnalyticsDimension::RootCauseFaultPath => {
                tally_causes(&mut tally, &summary.fault_root_causes, exception_path_key);
            },
            AnalyticsDimension::RootCauseFaultMessage => {
                tally_causes(&mut tally, &summary.fault_root_causes, first_exception_message);
            },
            AnalyticsDimension::Url => {
                let key = summary
                    .http
                    .as_ref()
                    .and_then(|http| http.url.clone())
                    .unwrap_or_else(|| "-".to_string());
                tally.add(key);
            },
            AnalyticsDimension::User => {
                if summary.users.is_empty() {
                    tally.add("-".to_string());
                }
                for user in &summary.users {
                    tally.add(user.clone());
                }
            },
            AnalyticsDimension::StatusCode => {
                let key = summary
                    .http
                    .as_ref()
                    .and_then(|http| http.status)
                    .map(|status| status.to_string())
                    .unwrap_or_else(|| "-".to_string());
                tally.add(key);
            },
        }
    }
    tally.into_result(dimension)
}

/// Tallies one key per cause; a record with no causes of the category
/// still contributes one record under "-".
fn tally_causes<F>(tally: &mut Tally, causes: &[RootCause], key_of: F)
where
    F: Fn(&RootCause) -> String,
{
    if causes.is_empty() {
        tally.add("-".to_string());
    }
    for cause in causes {
        tally.add(key_of(cause));
    }
}

/// "name (type)" of the last service in the cause chain
fn last_service_key(cause: &RootCause) -> String {
    cause
        .services
        .last()
        .map(|service| format!("{} ({})", service.name, service.kind))
        .unwrap_or_else(|| "-".to_string())
}

/// Full chain key for response-time causes: services joined by " => ",
/// each followed by its trailing sub-path segments. The first segment
/// repeats the service itself and is skipped.
fn sub_path_key(cause: &RootCause) -> String {
    let mut key = String::new();
    for (index, service) in cause.services.iter().enumerate() {
        key.push_str(&format!("{} ({})", service.name, service.kind));
        for entity in service.entity_path.iter().skip(1) {
            key.push_str(" -> ");
            key.push_str(&entity.name);
        }
        if index < cause.services.len() - 1 {
            key.push_str(" => ");
        }
    }
    key
}

/// Full chain key for error and fault causes: services joined by " => ",
/// each followed by every exception found along its entity path.
fn exception_path_key(cause: &RootCause) -> String {
    let mut key = String::new();
    for (index, service) in cause.services.iter().enumerate() {
        key.push_str(&format!("{} ({})", service.name, service.kind));
        for entity in &service.entity_path {
            for exception in &entity.exceptions {
                key.push_str(" -> ");
                key.push_str(exception.name.as_deref().unwrap_or("unknown"));
            }
        }
        if index < cause.services.len() - 1 {
            key.push_str(" => ");
        }
    }
    key
}

/// First exception message found walking the cause's path in order
fn first_exception_message(cause: &RootCause) -> String {
    for service in &cause.services {
        for entity in &service.entity_path {
            for exception in &entity.exceptions {
                if let Some(message) = &exception.message {
                    return message.clone();
                }
            }
        }
    }
    "-".to_string()
}
