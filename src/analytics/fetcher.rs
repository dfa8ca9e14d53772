//! Concurrent per-window trace fetching.

use crate::analytics::window::FetchWindow;
use crate::client::{TracePage, TraceQuery, TraceQueryClient};
use crate::core::Result;
use futures::future;
use tracing::debug;

/// Runs one fetch round: every active window is dispatched concurrently
/// and the round completes when all dispatched fetches finish.
///
/// Result slot `i` always corresponds to window `i` so the engine can fold
/// each page's continuation token back into its own window; tokens page
/// through logically distinct time slices and must never cross windows.
/// Inactive windows yield `None` in place. The first failed fetch fails
/// the round and drops the remaining in-flight fetches.
pub(crate) async fn run_round(
    client: &dyn TraceQueryClient,
    windows: &[FetchWindow],
    filter_expression: &str,
) -> Result<Vec<Option<TracePage>>> {
    let fetches = windows.iter().map(|window| async move {
        if !window.token.is_active() {
            return Ok(None);
        }
        let query = TraceQuery::new(filter_expression, window.sampling)
            .with_token(window.token.as_cursor().map(str::to_owned));
        let page = client.fetch_traces(&window.range, &query).await?;
        debug!(
            range = %window.range,
            sampling = window.sampling,
            fetched = page.summaries.len(),
            has_next = page.next_token.is_some(),
            "fetched trace page"
        );
        Ok(Some(page))
    });
    future::try_join_all(fetches).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::window::{split, PageToken};
    use crate::core::{JakaumaError, TimeRange, TraceId, TraceSummary};
    use chrono::{TimeZone, Utc};

    /// Returns one summary per call, tagging it with the window's start
    /// time so tests can check index alignment.
    struct EchoClient;

    #[async_trait::async_trait]
    impl TraceQueryClient for EchoClient {
        async fn fetch_traces(&self, range: &TimeRange, query: &TraceQuery) -> Result<TracePage> {
            assert!(query.next_token.is_none());
            let summary = TraceSummary::new(
                TraceId::new(range.from.to_rfc3339()).unwrap(),
                range.from,
            );
            Ok(TracePage {
                summaries: vec![summary],
                next_token: None,
            })
        }
    }

    struct FailingClient;

    #[async_trait::async_trait]
    impl TraceQueryClient for FailingClient {
        async fn fetch_traces(&self, _range: &TimeRange, _query: &TraceQuery) -> Result<TracePage> {
            Err(JakaumaError::upstream("connection reset"))
        }
    }

    fn windows(parts: usize) -> Vec<FetchWindow> {
        let range = TimeRange::new(
            Utc.with_ymd_and_hms(2020, 9, 16, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2020, 9, 16, 0, 0, 40).unwrap(),
        );
        split(&range, parts)
            .into_iter()
            .map(|sub| FetchWindow::new(sub, 1.0))
            .collect()
    }

    #[tokio::test]
    async fn test_results_align_with_windows() {
        let windows = windows(4);
        let pages = run_round(&EchoClient, &windows, "").await.unwrap();
        assert_eq!(pages.len(), 4);
        for (window, page) in windows.iter().zip(&pages) {
            let page = page.as_ref().unwrap();
            assert_eq!(page.summaries[0].matched_at, window.range.from);
        }
    }

    #[tokio::test]
    async fn test_exhausted_windows_are_skipped() {
        let mut windows = windows(4);
        windows[1].token = PageToken::Exhausted;
        windows[3].token = PageToken::Exhausted;
        let pages = run_round(&EchoClient, &windows, "").await.unwrap();
        assert!(pages[0].is_some());
        assert!(pages[1].is_none());
        assert!(pages[2].is_some());
        assert!(pages[3].is_none());
    }

    #[tokio::test]
    async fn test_first_failure_fails_the_round() {
        let windows = windows(4);
        let err = run_round(&FailingClient, &windows, "").await.unwrap_err();
        assert!(err.is_upstream());
    }
}
