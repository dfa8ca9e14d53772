//! Population size estimation via the statistics aggregate collaborator.

use crate::client::StatisticsClient;
use crate::core::{Result, TimeRange};
use tracing::debug;

/// Counts all records matching the whole request range by paging the
/// statistics aggregate endpoint and summing per-bucket totals.
///
/// The statistics endpoint does not support filter expressions, so this
/// is only usable when the request matches all records. Any page failure
/// aborts with the upstream error.
pub(crate) async fn estimate_population(
    client: &dyn StatisticsClient,
    range: &TimeRange,
    group: Option<&str>,
) -> Result<u64> {
    let mut total = 0u64;
    let mut token: Option<String> = None;
    loop {
        let page = client
            .fetch_aggregate_statistics(range, group, token.as_deref())
            .await?;
        total += page.buckets.iter().map(|bucket| bucket.total_count).sum::<u64>();
        match page.next_token {
            Some(next) => token = Some(next),
            None => break,
        }
    }
    debug!(%range, ?group, total, "estimated matching population");
    Ok(total)
}
