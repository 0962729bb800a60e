// Pushing a bucket to Trakt and logging what came back

use crate::buckets::{BucketKind, SyncAction};
use trakt_sync_api::{ApiError, TraktApi};
use trakt_sync_models::{SyncCounts, SyncRequest, SyncResponse, TraktAccount};
use tracing::{error, info};

/// Send one bucket through the endpoint its action maps to.
pub async fn send_bucket(
    api: &dyn TraktApi,
    account: &TraktAccount,
    kind: BucketKind,
    request: &SyncRequest,
) -> Result<SyncResponse, ApiError> {
    match kind.action() {
        SyncAction::Collect => api.add_to_collection(account, request).await,
        SyncAction::MarkPlayed => api.add_to_history(account, request).await,
        SyncAction::MarkUnplayed => api.remove_from_history(account, request).await,
    }
}

fn counts_line(counts: &SyncCounts) -> String {
    format!(
        "movies={}, shows={}, seasons={}, episodes={}",
        counts.movies, counts.shows, counts.seasons, counts.episodes
    )
}

/// Log the counts of a response and every not-found entry as an error.
/// Returns the number of not-found entries.
pub fn log_response(user: &str, kind: BucketKind, response: &SyncResponse) -> usize {
    match kind.action() {
        SyncAction::MarkUnplayed => info!(
            operation = "bucket_flushed",
            user,
            bucket = kind.label(),
            "Trakt deleted: {}",
            counts_line(&response.deleted)
        ),
        _ => info!(
            operation = "bucket_flushed",
            user,
            bucket = kind.label(),
            "Trakt added: {} | existing: {}",
            counts_line(&response.added),
            counts_line(&response.existing)
        ),
    }

    let mut not_found = 0;
    for (entity, entry) in response.not_found.entries() {
        not_found += 1;
        error!(
            operation = "not_found",
            user,
            bucket = kind.label(),
            "Trakt could not find {}: title={:?}, year={:?}, ids={}",
            entity,
            entry.title,
            entry.year,
            entry.ids.describe()
        );
    }
    not_found
}
