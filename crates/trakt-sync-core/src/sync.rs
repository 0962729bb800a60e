use crate::buckets::{BucketKind, SyncBuckets};
use crate::diff::classify_into;
use crate::error::SyncError;
use crate::filter::{order_for_traversal, syncable_items};
use crate::host::{AccountLinks, MediaHost, ProgressSink};
use crate::progress::RunProgress;
use crate::summary::{BucketFailure, SyncReport};
use crate::update::{log_response, send_bucket};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use trakt_sync_api::{ApiError, TraktApi};
use trakt_sync_models::{LocalUser, RemoteSnapshots, TraktAccount};
use tracing::{debug, error, info, instrument, warn};

/// Pushes each linked user's library state to their Trakt account.
///
/// Users are processed strictly one after another, and within a user every
/// Trakt call is awaited before the next is issued.
pub struct LibrarySync {
    api: Arc<dyn TraktApi>,
    host: Arc<dyn MediaHost>,
    links: Arc<dyn AccountLinks>,
    dry_run: bool,
    excluded_locations: HashMap<String, Vec<PathBuf>>,
}

impl LibrarySync {
    pub fn new(api: Arc<dyn TraktApi>, host: Arc<dyn MediaHost>, links: Arc<dyn AccountLinks>) -> Self {
        Self {
            api,
            host,
            links,
            dry_run: false,
            excluded_locations: HashMap::new(),
        }
    }

    /// Classify and log buckets without sending any update calls
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Path prefixes to leave out, keyed by local user id
    pub fn with_excluded_locations(mut self, excluded_locations: HashMap<String, Vec<PathBuf>>) -> Self {
        self.excluded_locations = excluded_locations;
        self
    }

    pub fn host(&self) -> &Arc<dyn MediaHost> {
        &self.host
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    #[instrument(skip_all, fields(dry_run = self.dry_run))]
    pub async fn run(
        &self,
        users: &[LocalUser],
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<SyncReport, SyncError> {
        let started = Instant::now();
        let mut report = SyncReport::new(self.dry_run);

        let linked: Vec<(&LocalUser, TraktAccount)> = users
            .iter()
            .filter_map(|user| self.links.linked_account(user).map(|account| (user, account)))
            .collect();
        report.users_linked = linked.len();

        if linked.is_empty() {
            info!(
                operation = "library_sync_skipped",
                "None of the {} users is linked to Trakt, nothing to sync",
                users.len()
            );
            report.finish(started);
            return Ok(report);
        }

        info!(
            operation = "library_sync_start",
            users = linked.len(),
            "Starting library sync for {} linked users",
            linked.len()
        );

        let mut run_progress = RunProgress::new(progress, linked.len());
        for (index, (user, account)) in linked.iter().enumerate() {
            match self
                .sync_user(index, user, account, &mut run_progress, cancel, &mut report)
                .await
            {
                Ok(()) => report.users_synced += 1,
                Err(SyncError::Cancelled) => {
                    warn!(
                        operation = "library_sync_cancelled",
                        user = %user.name,
                        "Library sync cancelled at {:.1}%",
                        run_progress.current()
                    );
                    return Err(SyncError::Cancelled);
                }
                Err(e) => {
                    error!(operation = "user_sync_failed", user = %user.name, "Skipping user: {}", e);
                    report.users_failed.push((user.name.clone(), e.to_string()));
                }
            }
            run_progress.finish_user(index);
        }

        report.finish(started);
        report.log_summary();
        Ok(report)
    }

    async fn sync_user(
        &self,
        index: usize,
        user: &LocalUser,
        account: &TraktAccount,
        progress: &mut RunProgress<'_>,
        cancel: &CancellationToken,
        report: &mut SyncReport,
    ) -> Result<(), SyncError> {
        if cancel.is_cancelled() {
            return Err(SyncError::Cancelled);
        }

        let snapshots = self.fetch_snapshots(user, account).await?;

        let items = self.host.library_items(user).await.map_err(SyncError::host)?;
        let excluded = self
            .excluded_locations
            .get(&user.id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let mut items = syncable_items(items, excluded);
        order_for_traversal(&mut items);

        info!(
            operation = "user_sync_start",
            user = %user.name,
            items = items.len(),
            "Syncing {} library items for {}",
            items.len(),
            user.name
        );

        // Targets are computed from the item index and capped so float drift
        // never pushes past the user's share.
        let start = progress.user_start(index);
        let end = progress.user_start(index + 1);
        let half_share = progress.user_share() / 2.0;
        let traversal_end = (start + half_share).min(end);

        let mut buckets = SyncBuckets::new();
        let item_count = items.len();
        for (position, item) in items.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(SyncError::Cancelled);
            }
            let play_state = self.host.play_state(user, item);
            if let Err(reason) = classify_into(item, play_state, &snapshots, &mut buckets) {
                debug!("Skipping {} ({}): {:?}", item.name(), item.id(), reason);
                report.items_skipped += 1;
            }
            let done = (position + 1) as f64 / item_count as f64;
            progress.advance_to((start + half_share * done).min(traversal_end));
        }
        progress.advance_to(traversal_end);

        self.flush_buckets(user, account, &buckets, (traversal_end, end), progress, cancel, report)
            .await
    }

    async fn fetch_snapshots(
        &self,
        user: &LocalUser,
        account: &TraktAccount,
    ) -> Result<RemoteSnapshots, SyncError> {
        let watched_movies = self
            .api
            .watched_movies(account)
            .await
            .map_err(snapshot_error(user, "watched movies"))?;
        let collected_movies = self
            .api
            .collected_movies(account)
            .await
            .map_err(snapshot_error(user, "collected movies"))?;
        let watched_shows = self
            .api
            .watched_shows(account)
            .await
            .map_err(snapshot_error(user, "watched shows"))?;
        let collected_shows = self
            .api
            .collected_shows(account)
            .await
            .map_err(snapshot_error(user, "collected shows"))?;

        debug!(
            user = %user.name,
            "Trakt snapshots: {} watched movies, {} collected movies, {} watched shows, {} collected shows",
            watched_movies.len(),
            collected_movies.len(),
            watched_shows.len(),
            collected_shows.len()
        );

        Ok(RemoteSnapshots {
            watched_movies,
            collected_movies,
            watched_shows,
            collected_shows,
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn flush_buckets(
        &self,
        user: &LocalUser,
        account: &TraktAccount,
        buckets: &SyncBuckets,
        (flush_start, flush_end): (f64, f64),
        progress: &mut RunProgress<'_>,
        cancel: &CancellationToken,
        report: &mut SyncReport,
    ) -> Result<(), SyncError> {
        let total = buckets.total();
        if total == 0 {
            debug!(user = %user.name, "Trakt is already up to date");
            return Ok(());
        }

        let mut flushed = 0;
        for kind in BucketKind::FLUSH_ORDER {
            if cancel.is_cancelled() {
                return Err(SyncError::Cancelled);
            }
            let count = buckets.len(kind);
            if count == 0 {
                continue;
            }

            let request = buckets.request(kind);
            if self.dry_run {
                info!(
                    operation = "dry_run_bucket",
                    user = %user.name,
                    bucket = kind.label(),
                    "Dry run: would send {} items",
                    count
                );
                if let Ok(body) = serde_json::to_string(&request) {
                    debug!(bucket = kind.label(), "{}", body);
                }
                report.record_sent(kind, count);
            } else {
                match send_bucket(self.api.as_ref(), account, kind, &request).await {
                    Ok(response) => {
                        report.not_found += log_response(&user.name, kind, &response);
                        report.record_sent(kind, count);
                    }
                    Err(e) => {
                        error!(
                            operation = "bucket_failed",
                            user = %user.name,
                            bucket = kind.label(),
                            category = e.category(),
                            "Failed to send {} items: {}",
                            count,
                            e
                        );
                        report.record_failure(BucketFailure {
                            user: user.name.clone(),
                            bucket: kind,
                            category: e.category(),
                            message: e.to_string(),
                        });
                    }
                }
            }

            flushed += count;
            let done = flushed as f64 / total as f64;
            progress.advance_to((flush_start + (flush_end - flush_start) * done).min(flush_end));
        }

        Ok(())
    }
}

fn snapshot_error<'a>(user: &'a LocalUser, snapshot: &'static str) -> impl FnOnce(ApiError) -> SyncError + 'a {
    move |source| SyncError::Snapshot {
        user: user.name.clone(),
        snapshot,
        source,
    }
}
