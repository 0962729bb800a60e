use crate::buckets::BucketKind;
use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// A bucket whose update call failed; the run carried on without it.
#[derive(Debug, Clone)]
pub struct BucketFailure {
    pub user: String,
    pub bucket: BucketKind,
    pub category: &'static str,
    pub message: String,
}

/// Outcome of one library sync run.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub dry_run: bool,
    pub users_linked: usize,
    pub users_synced: usize,
    /// (user, error) for users whose snapshots or library could not be read
    pub users_failed: Vec<(String, String)>,
    /// Items sent per bucket, summed over users
    pub items_sent: BTreeMap<BucketKind, usize>,
    pub items_skipped: usize,
    pub not_found: usize,
    pub failures: Vec<BucketFailure>,
    pub duration: Duration,
}

impl SyncReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            users_linked: 0,
            users_synced: 0,
            users_failed: Vec::new(),
            items_sent: BTreeMap::new(),
            items_skipped: 0,
            not_found: 0,
            failures: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    pub fn total_sent(&self) -> usize {
        self.items_sent.values().sum()
    }

    pub(crate) fn record_sent(&mut self, bucket: BucketKind, count: usize) {
        *self.items_sent.entry(bucket).or_insert(0) += count;
    }

    pub(crate) fn record_failure(&mut self, failure: BucketFailure) {
        self.failures.push(failure);
    }

    pub(crate) fn finish(&mut self, started: Instant) {
        self.duration = started.elapsed();
    }

    /// Log a final summary, with failures grouped by category
    pub fn log_summary(&self) {
        let sent: Vec<String> = self
            .items_sent
            .iter()
            .map(|(bucket, count)| format!("{}: {}", bucket, count))
            .collect();

        if self.failures.is_empty() && self.users_failed.is_empty() {
            info!(
                operation = "library_sync_complete",
                dry_run = self.dry_run,
                "Library sync completed: {} of {} linked users in {:.1}s | Sent: [{}] | Skipped: {} | Not found: {}",
                self.users_synced,
                self.users_linked,
                self.duration.as_secs_f64(),
                sent.join(", "),
                self.items_skipped,
                self.not_found
            );
            return;
        }

        warn!(
            operation = "library_sync_complete",
            dry_run = self.dry_run,
            "Library sync completed with errors: {} of {} linked users in {:.1}s | Sent: [{}] | Failed buckets: {} | Failed users: {}",
            self.users_synced,
            self.users_linked,
            self.duration.as_secs_f64(),
            sent.join(", "),
            self.failures.len(),
            self.users_failed.len()
        );

        if !self.failures.is_empty() {
            let mut error_counts: HashMap<&str, usize> = HashMap::new();
            for failure in &self.failures {
                *error_counts.entry(failure.category).or_insert(0) += 1;
            }
            let mut error_entries: Vec<_> = error_counts.into_iter().collect();
            error_entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

            let error_summary: Vec<String> = error_entries
                .iter()
                .map(|(category, count)| format!("{}: {}", category, count))
                .collect();

            info!("Error breakdown: {}", error_summary.join(", "));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sent_counts_accumulate_per_bucket() {
        let mut report = SyncReport::new(false);
        report.record_sent(BucketKind::CollectMovies, 2);
        report.record_sent(BucketKind::CollectMovies, 3);
        report.record_sent(BucketKind::MarkPlayedEpisodes, 1);

        assert_eq!(report.items_sent[&BucketKind::CollectMovies], 5);
        assert_eq!(report.total_sent(), 6);
        report.log_summary();
    }
}
