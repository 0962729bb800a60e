//! Scheduled-job surface for the library sync.

use crate::error::SyncError;
use crate::host::ProgressSink;
use crate::summary::SyncReport;
use crate::sync::LibrarySync;
use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// When a scheduled task should fire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskTrigger {
    /// Once when the scheduler starts
    Startup,
    Interval(Duration),
    /// Six-field cron expression (seconds first)
    Cron(String),
}

#[async_trait]
pub trait ScheduledTask: Send + Sync {
    fn name(&self) -> &str;

    /// Stable identifier used in logs and job registration.
    fn key(&self) -> &str;

    fn description(&self) -> &str;

    fn category(&self) -> &str;

    fn default_triggers(&self) -> Vec<TaskTrigger>;

    async fn execute(
        &self,
        progress: &dyn ProgressSink,
        cancel: CancellationToken,
    ) -> Result<SyncReport, SyncError>;
}

pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Runs [`LibrarySync`] over every user the host knows about.
pub struct LibrarySyncTask {
    sync: LibrarySync,
}

impl LibrarySyncTask {
    pub fn new(sync: LibrarySync) -> Self {
        Self { sync }
    }
}

#[async_trait]
impl ScheduledTask for LibrarySyncTask {
    fn name(&self) -> &str {
        "Sync library to Trakt"
    }

    fn key(&self) -> &str {
        "trakt_library_sync"
    }

    fn description(&self) -> &str {
        "Sends collection and watched state of linked users to their Trakt accounts."
    }

    fn category(&self) -> &str {
        "Trakt"
    }

    fn default_triggers(&self) -> Vec<TaskTrigger> {
        vec![TaskTrigger::Interval(DEFAULT_SYNC_INTERVAL)]
    }

    async fn execute(
        &self,
        progress: &dyn ProgressSink,
        cancel: CancellationToken,
    ) -> Result<SyncReport, SyncError> {
        let users = self.sync.host().users().await.map_err(SyncError::host)?;
        info!(operation = "task_start", task = self.key(), users = users.len(), "Running {}", self.name());
        self.sync.run(&users, progress, &cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MediaHost, NoProgress};
    use crate::test_support::{movie, FakeHost, FakeTrakt};
    use std::collections::HashMap;
    use std::sync::Arc;
    use trakt_sync_api::TraktApi;
    use trakt_sync_models::{LocalMediaItem, LocalUser, PlayState, TraktAccount};

    #[test]
    fn test_default_trigger_is_daily() {
        let api: Arc<dyn TraktApi> = Arc::new(FakeTrakt::new());
        let links: HashMap<String, TraktAccount> = HashMap::new();
        let task = LibrarySyncTask::new(LibrarySync::new(api, Arc::new(FakeHost::default()), Arc::new(links)));

        assert_eq!(task.default_triggers(), vec![TaskTrigger::Interval(Duration::from_secs(86_400))]);
        assert_eq!(task.key(), "trakt_library_sync");
    }

    #[tokio::test]
    async fn test_execute_syncs_every_linked_host_user() {
        let trakt = Arc::new(FakeTrakt::new());
        let host = Arc::new(FakeHost::new(
            vec![LocalUser::new("u1", "alice"), LocalUser::new("u2", "bob")],
            vec![movie("m1", "tt1")],
        ));
        let mut links = HashMap::new();
        links.insert("u2".to_string(), TraktAccount::new("t2"));

        let api: Arc<dyn TraktApi> = trakt.clone();
        let media_host: Arc<dyn MediaHost> = host.clone();
        let task = LibrarySyncTask::new(LibrarySync::new(api, media_host, Arc::new(links)));

        let report = task.execute(&NoProgress, CancellationToken::new()).await.unwrap();

        assert_eq!(report.users_linked, 1);
        assert_eq!(report.users_synced, 1);
        assert_eq!(*host.library_requests.lock().unwrap(), vec!["u2".to_string()]);
        assert!(trakt.calls().iter().all(|call| call.token == "t2"));
    }

    struct BrokenHost;

    #[async_trait]
    impl MediaHost for BrokenHost {
        async fn users(&self) -> anyhow::Result<Vec<LocalUser>> {
            anyhow::bail!("user store unavailable")
        }

        async fn library_items(&self, _user: &LocalUser) -> anyhow::Result<Vec<LocalMediaItem>> {
            Ok(Vec::new())
        }

        fn play_state(&self, _user: &LocalUser, _item: &LocalMediaItem) -> PlayState {
            PlayState::default()
        }
    }

    #[tokio::test]
    async fn test_execute_surfaces_host_errors() {
        let api: Arc<dyn TraktApi> = Arc::new(FakeTrakt::new());
        let links: HashMap<String, TraktAccount> = HashMap::new();
        let task = LibrarySyncTask::new(LibrarySync::new(api, Arc::new(BrokenHost), Arc::new(links)));

        let result = task.execute(&NoProgress, CancellationToken::new()).await;
        match result {
            Err(SyncError::Host(message)) => assert!(message.contains("user store unavailable")),
            other => panic!("expected host error, got {:?}", other.map(|r| r.users_synced)),
        }
    }
}
