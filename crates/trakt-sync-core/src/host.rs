//! The boundary to the media server hosting the sync task.

use async_trait::async_trait;
use std::collections::HashMap;
use trakt_sync_models::{LocalMediaItem, LocalUser, PlayState, TraktAccount};

/// Library and user-data access provided by the media host.
#[async_trait]
pub trait MediaHost: Send + Sync {
    async fn users(&self) -> anyhow::Result<Vec<LocalUser>>;

    /// Every movie and episode visible to the user, recursively.
    async fn library_items(&self, user: &LocalUser) -> anyhow::Result<Vec<LocalMediaItem>>;

    fn play_state(&self, user: &LocalUser, item: &LocalMediaItem) -> PlayState;
}

/// Resolves which local users are linked to a Trakt account.
pub trait AccountLinks: Send + Sync {
    fn linked_account(&self, user: &LocalUser) -> Option<TraktAccount>;
}

impl AccountLinks for HashMap<String, TraktAccount> {
    fn linked_account(&self, user: &LocalUser) -> Option<TraktAccount> {
        self.get(&user.id)
            .filter(|account| !account.access_token.is_empty())
            .cloned()
    }
}

/// Receives the running completion percentage, in [0, 100].
pub trait ProgressSink: Send + Sync {
    fn report(&self, percent: f64);
}

impl<F> ProgressSink for F
where
    F: Fn(f64) + Send + Sync,
{
    fn report(&self, percent: f64) {
        self(percent)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _percent: f64) {}
}
