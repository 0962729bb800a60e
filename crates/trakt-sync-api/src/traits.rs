use async_trait::async_trait;
use trakt_sync_models::{
    CollectedMovie, CollectedShow, SyncRequest, SyncResponse, TraktAccount, WatchedMovie,
    WatchedShow,
};
use crate::error::ApiError;

/// The slice of the Trakt API the library sync needs.
///
/// Every call is scoped to one linked account. Implementations must not
/// batch or reorder calls; the caller awaits each one before issuing the next.
#[async_trait]
pub trait TraktApi: Send + Sync {
    // Snapshots
    async fn watched_movies(&self, account: &TraktAccount) -> Result<Vec<WatchedMovie>, ApiError>;
    async fn collected_movies(&self, account: &TraktAccount) -> Result<Vec<CollectedMovie>, ApiError>;
    async fn watched_shows(&self, account: &TraktAccount) -> Result<Vec<WatchedShow>, ApiError>;
    async fn collected_shows(&self, account: &TraktAccount) -> Result<Vec<CollectedShow>, ApiError>;

    // Batched updates
    async fn add_to_collection(
        &self,
        account: &TraktAccount,
        request: &SyncRequest,
    ) -> Result<SyncResponse, ApiError>;
    async fn add_to_history(
        &self,
        account: &TraktAccount,
        request: &SyncRequest,
    ) -> Result<SyncResponse, ApiError>;
    async fn remove_from_history(
        &self,
        account: &TraktAccount,
        request: &SyncRequest,
    ) -> Result<SyncResponse, ApiError>;
}
