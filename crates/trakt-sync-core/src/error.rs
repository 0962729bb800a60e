use thiserror::Error;
use trakt_sync_api::ApiError;

#[derive(Debug, Error)]
pub enum SyncError {
    /// The run's cancellation token fired between two items or flushes.
    #[error("library sync cancelled")]
    Cancelled,

    #[error("host error: {0}")]
    Host(String),

    #[error("failed to fetch {snapshot} snapshot for user {user}: {source}")]
    Snapshot {
        user: String,
        snapshot: &'static str,
        #[source]
        source: ApiError,
    },
}

impl SyncError {
    pub fn host(error: anyhow::Error) -> Self {
        SyncError::Host(format!("{:#}", error))
    }
}
