pub mod buckets;
pub mod diff;
pub mod error;
pub mod filter;
pub mod host;
pub mod library_file;
mod progress;
pub mod summary;
pub mod sync;
pub mod task;
pub mod update;

#[cfg(test)]
pub(crate) mod test_support;

pub use buckets::{BucketKind, SyncAction, SyncBuckets};
pub use diff::{classify_episode, classify_movie, Classification, SkipReason, WatchChange};
pub use error::SyncError;
pub use host::{AccountLinks, MediaHost, NoProgress, ProgressSink};
pub use library_file::LibraryFile;
pub use summary::{BucketFailure, SyncReport};
pub use sync::LibrarySync;
pub use task::{LibrarySyncTask, ScheduledTask, TaskTrigger, DEFAULT_SYNC_INTERVAL};

pub use tokio_util::sync::CancellationToken;
