pub mod media;
pub mod media_ids;
pub mod snapshot;
pub mod sync_payload;
pub mod user;

pub use media::{LocalEpisode, LocalMediaItem, LocalMovie, LocationType, PlayState};
pub use media_ids::MediaIds;
pub use snapshot::{
    CollectedEpisode, CollectedMovie, CollectedSeason, CollectedShow, CollectionMetadata,
    RemoteSnapshots, TraktMovie, TraktShow, WatchedEpisode, WatchedMovie, WatchedSeason,
    WatchedShow,
};
pub use sync_payload::{
    NotFound, NotFoundEntry, SyncCounts, SyncEpisode, SyncMovie, SyncRequest, SyncResponse,
    SyncSeason, SyncShow,
};
pub use user::{LocalUser, TraktAccount};
