use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::media_ids::MediaIds;
use crate::snapshot::CollectionMetadata;

/// Body of `POST /sync/collection`, `/sync/history` and `/sync/history/remove`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SyncRequest {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub movies: Vec<SyncMovie>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shows: Vec<SyncShow>,
}

impl SyncRequest {
    pub fn is_empty(&self) -> bool {
        self.movies.is_empty() && self.shows.is_empty()
    }

    pub fn episode_count(&self) -> usize {
        self.shows
            .iter()
            .flat_map(|s| s.seasons.iter())
            .map(|s| s.episodes.len())
            .sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncMovie {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    pub ids: MediaIds,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collected_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watched_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub metadata: Option<CollectionMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncShow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    pub ids: MediaIds,
    #[serde(default)]
    pub seasons: Vec<SyncSeason>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncSeason {
    pub number: u32,
    #[serde(default)]
    pub episodes: Vec<SyncEpisode>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncEpisode {
    pub number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collected_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watched_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub metadata: Option<CollectionMetadata>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SyncCounts {
    #[serde(default)]
    pub movies: u32,
    #[serde(default)]
    pub shows: u32,
    #[serde(default)]
    pub seasons: u32,
    #[serde(default)]
    pub episodes: u32,
}

impl SyncCounts {
    pub fn is_zero(&self) -> bool {
        self.movies == 0 && self.shows == 0 && self.seasons == 0 && self.episodes == 0
    }
}

/// An entry Trakt could not resolve; only the identifying parts are echoed back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NotFoundEntry {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub ids: MediaIds,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NotFound {
    #[serde(default)]
    pub movies: Vec<NotFoundEntry>,
    #[serde(default)]
    pub shows: Vec<NotFoundEntry>,
    #[serde(default)]
    pub seasons: Vec<NotFoundEntry>,
    #[serde(default)]
    pub episodes: Vec<NotFoundEntry>,
}

impl NotFound {
    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
            && self.shows.is_empty()
            && self.seasons.is_empty()
            && self.episodes.is_empty()
    }

    /// Entries tagged with their kind, in a stable order for logging.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &NotFoundEntry)> {
        self.movies
            .iter()
            .map(|e| ("movie", e))
            .chain(self.shows.iter().map(|e| ("show", e)))
            .chain(self.seasons.iter().map(|e| ("season", e)))
            .chain(self.episodes.iter().map(|e| ("episode", e)))
    }
}

/// Response of every batched sync call. Collection and history adds fill
/// `added`/`existing`, history removal fills `deleted`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SyncResponse {
    #[serde(default)]
    pub added: SyncCounts,
    #[serde(default)]
    pub updated: SyncCounts,
    #[serde(default)]
    pub existing: SyncCounts,
    #[serde(default)]
    pub deleted: SyncCounts,
    #[serde(default)]
    pub not_found: NotFound,
}
