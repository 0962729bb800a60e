//! Records returned by Trakt's `/sync/watched/*` and `/sync/collection/*`
//! endpoints. Snapshots are fetched once per user run and only read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::media_ids::MediaIds;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TraktMovie {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub ids: MediaIds,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TraktShow {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub ids: MediaIds,
}

/// Media details Trakt stores per collected item (`extended=metadata`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CollectionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hdr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_channels: Option<String>,
    #[serde(rename = "3d", default, skip_serializing_if = "Option::is_none")]
    pub is_3d: Option<bool>,
}

impl CollectionMetadata {
    pub fn is_empty(&self) -> bool {
        fn blank(value: &Option<String>) -> bool {
            value.as_deref().map(str::is_empty).unwrap_or(true)
        }

        blank(&self.media_type)
            && blank(&self.resolution)
            && blank(&self.hdr)
            && blank(&self.audio)
            && blank(&self.audio_channels)
            && self.is_3d.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchedMovie {
    #[serde(default)]
    pub plays: u32,
    #[serde(default)]
    pub last_watched_at: Option<DateTime<Utc>>,
    pub movie: TraktMovie,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectedMovie {
    #[serde(default)]
    pub collected_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: Option<CollectionMetadata>,
    pub movie: TraktMovie,
}

impl CollectedMovie {
    /// Whether Trakt holds any media details for this entry.
    pub fn has_metadata(&self) -> bool {
        self.metadata.as_ref().map(|m| !m.is_empty()).unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchedEpisode {
    pub number: u32,
    #[serde(default)]
    pub plays: u32,
    #[serde(default)]
    pub last_watched_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchedSeason {
    pub number: u32,
    #[serde(default)]
    pub episodes: Vec<WatchedEpisode>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchedShow {
    #[serde(default)]
    pub plays: u32,
    #[serde(default)]
    pub last_watched_at: Option<DateTime<Utc>>,
    pub show: TraktShow,
    #[serde(default)]
    pub seasons: Vec<WatchedSeason>,
}

impl WatchedShow {
    /// True iff a season with `season` contains episode `episode` with plays > 0.
    pub fn is_episode_played(&self, season: u32, episode: u32) -> bool {
        self.seasons
            .iter()
            .filter(|s| s.number == season)
            .flat_map(|s| s.episodes.iter())
            .any(|e| e.number == episode && e.plays > 0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectedEpisode {
    pub number: u32,
    #[serde(default)]
    pub collected_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: Option<CollectionMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectedSeason {
    pub number: u32,
    #[serde(default)]
    pub episodes: Vec<CollectedEpisode>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectedShow {
    #[serde(default)]
    pub last_collected_at: Option<DateTime<Utc>>,
    pub show: TraktShow,
    #[serde(default)]
    pub seasons: Vec<CollectedSeason>,
}

impl CollectedShow {
    pub fn has_episode(&self, season: u32, episode: u32) -> bool {
        self.seasons
            .iter()
            .filter(|s| s.number == season)
            .flat_map(|s| s.episodes.iter())
            .any(|e| e.number == episode)
    }
}

/// The four snapshots fetched for one user before traversal.
#[derive(Debug, Clone, Default)]
pub struct RemoteSnapshots {
    pub watched_movies: Vec<WatchedMovie>,
    pub collected_movies: Vec<CollectedMovie>,
    pub watched_shows: Vec<WatchedShow>,
    pub collected_shows: Vec<CollectedShow>,
}

impl RemoteSnapshots {
    pub fn find_watched_movie(&self, ids: &MediaIds) -> Option<&WatchedMovie> {
        self.watched_movies.iter().find(|m| m.movie.ids.matches(ids))
    }

    pub fn find_collected_movie(&self, ids: &MediaIds) -> Option<&CollectedMovie> {
        self.collected_movies.iter().find(|m| m.movie.ids.matches(ids))
    }

    pub fn find_watched_show(&self, series_ids: &MediaIds) -> Option<&WatchedShow> {
        self.watched_shows.iter().find(|s| s.show.ids.matches(series_ids))
    }

    pub fn find_collected_show(&self, series_ids: &MediaIds) -> Option<&CollectedShow> {
        self.collected_shows.iter().find(|s| s.show.ids.matches(series_ids))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watched_show_parses_trakt_payload() {
        let json = r#"[{
            "plays": 3,
            "last_watched_at": "2014-10-11T17:00:54.000Z",
            "last_updated_at": "2014-10-11T17:00:54.000Z",
            "show": {"title": "Breaking Bad", "year": 2008, "ids": {"trakt": 1, "slug": "breaking-bad", "tvdb": 81189, "imdb": "tt0903747", "tmdb": 1396}},
            "seasons": [{"number": 1, "episodes": [
                {"number": 1, "plays": 1, "last_watched_at": "2014-10-11T17:00:54.000Z"},
                {"number": 2, "plays": 0, "last_watched_at": null}
            ]}]
        }]"#;
        let shows: Vec<WatchedShow> = serde_json::from_str(json).unwrap();
        assert_eq!(shows.len(), 1);
        assert_eq!(shows[0].show.ids.tvdb, Some(81189));
        assert!(shows[0].is_episode_played(1, 1));
        assert!(!shows[0].is_episode_played(1, 2));
        assert!(!shows[0].is_episode_played(2, 1));
    }

    #[test]
    fn test_collected_movie_metadata_presence() {
        let json = r#"[
            {"collected_at": "2014-09-01T09:10:11.000Z", "movie": {"title": "A", "year": 2009, "ids": {"trakt": 1}},
             "metadata": {"media_type": "bluray", "resolution": "hd_1080p", "3d": false}},
            {"collected_at": "2014-09-01T09:10:11.000Z", "movie": {"title": "B", "year": 2010, "ids": {"trakt": 2}},
             "metadata": {}},
            {"collected_at": "2014-09-01T09:10:11.000Z", "movie": {"title": "C", "year": 2011, "ids": {"trakt": 3}}}
        ]"#;
        let movies: Vec<CollectedMovie> = serde_json::from_str(json).unwrap();
        assert!(movies[0].has_metadata());
        assert_eq!(movies[0].metadata.as_ref().unwrap().is_3d, Some(false));
        assert!(!movies[1].has_metadata());
        assert!(!movies[2].has_metadata());
    }

    #[test]
    fn test_collected_show_has_episode() {
        let show = CollectedShow {
            last_collected_at: None,
            show: TraktShow::default(),
            seasons: vec![CollectedSeason {
                number: 2,
                episodes: vec![CollectedEpisode { number: 5, collected_at: None, metadata: None }],
            }],
        };
        assert!(show.has_episode(2, 5));
        assert!(!show.has_episode(1, 5));
        assert!(!show.has_episode(2, 6));
    }
}
