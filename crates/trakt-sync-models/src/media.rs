use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::media_ids::MediaIds;
use crate::snapshot::CollectionMetadata;

/// Where the host says an item's media lives.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LocationType {
    #[default]
    FileSystem,
    Remote,
    /// Placeholder created from metadata (missing episodes, upcoming releases).
    Virtual,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocalMovie {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub ids: MediaIds,
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub location_type: LocationType,
    #[serde(default)]
    pub date_added: Option<DateTime<Utc>>,
    /// Media details reported as collection metadata
    #[serde(default)]
    pub metadata: Option<CollectionMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocalEpisode {
    pub id: String,
    pub name: String,
    pub series_name: String,
    #[serde(default)]
    pub series_year: Option<u32>,
    #[serde(default)]
    pub series_ids: MediaIds,
    #[serde(default)]
    pub ids: MediaIds,
    #[serde(default)]
    pub season_number: Option<u32>,
    #[serde(default)]
    pub episode_number: Option<u32>,
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub location_type: LocationType,
    #[serde(default)]
    pub date_added: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: Option<CollectionMetadata>,
}

/// A syncable item from the host library.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LocalMediaItem {
    Movie(LocalMovie),
    Episode(LocalEpisode),
}

impl LocalMediaItem {
    pub fn id(&self) -> &str {
        match self {
            LocalMediaItem::Movie(movie) => &movie.id,
            LocalMediaItem::Episode(episode) => &episode.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            LocalMediaItem::Movie(movie) => &movie.name,
            LocalMediaItem::Episode(episode) => &episode.name,
        }
    }

    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            LocalMediaItem::Movie(movie) => movie.path.as_ref(),
            LocalMediaItem::Episode(episode) => episode.path.as_ref(),
        }
    }

    pub fn location_type(&self) -> LocationType {
        match self {
            LocalMediaItem::Movie(movie) => movie.location_type,
            LocalMediaItem::Episode(episode) => episode.location_type,
        }
    }

    /// Items backed by a real file. Virtual placeholders and path-less items
    /// never reach Trakt.
    pub fn has_real_file(&self) -> bool {
        let has_path = self
            .path()
            .map(|p| !p.as_os_str().is_empty())
            .unwrap_or(false);
        has_path && self.location_type() != LocationType::Virtual
    }
}

/// Per-user play state the host keeps for an item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PlayState {
    #[serde(default)]
    pub played: bool,
    #[serde(default)]
    pub play_count: u32,
    #[serde(default)]
    pub last_played_date: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(path: Option<&str>, location_type: LocationType) -> LocalMediaItem {
        LocalMediaItem::Movie(LocalMovie {
            id: "m1".to_string(),
            name: "Heat".to_string(),
            year: Some(1995),
            ids: MediaIds::new().with_imdb("tt0113277"),
            path: path.map(PathBuf::from),
            location_type,
            date_added: None,
            metadata: None,
        })
    }

    #[test]
    fn test_real_file_requires_path_and_non_virtual_location() {
        assert!(movie(Some("/media/heat.mkv"), LocationType::FileSystem).has_real_file());
        assert!(movie(Some("smb://nas/heat.mkv"), LocationType::Remote).has_real_file());
        assert!(!movie(None, LocationType::FileSystem).has_real_file());
        assert!(!movie(Some(""), LocationType::FileSystem).has_real_file());
        assert!(!movie(Some("/media/heat.mkv"), LocationType::Virtual).has_real_file());
    }

    #[test]
    fn test_item_deserializes_with_type_tag() {
        let json = r#"{
            "type": "episode",
            "id": "e1",
            "name": "Pilot",
            "series_name": "Lost",
            "series_ids": {"tvdb": 73739},
            "season_number": 1,
            "episode_number": 1,
            "path": "/tv/lost/s01e01.mkv"
        }"#;
        let item: LocalMediaItem = serde_json::from_str(json).unwrap();
        match item {
            LocalMediaItem::Episode(episode) => {
                assert_eq!(episode.series_ids.tvdb, Some(73739));
                assert_eq!(episode.location_type, LocationType::FileSystem);
            }
            LocalMediaItem::Movie(_) => panic!("expected an episode"),
        }
    }
}
