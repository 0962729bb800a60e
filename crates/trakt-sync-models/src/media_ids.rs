use serde::{Deserialize, Serialize};

/// Provider identifiers shared by local library items and Trakt records.
///
/// The serialized shape is Trakt's `ids` object, so the same struct is used
/// when reading snapshots and when building sync payloads. Local items fill
/// in whatever the host's metadata providers resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct MediaIds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trakt: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmdb: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tvdb: Option<u32>,
}

impl MediaIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_imdb(mut self, imdb: impl Into<String>) -> Self {
        self.imdb = Some(imdb.into());
        self
    }

    pub fn with_tmdb(mut self, tmdb: u32) -> Self {
        self.tmdb = Some(tmdb);
        self
    }

    pub fn with_tvdb(mut self, tvdb: u32) -> Self {
        self.tvdb = Some(tvdb);
        self
    }

    pub fn with_trakt(mut self, trakt: u64) -> Self {
        self.trakt = Some(trakt);
        self
    }

    /// Check if all ID fields are empty
    pub fn is_empty(&self) -> bool {
        self.trakt.is_none()
            && self.slug.is_none()
            && self.imdb.as_deref().map(str::is_empty).unwrap_or(true)
            && self.tmdb.is_none()
            && self.tvdb.is_none()
    }

    /// IMDB id with the stray slashes Trakt sometimes returns removed, lowercased.
    pub fn normalized_imdb(&self) -> Option<String> {
        self.imdb
            .as_deref()
            .map(|s| s.replace('/', "").trim().to_lowercase())
            .filter(|s| !s.is_empty())
    }

    /// True when both sides carry at least one identical ID of the same kind.
    pub fn matches(&self, other: &MediaIds) -> bool {
        if let (Some(a), Some(b)) = (self.normalized_imdb(), other.normalized_imdb()) {
            if a == b {
                return true;
            }
        }

        if let (Some(a), Some(b)) = (self.trakt, other.trakt) {
            if a == b {
                return true;
            }
        }

        if let (Some(a), Some(b)) = (self.tmdb, other.tmdb) {
            if a == b {
                return true;
            }
        }

        if let (Some(a), Some(b)) = (self.tvdb, other.tvdb) {
            if a == b {
                return true;
            }
        }

        false
    }

    /// Short human-readable form used in log lines.
    pub fn describe(&self) -> String {
        self.normalized_imdb()
            .or_else(|| self.tmdb.map(|id| format!("tmdb:{}", id)))
            .or_else(|| self.tvdb.map(|id| format!("tvdb:{}", id)))
            .or_else(|| self.trakt.map(|id| format!("trakt:{}", id)))
            .or_else(|| self.slug.clone())
            .unwrap_or_else(|| "<no ids>".to_string())
    }
}
