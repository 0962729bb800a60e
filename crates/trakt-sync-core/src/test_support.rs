//! In-memory fakes shared by the sync and task tests.

use crate::host::MediaHost;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Mutex;
use trakt_sync_api::{ApiError, TraktApi};
use trakt_sync_models::{
    CollectedMovie, CollectedShow, LocalEpisode, LocalMediaItem, LocalMovie, LocalUser,
    LocationType, MediaIds, PlayState, RemoteSnapshots, SyncRequest, SyncResponse, TraktAccount,
    WatchedMovie, WatchedShow,
};

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub token: String,
    pub endpoint: &'static str,
    pub request: Option<SyncRequest>,
}

/// Trakt fake keyed by access token; records every call in order.
#[derive(Default)]
pub(crate) struct FakeTrakt {
    snapshots: HashMap<String, RemoteSnapshots>,
    failing_endpoints: HashSet<&'static str>,
    failing_tokens: HashSet<String>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeTrakt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshots(mut self, token: &str, snapshots: RemoteSnapshots) -> Self {
        self.snapshots.insert(token.to_string(), snapshots);
        self
    }

    /// Every call to `endpoint` fails with a 500.
    pub fn failing(mut self, endpoint: &'static str) -> Self {
        self.failing_endpoints.insert(endpoint);
        self
    }

    /// Snapshot fetches for `token` fail with a 401.
    pub fn failing_snapshots_for(mut self, token: &str) -> Self {
        self.failing_tokens.insert(token.to_string());
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn endpoints(&self) -> Vec<&'static str> {
        self.calls().iter().map(|call| call.endpoint).collect()
    }

    pub fn update_calls(&self) -> Vec<RecordedCall> {
        self.calls().into_iter().filter(|call| call.request.is_some()).collect()
    }

    fn record(
        &self,
        account: &TraktAccount,
        endpoint: &'static str,
        request: Option<&SyncRequest>,
    ) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(RecordedCall {
            token: account.access_token.clone(),
            endpoint,
            request: request.cloned(),
        });
        if request.is_none() && self.failing_tokens.contains(&account.access_token) {
            return Err(ApiError::Http { endpoint: endpoint.to_string(), status: 401, body: String::new() });
        }
        if self.failing_endpoints.contains(endpoint) {
            return Err(ApiError::Http { endpoint: endpoint.to_string(), status: 500, body: "boom".to_string() });
        }
        Ok(())
    }

    fn snapshots(&self, account: &TraktAccount) -> RemoteSnapshots {
        self.snapshots.get(&account.access_token).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl TraktApi for FakeTrakt {
    async fn watched_movies(&self, account: &TraktAccount) -> Result<Vec<WatchedMovie>, ApiError> {
        self.record(account, "watched_movies", None)?;
        Ok(self.snapshots(account).watched_movies)
    }

    async fn collected_movies(&self, account: &TraktAccount) -> Result<Vec<CollectedMovie>, ApiError> {
        self.record(account, "collected_movies", None)?;
        Ok(self.snapshots(account).collected_movies)
    }

    async fn watched_shows(&self, account: &TraktAccount) -> Result<Vec<WatchedShow>, ApiError> {
        self.record(account, "watched_shows", None)?;
        Ok(self.snapshots(account).watched_shows)
    }

    async fn collected_shows(&self, account: &TraktAccount) -> Result<Vec<CollectedShow>, ApiError> {
        self.record(account, "collected_shows", None)?;
        Ok(self.snapshots(account).collected_shows)
    }

    async fn add_to_collection(&self, account: &TraktAccount, request: &SyncRequest) -> Result<SyncResponse, ApiError> {
        self.record(account, "add_to_collection", Some(request))?;
        Ok(SyncResponse::default())
    }

    async fn add_to_history(&self, account: &TraktAccount, request: &SyncRequest) -> Result<SyncResponse, ApiError> {
        self.record(account, "add_to_history", Some(request))?;
        Ok(SyncResponse::default())
    }

    async fn remove_from_history(&self, account: &TraktAccount, request: &SyncRequest) -> Result<SyncResponse, ApiError> {
        self.record(account, "remove_from_history", Some(request))?;
        Ok(SyncResponse::default())
    }
}

/// Host fake: one shared library, play state per (user id, item id).
#[derive(Default)]
pub(crate) struct FakeHost {
    pub users: Vec<LocalUser>,
    pub items: Vec<LocalMediaItem>,
    pub play_states: HashMap<(String, String), PlayState>,
    pub library_requests: Mutex<Vec<String>>,
}

impl FakeHost {
    pub fn new(users: Vec<LocalUser>, items: Vec<LocalMediaItem>) -> Self {
        Self { users, items, ..Self::default() }
    }

    pub fn with_play_state(mut self, user_id: &str, item_id: &str, state: PlayState) -> Self {
        self.play_states.insert((user_id.to_string(), item_id.to_string()), state);
        self
    }
}

#[async_trait]
impl MediaHost for FakeHost {
    async fn users(&self) -> anyhow::Result<Vec<LocalUser>> {
        Ok(self.users.clone())
    }

    async fn library_items(&self, user: &LocalUser) -> anyhow::Result<Vec<LocalMediaItem>> {
        self.library_requests.lock().unwrap().push(user.id.clone());
        Ok(self.items.clone())
    }

    fn play_state(&self, user: &LocalUser, item: &LocalMediaItem) -> PlayState {
        self.play_states
            .get(&(user.id.clone(), item.id().to_string()))
            .cloned()
            .unwrap_or_default()
    }
}

pub(crate) fn movie(id: &str, imdb_id: &str) -> LocalMediaItem {
    LocalMediaItem::Movie(LocalMovie {
        id: id.to_string(),
        name: format!("Movie {}", id),
        year: Some(2001),
        ids: MediaIds::new().with_imdb(imdb_id),
        path: Some(PathBuf::from(format!("/movies/{}.mkv", id))),
        location_type: LocationType::FileSystem,
        date_added: None,
        metadata: None,
    })
}

pub(crate) fn episode(id: &str, series_tvdb: u32, season: u32, number: u32) -> LocalMediaItem {
    LocalMediaItem::Episode(LocalEpisode {
        id: id.to_string(),
        name: format!("Episode {}", number),
        series_name: format!("Series {}", series_tvdb),
        series_year: None,
        series_ids: MediaIds::new().with_tvdb(series_tvdb),
        ids: MediaIds::new(),
        season_number: Some(season),
        episode_number: Some(number),
        path: Some(PathBuf::from(format!("/tv/{}.mkv", id))),
        location_type: LocationType::FileSystem,
        date_added: None,
        metadata: None,
    })
}

pub(crate) fn played(play_count: u32) -> PlayState {
    PlayState { played: true, play_count, last_played_date: None }
}
