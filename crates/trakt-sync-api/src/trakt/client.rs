use crate::error::ApiError;
use crate::traits::TraktApi;
use crate::trakt::{api, auth, DEFAULT_API_URL};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use trakt_sync_models::{
    CollectedMovie, CollectedShow, SyncRequest, SyncResponse, TraktAccount, WatchedMovie,
    WatchedShow,
};
use tracing::debug;

#[derive(Clone)]
pub struct TraktClient {
    client: Arc<Client>,
    client_id: String,
    base_url: String,
}

impl TraktClient {
    pub fn new(client_id: String) -> Self {
        Self {
            client: Arc::new(auth::create_trakt_client()),
            client_id,
            base_url: DEFAULT_API_URL.to_string(),
        }
    }

    /// Point the client at another API host (staging, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn http(&self) -> &Client {
        &self.client
    }

    pub async fn username(&self, access_token: &str) -> Result<String, ApiError> {
        api::get_encoded_username(&self.client, &self.base_url, access_token, &self.client_id).await
    }
}

impl std::fmt::Debug for TraktClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraktClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl TraktApi for TraktClient {
    async fn watched_movies(&self, account: &TraktAccount) -> Result<Vec<WatchedMovie>, ApiError> {
        let movies =
            api::get_watched_movies(&self.client, &self.base_url, &account.access_token, &self.client_id)
                .await?;
        debug!("Fetched Trakt watched movies: total_items={}", movies.len());
        Ok(movies)
    }

    async fn collected_movies(&self, account: &TraktAccount) -> Result<Vec<CollectedMovie>, ApiError> {
        let movies =
            api::get_collected_movies(&self.client, &self.base_url, &account.access_token, &self.client_id)
                .await?;
        debug!("Fetched Trakt collected movies: total_items={}", movies.len());
        Ok(movies)
    }

    async fn watched_shows(&self, account: &TraktAccount) -> Result<Vec<WatchedShow>, ApiError> {
        let shows =
            api::get_watched_shows(&self.client, &self.base_url, &account.access_token, &self.client_id)
                .await?;
        debug!("Fetched Trakt watched shows: total_items={}", shows.len());
        Ok(shows)
    }

    async fn collected_shows(&self, account: &TraktAccount) -> Result<Vec<CollectedShow>, ApiError> {
        let shows =
            api::get_collected_shows(&self.client, &self.base_url, &account.access_token, &self.client_id)
                .await?;
        debug!("Fetched Trakt collected shows: total_items={}", shows.len());
        Ok(shows)
    }

    async fn add_to_collection(
        &self,
        account: &TraktAccount,
        request: &SyncRequest,
    ) -> Result<SyncResponse, ApiError> {
        api::add_to_collection(&self.client, &self.base_url, &account.access_token, &self.client_id, request)
            .await
    }

    async fn add_to_history(
        &self,
        account: &TraktAccount,
        request: &SyncRequest,
    ) -> Result<SyncResponse, ApiError> {
        api::add_to_history(&self.client, &self.base_url, &account.access_token, &self.client_id, request)
            .await
    }

    async fn remove_from_history(
        &self,
        account: &TraktAccount,
        request: &SyncRequest,
    ) -> Result<SyncResponse, ApiError> {
        api::remove_from_history(&self.client, &self.base_url, &account.access_token, &self.client_id, request)
            .await
    }
}
