use crate::error::ApiError;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use trakt_sync_models::{
    CollectedMovie, CollectedShow, SyncRequest, SyncResponse, WatchedMovie, WatchedShow,
};
use tracing::{debug, warn};

pub(crate) const WATCHED_MOVIES: &str = "/sync/watched/movies";
pub(crate) const COLLECTED_MOVIES: &str = "/sync/collection/movies?extended=metadata";
pub(crate) const WATCHED_SHOWS: &str = "/sync/watched/shows";
pub(crate) const COLLECTED_SHOWS: &str = "/sync/collection/shows?extended=metadata";
pub(crate) const ADD_COLLECTION: &str = "/sync/collection";
pub(crate) const ADD_HISTORY: &str = "/sync/history";
pub(crate) const REMOVE_HISTORY: &str = "/sync/history/remove";

/// Attach the headers every authenticated Trakt call needs.
fn authorized(builder: RequestBuilder, access_token: &str, client_id: &str) -> RequestBuilder {
    builder
        .header("Authorization", format!("Bearer {}", access_token))
        .header("trakt-api-version", "2")
        .header("trakt-api-key", client_id)
        .header("Accept", "application/json")
        .header("Content-Type", "application/json")
}

async fn read_body<T: DeserializeOwned>(
    response: reqwest::Response,
    endpoint: &str,
) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!("Trakt API error: {} - {}. Endpoint: {}", status, body, endpoint);
        return Err(ApiError::Http {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    // Parse from text so decode failures are reported separately from transport ones
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|source| {
        if text.len() < 500 {
            debug!("Trakt raw response from {}: {}", endpoint, text);
        }
        ApiError::Decode {
            endpoint: endpoint.to_string(),
            source,
        }
    })
}

async fn get_json<T: DeserializeOwned>(
    client: &Client,
    base_url: &str,
    endpoint: &str,
    access_token: &str,
    client_id: &str,
) -> Result<T, ApiError> {
    let url = format!("{}{}", base_url.trim_end_matches('/'), endpoint);
    let response = authorized(client.get(&url), access_token, client_id)
        .send()
        .await?;
    read_body(response, endpoint).await
}

async fn post_sync(
    client: &Client,
    base_url: &str,
    endpoint: &str,
    access_token: &str,
    client_id: &str,
    request: &SyncRequest,
) -> Result<SyncResponse, ApiError> {
    if request.is_empty() {
        return Err(ApiError::InvalidArgument(format!(
            "refusing to POST an empty payload to {}",
            endpoint
        )));
    }
    if let Some(movie) = request.movies.iter().find(|m| m.ids.is_empty()) {
        return Err(ApiError::InvalidArgument(format!(
            "movie {:?} has no ids",
            movie.title
        )));
    }
    if let Some(show) = request.shows.iter().find(|s| s.ids.is_empty()) {
        return Err(ApiError::InvalidArgument(format!(
            "show {:?} has no ids",
            show.title
        )));
    }

    debug!(
        "POST {}: movies={}, shows={}, episodes={}",
        endpoint,
        request.movies.len(),
        request.shows.len(),
        request.episode_count()
    );

    let url = format!("{}{}", base_url.trim_end_matches('/'), endpoint);
    let response = authorized(client.post(&url), access_token, client_id)
        .json(request)
        .send()
        .await?;
    read_body(response, endpoint).await
}

/// Fetch every movie the user has watched, with play counts
pub async fn get_watched_movies(
    client: &Client,
    base_url: &str,
    access_token: &str,
    client_id: &str,
) -> Result<Vec<WatchedMovie>, ApiError> {
    get_json(client, base_url, WATCHED_MOVIES, access_token, client_id).await
}

/// Fetch the user's movie collection including media metadata
pub async fn get_collected_movies(
    client: &Client,
    base_url: &str,
    access_token: &str,
    client_id: &str,
) -> Result<Vec<CollectedMovie>, ApiError> {
    get_json(client, base_url, COLLECTED_MOVIES, access_token, client_id).await
}

pub async fn get_watched_shows(
    client: &Client,
    base_url: &str,
    access_token: &str,
    client_id: &str,
) -> Result<Vec<WatchedShow>, ApiError> {
    get_json(client, base_url, WATCHED_SHOWS, access_token, client_id).await
}

pub async fn get_collected_shows(
    client: &Client,
    base_url: &str,
    access_token: &str,
    client_id: &str,
) -> Result<Vec<CollectedShow>, ApiError> {
    get_json(client, base_url, COLLECTED_SHOWS, access_token, client_id).await
}

/// Add movies and episodes to the user's collection
pub async fn add_to_collection(
    client: &Client,
    base_url: &str,
    access_token: &str,
    client_id: &str,
    request: &SyncRequest,
) -> Result<SyncResponse, ApiError> {
    post_sync(client, base_url, ADD_COLLECTION, access_token, client_id, request).await
}

/// Add plays to the user's watch history
pub async fn add_to_history(
    client: &Client,
    base_url: &str,
    access_token: &str,
    client_id: &str,
    request: &SyncRequest,
) -> Result<SyncResponse, ApiError> {
    post_sync(client, base_url, ADD_HISTORY, access_token, client_id, request).await
}

/// Remove all plays of the given items from the user's watch history
pub async fn remove_from_history(
    client: &Client,
    base_url: &str,
    access_token: &str,
    client_id: &str,
    request: &SyncRequest,
) -> Result<SyncResponse, ApiError> {
    post_sync(client, base_url, REMOVE_HISTORY, access_token, client_id, request).await
}

/// Resolve the Trakt username (slug) of the token's owner, URL-encoded
pub async fn get_encoded_username(
    client: &Client,
    base_url: &str,
    access_token: &str,
    client_id: &str,
) -> Result<String, ApiError> {
    let json: serde_json::Value =
        get_json(client, base_url, "/users/me", access_token, client_id).await?;
    let slug = json["ids"]["slug"]
        .as_str()
        .or_else(|| json["username"].as_str())
        .ok_or_else(|| ApiError::InvalidArgument("user profile has no slug".to_string()))?;

    Ok(urlencoding::encode(slug).to_string())
}
