pub mod api;
pub mod auth;
pub mod client;

pub use client::TraktClient;

pub const DEFAULT_API_URL: &str = "https://api.trakt.tv";
