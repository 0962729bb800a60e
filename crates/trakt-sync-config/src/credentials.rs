use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Default)]
struct CredentialsData {
    #[serde(flatten)]
    data: HashMap<String, String>,
}

/// Flat key/value store for per-user Trakt tokens.
///
/// Keys are namespaced by local user id, e.g. `trakt_access_token.<user>`.
pub struct CredentialStore {
    path: PathBuf,
    credentials: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            credentials: HashMap::new(),
        }
    }

    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let creds_data: CredentialsData = toml::from_str(&content)?;
            self.credentials = creds_data.data;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let creds_data = CredentialsData {
            data: self.credentials.clone(),
        };
        let content = toml::to_string_pretty(&creds_data)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.credentials.get(key)
    }

    pub fn set(&mut self, key: String, value: String) {
        self.credentials.insert(key, value);
    }

    pub fn remove(&mut self, key: &str) {
        self.credentials.remove(key);
    }

    const USER_KEYS: [&str; 4] = [
        "trakt_access_token",
        "trakt_refresh_token",
        "trakt_token_expires",
        "trakt_username",
    ];

    fn user_key(prefix: &str, user_id: &str) -> String {
        format!("{}.{}", prefix, user_id)
    }

    pub fn get_trakt_access_token(&self, user_id: &str) -> Option<&String> {
        self.get(&Self::user_key("trakt_access_token", user_id))
    }

    pub fn set_trakt_access_token(&mut self, user_id: &str, token: String) {
        self.set(Self::user_key("trakt_access_token", user_id), token);
    }

    pub fn get_trakt_refresh_token(&self, user_id: &str) -> Option<&String> {
        self.get(&Self::user_key("trakt_refresh_token", user_id))
    }

    pub fn set_trakt_refresh_token(&mut self, user_id: &str, token: String) {
        self.set(Self::user_key("trakt_refresh_token", user_id), token);
    }

    pub fn get_trakt_token_expires(&self, user_id: &str) -> Option<DateTime<Utc>> {
        self.get(&Self::user_key("trakt_token_expires", user_id))
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn set_trakt_token_expires(&mut self, user_id: &str, expires: DateTime<Utc>) {
        self.set(Self::user_key("trakt_token_expires", user_id), expires.to_rfc3339());
    }

    pub fn get_trakt_username(&self, user_id: &str) -> Option<&String> {
        self.get(&Self::user_key("trakt_username", user_id))
    }

    pub fn set_trakt_username(&mut self, user_id: &str, username: String) {
        self.set(Self::user_key("trakt_username", user_id), username);
    }

    /// Drop every credential stored for a user (unlink)
    pub fn remove_user(&mut self, user_id: &str) {
        for prefix in Self::USER_KEYS {
            self.credentials.remove(&Self::user_key(prefix, user_id));
        }
    }

    /// A token that exists and is not past its expiry. Tokens without expiry
    /// information are assumed valid.
    pub fn has_valid_trakt_token(&self, user_id: &str, now: DateTime<Utc>) -> bool {
        match (self.get_trakt_access_token(user_id), self.get_trakt_token_expires(user_id)) {
            (Some(token), Some(expires)) => !token.is_empty() && expires > now,
            (Some(token), None) => !token.is_empty(),
            (None, _) => false,
        }
    }
}
