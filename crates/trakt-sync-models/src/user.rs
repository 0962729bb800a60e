use serde::{Deserialize, Serialize};

/// A user account on the media host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct LocalUser {
    pub id: String,
    pub name: String,
}

impl LocalUser {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into() }
    }
}

/// Credentials for the Trakt account a local user is linked to.
#[derive(Clone, PartialEq, Eq)]
pub struct TraktAccount {
    pub username: Option<String>,
    pub access_token: String,
}

impl TraktAccount {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self { username: None, access_token: access_token.into() }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

// Keep tokens out of logs.
impl std::fmt::Debug for TraktAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraktAccount")
            .field("username", &self.username)
            .field("access_token", &"***")
            .finish()
    }
}
