//! A media host backed by a JSON export of the library.
//!
//! ```json
//! {
//!   "users": [{"id": "u1", "name": "alice"}],
//!   "items": [{"type": "movie", "id": "m1", "name": "Heat", "path": "/movies/heat.mkv",
//!              "ids": {"imdb": "tt0113277"}}],
//!   "user_data": {"u1": {"m1": {"played": true, "play_count": 2}}}
//! }
//! ```

use crate::host::MediaHost;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use trakt_sync_models::{LocalMediaItem, LocalUser, PlayState};
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryFile {
    #[serde(default)]
    pub users: Vec<LocalUser>,
    #[serde(default)]
    pub items: Vec<LocalMediaItem>,
    /// Play state keyed by user id, then item id
    #[serde(default)]
    pub user_data: HashMap<String, HashMap<String, PlayState>>,
}

impl LibraryFile {
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read library file: {:?}", path))?;
        let library: LibraryFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse library file: {:?}", path))?;
        debug!(
            "Loaded library file {:?}: {} users, {} items",
            path,
            library.users.len(),
            library.items.len()
        );
        Ok(library)
    }
}

#[async_trait]
impl MediaHost for LibraryFile {
    async fn users(&self) -> Result<Vec<LocalUser>> {
        Ok(self.users.clone())
    }

    async fn library_items(&self, user: &LocalUser) -> Result<Vec<LocalMediaItem>> {
        if !self.users.iter().any(|known| known.id == user.id) {
            anyhow::bail!("Unknown user '{}' ({})", user.name, user.id);
        }
        Ok(self.items.clone())
    }

    fn play_state(&self, user: &LocalUser, item: &LocalMediaItem) -> PlayState {
        self.user_data
            .get(&user.id)
            .and_then(|states| states.get(item.id()))
            .cloned()
            .unwrap_or_default()
    }
}
