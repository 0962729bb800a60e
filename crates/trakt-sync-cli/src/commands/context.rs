use chrono::Utc;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use trakt_sync_api::trakt::auth::refresh_access_token;
use trakt_sync_api::{TraktApi, TraktClient};
use trakt_sync_config::{Config, CredentialStore, PathManager};
use trakt_sync_core::{AccountLinks, LibraryFile, LibrarySync, LibrarySyncTask, MediaHost};
use trakt_sync_models::{LocalUser, TraktAccount};
use tracing::{debug, info, warn};

/// Config, credentials and Trakt client for one command invocation.
pub struct Context {
    pub paths: PathManager,
    pub config: Config,
    pub credentials: CredentialStore,
    pub client: TraktClient,
}

impl Context {
    pub fn load() -> Result<Self> {
        Self::load_from(PathManager::default())
    }

    pub fn load_from(paths: PathManager) -> Result<Self> {
        let config_file = paths.config_file();
        if !config_file.exists() {
            return Err(eyre!(
                "Configuration file not found at {}. Run 'trakt-sync link <USER_ID>' to create it.",
                config_file.display()
            ));
        }
        let config = Config::load_from_file(&config_file)
            .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
        config
            .validate()
            .map_err(|e| eyre!("Configuration validation failed: {}", e))?;

        let credentials_file = paths.credentials_file();
        let mut credentials = CredentialStore::new(credentials_file.clone());
        credentials
            .load()
            .map_err(|e| eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;

        Ok(Self::from_parts(paths, config, credentials))
    }

    pub fn from_parts(paths: PathManager, config: Config, credentials: CredentialStore) -> Self {
        let client = TraktClient::new(config.trakt.client_id.clone()).with_base_url(config.trakt.api_url.clone());
        Self { paths, config, credentials, client }
    }

    pub async fn library(&self) -> Result<LibraryFile> {
        let library_file = self.config.library_file(&self.paths);
        LibraryFile::load(&library_file)
            .await
            .map_err(|e| eyre!("{:#}", e))
    }

    /// Users taking part in a sync: not disabled in config and, when a
    /// selection is given, named in it.
    pub fn is_selected(&self, user: &LocalUser, only: &[String]) -> bool {
        let enabled = self.config.user(&user.id).map(|u| u.enabled).unwrap_or(true);
        enabled && (only.is_empty() || only.iter().any(|id| id == &user.id))
    }

    /// Trakt accounts of the selected users, refreshing expired tokens first.
    /// Users whose token cannot be refreshed are left unlinked for this run.
    pub async fn linked_accounts(
        &mut self,
        users: &[LocalUser],
        only: &[String],
    ) -> Result<HashMap<String, TraktAccount>> {
        let now = Utc::now();
        let mut accounts = HashMap::new();
        let mut refreshed = false;

        let selected: Vec<&LocalUser> = users.iter().filter(|user| self.is_selected(user, only)).collect();
        for user in selected {
            if self.credentials.get_trakt_access_token(&user.id).is_none() {
                debug!(user = %user.name, "No Trakt link");
                continue;
            }

            if !self.credentials.has_valid_trakt_token(&user.id, now) {
                let Some(refresh_token) = self.credentials.get_trakt_refresh_token(&user.id).cloned() else {
                    warn!(user = %user.name, "Trakt token expired and no refresh token is stored; run 'trakt-sync link {}'", user.id);
                    continue;
                };
                match refresh_access_token(
                    self.client.http(),
                    self.client.base_url(),
                    &self.config.trakt.client_id,
                    &self.config.trakt.client_secret,
                    &refresh_token,
                )
                .await
                {
                    Ok(token_info) => {
                        info!(operation = "token_refreshed", user = %user.name, "Refreshed Trakt token");
                        self.credentials.set_trakt_access_token(&user.id, token_info.access_token);
                        self.credentials.set_trakt_refresh_token(&user.id, token_info.refresh_token);
                        self.credentials.set_trakt_token_expires(&user.id, token_info.expires_at);
                        refreshed = true;
                    }
                    Err(e) => {
                        warn!(operation = "token_refresh_failed", user = %user.name, "Skipping user: {:#}", e);
                        continue;
                    }
                }
            }

            if let Some(token) = self.credentials.get_trakt_access_token(&user.id) {
                let mut account = TraktAccount::new(token.clone());
                if let Some(username) = self.credentials.get_trakt_username(&user.id) {
                    account = account.with_username(username.clone());
                }
                accounts.insert(user.id.clone(), account);
            }
        }

        if refreshed {
            self.credentials
                .save()
                .map_err(|e| eyre!("Failed to save refreshed credentials: {}", e))?;
        }

        Ok(accounts)
    }

    pub fn excluded_locations(&self) -> HashMap<String, Vec<PathBuf>> {
        self.config
            .users
            .iter()
            .filter(|user| !user.excluded_locations.is_empty())
            .map(|user| (user.id.clone(), user.excluded_locations.clone()))
            .collect()
    }

    /// Wire the library file, linked accounts and Trakt client into a task.
    pub async fn build_task(&mut self, dry_run: bool, only: &[String]) -> Result<LibrarySyncTask> {
        let library = self.library().await?;
        let links = self.linked_accounts(&library.users, only).await?;
        info!(
            operation = "links_resolved",
            linked = links.len(),
            users = library.users.len(),
            "{} of {} library users are linked to Trakt",
            links.len(),
            library.users.len()
        );

        let api: Arc<dyn TraktApi> = Arc::new(self.client.clone());
        let host: Arc<dyn MediaHost> = Arc::new(library);
        let links: Arc<dyn AccountLinks> = Arc::new(links);

        let sync = LibrarySync::new(api, host, links)
            .with_dry_run(dry_run || self.config.sync.dry_run)
            .with_excluded_locations(self.excluded_locations());
        Ok(LibrarySyncTask::new(sync))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;
    use trakt_sync_config::{LibraryConfig, SyncOptions, TraktConfig, UserConfig};

    fn context(dir: &TempDir) -> Context {
        let paths = PathManager::with_base(dir.path().to_path_buf());
        let config = Config {
            trakt: TraktConfig {
                client_id: "client-id-123456".to_string(),
                client_secret: "secret".to_string(),
                api_url: "http://127.0.0.1:9".to_string(),
            },
            library: LibraryConfig::default(),
            sync: SyncOptions::default(),
            scheduler: None,
            users: vec![
                UserConfig { id: "u2".to_string(), name: None, enabled: false, excluded_locations: Vec::new() },
                UserConfig {
                    id: "u3".to_string(),
                    name: None,
                    enabled: true,
                    excluded_locations: vec![PathBuf::from("/home-videos")],
                },
            ],
        };
        let mut credentials = CredentialStore::new(paths.credentials_file());
        for id in ["u1", "u2", "u3"] {
            credentials.set_trakt_access_token(id, format!("token-{}", id));
            credentials.set_trakt_token_expires(id, Utc::now() + Duration::days(30));
        }
        credentials.set_trakt_username("u1", "alice_trakt".to_string());
        Context::from_parts(paths, config, credentials)
    }

    fn users() -> Vec<LocalUser> {
        vec![
            LocalUser::new("u1", "alice"),
            LocalUser::new("u2", "bob"),
            LocalUser::new("u3", "carol"),
            LocalUser::new("u4", "dave"),
        ]
    }

    #[tokio::test]
    async fn test_linked_accounts_skip_disabled_and_unlinked_users() {
        let dir = TempDir::new().unwrap();
        let mut context = context(&dir);

        let accounts = context.linked_accounts(&users(), &[]).await.unwrap();

        let mut ids: Vec<&String> = accounts.keys().collect();
        ids.sort();
        assert_eq!(ids, vec!["u1", "u3"]);
        assert_eq!(accounts["u1"].username.as_deref(), Some("alice_trakt"));
        assert_eq!(accounts["u3"].access_token, "token-u3");
    }

    #[tokio::test]
    async fn test_selection_limits_linked_accounts() {
        let dir = TempDir::new().unwrap();
        let mut context = context(&dir);

        let accounts = context.linked_accounts(&users(), &["u3".to_string()]).await.unwrap();
        assert_eq!(accounts.len(), 1);
        assert!(accounts.contains_key("u3"));
    }

    #[tokio::test]
    async fn test_expired_token_without_refresh_token_is_unlinked() {
        let dir = TempDir::new().unwrap();
        let mut context = context(&dir);
        context.credentials.set_trakt_token_expires("u1", Utc::now() - Duration::hours(1));

        let accounts = context.linked_accounts(&users(), &[]).await.unwrap();
        assert!(!accounts.contains_key("u1"));
    }

    #[test]
    fn test_excluded_locations_by_user() {
        let dir = TempDir::new().unwrap();
        let context = context(&dir);
        let excluded = context.excluded_locations();
        assert_eq!(excluded.len(), 1);
        assert_eq!(excluded["u3"], vec![PathBuf::from("/home-videos")]);
    }
}
