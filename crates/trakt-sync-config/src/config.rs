use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub trakt: TraktConfig,
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub sync: SyncOptions,
    #[serde(default)]
    pub scheduler: Option<SchedulerConfig>,
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TraktConfig {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

/// Where the host library export lives when running outside a media server.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LibraryConfig {
    #[serde(default)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SyncOptions {
    /// Classify and log, but never POST to Trakt
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SchedulerConfig {
    #[serde(default = "default_interval_hours")]
    pub interval_hours: u64,
    /// Six-field cron expression (seconds first); overrides `interval_hours`
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default = "default_true")]
    pub run_on_startup: bool,
}

/// A local user that may be linked to a Trakt account.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserConfig {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Library path prefixes never pushed to Trakt for this user
    #[serde(default)]
    pub excluded_locations: Vec<PathBuf>,
}

/// Longest accepted scheduler interval (one year).
pub const MAX_INTERVAL_HOURS: u64 = 24 * 365;

fn default_true() -> bool {
    true
}

fn default_api_url() -> String {
    "https://api.trakt.tv".to_string()
}

fn default_interval_hours() -> u64 {
    24
}

pub fn default_scheduler_config() -> SchedulerConfig {
    SchedulerConfig {
        interval_hours: default_interval_hours(),
        schedule: None,
        run_on_startup: default_true(),
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.is_trakt_configured() {
            return Err(anyhow::anyhow!("Trakt client_id/client_secret are not configured"));
        }

        if !self.trakt.api_url.starts_with("http://") && !self.trakt.api_url.starts_with("https://") {
            return Err(anyhow::anyhow!("Invalid Trakt api_url: {}", self.trakt.api_url));
        }

        let mut seen = HashSet::new();
        for user in &self.users {
            if user.id.trim().is_empty() {
                return Err(anyhow::anyhow!("User entries must have a non-empty id"));
            }
            if !seen.insert(user.id.as_str()) {
                return Err(anyhow::anyhow!("Duplicate user id in config: {}", user.id));
            }
        }

        if let Some(scheduler) = &self.scheduler {
            if scheduler.schedule.is_none() && scheduler.interval_hours == 0 {
                return Err(anyhow::anyhow!("scheduler.interval_hours must be greater than zero"));
            }
            if scheduler.interval_hours > MAX_INTERVAL_HOURS {
                return Err(anyhow::anyhow!(
                    "scheduler.interval_hours must be at most {} (one year), got {}",
                    MAX_INTERVAL_HOURS,
                    scheduler.interval_hours
                ));
            }
        }

        Ok(())
    }

    pub fn is_trakt_configured(&self) -> bool {
        !self.trakt.client_id.is_empty()
            && self.trakt.client_id != "YOUR_CLIENT_ID"
            && !self.trakt.client_secret.is_empty()
            && self.trakt.client_secret != "YOUR_CLIENT_SECRET"
    }

    pub fn user(&self, id: &str) -> Option<&UserConfig> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Library file from config, falling back to the data directory default
    pub fn library_file(&self, paths: &crate::PathManager) -> PathBuf {
        self.library
            .file
            .clone()
            .unwrap_or_else(|| paths.default_library_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn test_config() -> Config {
        Config {
            trakt: TraktConfig {
                client_id: "test_id".to_string(),
                client_secret: "test_secret".to_string(),
                api_url: default_api_url(),
            },
            library: LibraryConfig::default(),
            sync: SyncOptions::default(),
            scheduler: None,
            users: vec![UserConfig {
                id: "u1".to_string(),
                name: Some("alice".to_string()),
                enabled: true,
                excluded_locations: vec![PathBuf::from("/media/home-videos")],
            }],
        }
    }

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let config = test_config();

        let path = file.path().to_path_buf();
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.trakt.client_id, "test_id");
        assert_eq!(loaded.trakt.client_secret, "test_secret");
        assert_eq!(loaded.users.len(), 1);
        assert_eq!(loaded.users[0].excluded_locations, vec![PathBuf::from("/media/home-videos")]);
        assert!(!loaded.sync.dry_run);
    }

    #[test]
    fn test_config_defaults_from_minimal_toml() {
        let config: Config = toml::from_str(
            r#"
            [trakt]
            client_id = "id"
            client_secret = "secret"

            [[users]]
            id = "u1"
            "#,
        )
        .unwrap();
        assert_eq!(config.trakt.api_url, "https://api.trakt.tv");
        assert!(config.users[0].enabled);
        assert!(config.users[0].excluded_locations.is_empty());
        assert!(config.scheduler.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validate() {
        let mut config = test_config();
        assert!(config.validate().is_ok());

        config.trakt.client_id = "YOUR_CLIENT_ID".to_string();
        assert!(config.validate().is_err());
        assert!(!config.is_trakt_configured());

        let mut config = test_config();
        config.users.push(config.users[0].clone());
        assert!(config.validate().is_err());

        let mut config = test_config();
        config.scheduler = Some(SchedulerConfig {
            interval_hours: 0,
            schedule: None,
            run_on_startup: false,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_library_file_fallback() {
        let dir = tempfile::TempDir::new().unwrap();
        let paths = crate::PathManager::with_base(dir.path().to_path_buf());
        let mut config = test_config();
        assert_eq!(config.library_file(&paths), paths.default_library_file());

        config.library.file = Some(PathBuf::from("/srv/library.json"));
        assert_eq!(config.library_file(&paths), PathBuf::from("/srv/library.json"));
    }

    #[test]
    fn test_validate_bounds_interval_hours() {
        let mut config = test_config();
        config.scheduler = Some(SchedulerConfig {
            interval_hours: MAX_INTERVAL_HOURS,
            schedule: None,
            run_on_startup: true,
        });
        assert!(config.validate().is_ok());

        config.scheduler = Some(SchedulerConfig {
            interval_hours: u64::MAX / 60,
            schedule: None,
            run_on_startup: true,
        });
        assert!(config.validate().is_err());
    }
}
