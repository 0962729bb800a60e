pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{
    default_scheduler_config, Config, LibraryConfig, SchedulerConfig, SyncOptions, TraktConfig,
    UserConfig, MAX_INTERVAL_HOURS,
};
pub use credentials::CredentialStore;
pub use paths::{container_base_path, PathManager};
