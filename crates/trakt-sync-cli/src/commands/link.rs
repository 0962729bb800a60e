use super::prompts;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use owo_colors::OwoColorize;
use trakt_sync_api::trakt::auth::{authorization_url, exchange_code};
use trakt_sync_api::{TraktClient, DEFAULT_API_URL};
use trakt_sync_config::{Config, CredentialStore, LibraryConfig, PathManager, SyncOptions, TraktConfig, UserConfig};
use tracing::warn;

/// Validates Trakt Client ID format
fn validate_client_id(input: &str) -> Result<(), &'static str> {
    if input.is_empty() {
        return Err("Client ID cannot be empty");
    }
    if input.len() < 10 {
        return Err("Client ID seems too short. Please verify it's correct.");
    }
    Ok(())
}

/// Load the config, asking for the Trakt API application on first use.
fn load_or_create_config(paths: &PathManager, output: &Output) -> Result<Config> {
    let config_file = paths.config_file();
    let mut config = if config_file.exists() {
        Config::load_from_file(&config_file)
            .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?
    } else {
        Config {
            trakt: TraktConfig {
                client_id: String::new(),
                client_secret: String::new(),
                api_url: DEFAULT_API_URL.to_string(),
            },
            library: LibraryConfig::default(),
            sync: SyncOptions::default(),
            scheduler: Some(trakt_sync_config::default_scheduler_config()),
            users: Vec::new(),
        }
    };

    if config.is_trakt_configured() {
        return Ok(config);
    }

    output.println("");
    output.println(format!("{}", "Trakt API Setup".bold().bright_cyan()));
    output.println("  1. Login to Trakt and open https://trakt.tv/oauth/applications");
    output.println("  2. Create an application named 'trakt-sync'");
    output.println("  3. Use 'urn:ietf:wg:oauth:2.0:oob' as the Redirect URI");
    output.println("");

    let client_id = loop {
        let input = prompts::prompt_string("Trakt Client ID", None)?;
        match validate_client_id(&input) {
            Ok(()) => break input,
            Err(e) => output.error(format!("Validation error: {}", e)),
        }
    };
    let client_secret = prompts::prompt_secret("Trakt Client Secret")?;
    if client_secret.is_empty() {
        return Err(eyre!("Client Secret is required"));
    }

    config.trakt.client_id = client_id;
    config.trakt.client_secret = client_secret;
    config
        .save_to_file(&config_file)
        .map_err(|e| eyre!("Failed to save config to {}: {}", config_file.display(), e))?;
    Ok(config)
}

pub async fn run_link(user_id: String, code: Option<String>, output: &Output) -> Result<()> {
    let paths = PathManager::default();
    let mut config = load_or_create_config(&paths, output)?;
    let client = TraktClient::new(config.trakt.client_id.clone()).with_base_url(config.trakt.api_url.clone());

    let code = match code {
        Some(code) => code,
        None => {
            output.println("");
            output.println(format!(
                "{} Open this URL, approve access and paste the code shown:",
                "→".bright_blue()
            ));
            output.println(format!("  {}", authorization_url(&config.trakt.client_id).bright_white()));
            output.println("");
            prompts::prompt_string("Authorization code", None)?
        }
    };

    let token_info = exchange_code(
        client.http(),
        client.base_url(),
        &config.trakt.client_id,
        &config.trakt.client_secret,
        &code,
    )
    .await
    .map_err(|e| eyre!("Trakt OAuth authentication failed: {:#}", e))?;

    let username = match client.username(&token_info.access_token).await {
        Ok(username) => Some(username),
        Err(e) => {
            warn!(category = e.category(), "Could not resolve Trakt username: {}", e);
            None
        }
    };

    let credentials_file = paths.credentials_file();
    let mut credentials = CredentialStore::new(credentials_file.clone());
    credentials
        .load()
        .map_err(|e| eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;
    credentials.set_trakt_access_token(&user_id, token_info.access_token);
    credentials.set_trakt_refresh_token(&user_id, token_info.refresh_token);
    credentials.set_trakt_token_expires(&user_id, token_info.expires_at);
    if let Some(username) = &username {
        credentials.set_trakt_username(&user_id, username.clone());
    }
    credentials
        .save()
        .map_err(|e| eyre!("Failed to save credentials to {}: {}", credentials_file.display(), e))?;

    if config.user(&user_id).is_none() {
        config.users.push(UserConfig {
            id: user_id.clone(),
            name: None,
            enabled: true,
            excluded_locations: Vec::new(),
        });
        let config_file = paths.config_file();
        config
            .save_to_file(&config_file)
            .map_err(|e| eyre!("Failed to save config to {}: {}", config_file.display(), e))?;
    }

    output.success(format!(
        "Linked user '{}' to Trakt{}",
        user_id,
        username.map(|u| format!(" account '{}'", u)).unwrap_or_default()
    ));
    output.println(format!("  Access token expires at: {}", token_info.expires_at.to_rfc3339().bright_green()));
    Ok(())
}

pub async fn run_unlink(user_id: String, output: &Output) -> Result<()> {
    let paths = PathManager::default();
    let credentials_file = paths.credentials_file();
    let mut credentials = CredentialStore::new(credentials_file.clone());
    credentials
        .load()
        .map_err(|e| eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;

    if credentials.get_trakt_access_token(&user_id).is_none() {
        output.warn(format!("User '{}' is not linked to Trakt", user_id));
        return Ok(());
    }

    credentials.remove_user(&user_id);
    credentials
        .save()
        .map_err(|e| eyre!("Failed to save credentials to {}: {}", credentials_file.display(), e))?;
    output.success(format!("Removed Trakt link of user '{}'", user_id));
    Ok(())
}
