use crate::output::{Output, OutputFormat};
use crate::ConfigCommands;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;
use serde_json::json;
use trakt_sync_config::{default_scheduler_config, Config, PathManager};

pub async fn run_config(cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(full, output).await,
    }
}

fn mask_string(s: &str) -> String {
    if s.is_empty() || s == "YOUR_CLIENT_ID" || s == "YOUR_CLIENT_SECRET" {
        return "<not set>".to_string();
    }
    if s.len() <= 4 {
        return "*".repeat(s.len());
    }
    format!("{}***{}", &s[..2], &s[s.len() - 2..])
}

fn styled_table(header: &str) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new(header)
            .fg(comfy_table::Color::Cyan)
            .add_attribute(comfy_table::Attribute::Bold),
        Cell::new(""),
    ]);
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

async fn show_config(full: bool, output: &Output) -> Result<()> {
    let paths = PathManager::default();
    let config_file = paths.config_file();

    if !config_file.exists() {
        output.warn(format!("Configuration file not found at: {}", config_file.display()));
        output.info("Configuration will be created automatically when you run 'trakt-sync link <USER_ID>'.");
        return Ok(());
    }

    let config = Config::load_from_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
    let secret = |value: &str| if full { value.to_string() } else { mask_string(value) };
    let scheduler = config.scheduler.clone().unwrap_or_else(default_scheduler_config);
    let library_file = config.library_file(&paths);

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }

            println!("\n{}", "Configuration".bright_cyan().bold());
            println!("{}\n", config_file.display().to_string().dimmed());

            let mut trakt = styled_table("Trakt");
            trakt.add_row(vec![Cell::new("Client ID"), Cell::new(secret(&config.trakt.client_id))]);
            trakt.add_row(vec![Cell::new("Client Secret"), Cell::new(secret(&config.trakt.client_secret))]);
            trakt.add_row(vec![Cell::new("API URL"), Cell::new(&config.trakt.api_url)]);
            println!("{}", trakt);

            let mut sync = styled_table("Sync");
            sync.add_row(vec![Cell::new("Library file"), Cell::new(library_file.display())]);
            sync.add_row(vec![Cell::new("Dry run"), Cell::new(config.sync.dry_run)]);
            let schedule = match &scheduler.schedule {
                Some(cron) => format!("cron '{}'", cron),
                None => format!("every {} hours", scheduler.interval_hours),
            };
            sync.add_row(vec![Cell::new("Schedule"), Cell::new(schedule)]);
            sync.add_row(vec![Cell::new("Run on startup"), Cell::new(scheduler.run_on_startup)]);
            println!("{}", sync);

            if !config.users.is_empty() {
                let mut users = Table::new();
                users.set_header(vec![
                    Cell::new("User ID").add_attribute(comfy_table::Attribute::Bold),
                    Cell::new("Name").add_attribute(comfy_table::Attribute::Bold),
                    Cell::new("Enabled").add_attribute(comfy_table::Attribute::Bold),
                    Cell::new("Excluded locations").add_attribute(comfy_table::Attribute::Bold),
                ]);
                for user in &config.users {
                    let excluded: Vec<String> =
                        user.excluded_locations.iter().map(|p| p.display().to_string()).collect();
                    users.add_row(vec![
                        Cell::new(&user.id),
                        Cell::new(user.name.as_deref().unwrap_or("-")),
                        Cell::new(if user.enabled { "✓".green().to_string() } else { "✗".red().to_string() }),
                        Cell::new(excluded.join("\n")),
                    ]);
                }
                users.load_preset(comfy_table::presets::UTF8_FULL);
                users.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
                println!("{}", users);
            }
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let users: Vec<serde_json::Value> = config
                .users
                .iter()
                .map(|user| {
                    json!({
                        "id": user.id,
                        "name": user.name,
                        "enabled": user.enabled,
                        "excluded_locations": user.excluded_locations,
                    })
                })
                .collect();
            output.json(&json!({
                "config_file": config_file,
                "trakt": {
                    "client_id": secret(&config.trakt.client_id),
                    "client_secret": secret(&config.trakt.client_secret),
                    "api_url": config.trakt.api_url,
                },
                "library": { "file": library_file },
                "sync": { "dry_run": config.sync.dry_run },
                "scheduler": {
                    "interval_hours": scheduler.interval_hours,
                    "schedule": scheduler.schedule,
                    "run_on_startup": scheduler.run_on_startup,
                },
                "users": users,
            }));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_string() {
        assert_eq!(mask_string(""), "<not set>");
        assert_eq!(mask_string("abc"), "***");
        assert_eq!(mask_string("abcdef123456"), "ab***56");
    }
}
