use super::context::Context;
use crate::output::{Output, OutputFormat};
use chrono::Utc;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;
use serde_json::json;
use trakt_sync_core::MediaHost;

pub async fn run_users(output: &Output) -> Result<()> {
    let context = Context::load()?;
    let library = context.library().await?;
    let users = library.users().await.map_err(|e| color_eyre::eyre::eyre!("{:#}", e))?;
    let now = Utc::now();

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }
            if users.is_empty() {
                output.warn("The library file lists no users.");
                return Ok(());
            }

            let mut table = Table::new();
            table.set_header(vec![
                Cell::new("User ID").add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Name").add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Enabled").add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Trakt").add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Token expires").add_attribute(comfy_table::Attribute::Bold),
            ]);

            for user in &users {
                let enabled = context.is_selected(user, &[]);
                let linked = context.credentials.has_valid_trakt_token(&user.id, now);
                let trakt = match (context.credentials.get_trakt_access_token(&user.id), linked) {
                    (None, _) => "not linked".dimmed().to_string(),
                    (Some(_), false) => "expired".yellow().to_string(),
                    (Some(_), true) => context
                        .credentials
                        .get_trakt_username(&user.id)
                        .cloned()
                        .unwrap_or_else(|| "linked".to_string())
                        .green()
                        .to_string(),
                };
                let expires = context
                    .credentials
                    .get_trakt_token_expires(&user.id)
                    .map(|e| e.format("%Y-%m-%d %H:%M UTC").to_string())
                    .unwrap_or_else(|| "-".to_string());

                table.add_row(vec![
                    Cell::new(&user.id),
                    Cell::new(&user.name),
                    Cell::new(if enabled { "✓".green().to_string() } else { "✗".red().to_string() }),
                    Cell::new(trakt),
                    Cell::new(expires),
                ]);
            }

            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", table);
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let entries: Vec<serde_json::Value> = users
                .iter()
                .map(|user| {
                    json!({
                        "id": user.id,
                        "name": user.name,
                        "enabled": context.is_selected(user, &[]),
                        "linked": context.credentials.has_valid_trakt_token(&user.id, now),
                        "trakt_username": context.credentials.get_trakt_username(&user.id),
                        "token_expires": context.credentials.get_trakt_token_expires(&user.id).map(|e| e.to_rfc3339()),
                    })
                })
                .collect();
            output.json(&json!({ "users": entries }));
        }
    }

    Ok(())
}
