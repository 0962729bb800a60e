use super::context::Context;
use super::sync_ui::{is_interactive, SyncProgress};
use crate::output::{Output, OutputFormat};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use serde_json::json;
use trakt_sync_core::{CancellationToken, ScheduledTask, SyncError, SyncReport};
use tracing::warn;

pub async fn run_sync(dry_run: bool, users: Vec<String>, output: &Output) -> Result<()> {
    tracing::debug!("Sync command started");

    let mut context = Context::load()?;
    let task = context.build_task(dry_run, &users).await?;

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!(operation = "sync_interrupted", "Interrupt received, stopping after the current item");
            ctrl_c.cancel();
        }
    });

    let progress = SyncProgress::new(is_interactive() && output.is_human() && !output.is_quiet());
    let result = task.execute(&progress, cancel).await;

    match result {
        Ok(report) => {
            progress.finish("Done");
            print_report(&report, output);
            Ok(())
        }
        Err(SyncError::Cancelled) => {
            progress.finish("Cancelled");
            Err(eyre!("Sync cancelled"))
        }
        Err(e) => {
            progress.finish("Failed");
            Err(eyre!("Sync operation failed: {}", e))
        }
    }
}

fn print_report(report: &SyncReport, output: &Output) {
    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return;
            }
            if report.users_linked == 0 {
                output.warn("No library users are linked to Trakt. Run 'trakt-sync link <USER_ID>' first.");
                return;
            }

            if !report.items_sent.is_empty() {
                let mut table = Table::new();
                table.set_header(vec![
                    Cell::new("Bucket").add_attribute(comfy_table::Attribute::Bold),
                    Cell::new(if report.dry_run { "Would send" } else { "Sent" })
                        .add_attribute(comfy_table::Attribute::Bold),
                ]);
                for (bucket, count) in &report.items_sent {
                    table.add_row(vec![Cell::new(bucket.label()), Cell::new(count)]);
                }
                table.load_preset(comfy_table::presets::UTF8_FULL);
                table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
                println!("{}", table);
            }

            for (user, error) in &report.users_failed {
                output.error(format!("{}: {}", user, error));
            }
            for failure in &report.failures {
                output.error(format!("{} / {} ({}): {}", failure.user, failure.bucket, failure.category, failure.message));
            }
            if report.not_found > 0 {
                output.warn(format!("Trakt could not match {} items; run with -v for details", report.not_found));
            }

            let prefix = if report.dry_run { "Dry run completed" } else { "Sync completed" };
            output.success(format!(
                "{}: {} of {} linked users, {} items in {:.1}s",
                prefix,
                report.users_synced,
                report.users_linked,
                report.total_sent(),
                report.duration.as_secs_f64()
            ));
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&report_json(report));
        }
    }
}

fn report_json(report: &SyncReport) -> serde_json::Value {
    let sent: serde_json::Map<String, serde_json::Value> = report
        .items_sent
        .iter()
        .map(|(bucket, count)| (bucket.label().to_string(), json!(count)))
        .collect();
    let failures: Vec<serde_json::Value> = report
        .failures
        .iter()
        .map(|f| json!({ "user": f.user, "bucket": f.bucket.label(), "category": f.category, "message": f.message }))
        .collect();
    let users_failed: Vec<serde_json::Value> = report
        .users_failed
        .iter()
        .map(|(user, error)| json!({ "user": user, "error": error }))
        .collect();

    json!({
        "success": report.failures.is_empty() && report.users_failed.is_empty(),
        "dry_run": report.dry_run,
        "users_linked": report.users_linked,
        "users_synced": report.users_synced,
        "users_failed": users_failed,
        "items_sent": sent,
        "items_skipped": report.items_skipped,
        "not_found": report.not_found,
        "failures": failures,
        "duration_seconds": report.duration.as_secs_f64(),
    })
}
