use super::context::Context;
use super::sync_ui::SyncProgress;
use crate::logging;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use trakt_sync_config::{PathManager, SchedulerConfig, MAX_INTERVAL_HOURS};
use trakt_sync_core::{ScheduledTask, TaskTrigger};
use tracing::{error, info, warn};

/// Shared by every scheduled job; at most one sync runs at a time.
struct Daemon {
    running: Mutex<()>,
    shutdown: CancellationToken,
}

impl Daemon {
    async fn run_once(&self, trigger: &str) {
        let Ok(_guard) = self.running.try_lock() else {
            warn!(
                operation = "scheduled_sync_skipped",
                trigger,
                "Previous sync still running, skipping this trigger"
            );
            return;
        };

        info!(operation = "scheduled_sync_start", trigger, "Starting scheduled sync");
        let started = Instant::now();

        // Reload config, credentials and library so every run sees current state
        let result = async {
            let mut context = Context::load()?;
            let task = context.build_task(false, &[]).await?;
            let progress = SyncProgress::new(false);
            task.execute(&progress, self.shutdown.child_token())
                .await
                .map_err(|e| eyre!("{}", e))
        }
        .await;

        match result {
            Ok(report) => {
                info!(
                    operation = "scheduled_sync_complete",
                    trigger,
                    users_synced = report.users_synced,
                    items_sent = report.total_sent(),
                    bucket_failures = report.failures.len(),
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Scheduled sync completed"
                );
            }
            Err(e) => {
                error!(
                    operation = "scheduled_sync_error",
                    trigger,
                    error = %e,
                    "Scheduled sync failed"
                );
            }
        }
    }
}

/// Scheduler triggers: a cron expression (flag, then config) wins over an
/// interval; without a `[scheduler]` section the task's own defaults apply.
fn schedule_triggers(
    scheduler: Option<&SchedulerConfig>,
    schedule_override: Option<String>,
    no_startup_sync: bool,
    task_defaults: Vec<TaskTrigger>,
) -> Vec<TaskTrigger> {
    let run_on_startup = !no_startup_sync && scheduler.map(|s| s.run_on_startup).unwrap_or(true);

    let mut triggers = Vec::new();
    if run_on_startup {
        triggers.push(TaskTrigger::Startup);
    }

    let cron = schedule_override.or_else(|| scheduler.and_then(|s| s.schedule.clone()));
    match (cron, scheduler) {
        (Some(expression), _) => triggers.push(TaskTrigger::Cron(expression)),
        (None, Some(config)) => {
            let hours = config.interval_hours.clamp(1, MAX_INTERVAL_HOURS);
            triggers.push(TaskTrigger::Interval(Duration::from_secs(hours * 60 * 60)))
        }
        (None, None) => triggers.extend(
            task_defaults
                .into_iter()
                .filter(|trigger| *trigger != TaskTrigger::Startup),
        ),
    }
    triggers
}

pub async fn run_daemon(
    schedule_override: Option<String>,
    no_startup_sync: bool,
    verbose: u8,
    quiet: bool,
    output: &Output,
) -> Result<()> {
    let paths = PathManager::default();
    paths
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create data directories: {}", e))?;
    let log_file = paths.daemon_log_file();
    logging::init_logging_with_file(verbose, quiet, Some(log_file.clone()))
        .map_err(|e| eyre!("{}", e))?;

    // Fail fast on a broken setup before anything is scheduled
    let mut context = Context::load_from(paths)?;
    let task = context.build_task(false, &[]).await?;

    let triggers = schedule_triggers(
        context.config.scheduler.as_ref(),
        schedule_override,
        no_startup_sync,
        task.default_triggers(),
    );

    let daemon = Arc::new(Daemon {
        running: Mutex::new(()),
        shutdown: CancellationToken::new(),
    });

    let scheduler = JobScheduler::new().await?;
    for trigger in &triggers {
        match trigger {
            TaskTrigger::Startup => {}
            TaskTrigger::Interval(every) => {
                let daemon = daemon.clone();
                let job = Job::new_repeated_async(*every, move |_uuid, _lock| {
                    let daemon = daemon.clone();
                    Box::pin(async move { daemon.run_once("interval").await })
                })?;
                scheduler.add(job).await?;
            }
            TaskTrigger::Cron(expression) => {
                let daemon = daemon.clone();
                let job = Job::new_async(expression.as_str(), move |_uuid, _lock| {
                    let daemon = daemon.clone();
                    Box::pin(async move { daemon.run_once("cron").await })
                })
                .map_err(|e| eyre!("Invalid cron schedule '{}': {}", expression, e))?;
                scheduler.add(job).await?;
            }
        }
    }
    scheduler.start().await?;

    info!(
        operation = "scheduler_started",
        task = task.key(),
        triggers = ?triggers,
        "Scheduler started"
    );
    output.info(format!("{} scheduled. Logs are being written to {}", task.name(), log_file.display()));

    if triggers.contains(&TaskTrigger::Startup) {
        let daemon = daemon.clone();
        tokio::spawn(async move { daemon.run_once("startup").await });
    }

    tokio::signal::ctrl_c().await?;
    info!(operation = "scheduler_stopping", "Shutdown requested, cancelling running sync");
    daemon.shutdown.cancel();

    let mut scheduler = scheduler;
    scheduler.shutdown().await?;
    // Let a cancelled run log its outcome
    let _ = daemon.running.lock().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn daily() -> Vec<TaskTrigger> {
        vec![TaskTrigger::Interval(Duration::from_secs(86_400))]
    }

    #[test]
    fn test_defaults_without_scheduler_section() {
        let triggers = schedule_triggers(None, None, false, daily());
        assert_eq!(
            triggers,
            vec![TaskTrigger::Startup, TaskTrigger::Interval(Duration::from_secs(86_400))]
        );
    }

    #[test]
    fn test_cron_override_wins_over_interval() {
        let config = SchedulerConfig {
            interval_hours: 6,
            schedule: Some("0 0 3 * * *".to_string()),
            run_on_startup: false,
        };
        let triggers = schedule_triggers(Some(&config), Some("0 30 * * * *".to_string()), false, daily());
        assert_eq!(triggers, vec![TaskTrigger::Cron("0 30 * * * *".to_string())]);

        let triggers = schedule_triggers(Some(&config), None, false, daily());
        assert_eq!(triggers, vec![TaskTrigger::Cron("0 0 3 * * *".to_string())]);
    }

    #[test]
    fn test_configured_interval_and_startup_flag() {
        let config = SchedulerConfig { interval_hours: 6, schedule: None, run_on_startup: true };
        let triggers = schedule_triggers(Some(&config), None, true, daily());
        assert_eq!(triggers, vec![TaskTrigger::Interval(Duration::from_secs(6 * 3600))]);
    }

    #[tokio::test]
    async fn test_overlapping_runs_are_skipped() {
        let daemon = Daemon { running: Mutex::new(()), shutdown: CancellationToken::new() };
        let _held = daemon.running.lock().await;
        // Returns immediately instead of waiting for the lock
        tokio::time::timeout(Duration::from_secs(1), daemon.run_once("test"))
            .await
            .unwrap();
    }

    #[test]
    fn test_interval_is_clamped_to_a_year() {
        let config = SchedulerConfig { interval_hours: u64::MAX / 60, schedule: None, run_on_startup: false };
        let triggers = schedule_triggers(Some(&config), None, true, vec![]);
        assert_eq!(
            triggers,
            vec![TaskTrigger::Interval(Duration::from_secs(MAX_INTERVAL_HOURS * 3600))]
        );
    }
}
