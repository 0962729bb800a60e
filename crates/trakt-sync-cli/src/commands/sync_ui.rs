use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::sync::atomic::{AtomicU64, Ordering};
use trakt_sync_core::ProgressSink;

/// Progress of a sync run: a bar on a terminal, structured log lines at
/// every 10% otherwise.
pub struct SyncProgress {
    bar: ProgressBar,
    interactive: bool,
    last_logged_step: AtomicU64,
}

impl SyncProgress {
    pub fn new(interactive: bool) -> Self {
        let bar = if interactive {
            let bar = ProgressBar::new(100);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}% {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("█▉▊▋▌▍▎▏  "),
            );
            bar.set_message("Syncing library to Trakt...");
            bar
        } else {
            tracing::info!(
                operation = "ui_init",
                mode = "non_interactive",
                "Running in non-interactive mode - progress bar disabled, using structured logging"
            );
            ProgressBar::hidden()
        };

        Self {
            bar,
            interactive,
            last_logged_step: AtomicU64::new(0),
        }
    }

    pub fn finish(&self, message: &str) {
        if self.interactive {
            self.bar.finish_with_message(message.to_string());
        }
    }
}

impl ProgressSink for SyncProgress {
    fn report(&self, percent: f64) {
        let position = percent.clamp(0.0, 100.0).floor() as u64;
        if self.interactive {
            self.bar.set_position(position);
            return;
        }

        let step = position / 10;
        if self.last_logged_step.fetch_max(step, Ordering::Relaxed) < step {
            tracing::info!(operation = "progress", percent = position, "Sync progress update");
        }
    }
}

pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_interactive_progress_tracks_ten_percent_steps() {
        let progress = SyncProgress::new(false);
        progress.report(4.0);
        assert_eq!(progress.last_logged_step.load(Ordering::Relaxed), 0);
        progress.report(37.5);
        assert_eq!(progress.last_logged_step.load(Ordering::Relaxed), 3);
        progress.report(100.0);
        assert_eq!(progress.last_logged_step.load(Ordering::Relaxed), 10);
    }
}
