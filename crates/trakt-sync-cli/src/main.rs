use clap::{ArgAction, Parser, Subcommand};
use commands::{config, daemon, link, sync, users};

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "trakt-sync")]
#[command(about = "trakt-sync - Push your media library's collection and watched state to Trakt")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync every linked user's library to Trakt once
    #[command(long_about = "Compare each linked user's library with their Trakt collection and watched history, then send the missing collection entries, plays and un-plays to Trakt.")]
    Sync {
        /// Classify and log what would be sent without calling Trakt's update endpoints
        #[arg(long, action = ArgAction::SetTrue)]
        dry_run: bool,

        /// Only sync these local user ids (repeatable)
        #[arg(long = "user", value_name = "USER_ID")]
        users: Vec<String>,
    },
    /// Run as daemon with internal scheduler
    #[command(long_about = "Run the library sync on a schedule. By default the sync runs once on startup and then every 24 hours; configure [scheduler] in config.toml or pass --schedule to change it.")]
    Daemon {
        /// Six-field cron expression (e.g. '0 0 */6 * * *' for every 6 hours)
        #[arg(long, value_name = "SCHEDULE")]
        schedule: Option<String>,

        /// Skip initial sync on startup
        #[arg(long, action = ArgAction::SetTrue)]
        no_startup_sync: bool,
    },
    /// Link a local user to a Trakt account (OAuth)
    #[command(long_about = "Authorize trakt-sync to access a Trakt account on behalf of a local user. You'll need a Trakt API application (https://trakt.tv/oauth/applications) with 'urn:ietf:wg:oauth:2.0:oob' as redirect URI.")]
    Link {
        /// Local user id
        user: String,

        /// Authorization code (if not provided, will prompt)
        #[arg(long)]
        code: Option<String>,
    },
    /// Remove the Trakt link of a local user
    Unlink {
        /// Local user id
        user: String,
    },
    /// List local users and their Trakt link status
    Users,
    /// Show configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigCommands {
    /// Show current configuration (masks sensitive data)
    Show {
        /// Show full configuration including masked secrets
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // The daemon sets up its own file logging
    if !matches!(cli.command, Commands::Daemon { .. }) {
        logging::init_logging(cli.verbose, cli.quiet).map_err(|e| color_eyre::eyre::eyre!("{}", e))?;
    }

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Sync { dry_run, users } => sync::run_sync(dry_run, users, &output).await,
        Commands::Daemon { schedule, no_startup_sync } => {
            daemon::run_daemon(schedule, no_startup_sync, cli.verbose, cli.quiet, &output).await
        }
        Commands::Link { user, code } => link::run_link(user, code, &output).await,
        Commands::Unlink { user } => link::run_unlink(user, &output).await,
        Commands::Users => users::run_users(&output).await,
        Commands::Config { cmd } => config::run_config(cmd, &output).await,
    }
}
