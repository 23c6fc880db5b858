pub mod daemon_path;
pub mod history;
pub mod process;
pub mod status;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use history::{process_history_command, HistoryCommand};
use process::{daemon_executable, kill_previous_servers, restart_server};
use status::{print_status, watch_status};
use tracing::level_filters::LevelFilter;

use crate::{
    daemon::start_daemon,
    goal::display_ml,
    storage::daily_store::DailyStateStore,
    utils::{
        clock::DefaultClock,
        dir::{create_application_default_path, ensure_dir},
        logging::{enable_logging, CLI_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "Waterlog", version, long_about = None)]
#[command(about = "Application for tracking daily water intake", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Log an amount of water drunk today, in ml")]
    Log {
        #[arg(allow_negative_numbers = true)]
        amount: f64,
    },
    #[command(about = "Show today's progress against the goal")]
    Status {},
    #[command(about = "Show today's progress, refreshed every second")]
    Watch {},
    #[command(about = "Show or change settings")]
    Settings {
        #[arg(long, allow_negative_numbers = true, help = "Daily goal in ml")]
        goal: Option<f64>,
        #[arg(long, help = "Hours between reminders")]
        interval: Option<u32>,
    },
    #[command(about = "Show intake of previous days")]
    History {
        #[command(flatten)]
        command: HistoryCommand,
    },
    #[command(about = "Starts a reminder daemon for the application")]
    Init {},
    #[command(
        about = "Run the reminder loop directly in current console. Used for debugging"
    )]
    Serve {},
    #[command(about = "Stop currently running daemon.")]
    Stop {},
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = args
        .dir
        .map_or_else(create_application_default_path, ensure_dir)?;

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &app_dir, logging_level, args.log)?;

    let store = DailyStateStore::new(app_dir.clone(), Box::new(DefaultClock))?;

    match args.commands {
        Commands::Log { amount } => {
            store.log_intake(amount)?;
            print_status(&store);
            Ok(())
        }
        Commands::Status {} => {
            print_status(&store);
            Ok(())
        }
        Commands::Watch {} => watch_status(store).await,
        Commands::Settings { goal, interval } => {
            let current = store.load().settings;
            let settings = if goal.is_some() || interval.is_some() {
                store
                    .update_settings(
                        goal.unwrap_or(current.goal_ml),
                        interval.unwrap_or(current.notification_interval_hours),
                    )?
                    .settings
            } else {
                current
            };
            println!("Goal: {} ml", display_ml(settings.goal_ml));
            println!(
                "Reminder every {} hour(s)",
                settings.notification_interval_hours
            );
            Ok(())
        }
        Commands::History { command } => process_history_command(command, &store),
        Commands::Init {} => {
            restart_server(&app_dir)?;
            println!("Reminder daemon started");
            Ok(())
        }
        Commands::Serve {} => start_daemon(app_dir).await,
        Commands::Stop {} => {
            let stopped = kill_previous_servers(&daemon_executable()?)?;
            println!("Stopped {stopped} reminder daemon(s)");
            Ok(())
        }
    }
}
