use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use finreport::cli::{
    handle_backup_command, handle_export_command, handle_history_command, handle_schedule_command,
    handle_template_command, BackupCommands, CliContext, ExportArgs, HistoryArgs,
    ScheduleCommands, TemplateCommands,
};
use finreport::config::FinReportPaths;
use finreport::notify::LogNotifier;
use finreport::schedule::SystemClock;
use finreport::store::{FileStore, TimestampIds};

#[derive(Parser)]
#[command(
    name = "finreport",
    version,
    about = "Scheduled financial reports, exports, and backups",
    long_about = "finreport generates financial exports (CSV, PDF, XLSX, JSON, QIF, OFX) \
                  from a personal-finance data store, runs them on recurring schedules, \
                  and keeps automatic backups of the underlying data."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a bundle file in any supported format
    Export(ExportArgs),

    /// Export template management commands
    #[command(subcommand)]
    Template(TemplateCommands),

    /// Scheduled report management commands
    #[command(subcommand)]
    Schedule(ScheduleCommands),

    /// Backup management commands
    #[command(subcommand)]
    Backup(BackupCommands),

    /// Show report or backup run history
    History(HistoryArgs),

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = FinReportPaths::new()?;
    paths.ensure_directories()?;

    let ctx = CliContext {
        store: Arc::new(FileStore::new(paths.store_dir())?),
        clock: Arc::new(SystemClock),
        ids: Arc::new(TimestampIds::new()),
        notifier: Arc::new(LogNotifier),
        paths: paths.clone(),
    };

    match cli.command {
        Some(Commands::Export(args)) => handle_export_command(args)?,
        Some(Commands::Template(cmd)) => handle_template_command(&ctx, cmd)?,
        Some(Commands::Schedule(cmd)) => handle_schedule_command(&ctx, cmd)?,
        Some(Commands::Backup(cmd)) => handle_backup_command(&ctx, cmd)?,
        Some(Commands::History(args)) => handle_history_command(&ctx, args)?,
        Some(Commands::Config) => {
            println!("finreport Configuration");
            println!("=======================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Store directory:  {}", paths.store_dir().display());
            println!("Report directory: {}", paths.reports_dir().display());
        }
        None => {
            println!("finreport - scheduled financial reports and backups");
            println!();
            println!("Run 'finreport --help' for usage information.");
        }
    }

    Ok(())
}
