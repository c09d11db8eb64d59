//! Run history CLI command

use clap::Args;

use crate::backup::BackupManager;
use crate::error::FinReportResult;
use crate::store::ScheduleStore;

use super::CliContext;

/// Arguments for the `history` command
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Show backup history instead of report history
    #[arg(long)]
    pub backups: bool,

    /// Number of entries to show, newest last
    #[arg(short, long, default_value = "20")]
    pub limit: usize,
}

/// Handle the history command
pub fn handle_history_command(ctx: &CliContext, args: HistoryArgs) -> FinReportResult<()> {
    if args.backups {
        let manager =
            BackupManager::new(ctx.store.clone(), ctx.clock.clone(), ctx.notifier.clone());
        let history = manager.archiver().history();
        if history.is_empty() {
            println!("No backup history.");
            return Ok(());
        }
        for entry in history.iter().rev().take(args.limit).rev() {
            let status = if entry.success { "ok  " } else { "FAIL" };
            print!(
                "{}  {}  {} record(s)",
                entry.run_time.format("%Y-%m-%d %H:%M UTC"),
                status,
                entry.records_written,
            );
            match &entry.error {
                Some(error) => println!("  ({})", error),
                None => println!(),
            }
        }
    } else {
        let schedules = ScheduleStore::new(ctx.store.clone(), ctx.ids.clone(), ctx.clock.clone());
        let history = schedules.history();
        if history.is_empty() {
            println!("No report history.");
            return Ok(());
        }
        for entry in history.iter().rev().take(args.limit).rev() {
            let status = if entry.success { "ok  " } else { "FAIL" };
            let format = entry
                .format
                .map(|f| f.to_string())
                .unwrap_or_else(|| "-".to_string());
            print!(
                "{}  {}  {} ({})",
                entry.run_time.format("%Y-%m-%d %H:%M UTC"),
                status,
                entry.report_name,
                format,
            );
            match &entry.error {
                Some(error) => println!("  ({})", error),
                None => println!(),
            }
        }
    }

    Ok(())
}
