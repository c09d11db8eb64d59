//! Backup CLI commands

use clap::{Subcommand, ValueEnum};

use crate::backup::{
    load_config, update_config, BackupConfigPatch, BackupFormat, BackupFrequency, BackupManager,
};
use crate::error::{FinReportError, FinReportResult};

use super::CliContext;

/// Backup frequency options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BackupFrequencyArg {
    Daily,
    Weekly,
    Monthly,
}

impl From<BackupFrequencyArg> for BackupFrequency {
    fn from(arg: BackupFrequencyArg) -> Self {
        match arg {
            BackupFrequencyArg::Daily => Self::Daily,
            BackupFrequencyArg::Weekly => Self::Weekly,
            BackupFrequencyArg::Monthly => Self::Monthly,
        }
    }
}

/// Backup format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BackupFormatArg {
    Json,
    Csv,
    All,
}

impl From<BackupFormatArg> for BackupFormat {
    fn from(arg: BackupFormatArg) -> Self {
        match arg {
            BackupFormatArg::Json => Self::Json,
            BackupFormatArg::Csv => Self::Csv,
            BackupFormatArg::All => Self::All,
        }
    }
}

/// Backup subcommands
#[derive(Subcommand, Debug)]
pub enum BackupCommands {
    /// Run a backup now
    Run,

    /// List stored backup records
    List {
        /// Show detailed information
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show the backup configuration
    ShowConfig,

    /// Change backup configuration values
    SetConfig {
        /// Turn automatic backups on or off
        #[arg(long)]
        enabled: Option<bool>,

        /// How often backups run
        #[arg(long, value_enum)]
        frequency: Option<BackupFrequencyArg>,

        /// Time of day (HH:MM, 24-hour)
        #[arg(long)]
        time: Option<String>,

        /// Payload format(s) per run
        #[arg(long, value_enum)]
        format: Option<BackupFormatArg>,

        /// Seal payloads with a single-use key (records become unreadable)
        #[arg(long)]
        encrypt: Option<bool>,

        /// Days to keep records before pruning
        #[arg(long)]
        retention_days: Option<u32>,

        /// Cloud provider name (sync itself is not available yet)
        #[arg(long)]
        cloud_provider: Option<String>,
    },

    /// Delete records older than the retention window
    Prune,

    /// Delete one backup record
    Rm {
        /// Record id
        id: String,
    },
}

/// Handle a backup command
pub fn handle_backup_command(ctx: &CliContext, cmd: BackupCommands) -> FinReportResult<()> {
    let manager = BackupManager::new(ctx.store.clone(), ctx.clock.clone(), ctx.notifier.clone());

    match cmd {
        BackupCommands::Run => {
            println!("Running backup...");
            let records = manager.run_backup()?;
            for record in &records {
                println!("  {} ({} bytes)", record.filename, record.size());
            }
            println!("Backup complete: {} record(s).", records.len());
        }

        BackupCommands::List { verbose } => {
            let records = manager.archiver().list_records();
            if records.is_empty() {
                println!("No backups found.");
                println!("Create one with: finreport backup run");
                return Ok(());
            }
            for record in records {
                let sealed = if record.encrypted { " [sealed]" } else { "" };
                if verbose {
                    println!(
                        "{}\n   File: {}\n   Created: {}\n   Size: {} bytes{}\n",
                        record.id,
                        record.filename,
                        record.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
                        record.size(),
                        sealed,
                    );
                } else {
                    println!(
                        "  {}  {} ({}){}",
                        record.id,
                        record.filename,
                        record.timestamp.format("%Y-%m-%d"),
                        sealed,
                    );
                }
            }
        }

        BackupCommands::ShowConfig => {
            let config = load_config(ctx.store.as_ref());
            println!("Backup Configuration");
            println!("====================");
            println!("Enabled:        {}", config.enabled);
            println!("Frequency:      {}", config.frequency);
            println!("Time:           {}", config.time);
            println!("Format:         {}", config.format);
            println!("Encryption:     {}", config.encryption_enabled);
            println!("Retention days: {}", config.retention_days);
            match &config.cloud_provider {
                Some(provider) => println!("Cloud provider: {}", provider),
                None => println!("Cloud provider: none"),
            }
            match config.next_backup {
                Some(next) => println!("Next backup:    {}", next.format("%Y-%m-%d %H:%M UTC")),
                None => println!("Next backup:    not scheduled"),
            }
        }

        BackupCommands::SetConfig {
            enabled,
            frequency,
            time,
            format,
            encrypt,
            retention_days,
            cloud_provider,
        } => {
            let config = update_config(
                ctx.store.as_ref(),
                BackupConfigPatch {
                    enabled,
                    frequency: frequency.map(Into::into),
                    time,
                    format: format.map(Into::into),
                    encryption_enabled: encrypt,
                    cloud_provider: cloud_provider.map(Some),
                    retention_days,
                    include_attachments: None,
                },
            )?;
            println!(
                "Configuration saved: {} {} at {} ({})",
                if config.enabled { "enabled," } else { "disabled," },
                config.frequency,
                config.time,
                config.format,
            );
        }

        BackupCommands::Prune => {
            let config = load_config(ctx.store.as_ref());
            let pruned = manager.archiver().prune(config.retention_days);
            println!(
                "Pruned {} record(s) older than {} days.",
                pruned, config.retention_days
            );
        }

        BackupCommands::Rm { id } => {
            if manager.archiver().delete_record(&id) {
                println!("Deleted backup record {}", id);
            } else {
                return Err(FinReportError::NotFound {
                    entity_type: "Backup record",
                    identifier: id,
                });
            }
        }
    }

    Ok(())
}
