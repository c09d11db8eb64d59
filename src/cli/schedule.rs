//! Scheduled report CLI commands

use std::sync::Arc;

use clap::{Subcommand, ValueEnum};

use crate::error::{FinReportError, FinReportResult};
use crate::export::{ExportGenerator, ExportOptions};
use crate::schedule::{DirectorySink, Frequency, ReportEngine, StoreDataSource};
use crate::store::{Delivery, NewSchedule, SchedulePatch, ScheduleStore};

use super::export::FormatArg;
use super::CliContext;

/// Frequency options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FrequencyArg {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl From<FrequencyArg> for Frequency {
    fn from(arg: FrequencyArg) -> Self {
        match arg {
            FrequencyArg::Daily => Self::Daily,
            FrequencyArg::Weekly => Self::Weekly,
            FrequencyArg::Monthly => Self::Monthly,
            FrequencyArg::Quarterly => Self::Quarterly,
            FrequencyArg::Yearly => Self::Yearly,
        }
    }
}

/// Schedule subcommands
#[derive(Subcommand, Debug)]
pub enum ScheduleCommands {
    /// List all schedules
    List,

    /// Add a new schedule
    Add {
        /// Schedule name
        name: String,

        /// How often the report runs
        #[arg(short = 'q', long, value_enum, default_value = "weekly")]
        frequency: FrequencyArg,

        /// Export format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: FormatArg,

        /// Time of day (HH:MM, 24-hour)
        #[arg(short, long, default_value = "09:00")]
        time: String,

        /// Day of week for weekly schedules (0 = Sunday .. 6 = Saturday)
        #[arg(long)]
        day_of_week: Option<u8>,

        /// Day of month for monthly schedules (clamped to month end)
        #[arg(long)]
        day_of_month: Option<u32>,

        /// Deliver by email notification instead of writing a file
        #[arg(long)]
        email: Option<String>,
    },

    /// Enable a schedule
    Enable {
        /// Schedule id
        id: String,
    },

    /// Disable a schedule
    Disable {
        /// Schedule id
        id: String,
    },

    /// Remove a schedule
    Rm {
        /// Schedule id
        id: String,
    },

    /// Run everything that has come due, once
    RunDue,
}

/// Handle a schedule command
pub fn handle_schedule_command(ctx: &CliContext, cmd: ScheduleCommands) -> FinReportResult<()> {
    let schedules = ScheduleStore::new(ctx.store.clone(), ctx.ids.clone(), ctx.clock.clone());

    match cmd {
        ScheduleCommands::List => {
            let all = schedules.list_schedules();
            if all.is_empty() {
                println!("No schedules.");
                return Ok(());
            }
            for schedule in all {
                let state = if schedule.enabled { "on " } else { "off" };
                println!(
                    "{}  [{}] {} ({} {}, {})  next: {}",
                    schedule.id,
                    state,
                    schedule.name,
                    schedule.frequency,
                    schedule.time,
                    schedule.options.format,
                    schedule.next_run.format("%Y-%m-%d %H:%M UTC"),
                );
            }
        }

        ScheduleCommands::Add {
            name,
            frequency,
            format,
            time,
            day_of_week,
            day_of_month,
            email,
        } => {
            let mut new = NewSchedule::new(
                name,
                frequency.into(),
                ExportOptions::full(format.into()),
            );
            new.time = time;
            new.day_of_week = day_of_week;
            new.day_of_month = day_of_month;
            if let Some(address) = email {
                new.delivery = Delivery::Email { address };
            }

            let schedule = schedules.create_scheduled_report(new)?;
            println!(
                "Created schedule {} ({}), first run {}",
                schedule.name,
                schedule.id,
                schedule.next_run.format("%Y-%m-%d %H:%M UTC"),
            );
        }

        ScheduleCommands::Enable { id } => {
            set_enabled(&schedules, &id, true)?;
            println!("Enabled schedule {}", id);
        }

        ScheduleCommands::Disable { id } => {
            set_enabled(&schedules, &id, false)?;
            println!("Disabled schedule {}", id);
        }

        ScheduleCommands::Rm { id } => {
            if schedules.delete_scheduled_report(&id) {
                println!("Deleted schedule {}", id);
            } else {
                return Err(FinReportError::schedule_not_found(&id));
            }
        }

        ScheduleCommands::RunDue => {
            let due = schedules.due_schedules(ctx.clock.now()).len();
            let engine = ReportEngine::new(
                schedules,
                ExportGenerator::new(),
                Arc::new(StoreDataSource::new(ctx.store.clone())),
                Arc::new(DirectorySink::new(ctx.paths.reports_dir())),
                ctx.notifier.clone(),
                ctx.clock.clone(),
            );
            engine.poll_once();
            println!("Ran {} due schedule(s).", due);
        }
    }

    Ok(())
}

fn set_enabled(schedules: &ScheduleStore, id: &str, enabled: bool) -> FinReportResult<()> {
    schedules
        .update_scheduled_report(
            id,
            SchedulePatch {
                enabled: Some(enabled),
                ..Default::default()
            },
        )?
        .ok_or_else(|| FinReportError::schedule_not_found(id))?;
    Ok(())
}
