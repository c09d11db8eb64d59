//! Scheduled report store
//!
//! CRUD over persisted report schedules plus the append-only run history.
//! `next_run` is computed here — on creation and on frequency-changing
//! updates — and by the engine after every run, so the stored value is
//! always strictly in the future at the time it was written.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{keys, MAX_REPORT_HISTORY};
use crate::error::FinReportResult;
use crate::export::{ExportFormat, ExportOptions};
use crate::schedule::{calculate_next_run, parse_time_of_day, weekday_from_index, Clock, Frequency};

use super::{load_or_default, save_best_effort, IdGenerator, KeyValueStore};

/// How a finished report leaves the system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Delivery {
    /// Emit a local "report ready" notification (mail is simulated)
    Email { address: String },
    /// Hand the payload to the report sink (download directory)
    File,
}

/// A persisted recurring report definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledReport {
    pub id: String,
    pub name: String,
    pub frequency: Frequency,
    pub delivery: Delivery,
    pub options: ExportOptions,
    /// 0 = Sunday .. 6 = Saturday; weekly schedules default to Monday (1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u32>,
    /// Time of day, `HH:MM`
    pub time: String,
    pub next_run: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run: Option<DateTime<Utc>>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating a schedule (`next_run` is computed, not given)
#[derive(Debug, Clone)]
pub struct NewSchedule {
    pub name: String,
    pub frequency: Frequency,
    pub delivery: Delivery,
    pub options: ExportOptions,
    pub day_of_week: Option<u8>,
    pub day_of_month: Option<u32>,
    pub time: String,
}

impl NewSchedule {
    /// A schedule with the common defaults: 09:00, file delivery
    pub fn new(name: impl Into<String>, frequency: Frequency, options: ExportOptions) -> Self {
        Self {
            name: name.into(),
            frequency,
            delivery: Delivery::File,
            options,
            day_of_week: None,
            day_of_month: None,
            time: "09:00".to_string(),
        }
    }
}

/// Partial update for a schedule; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct SchedulePatch {
    pub name: Option<String>,
    pub frequency: Option<Frequency>,
    pub delivery: Option<Delivery>,
    pub options: Option<ExportOptions>,
    pub day_of_week: Option<u8>,
    pub day_of_month: Option<u32>,
    pub time: Option<String>,
    pub enabled: Option<bool>,
}

/// One line of the append-only run history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportHistoryEntry {
    pub report_id: String,
    pub report_name: String,
    pub run_time: DateTime<Utc>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ExportFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Store for scheduled reports and their history
#[derive(Clone)]
pub struct ScheduleStore {
    store: Arc<dyn KeyValueStore>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl ScheduleStore {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { store, ids, clock }
    }

    fn load(&self) -> Vec<ScheduledReport> {
        load_or_default(self.store.as_ref(), keys::SCHEDULED_REPORTS)
    }

    fn persist(&self, schedules: &[ScheduledReport]) {
        save_best_effort(self.store.as_ref(), keys::SCHEDULED_REPORTS, &schedules);
    }

    fn next_run_for(
        &self,
        now: DateTime<Utc>,
        frequency: Frequency,
        time: &str,
        day_of_week: Option<u8>,
        day_of_month: Option<u32>,
    ) -> FinReportResult<DateTime<Utc>> {
        calculate_next_run(
            now,
            frequency,
            time,
            day_of_week.and_then(weekday_from_index),
            day_of_month,
        )
    }

    /// Create a schedule, computing its first `next_run`, and persist it
    pub fn create_scheduled_report(&self, new: NewSchedule) -> FinReportResult<ScheduledReport> {
        let now = self.clock.now();
        let next_run = self.next_run_for(
            now,
            new.frequency,
            &new.time,
            new.day_of_week,
            new.day_of_month,
        )?;

        let schedule = ScheduledReport {
            id: self.ids.next_id(),
            name: new.name,
            frequency: new.frequency,
            delivery: new.delivery,
            options: new.options,
            day_of_week: new.day_of_week,
            day_of_month: new.day_of_month,
            time: new.time,
            next_run,
            last_run: None,
            enabled: true,
            created_at: now,
            updated_at: now,
        };

        let mut schedules = self.load();
        schedules.push(schedule.clone());
        self.persist(&schedules);
        Ok(schedule)
    }

    /// All schedules in stored order
    pub fn list_schedules(&self) -> Vec<ScheduledReport> {
        self.load()
    }

    /// Look up one schedule
    pub fn get_schedule(&self, id: &str) -> Option<ScheduledReport> {
        self.load().into_iter().find(|s| s.id == id)
    }

    /// Enabled schedules whose `next_run` has arrived
    pub fn due_schedules(&self, now: DateTime<Utc>) -> Vec<ScheduledReport> {
        self.load()
            .into_iter()
            .filter(|s| s.enabled && s.next_run <= now)
            .collect()
    }

    /// Partial-merge update; recomputes `next_run` only when the frequency
    /// actually changes. Returns `Ok(None)` for an unknown id.
    ///
    /// A patched `time` is validated up front: an unparseable value would
    /// otherwise persist fine but make every later `next_run` computation
    /// fail, leaving the schedule due forever.
    pub fn update_scheduled_report(
        &self,
        id: &str,
        patch: SchedulePatch,
    ) -> FinReportResult<Option<ScheduledReport>> {
        if let Some(time) = &patch.time {
            parse_time_of_day(time)?;
        }

        let mut schedules = self.load();
        let Some(schedule) = schedules.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };

        let old_frequency = schedule.frequency;

        if let Some(name) = patch.name {
            schedule.name = name;
        }
        if let Some(frequency) = patch.frequency {
            schedule.frequency = frequency;
        }
        if let Some(delivery) = patch.delivery {
            schedule.delivery = delivery;
        }
        if let Some(options) = patch.options {
            schedule.options = options;
        }
        if let Some(day_of_week) = patch.day_of_week {
            schedule.day_of_week = Some(day_of_week);
        }
        if let Some(day_of_month) = patch.day_of_month {
            schedule.day_of_month = Some(day_of_month);
        }
        if let Some(time) = patch.time {
            schedule.time = time;
        }
        if let Some(enabled) = patch.enabled {
            schedule.enabled = enabled;
        }

        let now = self.clock.now();
        if schedule.frequency != old_frequency {
            schedule.next_run = calculate_next_run(
                now,
                schedule.frequency,
                &schedule.time,
                schedule.day_of_week.and_then(weekday_from_index),
                schedule.day_of_month,
            )?;
        }
        schedule.updated_at = now;

        let updated = schedule.clone();
        self.persist(&schedules);
        Ok(Some(updated))
    }

    /// Delete a schedule; returns whether anything was removed
    pub fn delete_scheduled_report(&self, id: &str) -> bool {
        let mut schedules = self.load();
        let before = schedules.len();
        schedules.retain(|s| s.id != id);
        let removed = schedules.len() != before;
        if removed {
            self.persist(&schedules);
        }
        removed
    }

    /// Record a run outcome: advance `last_run`/`next_run` and append a
    /// history entry. Both success and failure advance the schedule — a
    /// failed slot is not retried.
    pub fn mark_run(
        &self,
        id: &str,
        success: bool,
        format: Option<ExportFormat>,
        error: Option<String>,
    ) -> FinReportResult<()> {
        let now = self.clock.now();
        let mut schedules = self.load();
        let Some(schedule) = schedules.iter_mut().find(|s| s.id == id) else {
            return Ok(());
        };

        schedule.last_run = Some(now);
        schedule.next_run = calculate_next_run(
            now,
            schedule.frequency,
            &schedule.time,
            schedule.day_of_week.and_then(weekday_from_index),
            schedule.day_of_month,
        )?;
        schedule.updated_at = now;

        let entry = ReportHistoryEntry {
            report_id: schedule.id.clone(),
            report_name: schedule.name.clone(),
            run_time: now,
            success,
            format,
            error,
        };

        self.persist(&schedules);
        self.append_history(entry);
        Ok(())
    }

    /// Append to the run history, dropping the oldest entries past the cap
    pub fn append_history(&self, entry: ReportHistoryEntry) {
        let mut history: Vec<ReportHistoryEntry> =
            load_or_default(self.store.as_ref(), keys::REPORT_HISTORY);
        history.push(entry);
        if history.len() > MAX_REPORT_HISTORY {
            let excess = history.len() - MAX_REPORT_HISTORY;
            history.drain(..excess);
        }
        save_best_effort(self.store.as_ref(), keys::REPORT_HISTORY, &history);
    }

    /// Run history, oldest first
    pub fn history(&self) -> Vec<ReportHistoryEntry> {
        load_or_default(self.store.as_ref(), keys::REPORT_HISTORY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::FixedClock;
    use crate::store::{MemoryStore, SequenceIds};
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn store_at(now: DateTime<Utc>) -> (ScheduleStore, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::at(now));
        let store = ScheduleStore::new(
            Arc::new(MemoryStore::new()),
            Arc::new(SequenceIds::new()),
            clock.clone(),
        );
        (store, clock)
    }

    fn weekly() -> NewSchedule {
        NewSchedule::new(
            "Weekly Summary",
            Frequency::Weekly,
            ExportOptions::full(ExportFormat::Json),
        )
    }

    #[test]
    fn test_create_computes_next_run() {
        // 2024-01-01 is a Monday; 09:00 has passed, default day is Monday
        let (store, _) = store_at(at(2024, 1, 1, 9, 0));
        let schedule = store.create_scheduled_report(weekly()).unwrap();
        assert_eq!(schedule.next_run, at(2024, 1, 8, 9, 0));
        assert!(schedule.enabled);
        assert!(schedule.last_run.is_none());
    }

    #[test]
    fn test_update_frequency_recomputes_next_run() {
        let (store, clock) = store_at(at(2024, 12, 1, 9, 0));
        let schedule = store
            .create_scheduled_report(NewSchedule::new(
                "Monthly",
                Frequency::Monthly,
                ExportOptions::full(ExportFormat::Json),
            ))
            .unwrap();

        clock.set(at(2025, 1, 1, 8, 0));
        let updated = store
            .update_scheduled_report(
                &schedule.id,
                SchedulePatch {
                    frequency: Some(Frequency::Daily),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.next_run, at(2025, 1, 2, 9, 0));
    }

    #[test]
    fn test_update_without_frequency_keeps_next_run() {
        let (store, clock) = store_at(at(2024, 1, 1, 9, 0));
        let schedule = store.create_scheduled_report(weekly()).unwrap();

        clock.set(at(2024, 1, 3, 9, 0));
        let updated = store
            .update_scheduled_report(
                &schedule.id,
                SchedulePatch {
                    name: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.next_run, schedule.next_run);
        assert_eq!(updated.name, "Renamed");
    }

    #[test]
    fn test_update_rejects_invalid_time() {
        let (store, _) = store_at(at(2024, 1, 1, 9, 0));
        let schedule = store.create_scheduled_report(weekly()).unwrap();

        let err = store
            .update_scheduled_report(
                &schedule.id,
                SchedulePatch {
                    time: Some("25:99".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(err.is_validation());

        // Nothing was persisted; the schedule still advances normally
        let unchanged = store.get_schedule(&schedule.id).unwrap();
        assert_eq!(unchanged.time, "09:00");
        assert_eq!(unchanged.next_run, schedule.next_run);
    }

    #[test]
    fn test_update_unknown_returns_none() {
        let (store, _) = store_at(at(2024, 1, 1, 9, 0));
        assert!(store
            .update_scheduled_report("nope", SchedulePatch::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_due_schedules() {
        let (store, _) = store_at(at(2024, 1, 1, 9, 0));
        let schedule = store.create_scheduled_report(weekly()).unwrap();

        assert!(store.due_schedules(at(2024, 1, 7, 9, 0)).is_empty());
        let due = store.due_schedules(at(2024, 1, 8, 9, 0));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, schedule.id);

        // Disabled schedules never come due
        store
            .update_scheduled_report(
                &schedule.id,
                SchedulePatch {
                    enabled: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(store.due_schedules(at(2024, 1, 8, 9, 0)).is_empty());
    }

    #[test]
    fn test_mark_run_advances_on_failure_too() {
        let (store, clock) = store_at(at(2024, 1, 1, 9, 0));
        let schedule = store.create_scheduled_report(weekly()).unwrap();

        clock.set(at(2024, 1, 8, 9, 0));
        store
            .mark_run(&schedule.id, false, None, Some("boom".to_string()))
            .unwrap();

        let after = store.get_schedule(&schedule.id).unwrap();
        assert_eq!(after.last_run, Some(at(2024, 1, 8, 9, 0)));
        assert_eq!(after.next_run, at(2024, 1, 15, 9, 0));

        let history = store.history();
        assert_eq!(history.len(), 1);
        assert!(!history[0].success);
        assert_eq!(history[0].error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_history_ring_buffer() {
        let (store, _) = store_at(at(2024, 1, 1, 9, 0));
        for i in 0..(MAX_REPORT_HISTORY + 10) {
            store.append_history(ReportHistoryEntry {
                report_id: format!("r{}", i),
                report_name: "r".to_string(),
                run_time: at(2024, 1, 1, 9, 0),
                success: true,
                format: None,
                error: None,
            });
        }

        let history = store.history();
        assert_eq!(history.len(), MAX_REPORT_HISTORY);
        // Oldest entries were dropped first
        assert_eq!(history[0].report_id, "r10");
    }

    #[test]
    fn test_next_run_rehydrates_from_iso_string() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::at(at(2024, 1, 1, 9, 0)));
        let store = ScheduleStore::new(kv.clone(), Arc::new(SequenceIds::new()), clock.clone());
        let schedule = store.create_scheduled_report(weekly()).unwrap();

        let raw = kv.get(keys::SCHEDULED_REPORTS).unwrap().unwrap();
        assert!(raw.contains("2024-01-08T09:00:00Z"));

        let reloaded = ScheduleStore::new(kv, Arc::new(SequenceIds::new()), clock);
        let back = reloaded.get_schedule(&schedule.id).unwrap();
        assert_eq!(back.next_run, schedule.next_run);
        assert_eq!(back.created_at, schedule.created_at);
    }
}
