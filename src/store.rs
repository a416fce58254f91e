// 🗄️ Partitioned Record Store - A per-date mini database on a flat medium
//
// Each date owns two records (schedule, expenses) under their own keys;
// settings live under one global key. Anything that fails to decode is
// logged and replaced with a valid default, never surfaced as an error.

use crate::config::StoreConfig;
use crate::error::Result;
use crate::keys::{date_label, record_key, RecordKind};
use crate::medium::KeyValueMedium;
use crate::models::{AppSettings, AttendanceStatus, DailySchedule, Expense, Student, TimeSlot};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

// ============================================================================
// LOAD RESULTS
// ============================================================================

/// Where a loaded value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSource {
    /// Decoded from the medium
    Stored,

    /// Key absent (or unreadable); value is the default
    Missing,

    /// Key present but malformed; value is the default
    Corrupted,
}

/// A loaded record plus how it was obtained. The plain `load_*` methods
/// drop the source and keep the silent-default behaviour.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub value: T,
    pub source: RecordSource,
}

impl<T> Loaded<T> {
    pub fn is_degraded(&self) -> bool {
        self.source == RecordSource::Corrupted
    }
}

/// Both per-date records, loaded together
#[derive(Debug, Clone, PartialEq)]
pub struct DayRecords {
    pub schedule: DailySchedule,
    pub expenses: Vec<Expense>,
}

enum Decoded<T> {
    Stored(T),
    Missing,
    Corrupted,
}

// ============================================================================
// RECORD STORE
// ============================================================================

pub struct RecordStore<M: KeyValueMedium> {
    medium: M,
    config: StoreConfig,
}

impl<M: KeyValueMedium> RecordStore<M> {
    pub fn new(medium: M, config: StoreConfig) -> Self {
        RecordStore { medium, config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn medium(&self) -> &M {
        &self.medium
    }

    pub fn medium_mut(&mut self) -> &mut M {
        &mut self.medium
    }

    pub fn key_for(&self, date: NaiveDate, kind: RecordKind) -> String {
        record_key(&self.config.key_prefix, &date_label(date), kind)
    }

    // ========================================================================
    // SETTINGS
    // ========================================================================

    pub fn load_settings(&self) -> AppSettings {
        self.load_settings_checked().value
    }

    /// Stored settings with an empty catalog count as corrupted
    pub fn load_settings_checked(&self) -> Loaded<AppSettings> {
        let key = self.config.settings_key.clone();

        match self.decode(&key, |settings: &AppSettings| !settings.services.is_empty()) {
            Decoded::Stored(settings) => Loaded {
                value: settings,
                source: RecordSource::Stored,
            },
            Decoded::Missing => Loaded {
                value: self.config.default_settings(),
                source: RecordSource::Missing,
            },
            Decoded::Corrupted => Loaded {
                value: self.config.default_settings(),
                source: RecordSource::Corrupted,
            },
        }
    }

    /// Callers must have rejected an empty catalog before getting here
    pub fn save_settings(&mut self, settings: &AppSettings) -> Result<()> {
        let key = self.config.settings_key.clone();
        self.write(&key, settings)
    }

    // ========================================================================
    // SCHEDULE
    // ========================================================================

    /// One slot per configured time label, each with blank `Vago` students
    pub fn default_schedule(&self, service_id: &str) -> DailySchedule {
        self.config
            .time_slots
            .iter()
            .map(|time| TimeSlot {
                time: time.clone(),
                service_id: service_id.to_string(),
                students: (0..self.config.students_per_slot)
                    .map(|_| Student::blank(AttendanceStatus::Vago))
                    .collect(),
            })
            .collect()
    }

    /// Load against the currently stored catalog
    pub fn load_schedule(&self, date: NaiveDate) -> DailySchedule {
        let settings = self.load_settings();
        self.load_schedule_checked(date, &settings).value
    }

    pub fn load_schedule_for(&self, date: NaiveDate, settings: &AppSettings) -> DailySchedule {
        self.load_schedule_checked(date, settings).value
    }

    /// Empty stored schedules are not valid days and get regenerated
    pub fn load_schedule_checked(
        &self,
        date: NaiveDate,
        settings: &AppSettings,
    ) -> Loaded<DailySchedule> {
        let key = self.key_for(date, RecordKind::Schedule);

        let source = match self.decode(&key, |slots: &DailySchedule| !slots.is_empty()) {
            Decoded::Stored(schedule) => {
                return Loaded {
                    value: schedule,
                    source: RecordSource::Stored,
                }
            }
            Decoded::Missing => RecordSource::Missing,
            Decoded::Corrupted => RecordSource::Corrupted,
        };

        let service_id = settings
            .first_service_id()
            .unwrap_or(self.config.default_service.id.as_str());
        debug!(date = %date, "synthesizing default schedule");

        Loaded {
            value: self.default_schedule(service_id),
            source,
        }
    }

    pub fn save_schedule(&mut self, date: NaiveDate, schedule: &DailySchedule) -> Result<()> {
        let key = self.key_for(date, RecordKind::Schedule);
        self.write(&key, schedule)
    }

    // ========================================================================
    // EXPENSES
    // ========================================================================

    pub fn load_expenses(&self, date: NaiveDate) -> Vec<Expense> {
        self.load_expenses_checked(date).value
    }

    pub fn load_expenses_checked(&self, date: NaiveDate) -> Loaded<Vec<Expense>> {
        let key = self.key_for(date, RecordKind::Expenses);

        match self.decode(&key, |_: &Vec<Expense>| true) {
            Decoded::Stored(expenses) => Loaded {
                value: expenses,
                source: RecordSource::Stored,
            },
            Decoded::Missing => Loaded {
                value: Vec::new(),
                source: RecordSource::Missing,
            },
            Decoded::Corrupted => Loaded {
                value: Vec::new(),
                source: RecordSource::Corrupted,
            },
        }
    }

    pub fn save_expenses(&mut self, date: NaiveDate, expenses: &[Expense]) -> Result<()> {
        let key = self.key_for(date, RecordKind::Expenses);
        self.write(&key, expenses)
    }

    // ========================================================================
    // DATE SWITCH
    // ========================================================================

    /// Resolve both records of `date` before handing either back, so a
    /// caller never mixes one date's schedule with another date's expenses.
    pub fn load_day(&self, date: NaiveDate, settings: &AppSettings) -> DayRecords {
        let schedule = self.load_schedule_for(date, settings);
        let expenses = self.load_expenses(date);

        DayRecords { schedule, expenses }
    }

    // ========================================================================
    // RAW ACCESS
    // ========================================================================

    fn decode<T: DeserializeOwned>(&self, key: &str, valid: impl Fn(&T) -> bool) -> Decoded<T> {
        let raw = match self.medium.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Decoded::Missing,
            Err(e) => {
                warn!(key, error = %e, "failed to read record, treating as absent");
                return Decoded::Missing;
            }
        };

        match serde_json::from_str::<T>(&raw) {
            Ok(value) if valid(&value) => Decoded::Stored(value),
            Ok(_) => {
                warn!(key, "stored record failed validation, using default");
                Decoded::Corrupted
            }
            Err(e) => {
                warn!(key, error = %e, "failed to parse stored record, using default");
                Decoded::Corrupted
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.medium.set(key, &json)?;
        debug!(key, bytes = json.len(), "record written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medium::{MemoryMedium, SqliteMedium};
    use crate::models::Service;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn memory_store() -> RecordStore<MemoryMedium> {
        RecordStore::new(MemoryMedium::new(), StoreConfig::default())
    }

    #[test]
    fn test_unvisited_date_gets_default_schedule() {
        let store = memory_store();
        let config = store.config().clone();

        let loaded = store.load_schedule_checked(date(2024, 3, 1), &store.load_settings());

        assert_eq!(loaded.source, RecordSource::Missing);
        assert_eq!(loaded.value.len(), config.time_slots.len());
        for (slot, label) in loaded.value.iter().zip(config.time_slots.iter()) {
            assert_eq!(&slot.time, label);
            assert_eq!(slot.service_id, config.default_service.id);
            assert_eq!(slot.students.len(), config.students_per_slot);
            assert!(slot
                .students
                .iter()
                .all(|s| s.status == AttendanceStatus::Vago && s.name.is_empty()));
        }

        println!("✅ Default schedule test PASSED");
    }

    #[test]
    fn test_default_schedule_uses_first_catalog_service() {
        let mut store = memory_store();
        let settings = AppSettings {
            services: vec![Service::new("Funcional", 40.0), Service::new("Pilates", 25.0)],
            student_tags: vec![],
        };
        store.save_settings(&settings).unwrap();

        let schedule = store.load_schedule(date(2024, 5, 2));

        assert!(schedule.iter().all(|slot| slot.service_id == settings.services[0].id));
    }

    #[test]
    fn test_schedule_round_trip() {
        let mut store = memory_store();
        let day = date(2024, 3, 1);

        let mut schedule = store.load_schedule(day);
        schedule[2].students[0].status = AttendanceStatus::Presente;
        schedule[2].students[0].name = "Carla".to_string();
        schedule[2].students[1].notes = "chegou atrasada".to_string();

        store.save_schedule(day, &schedule).unwrap();
        let loaded = store.load_schedule_checked(day, &store.load_settings());

        assert_eq!(loaded.source, RecordSource::Stored);
        assert_eq!(loaded.value, schedule);
    }

    #[test]
    fn test_corrupted_schedule_falls_back() {
        let mut store = memory_store();
        let day = date(2024, 3, 1);
        let key = store.key_for(day, RecordKind::Schedule);
        store.medium_mut().set(&key, "{not json").unwrap();

        let loaded = store.load_schedule_checked(day, &store.load_settings());

        assert!(loaded.is_degraded());
        assert_eq!(loaded.value.len(), store.config().time_slots.len());
    }

    #[test]
    fn test_empty_stored_schedule_is_regenerated() {
        let mut store = memory_store();
        let day = date(2024, 3, 1);
        store.save_schedule(day, &Vec::new()).unwrap();

        let schedule = store.load_schedule(day);

        assert_eq!(schedule.len(), store.config().time_slots.len());
    }

    #[test]
    fn test_unknown_status_is_corruption() {
        let mut store = memory_store();
        let day = date(2024, 3, 1);
        let key = store.key_for(day, RecordKind::Schedule);
        store
            .medium_mut()
            .set(
                &key,
                r#"[{"time":"08:00","serviceId":"x","students":[{"id":"1","name":"","status":"Atrasado","tag":"","notes":""}]}]"#,
            )
            .unwrap();

        let loaded = store.load_schedule_checked(day, &store.load_settings());
        assert_eq!(loaded.source, RecordSource::Corrupted);
    }

    #[test]
    fn test_settings_default_and_corruption() {
        let mut store = memory_store();
        let defaults = store.config().default_settings();

        let loaded = store.load_settings_checked();
        assert_eq!(loaded.source, RecordSource::Missing);
        assert_eq!(loaded.value, defaults);

        let key = store.config().settings_key.clone();
        store.medium_mut().set(&key, "42").unwrap();
        assert_eq!(store.load_settings_checked().source, RecordSource::Corrupted);

        store
            .medium_mut()
            .set(&key, r#"{"services":[],"studentTags":[]}"#)
            .unwrap();
        let loaded = store.load_settings_checked();
        assert_eq!(loaded.source, RecordSource::Corrupted);
        assert_eq!(loaded.value, defaults);
    }

    #[test]
    fn test_settings_key_literal() {
        let mut store = memory_store();
        let settings = store.load_settings();
        store.save_settings(&settings).unwrap();

        let raw = store.medium().get("pilaris_control_settings").unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(json["services"].is_array());
        assert!(json["studentTags"].is_array());
    }

    #[test]
    fn test_expenses_default_and_corruption() {
        let mut store = memory_store();
        let day = date(2024, 3, 1);
        assert!(store.load_expenses(day).is_empty());

        let expenses = vec![Expense {
            id: "e1".to_string(),
            description: "Material".to_string(),
            amount: 15.0,
            date: "2024-03-01".to_string(),
        }];
        store.save_expenses(day, &expenses).unwrap();
        assert_eq!(store.load_expenses(day), expenses);
        assert!(store
            .medium()
            .get("pilaris_control_2024-03-01_expenses")
            .unwrap()
            .is_some());

        let key = store.key_for(day, RecordKind::Expenses);
        store.medium_mut().set(&key, r#"[{"id":1}]"#).unwrap();
        let loaded = store.load_expenses_checked(day);
        assert!(loaded.is_degraded());
        assert!(loaded.value.is_empty());
    }

    #[test]
    fn test_load_day_with_sqlite_medium() {
        let medium = SqliteMedium::open_in_memory().unwrap();
        let mut store = RecordStore::new(medium, StoreConfig::default());
        let settings = store.load_settings();
        let day = date(2024, 6, 10);

        let key = store.key_for(day, RecordKind::Expenses);
        store.medium_mut().set(&key, "garbage").unwrap();

        let records = store.load_day(day, &settings);
        assert!(records.expenses.is_empty());
        assert_eq!(records.schedule.len(), store.config().time_slots.len());

        store.save_schedule(day, &records.schedule).unwrap();
        assert_eq!(store.load_schedule_for(day, &settings), records.schedule);

        println!("✅ SQLite day load test PASSED");
    }
}
