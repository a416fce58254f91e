// 📅 Session - The active date and its records
//
// Holds the current date's schedule and expenses plus the global settings.
// Every mutation writes its whole record straight through to the store:
// no batching, no deferred flush. Changes are built on a copy, written,
// and only then adopted, so a failed write leaves the session unchanged.

use crate::calculations::DailyReport;
use crate::error::{PilarisError, Result};
use crate::keys::date_label;
use crate::medium::KeyValueMedium;
use crate::models::{
    AppSettings, AttendanceStatus, DailySchedule, Expense, NewExpense, Service, ServicePatch,
    Student, StudentPatch, TimeSlot, TimeSlotPatch, YearlySummary,
};
use crate::store::{DayRecords, RecordStore};
use chrono::NaiveDate;
use tracing::info;

pub struct Session<M: KeyValueMedium> {
    store: RecordStore<M>,
    current_date: NaiveDate,
    settings: AppSettings,
    schedule: DailySchedule,
    expenses: Vec<Expense>,
}

impl<M: KeyValueMedium> Session<M> {
    /// Load settings and `date`, then persist them so the visit is recorded
    pub fn open(store: RecordStore<M>, date: NaiveDate) -> Result<Self> {
        let settings = store.load_settings();
        let DayRecords { schedule, expenses } = store.load_day(date, &settings);

        let mut session = Session {
            store,
            current_date: date,
            settings,
            schedule,
            expenses,
        };

        session.store.save_settings(&session.settings)?;
        session.persist_day()?;
        info!(date = %date, "session opened");

        Ok(session)
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn current_date(&self) -> NaiveDate {
        self.current_date
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn schedule(&self) -> &DailySchedule {
        &self.schedule
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn store(&self) -> &RecordStore<M> {
        &self.store
    }

    pub fn into_store(self) -> RecordStore<M> {
        self.store
    }

    // ========================================================================
    // DATE SWITCH
    // ========================================================================

    /// Replace schedule and expenses together; neither is left from the
    /// previous date. Both records of the new date are persisted.
    pub fn switch_date(&mut self, date: NaiveDate) -> Result<()> {
        let DayRecords { schedule, expenses } = self.store.load_day(date, &self.settings);

        self.store.save_schedule(date, &schedule)?;
        self.store.save_expenses(date, &expenses)?;

        self.current_date = date;
        self.schedule = schedule;
        self.expenses = expenses;
        info!(date = %date, "switched date");

        Ok(())
    }

    fn persist_day(&mut self) -> Result<()> {
        self.store.save_schedule(self.current_date, &self.schedule)?;
        self.store.save_expenses(self.current_date, &self.expenses)
    }

    // ========================================================================
    // SCHEDULE MUTATIONS
    // ========================================================================

    pub fn update_student(&mut self, time: &str, student_id: &str, patch: StudentPatch) -> Result<()> {
        let mut schedule = self.schedule.clone();
        let student = slot_mut(&mut schedule, time)?
            .student_mut(student_id)
            .ok_or_else(|| PilarisError::StudentNotFound(student_id.to_string()))?;
        student.apply(patch);

        self.commit_schedule(schedule)
    }

    pub fn set_status(&mut self, time: &str, student_id: &str, status: AttendanceStatus) -> Result<()> {
        self.update_student(time, student_id, StudentPatch::status(status))
    }

    /// Appends a blank student marked present; returns its id
    pub fn add_student(&mut self, time: &str) -> Result<String> {
        let mut schedule = self.schedule.clone();
        let student = Student::blank(AttendanceStatus::Presente);
        let id = student.id.clone();
        slot_mut(&mut schedule, time)?.students.push(student);

        self.commit_schedule(schedule)?;
        Ok(id)
    }

    pub fn remove_student(&mut self, time: &str, student_id: &str) -> Result<()> {
        let mut schedule = self.schedule.clone();
        let slot = slot_mut(&mut schedule, time)?;

        let before = slot.students.len();
        slot.students.retain(|s| s.id != student_id);
        if slot.students.len() == before {
            return Err(PilarisError::StudentNotFound(student_id.to_string()));
        }

        self.commit_schedule(schedule)
    }

    /// A patched service id must exist in the catalog
    pub fn update_time_slot(&mut self, time: &str, patch: TimeSlotPatch) -> Result<()> {
        if let Some(service_id) = &patch.service_id {
            if self.settings.service(service_id).is_none() {
                return Err(PilarisError::ServiceNotFound(service_id.clone()));
            }
        }

        let mut schedule = self.schedule.clone();
        slot_mut(&mut schedule, time)?.apply(patch);

        self.commit_schedule(schedule)
    }

    fn commit_schedule(&mut self, schedule: DailySchedule) -> Result<()> {
        self.store.save_schedule(self.current_date, &schedule)?;
        self.schedule = schedule;
        Ok(())
    }

    // ========================================================================
    // EXPENSE MUTATIONS
    // ========================================================================

    /// Assigns a fresh id and the current date
    pub fn add_expense(&mut self, expense: NewExpense) -> Result<Expense> {
        validate_amount(expense.amount)?;

        let expense = Expense {
            id: uuid::Uuid::new_v4().to_string(),
            description: expense.description,
            amount: expense.amount,
            date: date_label(self.current_date),
        };

        let mut expenses = self.expenses.clone();
        expenses.push(expense.clone());
        self.commit_expenses(expenses)?;

        Ok(expense)
    }

    pub fn remove_expense(&mut self, id: &str) -> Result<()> {
        let mut expenses = self.expenses.clone();
        expenses.retain(|e| e.id != id);
        if expenses.len() == self.expenses.len() {
            return Err(PilarisError::ExpenseNotFound(id.to_string()));
        }

        self.commit_expenses(expenses)
    }

    fn commit_expenses(&mut self, expenses: Vec<Expense>) -> Result<()> {
        self.store.save_expenses(self.current_date, &expenses)?;
        self.expenses = expenses;
        Ok(())
    }

    // ========================================================================
    // SETTINGS MUTATIONS
    // ========================================================================

    /// Rejects an empty catalog or a negative price before anything is written.
    /// Tags are trimmed; blank and repeated tags are dropped.
    pub fn update_settings(&mut self, mut settings: AppSettings) -> Result<()> {
        if settings.services.is_empty() {
            return Err(PilarisError::LastService);
        }
        for service in &settings.services {
            validate_amount(service.price)?;
        }
        settings.student_tags = normalize_tags(settings.student_tags);

        self.commit_settings(settings)
    }

    pub fn add_service(&mut self) -> Result<Service> {
        let config = self.store.config();
        let service = Service::new(&config.new_service_name, config.new_service_price);

        let mut settings = self.settings.clone();
        settings.services.push(service.clone());
        self.commit_settings(settings)?;

        info!(service = %service.name, "service added");
        Ok(service)
    }

    pub fn update_service(&mut self, id: &str, patch: ServicePatch) -> Result<()> {
        if let Some(price) = patch.price {
            validate_amount(price)?;
        }

        let mut settings = self.settings.clone();
        let service = settings
            .services
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| PilarisError::ServiceNotFound(id.to_string()))?;

        if let Some(name) = patch.name {
            service.name = name;
        }
        if let Some(price) = patch.price {
            service.price = price;
        }

        self.commit_settings(settings)
    }

    /// The last remaining service can never be removed
    pub fn remove_service(&mut self, id: &str) -> Result<()> {
        if self.settings.services.len() <= 1 {
            return Err(PilarisError::LastService);
        }

        let mut settings = self.settings.clone();
        settings.services.retain(|s| s.id != id);
        if settings.services.len() == self.settings.services.len() {
            return Err(PilarisError::ServiceNotFound(id.to_string()));
        }

        self.commit_settings(settings)?;
        info!(service_id = id, "service removed");
        Ok(())
    }

    /// Returns false for blank or duplicate tags
    pub fn add_tag(&mut self, tag: &str) -> Result<bool> {
        let tag = tag.trim();
        if tag.is_empty() || self.settings.student_tags.iter().any(|t| t == tag) {
            return Ok(false);
        }

        let mut settings = self.settings.clone();
        settings.student_tags.push(tag.to_string());
        self.commit_settings(settings)?;
        Ok(true)
    }

    pub fn remove_tag(&mut self, tag: &str) -> Result<bool> {
        if !self.settings.student_tags.iter().any(|t| t == tag) {
            return Ok(false);
        }

        let mut settings = self.settings.clone();
        settings.student_tags.retain(|t| t != tag);
        self.commit_settings(settings)?;
        Ok(true)
    }

    fn commit_settings(&mut self, settings: AppSettings) -> Result<()> {
        self.store.save_settings(&settings)?;
        self.settings = settings;
        Ok(())
    }

    // ========================================================================
    // REPORTS
    // ========================================================================

    pub fn daily_report(&self) -> DailyReport {
        DailyReport::build(
            &date_label(self.current_date),
            &self.schedule,
            &self.expenses,
            &self.settings.services,
        )
    }

    /// Recomputed from the store on every call, priced with the live catalog
    pub fn yearly_summary(&self, year: i32) -> YearlySummary {
        self.store.yearly_summary_with(year, &self.settings)
    }
}

fn slot_mut<'a>(schedule: &'a mut DailySchedule, time: &str) -> Result<&'a mut TimeSlot> {
    schedule
        .iter_mut()
        .find(|slot| slot.time == time)
        .ok_or_else(|| PilarisError::TimeSlotNotFound(time.to_string()))
}

/// Same rules as `add_tag`, first occurrence wins
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !unique.iter().any(|t| t == tag) {
            unique.push(tag.to_string());
        }
    }
    unique
}

fn validate_amount(amount: f64) -> Result<()> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(())
    } else {
        Err(PilarisError::InvalidAmount(amount))
    }
}
