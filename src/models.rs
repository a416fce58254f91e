// 🗂️ Domain Models - Schedules, Services, Expenses, Settings
// Field names serialize exactly as the persisted JSON records expect
// (camelCase, status literals in Portuguese).

use serde::{Deserialize, Serialize};

// ============================================================================
// ATTENDANCE STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AttendanceStatus {
    /// Open slot, nobody booked
    #[default]
    Vago,

    /// Student attended (the only status that earns revenue)
    Presente,

    /// Student was booked but missed the session
    Faltou,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Vago => "Vago",
            AttendanceStatus::Presente => "Presente",
            AttendanceStatus::Faltou => "Faltou",
        }
    }

    /// Parse a status literal (case-insensitive)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "vago" => Some(AttendanceStatus::Vago),
            "presente" => Some(AttendanceStatus::Presente),
            "faltou" => Some(AttendanceStatus::Faltou),
            _ => None,
        }
    }

    pub fn is_billable(&self) -> bool {
        matches!(self, AttendanceStatus::Presente)
    }
}

// ============================================================================
// SCHEDULE
// ============================================================================

/// One occupant of a time slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,

    #[serde(default)]
    pub name: String,

    pub status: AttendanceStatus,

    /// Classification tag from the configured tag set (empty = none)
    #[serde(default)]
    pub tag: String,

    #[serde(default)]
    pub notes: String,
}

impl Student {
    /// Blank student with a fresh id
    pub fn blank(status: AttendanceStatus) -> Self {
        Student {
            id: uuid::Uuid::new_v4().to_string(),
            name: String::new(),
            status,
            tag: String::new(),
            notes: String::new(),
        }
    }

    pub fn tag(&self) -> Option<&str> {
        if self.tag.is_empty() {
            None
        } else {
            Some(&self.tag)
        }
    }

    pub fn apply(&mut self, patch: StudentPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(tag) = patch.tag {
            self.tag = tag;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    /// Time label, unique within a day (e.g. "08:00")
    pub time: String,

    /// Service id; must resolve against the catalog to earn revenue
    pub service_id: String,

    /// Insertion order is display order
    pub students: Vec<Student>,
}

impl TimeSlot {
    pub fn student_mut(&mut self, student_id: &str) -> Option<&mut Student> {
        self.students.iter_mut().find(|s| s.id == student_id)
    }

    pub fn present_count(&self) -> usize {
        self.students.iter().filter(|s| s.status.is_billable()).count()
    }

    pub fn apply(&mut self, patch: TimeSlotPatch) {
        if let Some(service_id) = patch.service_id {
            self.service_id = service_id;
        }
        if let Some(students) = patch.students {
            self.students = students;
        }
    }
}

/// A day's schedule: one slot per configured time label, in order
pub type DailySchedule = Vec<TimeSlot>;

// ============================================================================
// PATCHES (partial updates)
// ============================================================================

/// Fields left as `None` are unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub status: Option<AttendanceStatus>,
    pub tag: Option<String>,
    pub notes: Option<String>,
}

impl StudentPatch {
    pub fn status(status: AttendanceStatus) -> Self {
        StudentPatch {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// The time label is the slot's key and cannot be patched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSlotPatch {
    pub service_id: Option<String>,
    pub students: Option<Vec<Student>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServicePatch {
    pub name: Option<String>,
    pub price: Option<f64>,
}

// ============================================================================
// CATALOG & SETTINGS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub price: f64,
}

impl Service {
    pub fn new(name: &str, price: f64) -> Self {
        Service {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            price,
        }
    }
}

/// Global settings, stored under a single non-partitioned key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Never empty once persisted
    pub services: Vec<Service>,

    #[serde(default)]
    pub student_tags: Vec<String>,
}

impl AppSettings {
    pub fn service(&self, id: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.id == id)
    }

    pub fn first_service_id(&self) -> Option<&str> {
        self.services.first().map(|s| s.id.as_str())
    }
}

// ============================================================================
// EXPENSES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub description: String,
    pub amount: f64,

    /// ISO date (YYYY-MM-DD) the expense was incurred on
    pub date: String,
}

/// Expense as entered by the caller; id and date are assigned on insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub description: String,
    pub amount: f64,
}

impl NewExpense {
    pub fn new(description: impl Into<String>, amount: f64) -> Self {
        NewExpense {
            description: description.into(),
            amount,
        }
    }
}

// ============================================================================
// SUMMARIES (derived, never persisted)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlySummary {
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub net_profit: f64,
    pub estimated_tax: f64,
}
