// Pilaris Control - Core Library
// Per-date record store on a flat key/value medium, plus yearly aggregation

pub mod models;
pub mod keys;
pub mod medium;
pub mod config;
pub mod store;
pub mod calculations;
pub mod aggregation;   // Yearly scan over the key space
pub mod session;       // Active date + write-through mutations
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use models::{
    AttendanceStatus, Student, TimeSlot, DailySchedule, Service, Expense, NewExpense,
    AppSettings, YearlySummary, StudentPatch, TimeSlotPatch, ServicePatch,
};
pub use keys::{RecordKind, record_key, year_prefix, parse_record_key, parse_date, date_label};
pub use medium::{KeyValueMedium, MemoryMedium, SqliteMedium};
pub use config::{StoreConfig, ESTIMATED_TAX_RATE};
pub use store::{RecordStore, DayRecords, Loaded, RecordSource};
pub use calculations::{
    calculate_total_revenue, calculate_total_expenses, calculate_net_profit,
    calculate_estimated_tax, calculate_yearly_summary, DailyReport, AttendanceLine,
};
pub use aggregation::{AnnualData, collect_annual_data};
pub use session::Session;
pub use error::{PilarisError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
