use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PilarisError>;

#[derive(Debug, Error)]
pub enum PilarisError {
    #[error("at least one service must remain in the catalog")]
    LastService,
    #[error("service not found: {0}")]
    ServiceNotFound(String),
    #[error("time slot not found: {0}")]
    TimeSlotNotFound(String),
    #[error("student not found: {0}")]
    StudentNotFound(String),
    #[error("expense not found: {0}")]
    ExpenseNotFound(String),
    #[error("invalid amount: {0}")]
    InvalidAmount(f64),
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
