pub mod dto;
pub mod model;
pub mod queries;
pub mod routes;

use chrono::{DateTime, NaiveDate};
use uuid::Uuid;

use crate::error::AppError;
use model::Priority;

pub const TASK_NOT_FOUND: &str = "Task not found";

// HELPER FUNCTIONS

/// A path segment that is not a task id names no task.
pub fn parse_task_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(TASK_NOT_FOUND.to_string()))
}

pub fn validate_title(title: &str) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::Validation("Task title is required".to_string()));
    }

    Ok(())
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp, keeping only the date.
pub fn parse_due_date(raw: &str) -> Result<NaiveDate, AppError> {
    let raw = raw.trim();

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| AppError::Validation("Valid due date is required".to_string()))
}

pub fn parse_priority(raw: Option<&str>) -> Priority {
    match raw.map(str::trim) {
        Some(p) if !p.is_empty() => Priority::from(p.to_string()),
        _ => Priority::default(),
    }
}
