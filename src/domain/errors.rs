//! Domain errors. Used by ports and use cases.
//!
//! Fee and schedule outcomes are their own enums so callers can match on them
//! directly; `DomainError` wraps them for the service layer. Adapters map
//! infrastructure errors into `DomainError::Repo`.

use crate::domain::calendar::weekday_label;
use crate::domain::entities::{ClassSlot, RegistrationId, RegistrationStatus};
use chrono::{NaiveTime, Weekday};
use rust_decimal::Decimal;
use thiserror::Error;

/// Malformed input to the fee calculator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeeError {
    #[error("invalid billing period {year}-{month:02}: month must be 1-12 and year at least 1")]
    InvalidPeriod { year: i32, month: u32 },

    #[error("invalid fee per session {0}: must not be negative")]
    InvalidRate(Decimal),
}

/// A candidate slot cannot be admitted next to the existing ones.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleConflict {
    #[error("class number {class_number} already exists for {}", day(.weekday))]
    DuplicateClassNumber { class_number: u32, weekday: Weekday },

    #[error("this time overlaps with an existing class: {existing}")]
    TimeOverlap { existing: ClassSlot },
}

/// Field-level problems with a class definition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("class number must be at least 1")]
    InvalidClassNumber,

    #[error("end time {end} must be after start time {start}")]
    EndNotAfterStart { start: NaiveTime, end: NaiveTime },

    #[error("teacher name is required")]
    EmptyTeacher,

    #[error("teacher name is {0} characters; at most 100 allowed")]
    TeacherTooLong(usize),
}

fn day(weekday: &Weekday) -> &'static str {
    weekday_label(*weekday)
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Repository error: {0}")]
    Repo(String),

    #[error(transparent)]
    Fee(#[from] FeeError),

    #[error(transparent)]
    Schedule(#[from] ScheduleConflict),

    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("already registered for this class in {month}")]
    AlreadyRegistered { month: &'static str },

    #[error("registration {0} belongs to another student")]
    NotOwner(RegistrationId),

    #[error("only pending registrations can be cancelled; registration {id} is {status}")]
    NotPending {
        id: RegistrationId,
        status: RegistrationStatus,
    },

    #[error("UI error: {0}")]
    Ui(String),

    /// The user backed out of a prompt.
    #[error("cancelled")]
    Cancelled,
}
