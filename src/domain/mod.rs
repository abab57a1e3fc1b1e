//! Core domain layer. No external I/O dependencies.
//!
//! Entities, calendar helpers, fee quoting and schedule admission rules.

pub mod calendar;
pub mod entities;
pub mod errors;
pub mod fee;
pub mod schedule;

pub use entities::{
    BillingPeriod, ClassSlot, FeeQuote, FeeSettings, Registration, RegistrationId,
    RegistrationStatus, ScheduleEntry, SlotDraft, SlotId, StudentId,
};
pub use errors::{DomainError, DraftError, FeeError, ScheduleConflict};
pub use fee::FeeCalculator;
pub use schedule::ScheduleValidator;
