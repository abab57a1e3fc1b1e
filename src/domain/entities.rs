//! Domain entities. Pure data structures for the core business.
//!
//! No storage types here; adapters map rows into these.

use crate::domain::calendar::{month_name, weekday_key, weekday_label};
use crate::domain::errors::DraftError;
use chrono::{Datelike, NaiveTime, Utc, Weekday};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fee per session used when no settings have been saved yet.
pub const BASELINE_FEE_PER_SESSION: Decimal = dec!(50.00);

/// Longest teacher name accepted for a class.
pub const MAX_TEACHER_LEN: usize = 100;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Store-assigned identity of an admitted class slot.
    SlotId
);
id_type!(RegistrationId);
id_type!(
    /// Student identity, owned by the (external) account system.
    StudentId
);

/// A class definition that has not been admitted yet (create or edit input).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotDraft {
    pub class_number: u32,
    pub weekday: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub teacher: String,
}

impl SlotDraft {
    /// Builds a draft after the field-level checks: class number at least 1,
    /// start strictly before end, teacher present and at most 100 characters.
    pub fn new(
        class_number: u32,
        weekday: Weekday,
        start_time: NaiveTime,
        end_time: NaiveTime,
        teacher: impl Into<String>,
    ) -> Result<Self, DraftError> {
        let teacher = teacher.into().trim().to_string();
        if class_number == 0 {
            return Err(DraftError::InvalidClassNumber);
        }
        if start_time >= end_time {
            return Err(DraftError::EndNotAfterStart {
                start: start_time,
                end: end_time,
            });
        }
        if teacher.is_empty() {
            return Err(DraftError::EmptyTeacher);
        }
        let len = teacher.chars().count();
        if len > MAX_TEACHER_LEN {
            return Err(DraftError::TeacherTooLong(len));
        }
        Ok(Self {
            class_number,
            weekday,
            start_time,
            end_time,
            teacher,
        })
    }
}

/// One recurring weekly class: fixed weekday, fixed [start, end) time of day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSlot {
    pub id: SlotId,
    pub class_number: u32,
    pub weekday: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub teacher: String,
}

impl ClassSlot {
    pub fn from_draft(id: SlotId, draft: SlotDraft) -> Self {
        Self {
            id,
            class_number: draft.class_number,
            weekday: draft.weekday,
            start_time: draft.start_time,
            end_time: draft.end_time,
            teacher: draft.teacher,
        }
    }

    pub fn to_draft(&self) -> SlotDraft {
        SlotDraft {
            class_number: self.class_number,
            weekday: self.weekday,
            start_time: self.start_time,
            end_time: self.end_time,
            teacher: self.teacher.clone(),
        }
    }

    /// "09:00 AM - 10:30 AM"
    pub fn time_display(&self) -> String {
        format!(
            "{} - {}",
            self.start_time.format("%I:%M %p"),
            self.end_time.format("%I:%M %p")
        )
    }
}

impl fmt::Display for ClassSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - Class {} ({}) - {}",
            weekday_label(self.weekday),
            self.class_number,
            self.time_display(),
            self.teacher
        )
    }
}

/// A (year, month) pair fees are computed for. Not validated on construction;
/// the fee calculator rejects out-of-range months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BillingPeriod {
    pub year: i32,
    pub month: u32,
}

impl BillingPeriod {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn month_name(&self) -> &'static str {
        month_name(self.month)
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month_name(), self.year)
    }
}

/// Computed fee for one class in one billing period. Frozen into the
/// registration once requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeQuote {
    pub session_count: u32,
    pub fee_per_session: Decimal,
    pub total_fee: Decimal,
}

/// Currently configured rate and reference year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSettings {
    pub year: i32,
    pub fee_per_session: Decimal,
}

impl FeeSettings {
    /// 50.00 per session for the current UTC year.
    pub fn baseline() -> Self {
        Self {
            year: Utc::now().year(),
            fee_per_session: BASELINE_FEE_PER_SESSION,
        }
    }
}

impl Default for FeeSettings {
    fn default() -> Self {
        Self::baseline()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Pending,
    Approved,
    Rejected,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegistrationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown registration status '{}'", other)),
        }
    }
}

/// A student's request to attend one class for one billing period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: RegistrationId,
    pub student_id: StudentId,
    pub class_id: SlotId,
    pub period: BillingPeriod,
    /// Total fee frozen at request time.
    pub fee: Decimal,
    pub status: RegistrationStatus,
    /// Unix seconds.
    pub created_at: i64,
}

/// One row of the calendar schedule feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: i64,
    pub title: String,
    pub start: String,
    pub end: String,
    pub day: String,
}

impl From<&ClassSlot> for ScheduleEntry {
    fn from(slot: &ClassSlot) -> Self {
        Self {
            id: slot.id.0,
            title: format!("Class {}: {}", slot.class_number, slot.teacher),
            start: slot.start_time.format("%H:%M").to_string(),
            end: slot.end_time.format("%H:%M").to_string(),
            day: weekday_key(slot.weekday).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn draft_rejects_bad_fields() {
        assert_eq!(
            SlotDraft::new(0, Weekday::Mon, t(9, 0), t(10, 0), "Ann"),
            Err(DraftError::InvalidClassNumber)
        );
        assert!(matches!(
            SlotDraft::new(1, Weekday::Mon, t(10, 0), t(10, 0), "Ann"),
            Err(DraftError::EndNotAfterStart { .. })
        ));
        assert_eq!(
            SlotDraft::new(1, Weekday::Mon, t(9, 0), t(10, 0), "   "),
            Err(DraftError::EmptyTeacher)
        );
        assert_eq!(
            SlotDraft::new(1, Weekday::Mon, t(9, 0), t(10, 0), "x".repeat(101)),
            Err(DraftError::TeacherTooLong(101))
        );
    }

    #[test]
    fn draft_trims_teacher() {
        let draft = SlotDraft::new(3, Weekday::Fri, t(9, 0), t(10, 0), "  Ann Lee ").unwrap();
        assert_eq!(draft.teacher, "Ann Lee");
    }

    #[test]
    fn slot_display_and_feed_entry() {
        let draft = SlotDraft::new(2, Weekday::Tue, t(9, 0), t(13, 30), "Ann").unwrap();
        let slot = ClassSlot::from_draft(SlotId(7), draft.clone());
        assert_eq!(slot.time_display(), "09:00 AM - 01:30 PM");
        assert_eq!(slot.to_string(), "Tuesday - Class 2 (09:00 AM - 01:30 PM) - Ann");
        assert_eq!(slot.to_draft(), draft);

        let entry = ScheduleEntry::from(&slot);
        assert_eq!(entry.id, 7);
        assert_eq!(entry.title, "Class 2: Ann");
        assert_eq!(entry.start, "09:00");
        assert_eq!(entry.end, "13:30");
        assert_eq!(entry.day, "tuesday");
    }

    #[test]
    fn status_parses_stored_form() {
        for status in [
            RegistrationStatus::Pending,
            RegistrationStatus::Approved,
            RegistrationStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<RegistrationStatus>(), Ok(status));
        }
        assert!("cancelled".parse::<RegistrationStatus>().is_err());
    }

    #[test]
    fn period_display() {
        assert_eq!(BillingPeriod::new(2024, 2).to_string(), "February 2024");
    }
}
