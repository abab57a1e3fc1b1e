//! Admission rules for weekly class slots.
//!
//! On a given weekday a class number may appear once, and no two slots may
//! share any part of their [start, end) interval. Back-to-back slots are fine.

use crate::domain::entities::{ClassSlot, SlotDraft, SlotId};
use crate::domain::errors::ScheduleConflict;
use chrono::NaiveTime;

/// True when [a_start, a_end) and [b_start, b_end) share at least one instant.
pub fn intervals_overlap(
    a_start: NaiveTime,
    a_end: NaiveTime,
    b_start: NaiveTime,
    b_end: NaiveTime,
) -> bool {
    a_start < b_end && a_end > b_start
}

pub struct ScheduleValidator;

impl ScheduleValidator {
    /// Checks whether `candidate` may be admitted next to `existing`.
    ///
    /// `existing` should be the admitted slots on the candidate's weekday; slots
    /// on other days are ignored. `exclude_id` names the candidate's own stored
    /// form when editing in place, so it is not compared against itself.
    ///
    /// Duplicate class numbers are checked before time overlaps; the first
    /// violation found is returned.
    pub fn validate(
        candidate: &SlotDraft,
        existing: &[ClassSlot],
        exclude_id: Option<SlotId>,
    ) -> Result<(), ScheduleConflict> {
        let peers = || {
            existing
                .iter()
                .filter(move |s| s.weekday == candidate.weekday && Some(s.id) != exclude_id)
        };

        if peers().any(|s| s.class_number == candidate.class_number) {
            return Err(ScheduleConflict::DuplicateClassNumber {
                class_number: candidate.class_number,
                weekday: candidate.weekday,
            });
        }

        if let Some(clash) = peers().find(|s| {
            intervals_overlap(
                candidate.start_time,
                candidate.end_time,
                s.start_time,
                s.end_time,
            )
        }) {
            return Err(ScheduleConflict::TimeOverlap {
                existing: clash.clone(),
            });
        }

        Ok(())
    }
}
