//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters (sqlite, in-memory).

use crate::domain::{
    BillingPeriod, ClassSlot, DomainError, FeeSettings, Registration, RegistrationId,
    RegistrationStatus, SlotDraft, SlotId, StudentId,
};
use chrono::Weekday;
use rust_decimal::Decimal;

/// Class slot store. Lookup-by-weekday feeds the schedule validator.
#[async_trait::async_trait]
pub trait SlotRepoPort: Send + Sync {
    /// All admitted slots whose weekday equals `weekday`.
    async fn slots_on_weekday(&self, weekday: Weekday) -> Result<Vec<ClassSlot>, DomainError>;

    async fn get_slot(&self, id: SlotId) -> Result<Option<ClassSlot>, DomainError>;

    async fn list_slots(&self) -> Result<Vec<ClassSlot>, DomainError>;

    /// Persist a validated draft. Fails with `ScheduleConflict::DuplicateClassNumber`
    /// if the store's (class number, weekday) key is already taken.
    async fn insert_slot(&self, draft: &SlotDraft) -> Result<ClassSlot, DomainError>;

    /// Overwrite slot `id`. `NotFound` if it does not exist.
    async fn update_slot(&self, id: SlotId, draft: &SlotDraft) -> Result<ClassSlot, DomainError>;

    /// Remove slot `id` together with its registrations. Returns false if absent.
    async fn delete_slot(&self, id: SlotId) -> Result<bool, DomainError>;
}

/// Narrows `list_registrations`. Unset fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistrationFilter {
    pub status: Option<RegistrationStatus>,
    pub student_id: Option<StudentId>,
    pub class_id: Option<SlotId>,
    /// Keep only the newest `limit` rows.
    pub limit: Option<usize>,
}

impl RegistrationFilter {
    pub fn matches(&self, r: &Registration) -> bool {
        self.status.is_none_or(|s| r.status == s)
            && self.student_id.is_none_or(|s| r.student_id == s)
            && self.class_id.is_none_or(|c| r.class_id == c)
    }
}

/// Registration store. (student, class, period) is unique.
#[async_trait::async_trait]
pub trait RegistrationRepoPort: Send + Sync {
    async fn find_registration(
        &self,
        student_id: StudentId,
        class_id: SlotId,
        period: BillingPeriod,
    ) -> Result<Option<Registration>, DomainError>;

    async fn get_registration(&self, id: RegistrationId)
    -> Result<Option<Registration>, DomainError>;

    /// Insert a pending registration with its frozen fee. Fails with
    /// `AlreadyRegistered` if the (student, class, period) key is taken.
    async fn insert_registration(
        &self,
        student_id: StudentId,
        class_id: SlotId,
        period: BillingPeriod,
        fee: Decimal,
    ) -> Result<Registration, DomainError>;

    /// Registrations matching `filter`, newest first.
    async fn list_registrations(
        &self,
        filter: RegistrationFilter,
    ) -> Result<Vec<Registration>, DomainError>;

    /// Returns false if the registration does not exist.
    async fn set_status(
        &self,
        id: RegistrationId,
        status: RegistrationStatus,
    ) -> Result<bool, DomainError>;

    async fn delete_registration(&self, id: RegistrationId) -> Result<bool, DomainError>;
}

/// Settings store: current fee per session and reference year.
#[async_trait::async_trait]
pub trait SettingsPort: Send + Sync {
    /// Saved settings, or the configured baseline when nothing was saved.
    async fn current_settings(&self) -> Result<FeeSettings, DomainError>;

    async fn save_settings(&self, settings: FeeSettings) -> Result<(), DomainError>;
}
