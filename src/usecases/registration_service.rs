//! Student registrations: quote, request, cancel; admin approve/reject,
//! per-class details and the dashboard summary.
//!
//! The fee is quoted with the settings current at request time and frozen into
//! the registration. Later rate changes never touch existing registrations.

use crate::domain::{
    BillingPeriod, ClassSlot, DomainError, FeeCalculator, FeeQuote, Registration, RegistrationId,
    RegistrationStatus, SlotId, StudentId,
};
use crate::ports::{RegistrationFilter, RegistrationRepoPort, SettingsPort, SlotRepoPort};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::info;

/// A student's registrations split by status, each newest first.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StudentRegistrations {
    pub approved: Vec<Registration>,
    pub pending: Vec<Registration>,
    pub rejected: Vec<Registration>,
}

/// One class with everything registered against it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDetails {
    pub class: ClassSlot,
    /// Newest first.
    pub registrations: Vec<Registration>,
    /// Distinct billing periods that have at least one registration, ascending.
    pub periods: Vec<BillingPeriod>,
}

/// Administrator overview.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub class_count: usize,
    /// Distinct students with at least one registration.
    pub student_count: usize,
    pub pending_count: usize,
    /// At most `RECENT_REGISTRATIONS`, newest first.
    pub recent: Vec<Registration>,
}

pub const RECENT_REGISTRATIONS: usize = 5;

pub struct RegistrationService {
    slots: Arc<dyn SlotRepoPort>,
    registrations: Arc<dyn RegistrationRepoPort>,
    settings: Arc<dyn SettingsPort>,
}

impl RegistrationService {
    pub fn new(
        slots: Arc<dyn SlotRepoPort>,
        registrations: Arc<dyn RegistrationRepoPort>,
        settings: Arc<dyn SettingsPort>,
    ) -> Self {
        Self {
            slots,
            registrations,
            settings,
        }
    }

    async fn class(&self, class_id: SlotId) -> Result<ClassSlot, DomainError> {
        self.slots
            .get_slot(class_id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "class",
                id: class_id.0,
            })
    }

    async fn registration(&self, id: RegistrationId) -> Result<Registration, DomainError> {
        self.registrations
            .get_registration(id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "registration",
                id: id.0,
            })
    }

    /// Quote the fee for `class_id` in `month` of the configured reference year.
    pub async fn quote_fee(
        &self,
        class_id: SlotId,
        month: u32,
    ) -> Result<(BillingPeriod, FeeQuote), DomainError> {
        let class = self.class(class_id).await?;
        let settings = self.settings.current_settings().await?;
        let period = BillingPeriod::new(settings.year, month);
        let quote = FeeCalculator::quote(period, class.weekday, settings.fee_per_session)?;
        Ok((period, quote))
    }

    /// Request a place in `class_id` for `month`. The new registration is
    /// pending and carries the quoted total as its fee.
    pub async fn request_registration(
        &self,
        student_id: StudentId,
        class_id: SlotId,
        month: u32,
    ) -> Result<Registration, DomainError> {
        let (period, quote) = self.quote_fee(class_id, month).await?;
        if self
            .registrations
            .find_registration(student_id, class_id, period)
            .await?
            .is_some()
        {
            return Err(DomainError::AlreadyRegistered {
                month: period.month_name(),
            });
        }
        let registration = self
            .registrations
            .insert_registration(student_id, class_id, period, quote.total_fee)
            .await?;
        info!(
            id = registration.id.0,
            student_id = student_id.0,
            class_id = class_id.0,
            period = %period,
            sessions = quote.session_count,
            fee = %quote.total_fee,
            "registration requested"
        );
        Ok(registration)
    }

    pub async fn approve(&self, id: RegistrationId) -> Result<Registration, DomainError> {
        self.decide(id, RegistrationStatus::Approved).await
    }

    pub async fn reject(&self, id: RegistrationId) -> Result<Registration, DomainError> {
        self.decide(id, RegistrationStatus::Rejected).await
    }

    async fn decide(
        &self,
        id: RegistrationId,
        status: RegistrationStatus,
    ) -> Result<Registration, DomainError> {
        let mut registration = self.registration(id).await?;
        if !self.registrations.set_status(id, status).await? {
            return Err(DomainError::NotFound {
                entity: "registration",
                id: id.0,
            });
        }
        registration.status = status;
        info!(id = id.0, status = %status, "registration reviewed");
        Ok(registration)
    }

    /// Withdraw a student's own pending request.
    pub async fn cancel(
        &self,
        student_id: StudentId,
        id: RegistrationId,
    ) -> Result<Registration, DomainError> {
        let registration = self.registration(id).await?;
        if registration.student_id != student_id {
            return Err(DomainError::NotOwner(id));
        }
        if registration.status != RegistrationStatus::Pending {
            return Err(DomainError::NotPending {
                id,
                status: registration.status,
            });
        }
        self.registrations.delete_registration(id).await?;
        info!(id = id.0, student_id = student_id.0, "registration cancelled");
        Ok(registration)
    }

    /// All registrations newest first, optionally only one status.
    pub async fn registrations(
        &self,
        status: Option<RegistrationStatus>,
    ) -> Result<Vec<Registration>, DomainError> {
        self.registrations
            .list_registrations(RegistrationFilter {
                status,
                ..Default::default()
            })
            .await
    }

    pub async fn class_details(&self, class_id: SlotId) -> Result<ClassDetails, DomainError> {
        let class = self.class(class_id).await?;
        let registrations = self
            .registrations
            .list_registrations(RegistrationFilter {
                class_id: Some(class_id),
                ..Default::default()
            })
            .await?;
        let periods: BTreeSet<BillingPeriod> = registrations.iter().map(|r| r.period).collect();
        Ok(ClassDetails {
            class,
            registrations,
            periods: periods.into_iter().collect(),
        })
    }

    pub async fn dashboard(&self) -> Result<DashboardSummary, DomainError> {
        let class_count = self.slots.list_slots().await?.len();
        let all = self
            .registrations
            .list_registrations(RegistrationFilter::default())
            .await?;
        let student_count = all.iter().map(|r| r.student_id).collect::<HashSet<_>>().len();
        let pending_count = all
            .iter()
            .filter(|r| r.status == RegistrationStatus::Pending)
            .count();
        let recent = all.into_iter().take(RECENT_REGISTRATIONS).collect();
        Ok(DashboardSummary {
            class_count,
            student_count,
            pending_count,
            recent,
        })
    }

    pub async fn student_overview(
        &self,
        student_id: StudentId,
    ) -> Result<StudentRegistrations, DomainError> {
        let all = self
            .registrations
            .list_registrations(RegistrationFilter {
                student_id: Some(student_id),
                ..Default::default()
            })
            .await?;
        let mut overview = StudentRegistrations::default();
        for r in all {
            match r.status {
                RegistrationStatus::Approved => overview.approved.push(r),
                RegistrationStatus::Pending => overview.pending.push(r),
                RegistrationStatus::Rejected => overview.rejected.push(r),
            }
        }
        Ok(overview)
    }
}
