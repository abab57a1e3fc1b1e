//! In-memory store implementing the slot, registration and settings ports.
//!
//! Enforces the same unique keys as the SQLite schema. Used by tests and by
//! `CLASS_REGISTRY_STORAGE=memory` for throwaway sessions.

use crate::domain::{
    BillingPeriod, ClassSlot, DomainError, FeeSettings, Registration, RegistrationId,
    RegistrationStatus, ScheduleConflict, SlotDraft, SlotId, StudentId,
};
use crate::ports::{RegistrationFilter, RegistrationRepoPort, SettingsPort, SlotRepoPort};
use chrono::{Utc, Weekday};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct MemoryState {
    last_slot_id: i64,
    slots: BTreeMap<SlotId, ClassSlot>,
    last_registration_id: i64,
    registrations: BTreeMap<RegistrationId, Registration>,
    settings: Option<FeeSettings>,
}

impl MemoryState {
    fn number_taken(&self, draft: &SlotDraft, except: Option<SlotId>) -> bool {
        self.slots.values().any(|s| {
            Some(s.id) != except
                && s.weekday == draft.weekday
                && s.class_number == draft.class_number
        })
    }
}

fn duplicate(draft: &SlotDraft) -> DomainError {
    ScheduleConflict::DuplicateClassNumber {
        class_number: draft.class_number,
        weekday: draft.weekday,
    }
    .into()
}

pub struct MemoryRepo {
    baseline: FeeSettings,
    state: RwLock<MemoryState>,
}

impl MemoryRepo {
    /// `baseline` is reported by `current_settings` until settings are saved.
    pub fn new(baseline: FeeSettings) -> Self {
        Self {
            baseline,
            state: RwLock::new(MemoryState::default()),
        }
    }
}

impl Default for MemoryRepo {
    fn default() -> Self {
        Self::new(FeeSettings::baseline())
    }
}

#[async_trait::async_trait]
impl SlotRepoPort for MemoryRepo {
    async fn slots_on_weekday(&self, weekday: Weekday) -> Result<Vec<ClassSlot>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .slots
            .values()
            .filter(|s| s.weekday == weekday)
            .cloned()
            .collect())
    }

    async fn get_slot(&self, id: SlotId) -> Result<Option<ClassSlot>, DomainError> {
        Ok(self.state.read().await.slots.get(&id).cloned())
    }

    async fn list_slots(&self) -> Result<Vec<ClassSlot>, DomainError> {
        Ok(self.state.read().await.slots.values().cloned().collect())
    }

    async fn insert_slot(&self, draft: &SlotDraft) -> Result<ClassSlot, DomainError> {
        let mut state = self.state.write().await;
        if state.number_taken(draft, None) {
            return Err(duplicate(draft));
        }
        state.last_slot_id += 1;
        let slot = ClassSlot::from_draft(SlotId(state.last_slot_id), draft.clone());
        state.slots.insert(slot.id, slot.clone());
        Ok(slot)
    }

    async fn update_slot(&self, id: SlotId, draft: &SlotDraft) -> Result<ClassSlot, DomainError> {
        let mut state = self.state.write().await;
        if !state.slots.contains_key(&id) {
            return Err(DomainError::NotFound {
                entity: "class",
                id: id.0,
            });
        }
        if state.number_taken(draft, Some(id)) {
            return Err(duplicate(draft));
        }
        let slot = ClassSlot::from_draft(id, draft.clone());
        state.slots.insert(id, slot.clone());
        Ok(slot)
    }

    async fn delete_slot(&self, id: SlotId) -> Result<bool, DomainError> {
        let mut state = self.state.write().await;
        if state.slots.remove(&id).is_none() {
            return Ok(false);
        }
        state.registrations.retain(|_, r| r.class_id != id);
        Ok(true)
    }
}

#[async_trait::async_trait]
impl RegistrationRepoPort for MemoryRepo {
    async fn find_registration(
        &self,
        student_id: StudentId,
        class_id: SlotId,
        period: BillingPeriod,
    ) -> Result<Option<Registration>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .registrations
            .values()
            .find(|r| r.student_id == student_id && r.class_id == class_id && r.period == period)
            .cloned())
    }

    async fn get_registration(
        &self,
        id: RegistrationId,
    ) -> Result<Option<Registration>, DomainError> {
        Ok(self.state.read().await.registrations.get(&id).cloned())
    }

    async fn insert_registration(
        &self,
        student_id: StudentId,
        class_id: SlotId,
        period: BillingPeriod,
        fee: Decimal,
    ) -> Result<Registration, DomainError> {
        let mut state = self.state.write().await;
        if !state.slots.contains_key(&class_id) {
            return Err(DomainError::NotFound {
                entity: "class",
                id: class_id.0,
            });
        }
        let taken = state
            .registrations
            .values()
            .any(|r| r.student_id == student_id && r.class_id == class_id && r.period == period);
        if taken {
            return Err(DomainError::AlreadyRegistered {
                month: period.month_name(),
            });
        }
        state.last_registration_id += 1;
        let registration = Registration {
            id: RegistrationId(state.last_registration_id),
            student_id,
            class_id,
            period,
            fee,
            status: RegistrationStatus::Pending,
            created_at: Utc::now().timestamp(),
        };
        state
            .registrations
            .insert(registration.id, registration.clone());
        Ok(registration)
    }

    async fn list_registrations(
        &self,
        filter: RegistrationFilter,
    ) -> Result<Vec<Registration>, DomainError> {
        let state = self.state.read().await;
        let mut out: Vec<Registration> = state
            .registrations
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        if let Some(limit) = filter.limit {
            out.truncate(limit);
        }
        Ok(out)
    }

    async fn set_status(
        &self,
        id: RegistrationId,
        status: RegistrationStatus,
    ) -> Result<bool, DomainError> {
        let mut state = self.state.write().await;
        match state.registrations.get_mut(&id) {
            Some(r) => {
                r.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_registration(&self, id: RegistrationId) -> Result<bool, DomainError> {
        Ok(self.state.write().await.registrations.remove(&id).is_some())
    }
}

#[async_trait::async_trait]
impl SettingsPort for MemoryRepo {
    async fn current_settings(&self) -> Result<FeeSettings, DomainError> {
        Ok(self.state.read().await.settings.unwrap_or(self.baseline))
    }

    async fn save_settings(&self, settings: FeeSettings) -> Result<(), DomainError> {
        self.state.write().await.settings = Some(settings);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use rust_decimal_macros::dec;

    fn draft(class_number: u32, day: Weekday, start_h: u32) -> SlotDraft {
        SlotDraft::new(
            class_number,
            day,
            NaiveTime::from_hms_opt(start_h, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(start_h + 1, 0, 0).unwrap(),
            "Ann",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn unique_class_number_per_weekday() {
        let repo = MemoryRepo::default();
        let a = repo.insert_slot(&draft(1, Weekday::Mon, 9)).await.unwrap();
        assert!(matches!(
            repo.insert_slot(&draft(1, Weekday::Mon, 11)).await,
            Err(DomainError::Schedule(ScheduleConflict::DuplicateClassNumber { .. }))
        ));
        repo.insert_slot(&draft(1, Weekday::Tue, 9)).await.unwrap();
        // Updating a slot in place keeps its own number.
        repo.update_slot(a.id, &draft(1, Weekday::Mon, 10))
            .await
            .unwrap();
        assert_eq!(repo.slots_on_weekday(Weekday::Mon).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn deleting_slot_drops_its_registrations() {
        let repo = MemoryRepo::default();
        let slot = repo.insert_slot(&draft(1, Weekday::Mon, 9)).await.unwrap();
        let period = BillingPeriod::new(2024, 2);
        repo.insert_registration(StudentId(1), slot.id, period, dec!(200))
            .await
            .unwrap();
        assert!(repo.delete_slot(slot.id).await.unwrap());
        assert!(repo
            .list_registrations(RegistrationFilter::default())
            .await
            .unwrap()
            .is_empty());
        assert!(!repo.delete_slot(slot.id).await.unwrap());
    }

    #[tokio::test]
    async fn filter_by_class_and_limit() {
        let repo = MemoryRepo::default();
        let mon = repo.insert_slot(&draft(1, Weekday::Mon, 9)).await.unwrap();
        let tue = repo.insert_slot(&draft(1, Weekday::Tue, 9)).await.unwrap();
        for month in 1..=3 {
            repo.insert_registration(StudentId(1), mon.id, BillingPeriod::new(2024, month), dec!(200))
                .await
                .unwrap();
        }
        repo.insert_registration(StudentId(2), tue.id, BillingPeriod::new(2024, 1), dec!(200))
            .await
            .unwrap();

        let for_mon = repo
            .list_registrations(RegistrationFilter {
                class_id: Some(mon.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(for_mon.len(), 3);
        assert!(for_mon.iter().all(|r| r.class_id == mon.id));

        let newest = repo
            .list_registrations(RegistrationFilter {
                limit: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();
        let ids: Vec<i64> = newest.iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![4, 3]);
    }

    #[tokio::test]
    async fn settings_fall_back_to_baseline() {
        let baseline = FeeSettings {
            year: 2024,
            fee_per_session: dec!(40),
        };
        let repo = MemoryRepo::new(baseline);
        assert_eq!(repo.current_settings().await.unwrap(), baseline);
        let saved = FeeSettings {
            year: 2024,
            fee_per_session: dec!(55.5),
        };
        repo.save_settings(saved).await.unwrap();
        assert_eq!(repo.current_settings().await.unwrap(), saved);
    }
}
