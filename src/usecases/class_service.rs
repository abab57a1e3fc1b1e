//! Class management: create, edit, delete and list weekly slots.
//!
//! Every create and edit runs the schedule validator against the slots already
//! stored for the candidate's weekday. Delete is never validated.

use crate::domain::calendar::{WEEK, weekday_label};
use crate::domain::{ClassSlot, DomainError, ScheduleEntry, ScheduleValidator, SlotDraft, SlotId};
use crate::ports::SlotRepoPort;
use chrono::Weekday;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

pub struct ClassService {
    slots: Arc<dyn SlotRepoPort>,
    /// Serializes lookup-validate-write so two admissions cannot interleave.
    admission: Mutex<()>,
}

impl ClassService {
    pub fn new(slots: Arc<dyn SlotRepoPort>) -> Self {
        Self {
            slots,
            admission: Mutex::new(()),
        }
    }

    /// Admit a new slot. Nothing is written when validation fails.
    pub async fn create_class(&self, draft: SlotDraft) -> Result<ClassSlot, DomainError> {
        let _guard = self.admission.lock().await;
        let existing = self.slots.slots_on_weekday(draft.weekday).await?;
        if let Err(conflict) = ScheduleValidator::validate(&draft, &existing, None) {
            warn!(
                class_number = draft.class_number,
                day = weekday_label(draft.weekday),
                error = %conflict,
                "class rejected"
            );
            return Err(conflict.into());
        }
        let slot = self.slots.insert_slot(&draft).await?;
        info!(
            id = slot.id.0,
            class_number = slot.class_number,
            day = weekday_label(slot.weekday),
            "class added"
        );
        Ok(slot)
    }

    /// Replace slot `id` with `draft`. The slot's stored form is excluded from
    /// the conflict check, so moving it within its own time range is allowed.
    pub async fn edit_class(&self, id: SlotId, draft: SlotDraft) -> Result<ClassSlot, DomainError> {
        let _guard = self.admission.lock().await;
        if self.slots.get_slot(id).await?.is_none() {
            return Err(DomainError::NotFound {
                entity: "class",
                id: id.0,
            });
        }
        let existing = self.slots.slots_on_weekday(draft.weekday).await?;
        if let Err(conflict) = ScheduleValidator::validate(&draft, &existing, Some(id)) {
            warn!(id = id.0, error = %conflict, "class edit rejected");
            return Err(conflict.into());
        }
        let slot = self.slots.update_slot(id, &draft).await?;
        info!(id = id.0, class_number = slot.class_number, "class updated");
        Ok(slot)
    }

    /// Remove a slot and its registrations. Returns the removed slot.
    pub async fn delete_class(&self, id: SlotId) -> Result<ClassSlot, DomainError> {
        let _guard = self.admission.lock().await;
        let slot = self
            .slots
            .get_slot(id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "class",
                id: id.0,
            })?;
        self.slots.delete_slot(id).await?;
        info!(
            id = id.0,
            class_number = slot.class_number,
            day = weekday_label(slot.weekday),
            "class deleted"
        );
        Ok(slot)
    }

    pub async fn get_class(&self, id: SlotId) -> Result<ClassSlot, DomainError> {
        self.slots.get_slot(id).await?.ok_or(DomainError::NotFound {
            entity: "class",
            id: id.0,
        })
    }

    /// All slots grouped Monday..Sunday, each day sorted by class number.
    /// Days without classes are omitted.
    pub async fn classes_by_day(&self) -> Result<Vec<(Weekday, Vec<ClassSlot>)>, DomainError> {
        let all = self.slots.list_slots().await?;
        Ok(WEEK
            .iter()
            .filter_map(|&day| {
                let mut on_day: Vec<ClassSlot> =
                    all.iter().filter(|s| s.weekday == day).cloned().collect();
                if on_day.is_empty() {
                    return None;
                }
                on_day.sort_by_key(|s| s.class_number);
                Some((day, on_day))
            })
            .collect())
    }

    /// Calendar feed of every slot, in weekday then class-number order.
    pub async fn schedule_feed(&self) -> Result<Vec<ScheduleEntry>, DomainError> {
        Ok(self
            .classes_by_day()
            .await?
            .iter()
            .flat_map(|(_, slots)| slots.iter().map(ScheduleEntry::from))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::memory_repo::MemoryRepo;
    use crate::domain::ScheduleConflict;
    use chrono::NaiveTime;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn draft(n: u32, day: Weekday, start: NaiveTime, end: NaiveTime) -> SlotDraft {
        SlotDraft::new(n, day, start, end, "Ann").unwrap()
    }

    fn service() -> (ClassService, Arc<MemoryRepo>) {
        let repo = Arc::new(MemoryRepo::default());
        (ClassService::new(repo.clone()), repo)
    }

    #[tokio::test]
    async fn rejected_candidate_leaves_store_untouched() {
        let (svc, repo) = service();
        svc.create_class(draft(1, Weekday::Mon, t(9, 0), t(10, 0)))
            .await
            .unwrap();

        let dup = svc
            .create_class(draft(1, Weekday::Mon, t(11, 0), t(12, 0)))
            .await;
        assert!(matches!(
            dup,
            Err(DomainError::Schedule(ScheduleConflict::DuplicateClassNumber { .. }))
        ));
        let overlap = svc
            .create_class(draft(2, Weekday::Mon, t(9, 30), t(10, 30)))
            .await;
        assert!(matches!(
            overlap,
            Err(DomainError::Schedule(ScheduleConflict::TimeOverlap { .. }))
        ));
        assert_eq!(repo.list_slots().await.unwrap().len(), 1);

        svc.create_class(draft(2, Weekday::Mon, t(10, 0), t(11, 0)))
            .await
            .unwrap();
        assert_eq!(repo.list_slots().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn edit_in_place_excludes_own_prior_state() {
        let (svc, _) = service();
        let a = svc
            .create_class(draft(1, Weekday::Mon, t(9, 0), t(10, 0)))
            .await
            .unwrap();
        let edited = svc
            .edit_class(a.id, draft(1, Weekday::Mon, t(9, 15), t(10, 15)))
            .await
            .unwrap();
        assert_eq!(edited.start_time, t(9, 15));
        assert_eq!(edited.id, a.id);
    }

    #[tokio::test]
    async fn edit_moving_to_another_day_checks_that_day() {
        let (svc, _) = service();
        let a = svc
            .create_class(draft(1, Weekday::Mon, t(9, 0), t(10, 0)))
            .await
            .unwrap();
        svc.create_class(draft(4, Weekday::Tue, t(9, 0), t(10, 0)))
            .await
            .unwrap();
        assert!(matches!(
            svc.edit_class(a.id, draft(1, Weekday::Tue, t(9, 30), t(10, 30)))
                .await,
            Err(DomainError::Schedule(ScheduleConflict::TimeOverlap { .. }))
        ));
        svc.edit_class(a.id, draft(1, Weekday::Tue, t(10, 0), t(11, 0)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn edit_and_delete_unknown_class() {
        let (svc, _) = service();
        assert!(matches!(
            svc.edit_class(SlotId(42), draft(1, Weekday::Mon, t(9, 0), t(10, 0)))
                .await,
            Err(DomainError::NotFound { id: 42, .. })
        ));
        assert!(matches!(
            svc.delete_class(SlotId(42)).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn listing_groups_by_day_in_week_order() {
        let (svc, _) = service();
        svc.create_class(draft(2, Weekday::Wed, t(9, 0), t(10, 0)))
            .await
            .unwrap();
        svc.create_class(draft(3, Weekday::Mon, t(11, 0), t(12, 0)))
            .await
            .unwrap();
        svc.create_class(draft(1, Weekday::Mon, t(13, 0), t(14, 0)))
            .await
            .unwrap();

        let grouped = svc.classes_by_day().await.unwrap();
        let days: Vec<Weekday> = grouped.iter().map(|(d, _)| *d).collect();
        assert_eq!(days, vec![Weekday::Mon, Weekday::Wed]);
        let monday: Vec<u32> = grouped[0].1.iter().map(|s| s.class_number).collect();
        assert_eq!(monday, vec![1, 3]);

        let feed = svc.schedule_feed().await.unwrap();
        assert_eq!(feed.len(), 3);
        assert_eq!(feed[0].title, "Class 1: Ann");
        assert_eq!(feed[2].day, "wednesday");
    }

    #[tokio::test]
    async fn delete_returns_removed_slot() {
        let (svc, repo) = service();
        let a = svc
            .create_class(draft(1, Weekday::Fri, t(9, 0), t(10, 0)))
            .await
            .unwrap();
        assert_eq!(svc.delete_class(a.id).await.unwrap(), a);
        assert!(repo.list_slots().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_conflicting_creates_admit_one() {
        let (svc, repo) = service();
        let svc = Arc::new(svc);
        let start = Arc::new(tokio::sync::Barrier::new(8));
        let handles: Vec<_> = (1..=8)
            .map(|n| {
                let svc = svc.clone();
                let start = start.clone();
                tokio::spawn(async move {
                    start.wait().await;
                    svc.create_class(draft(n, Weekday::Mon, t(9, 0), t(10, 0)))
                        .await
                })
            })
            .collect();

        let mut admitted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => admitted += 1,
                Err(e) => assert!(matches!(
                    e,
                    DomainError::Schedule(ScheduleConflict::TimeOverlap { .. })
                )),
            }
        }
        assert_eq!(admitted, 1);
        assert_eq!(repo.slots_on_weekday(Weekday::Mon).await.unwrap().len(), 1);
    }
}
