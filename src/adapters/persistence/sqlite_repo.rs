//! SQLite-backed store via libsql. Implements the slot, registration and settings ports.
//!
//! One database file (`data/registry.db`). The schema carries the business keys:
//! `UNIQUE (class_no, day_of_week)` on classes and
//! `UNIQUE (student_id, class_id, year, month)` on registrations, so a racing
//! second writer is rejected by the store even if it passed validation.
//! Money is stored as decimal TEXT, times as `HH:MM:SS` with an optional fraction.

use crate::domain::calendar::{parse_weekday, weekday_key};
use crate::domain::{
    BillingPeriod, ClassSlot, DomainError, FeeSettings, Registration, RegistrationId,
    RegistrationStatus, ScheduleConflict, SlotDraft, SlotId, StudentId,
};
use crate::ports::{RegistrationFilter, RegistrationRepoPort, SettingsPort, SlotRepoPort};
use chrono::{NaiveTime, Utc, Weekday};
use libsql::{Connection, Database, Row, params};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

const CLASSES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS classes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    class_no INTEGER NOT NULL,
    day_of_week TEXT NOT NULL,
    start_time TEXT NOT NULL,
    end_time TEXT NOT NULL,
    teacher TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    UNIQUE (class_no, day_of_week)
)"#;
const CLASSES_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_classes_day ON classes (day_of_week, start_time)";

const REGISTRATIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS registrations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id INTEGER NOT NULL,
    class_id INTEGER NOT NULL REFERENCES classes (id),
    year INTEGER NOT NULL,
    month INTEGER NOT NULL,
    fee TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    UNIQUE (student_id, class_id, year, month)
)"#;

/// Single-row settings table (id is always 1).
const SETTINGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS settings (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    year INTEGER NOT NULL,
    fee_per_session TEXT NOT NULL,
    updated_at INTEGER NOT NULL
)"#;

const SLOT_COLUMNS: &str = "id, class_no, day_of_week, start_time, end_time, teacher";
const REGISTRATION_COLUMNS: &str = "id, student_id, class_id, year, month, fee, status, created_at";

/// Lossless for any `NaiveTime`: `%.f` writes nothing when there are no sub-second digits.
const TIME_FORMAT: &str = "%H:%M:%S%.f";

fn repo_err(e: impl std::fmt::Display) -> DomainError {
    DomainError::Repo(e.to_string())
}

fn now() -> i64 {
    Utc::now().timestamp()
}

fn format_time(t: NaiveTime) -> String {
    t.format(TIME_FORMAT).to_string()
}

fn parse_time(s: &str) -> Result<NaiveTime, DomainError> {
    NaiveTime::parse_from_str(s, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|e| DomainError::Repo(format!("bad stored time '{}': {}", s, e)))
}

fn parse_decimal(s: &str) -> Result<Decimal, DomainError> {
    Decimal::from_str(s).map_err(|e| DomainError::Repo(format!("bad stored amount '{}': {}", s, e)))
}

fn slot_from_row(row: &Row) -> Result<ClassSlot, DomainError> {
    let id: i64 = row.get(0).map_err(repo_err)?;
    let class_no: i64 = row.get(1).map_err(repo_err)?;
    let day: String = row.get(2).map_err(repo_err)?;
    let start: String = row.get(3).map_err(repo_err)?;
    let end: String = row.get(4).map_err(repo_err)?;
    let teacher: String = row.get(5).map_err(repo_err)?;
    let weekday = parse_weekday(&day)
        .ok_or_else(|| DomainError::Repo(format!("bad stored weekday '{}'", day)))?;
    Ok(ClassSlot {
        id: SlotId(id),
        class_number: u32::try_from(class_no).map_err(repo_err)?,
        weekday,
        start_time: parse_time(&start)?,
        end_time: parse_time(&end)?,
        teacher,
    })
}

fn registration_from_row(row: &Row) -> Result<Registration, DomainError> {
    let id: i64 = row.get(0).map_err(repo_err)?;
    let student_id: i64 = row.get(1).map_err(repo_err)?;
    let class_id: i64 = row.get(2).map_err(repo_err)?;
    let year: i64 = row.get(3).map_err(repo_err)?;
    let month: i64 = row.get(4).map_err(repo_err)?;
    let fee: String = row.get(5).map_err(repo_err)?;
    let status: String = row.get(6).map_err(repo_err)?;
    let created_at: i64 = row.get(7).map_err(repo_err)?;
    Ok(Registration {
        id: RegistrationId(id),
        student_id: StudentId(student_id),
        class_id: SlotId(class_id),
        period: BillingPeriod::new(
            i32::try_from(year).map_err(repo_err)?,
            u32::try_from(month).map_err(repo_err)?,
        ),
        fee: parse_decimal(&fee)?,
        status: RegistrationStatus::from_str(&status).map_err(DomainError::Repo)?,
        created_at,
    })
}

/// Runs a PRAGMA and drains the row it returns (execute fails when rows come back).
async fn pragma(conn: &Connection, sql: &str) -> Result<(), DomainError> {
    let mut rows = conn
        .query(sql, ())
        .await
        .map_err(|e| DomainError::Repo(format!("{} failed: {}", sql, e)))?;
    while rows.next().await.map_err(repo_err)?.is_some() {}
    Ok(())
}

/// SQLite repository. Safe to share via Arc; each call opens its own connection.
pub struct SqliteRepo {
    db: Database,
    db_path: PathBuf,
    baseline: FeeSettings,
}

impl SqliteRepo {
    /// Connect to (or create) `registry.db` under `base_dir` and ensure the schema exists.
    /// `baseline` is returned by `current_settings` until settings are saved.
    pub async fn connect(
        base_dir: impl AsRef<Path>,
        baseline: FeeSettings,
    ) -> Result<Self, DomainError> {
        let base = base_dir.as_ref();
        std::fs::create_dir_all(base).map_err(repo_err)?;
        let db_path = base.join("registry.db");
        let path_str = db_path.to_string_lossy();
        let db = libsql::Builder::new_local(path_str.as_ref())
            .build()
            .await
            .map_err(repo_err)?;
        let conn = db.connect().map_err(repo_err)?;

        pragma(&conn, "PRAGMA journal_mode=WAL").await?;
        pragma(&conn, "PRAGMA synchronous=NORMAL").await?;

        for ddl in [
            CLASSES_TABLE,
            CLASSES_INDEX,
            REGISTRATIONS_TABLE,
            SETTINGS_TABLE,
        ] {
            conn.execute(ddl, ()).await.map_err(repo_err)?;
        }

        info!(path = %db_path.display(), "SQLite connected with WAL mode");

        Ok(Self {
            db,
            db_path,
            baseline,
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn conn(&self) -> Result<Connection, DomainError> {
        self.db.connect().map_err(repo_err)
    }

    async fn fetch_slot(conn: &Connection, id: SlotId) -> Result<Option<ClassSlot>, DomainError> {
        let sql = format!("SELECT {} FROM classes WHERE id = ?1", SLOT_COLUMNS);
        let mut rows = conn.query(&sql, params![id.0]).await.map_err(repo_err)?;
        match rows.next().await.map_err(repo_err)? {
            Some(row) => Ok(Some(slot_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn fetch_registration(
        conn: &Connection,
        id: RegistrationId,
    ) -> Result<Option<Registration>, DomainError> {
        let sql = format!(
            "SELECT {} FROM registrations WHERE id = ?1",
            REGISTRATION_COLUMNS
        );
        let mut rows = conn.query(&sql, params![id.0]).await.map_err(repo_err)?;
        match rows.next().await.map_err(repo_err)? {
            Some(row) => Ok(Some(registration_from_row(&row)?)),
            None => Ok(None),
        }
    }
}

#[async_trait::async_trait]
impl SlotRepoPort for SqliteRepo {
    async fn slots_on_weekday(&self, weekday: Weekday) -> Result<Vec<ClassSlot>, DomainError> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM classes WHERE day_of_week = ?1 ORDER BY start_time, class_no",
            SLOT_COLUMNS
        );
        let mut rows = conn
            .query(&sql, params![weekday_key(weekday)])
            .await
            .map_err(repo_err)?;
        let mut slots = Vec::new();
        while let Some(row) = rows.next().await.map_err(repo_err)? {
            slots.push(slot_from_row(&row)?);
        }
        Ok(slots)
    }

    async fn get_slot(&self, id: SlotId) -> Result<Option<ClassSlot>, DomainError> {
        Self::fetch_slot(&self.conn()?, id).await
    }

    async fn list_slots(&self) -> Result<Vec<ClassSlot>, DomainError> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM classes ORDER BY id", SLOT_COLUMNS);
        let mut rows = conn.query(&sql, ()).await.map_err(repo_err)?;
        let mut slots = Vec::new();
        while let Some(row) = rows.next().await.map_err(repo_err)? {
            slots.push(slot_from_row(&row)?);
        }
        Ok(slots)
    }

    async fn insert_slot(&self, draft: &SlotDraft) -> Result<ClassSlot, DomainError> {
        let conn = self.conn()?;
        let ts = now();
        let changed = conn
            .execute(
                r#"
                INSERT INTO classes (class_no, day_of_week, start_time, end_time, teacher, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT (class_no, day_of_week) DO NOTHING
                "#,
                params![
                    i64::from(draft.class_number),
                    weekday_key(draft.weekday),
                    format_time(draft.start_time),
                    format_time(draft.end_time),
                    draft.teacher.as_str(),
                    ts,
                    ts
                ],
            )
            .await
            .map_err(repo_err)?;
        if changed == 0 {
            return Err(ScheduleConflict::DuplicateClassNumber {
                class_number: draft.class_number,
                weekday: draft.weekday,
            }
            .into());
        }
        let id = SlotId(conn.last_insert_rowid());
        debug!(id = id.0, "inserted class row");
        Ok(ClassSlot::from_draft(id, draft.clone()))
    }

    async fn update_slot(&self, id: SlotId, draft: &SlotDraft) -> Result<ClassSlot, DomainError> {
        let conn = self.conn()?;
        let tx = conn.transaction().await.map_err(repo_err)?;
        if Self::fetch_slot(&tx, id).await?.is_none() {
            return Err(DomainError::NotFound {
                entity: "class",
                id: id.0,
            });
        }
        // OR IGNORE: a (class_no, day_of_week) collision leaves the row untouched.
        let changed = tx
            .execute(
                r#"
                UPDATE OR IGNORE classes
                SET class_no = ?1, day_of_week = ?2, start_time = ?3, end_time = ?4,
                    teacher = ?5, updated_at = ?6
                WHERE id = ?7
                "#,
                params![
                    i64::from(draft.class_number),
                    weekday_key(draft.weekday),
                    format_time(draft.start_time),
                    format_time(draft.end_time),
                    draft.teacher.as_str(),
                    now(),
                    id.0
                ],
            )
            .await
            .map_err(repo_err)?;
        if changed == 0 {
            return Err(ScheduleConflict::DuplicateClassNumber {
                class_number: draft.class_number,
                weekday: draft.weekday,
            }
            .into());
        }
        tx.commit().await.map_err(repo_err)?;
        Ok(ClassSlot::from_draft(id, draft.clone()))
    }

    async fn delete_slot(&self, id: SlotId) -> Result<bool, DomainError> {
        let conn = self.conn()?;
        let tx = conn.transaction().await.map_err(repo_err)?;
        let dropped = tx
            .execute(
                "DELETE FROM registrations WHERE class_id = ?1",
                params![id.0],
            )
            .await
            .map_err(repo_err)?;
        let deleted = tx
            .execute("DELETE FROM classes WHERE id = ?1", params![id.0])
            .await
            .map_err(repo_err)?;
        tx.commit().await.map_err(repo_err)?;
        if dropped > 0 {
            debug!(
                id = id.0,
                registrations = dropped,
                "dropped registrations with class"
            );
        }
        Ok(deleted > 0)
    }
}

#[async_trait::async_trait]
impl RegistrationRepoPort for SqliteRepo {
    async fn find_registration(
        &self,
        student_id: StudentId,
        class_id: SlotId,
        period: BillingPeriod,
    ) -> Result<Option<Registration>, DomainError> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM registrations WHERE student_id = ?1 AND class_id = ?2 AND year = ?3 AND month = ?4",
            REGISTRATION_COLUMNS
        );
        let mut rows = conn
            .query(
                &sql,
                params![
                    student_id.0,
                    class_id.0,
                    i64::from(period.year),
                    i64::from(period.month)
                ],
            )
            .await
            .map_err(repo_err)?;
        match rows.next().await.map_err(repo_err)? {
            Some(row) => Ok(Some(registration_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_registration(
        &self,
        id: RegistrationId,
    ) -> Result<Option<Registration>, DomainError> {
        Self::fetch_registration(&self.conn()?, id).await
    }

    async fn insert_registration(
        &self,
        student_id: StudentId,
        class_id: SlotId,
        period: BillingPeriod,
        fee: Decimal,
    ) -> Result<Registration, DomainError> {
        let conn = self.conn()?;
        let tx = conn.transaction().await.map_err(repo_err)?;
        if Self::fetch_slot(&tx, class_id).await?.is_none() {
            return Err(DomainError::NotFound {
                entity: "class",
                id: class_id.0,
            });
        }
        let ts = now();
        let changed = tx
            .execute(
                r#"
                INSERT INTO registrations (student_id, class_id, year, month, fee, status, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ON CONFLICT (student_id, class_id, year, month) DO NOTHING
                "#,
                params![
                    student_id.0,
                    class_id.0,
                    i64::from(period.year),
                    i64::from(period.month),
                    fee.to_string(),
                    RegistrationStatus::Pending.as_str(),
                    ts,
                    ts
                ],
            )
            .await
            .map_err(repo_err)?;
        if changed == 0 {
            return Err(DomainError::AlreadyRegistered {
                month: period.month_name(),
            });
        }
        let id = RegistrationId(tx.last_insert_rowid());
        tx.commit().await.map_err(repo_err)?;
        Ok(Registration {
            id,
            student_id,
            class_id,
            period,
            fee,
            status: RegistrationStatus::Pending,
            created_at: ts,
        })
    }

    async fn list_registrations(
        &self,
        filter: RegistrationFilter,
    ) -> Result<Vec<Registration>, DomainError> {
        let conn = self.conn()?;
        let sql = format!(
            r#"
            SELECT {} FROM registrations
            WHERE (?1 IS NULL OR status = ?1)
              AND (?2 IS NULL OR student_id = ?2)
              AND (?3 IS NULL OR class_id = ?3)
            ORDER BY created_at DESC, id DESC
            LIMIT ?4
            "#,
            REGISTRATION_COLUMNS
        );
        // A negative LIMIT means no limit in SQLite.
        let limit = filter
            .limit
            .map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));
        let mut rows = conn
            .query(
                &sql,
                params![
                    filter.status.map(|s| s.as_str()),
                    filter.student_id.map(|s| s.0),
                    filter.class_id.map(|c| c.0),
                    limit
                ],
            )
            .await
            .map_err(repo_err)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await.map_err(repo_err)? {
            out.push(registration_from_row(&row)?);
        }
        Ok(out)
    }

    async fn set_status(
        &self,
        id: RegistrationId,
        status: RegistrationStatus,
    ) -> Result<bool, DomainError> {
        let changed = self
            .conn()?
            .execute(
                "UPDATE registrations SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![status.as_str(), now(), id.0],
            )
            .await
            .map_err(repo_err)?;
        Ok(changed > 0)
    }

    async fn delete_registration(&self, id: RegistrationId) -> Result<bool, DomainError> {
        let changed = self
            .conn()?
            .execute("DELETE FROM registrations WHERE id = ?1", params![id.0])
            .await
            .map_err(repo_err)?;
        Ok(changed > 0)
    }
}

#[async_trait::async_trait]
impl SettingsPort for SqliteRepo {
    async fn current_settings(&self) -> Result<FeeSettings, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query(
                "SELECT year, fee_per_session FROM settings WHERE id = 1",
                (),
            )
            .await
            .map_err(repo_err)?;
        match rows.next().await.map_err(repo_err)? {
            Some(row) => {
                let year: i64 = row.get(0).map_err(repo_err)?;
                let fee: String = row.get(1).map_err(repo_err)?;
                Ok(FeeSettings {
                    year: i32::try_from(year).map_err(repo_err)?,
                    fee_per_session: parse_decimal(&fee)?,
                })
            }
            None => Ok(self.baseline),
        }
    }

    async fn save_settings(&self, settings: FeeSettings) -> Result<(), DomainError> {
        self.conn()?
            .execute(
                r#"
                INSERT INTO settings (id, year, fee_per_session, updated_at)
                VALUES (1, ?1, ?2, ?3)
                ON CONFLICT (id) DO UPDATE SET
                    year = excluded.year,
                    fee_per_session = excluded.fee_per_session,
                    updated_at = excluded.updated_at
                "#,
                params![
                    i64::from(settings.year),
                    settings.fee_per_session.to_string(),
                    now()
                ],
            )
            .await
            .map_err(repo_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ScheduleValidator;
    use rust_decimal_macros::dec;

    fn baseline() -> FeeSettings {
        FeeSettings {
            year: 2024,
            fee_per_session: dec!(50.00),
        }
    }

    fn draft(class_number: u32, day: Weekday, start: (u32, u32), end: (u32, u32)) -> SlotDraft {
        SlotDraft::new(
            class_number,
            day,
            NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
            "Ann Lee",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn slots_round_trip_through_the_database() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteRepo::connect(dir.path(), baseline()).await.unwrap();

        let a = repo
            .insert_slot(&draft(1, Weekday::Mon, (9, 0), (10, 30)))
            .await
            .unwrap();
        repo.insert_slot(&draft(2, Weekday::Wed, (9, 0), (10, 0)))
            .await
            .unwrap();

        assert_eq!(repo.get_slot(a.id).await.unwrap(), Some(a.clone()));
        assert_eq!(repo.slots_on_weekday(Weekday::Mon).await.unwrap(), vec![a]);
        assert_eq!(repo.list_slots().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn times_keep_seconds_and_fractions() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteRepo::connect(dir.path(), baseline()).await.unwrap();
        let at = |h, m, s| NaiveTime::from_hms_opt(h, m, s).unwrap();

        let a = repo
            .insert_slot(&SlotDraft::new(1, Weekday::Mon, at(9, 0, 0), at(10, 0, 30), "Ann").unwrap())
            .await
            .unwrap();
        let stored = repo.get_slot(a.id).await.unwrap().unwrap();
        assert_eq!(stored, a);
        assert_eq!(stored.end_time, at(10, 0, 30));

        // A candidate starting inside the stored slot's last half minute must
        // still collide with what was read back.
        let late = SlotDraft::new(2, Weekday::Mon, at(10, 0, 15), at(11, 0, 0), "Bo").unwrap();
        let existing = repo.slots_on_weekday(Weekday::Mon).await.unwrap();
        assert!(matches!(
            ScheduleValidator::validate(&late, &existing, None),
            Err(ScheduleConflict::TimeOverlap { .. })
        ));

        let short = SlotDraft::new(
            3,
            Weekday::Tue,
            at(9, 0, 30),
            NaiveTime::from_hms_milli_opt(9, 0, 45, 250).unwrap(),
            "Cy",
        )
        .unwrap();
        let b = repo.insert_slot(&short).await.unwrap();
        let stored = repo.get_slot(b.id).await.unwrap().unwrap();
        assert_eq!(stored, b);
        assert!(stored.start_time < stored.end_time);

        let moved = SlotDraft::new(3, Weekday::Tue, at(8, 59, 59), at(9, 30, 1), "Cy").unwrap();
        let updated = repo.update_slot(b.id, &moved).await.unwrap();
        assert_eq!(repo.get_slot(b.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn unique_key_rejects_second_writer() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteRepo::connect(dir.path(), baseline()).await.unwrap();
        repo.insert_slot(&draft(1, Weekday::Mon, (9, 0), (10, 0)))
            .await
            .unwrap();
        let b = repo
            .insert_slot(&draft(2, Weekday::Mon, (11, 0), (12, 0)))
            .await
            .unwrap();

        assert!(matches!(
            repo.insert_slot(&draft(1, Weekday::Mon, (13, 0), (14, 0))).await,
            Err(DomainError::Schedule(ScheduleConflict::DuplicateClassNumber { class_number: 1, .. }))
        ));
        assert!(matches!(
            repo.update_slot(b.id, &draft(1, Weekday::Mon, (11, 0), (12, 0))).await,
            Err(DomainError::Schedule(ScheduleConflict::DuplicateClassNumber { .. }))
        ));
        assert!(matches!(
            repo.update_slot(SlotId(99), &draft(5, Weekday::Mon, (15, 0), (16, 0))).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn registrations_keep_frozen_fee_and_status() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteRepo::connect(dir.path(), baseline()).await.unwrap();
        let slot = repo
            .insert_slot(&draft(1, Weekday::Thu, (9, 0), (10, 0)))
            .await
            .unwrap();
        let period = BillingPeriod::new(2024, 2);

        let reg = repo
            .insert_registration(StudentId(7), slot.id, period, dec!(250.00))
            .await
            .unwrap();
        assert_eq!(reg.status, RegistrationStatus::Pending);
        assert!(matches!(
            repo.insert_registration(StudentId(7), slot.id, period, dec!(250.00))
                .await,
            Err(DomainError::AlreadyRegistered { month: "February" })
        ));

        assert!(repo
            .set_status(reg.id, RegistrationStatus::Approved)
            .await
            .unwrap());
        let stored = repo.get_registration(reg.id).await.unwrap().unwrap();
        assert_eq!(stored.fee, dec!(250.00));
        assert_eq!(stored.status, RegistrationStatus::Approved);
        assert_eq!(
            repo.find_registration(StudentId(7), slot.id, period)
                .await
                .unwrap(),
            Some(stored)
        );

        assert!(repo
            .list_registrations(RegistrationFilter {
                status: Some(RegistrationStatus::Pending),
                ..Default::default()
            })
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            repo.list_registrations(RegistrationFilter {
                student_id: Some(StudentId(7)),
                class_id: Some(slot.id),
                ..Default::default()
            })
            .await
            .unwrap()
            .len(),
            1
        );
        assert!(repo
            .list_registrations(RegistrationFilter {
                class_id: Some(SlotId(99)),
                ..Default::default()
            })
            .await
            .unwrap()
            .is_empty());

        assert!(repo.delete_slot(slot.id).await.unwrap());
        assert!(repo.get_registration(reg.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn settings_persist_across_connections() {
        let dir = tempfile::tempdir().unwrap();
        {
            let repo = SqliteRepo::connect(dir.path(), baseline()).await.unwrap();
            assert_eq!(repo.current_settings().await.unwrap(), baseline());
            repo.save_settings(FeeSettings {
                year: 2024,
                fee_per_session: dec!(62.50),
            })
            .await
            .unwrap();
        }
        let repo = SqliteRepo::connect(dir.path(), baseline()).await.unwrap();
        assert_eq!(
            repo.current_settings().await.unwrap().fee_per_session,
            dec!(62.50)
        );
    }
}
