// In memory schedule catalog and attendance store.
//
// Exercises the engine and the capture flow without a database. The offline
// switch makes every call fail the way an unreachable MySQL would.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use tokio::sync::RwLock;

use super::{AttendanceStore, CheckInOutcome, InsertOutcome, ScheduleCatalog, StoreError};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, NewAttendanceRecord};
use crate::model::lecture::{CatalogEntry, DayOfWeek};

fn blank_record(record: NewAttendanceRecord, status: Option<AttendanceStatus>) -> AttendanceRecord {
    AttendanceRecord {
        lecture_id: record.lecture_id,
        date: record.date,
        check_in_time: None,
        check_out_time: None,
        status,
        teacher_id: record.teacher_id,
        course_id: record.course_id,
        classroom_id: record.classroom_id,
        academic_year_id: record.academic_year_id,
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    lectures: Vec<CatalogEntry>,
    records: RwLock<BTreeMap<(u64, NaiveDate), AttendanceRecord>>,
    is_offline: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lecture(mut self, entry: CatalogEntry) -> Self {
        self.lectures.push(entry);
        self
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }

    /// Seed a record as the capture flow would have left it.
    pub async fn put(&self, record: AttendanceRecord) {
        self.records
            .write()
            .await
            .insert((record.lecture_id, record.date), record);
    }

    pub async fn records(&self) -> Vec<AttendanceRecord> {
        self.records.read().await.values().cloned().collect()
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.is_offline {
            return Err(StoreError::Unavailable("attendance store offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ScheduleCatalog for InMemoryStore {
    async fn due_lectures(
        &self,
        day: DayOfWeek,
        before: NaiveTime,
    ) -> Result<Vec<CatalogEntry>, StoreError> {
        self.ensure_online()?;
        Ok(self
            .lectures
            .iter()
            .filter(|entry| {
                entry.day_of_week.eq_ignore_ascii_case(day.as_ref()) && entry.end_time < before
            })
            .cloned()
            .collect())
    }

    async fn find_lecture(&self, lecture_id: u64) -> Result<Option<CatalogEntry>, StoreError> {
        self.ensure_online()?;
        Ok(self.lectures.iter().find(|e| e.id == lecture_id).cloned())
    }
}

#[async_trait]
impl AttendanceStore for InMemoryStore {
    async fn find(
        &self,
        lecture_id: u64,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        self.ensure_online()?;
        Ok(self.records.read().await.get(&(lecture_id, date)).cloned())
    }

    async fn insert_absent(
        &self,
        record: NewAttendanceRecord,
    ) -> Result<InsertOutcome, StoreError> {
        self.ensure_online()?;
        let mut guard = self.records.write().await;
        match guard.entry((record.lecture_id, record.date)) {
            Entry::Occupied(_) => Ok(InsertOutcome::AlreadyExists),
            Entry::Vacant(slot) => {
                slot.insert(blank_record(record, Some(AttendanceStatus::Absent)));
                Ok(InsertOutcome::Inserted)
            }
        }
    }

    async fn update_status(
        &self,
        lecture_id: u64,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<(), StoreError> {
        self.ensure_online()?;
        if let Some(record) = self.records.write().await.get_mut(&(lecture_id, date)) {
            record.status = Some(status);
        }
        Ok(())
    }

    async fn record_check_in(
        &self,
        record: NewAttendanceRecord,
        at: NaiveDateTime,
    ) -> Result<CheckInOutcome, StoreError> {
        self.ensure_online()?;
        let mut guard = self.records.write().await;
        let existing = guard
            .entry((record.lecture_id, record.date))
            .or_insert_with(|| blank_record(record, None));

        if existing.check_in_time.is_some() {
            return Ok(CheckInOutcome::AlreadyCheckedIn);
        }
        existing.check_in_time = Some(at);
        Ok(CheckInOutcome::Recorded)
    }

    async fn record_check_out(
        &self,
        lecture_id: u64,
        date: NaiveDate,
        at: NaiveDateTime,
    ) -> Result<bool, StoreError> {
        self.ensure_online()?;
        match self.records.write().await.get_mut(&(lecture_id, date)) {
            Some(record) if record.check_in_time.is_some() && record.check_out_time.is_none() => {
                record.check_out_time = Some(at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_for_date(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>, StoreError> {
        self.ensure_online()?;
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|record| record.date == date)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod in_memory_store_tests {
    use super::*;
    use crate::test_support::{lecture_entry, monday};

    fn new_record() -> NewAttendanceRecord {
        NewAttendanceRecord {
            lecture_id: 1,
            date: monday(),
            teacher_id: 10,
            course_id: 20,
            classroom_id: 30,
            academic_year_id: 40,
        }
    }

    #[tokio::test]
    async fn it_should_insert_absent_only_once_per_key() {
        let store = InMemoryStore::new();
        assert_eq!(
            store.insert_absent(new_record()).await.unwrap(),
            InsertOutcome::Inserted
        );
        assert_eq!(
            store.insert_absent(new_record()).await.unwrap(),
            InsertOutcome::AlreadyExists
        );
        assert_eq!(store.records().await.len(), 1);
    }

    #[tokio::test]
    async fn it_should_filter_due_lectures_by_day_and_end_time() {
        let store = InMemoryStore::new()
            .with_lecture(lecture_entry(1, "Monday", (9, 0), (10, 0)))
            .with_lecture(lecture_entry(2, "Tuesday", (9, 0), (10, 0)))
            .with_lecture(lecture_entry(3, "Monday", (10, 0), (11, 0)));

        let due = store
            .due_lectures(DayOfWeek::Monday, NaiveTime::from_hms_opt(10, 30, 0).unwrap())
            .await
            .unwrap();
        assert_eq!(due.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1]);
    }

    #[tokio::test]
    async fn it_should_fail_when_offline() {
        let mut store = InMemoryStore::new();
        store.toggle_offline();
        let err = store.find(1, monday()).await.unwrap_err();
        assert!(err.to_string().contains("attendance store offline"));
    }
}
