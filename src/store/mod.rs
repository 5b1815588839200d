// Persistence ports used by the reconciliation engine and the capture flow.
//
// MySqlStore is the production adapter. InMemoryStore backs the tests.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

use crate::model::attendance::{AttendanceRecord, AttendanceStatus, NewAttendanceRecord};
use crate::model::lecture::{CatalogEntry, DayOfWeek};

#[cfg(test)]
pub mod memory;
pub mod mysql;

/// The datastore could not be reached or answered with something unusable.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("stored attendance row is invalid: {0}")]
    Decode(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                StoreError::Unavailable(err.to_string())
            }
            err => StoreError::Database(err),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// Another writer already holds the `(lecture_id, date)` key.
    AlreadyExists,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CheckInOutcome {
    Recorded,
    AlreadyCheckedIn,
}

#[async_trait]
pub trait ScheduleCatalog: Send + Sync {
    /// Lectures held on `day` whose end time is strictly before `before`.
    async fn due_lectures(
        &self,
        day: DayOfWeek,
        before: NaiveTime,
    ) -> Result<Vec<CatalogEntry>, StoreError>;

    async fn find_lecture(&self, lecture_id: u64) -> Result<Option<CatalogEntry>, StoreError>;
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn find(
        &self,
        lecture_id: u64,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError>;

    /// Atomically create an `absent` record unless one exists for the key.
    async fn insert_absent(
        &self,
        record: NewAttendanceRecord,
    ) -> Result<InsertOutcome, StoreError>;

    async fn update_status(
        &self,
        lecture_id: u64,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<(), StoreError>;

    /// Never touches `status`.
    async fn record_check_in(
        &self,
        record: NewAttendanceRecord,
        at: NaiveDateTime,
    ) -> Result<CheckInOutcome, StoreError>;

    /// Returns false when there is no open check-in to close.
    async fn record_check_out(
        &self,
        lecture_id: u64,
        date: NaiveDate,
        at: NaiveDateTime,
    ) -> Result<bool, StoreError>;

    async fn list_for_date(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>, StoreError>;
}
