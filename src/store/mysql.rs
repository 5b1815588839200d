use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use futures_util::StreamExt;
use sqlx::{FromRow, MySqlPool};

use super::{AttendanceStore, CheckInOutcome, InsertOutcome, ScheduleCatalog, StoreError};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, NewAttendanceRecord};
use crate::model::lecture::{CatalogEntry, DayOfWeek};

const CATALOG_SELECT: &str = r#"
    SELECT t.id, t.day_of_week, t.start_time, t.end_time,
           tc.id AS teacher_id, c.id AS course_id,
           r.id AS classroom_id, y.id AS academic_year_id
    FROM timetables t
    LEFT JOIN courses c ON c.id = t.course_id
    LEFT JOIN teachers tc ON tc.id = c.teacher_id
    LEFT JOIN classrooms r ON r.id = t.classroom_id
    LEFT JOIN academic_years y ON y.id = t.academic_year_id
"#;

const ATTENDANCE_SELECT: &str = r#"
    SELECT lecture_id, date, check_in_time, check_out_time, status,
           teacher_id, course_id, classroom_id, academic_year_id
    FROM attendances
"#;

#[derive(FromRow)]
struct AttendanceRow {
    lecture_id: u64,
    date: NaiveDate,
    check_in_time: Option<NaiveDateTime>,
    check_out_time: Option<NaiveDateTime>,
    status: Option<String>,
    teacher_id: u64,
    course_id: u64,
    classroom_id: u64,
    academic_year_id: u64,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = StoreError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .as_deref()
            .map(str::parse::<AttendanceStatus>)
            .transpose()
            .map_err(|_| {
                StoreError::Decode(format!(
                    "lecture {} on {} has status {:?}",
                    row.lecture_id, row.date, row.status
                ))
            })?;

        Ok(AttendanceRecord {
            lecture_id: row.lecture_id,
            date: row.date,
            check_in_time: row.check_in_time,
            check_out_time: row.check_out_time,
            status,
            teacher_id: row.teacher_id,
            course_id: row.course_id,
            classroom_id: row.classroom_id,
            academic_year_id: row.academic_year_id,
        })
    }
}

/// Duplicate `(lecture_id, date)` keys are reported by MySQL as error 1062.
fn is_duplicate_key(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleCatalog for MySqlStore {
    async fn due_lectures(
        &self,
        day: DayOfWeek,
        before: NaiveTime,
    ) -> Result<Vec<CatalogEntry>, StoreError> {
        let sql = format!(
            "{CATALOG_SELECT} WHERE t.day_of_week = ? AND t.end_time < ? ORDER BY t.end_time, t.id"
        );

        let mut stream = sqlx::query_as::<_, CatalogEntry>(&sql)
            .bind(day.as_ref())
            .bind(before)
            .fetch(&self.pool);

        let mut entries = Vec::new();
        while let Some(row) = stream.next().await {
            entries.push(row?);
        }
        Ok(entries)
    }

    async fn find_lecture(&self, lecture_id: u64) -> Result<Option<CatalogEntry>, StoreError> {
        let sql = format!("{CATALOG_SELECT} WHERE t.id = ?");

        let entry = sqlx::query_as::<_, CatalogEntry>(&sql)
            .bind(lecture_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(entry)
    }
}

#[async_trait]
impl AttendanceStore for MySqlStore {
    async fn find(
        &self,
        lecture_id: u64,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        let sql = format!("{ATTENDANCE_SELECT} WHERE lecture_id = ? AND date = ?");

        sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(lecture_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await?
            .map(AttendanceRecord::try_from)
            .transpose()
    }

    async fn insert_absent(
        &self,
        record: NewAttendanceRecord,
    ) -> Result<InsertOutcome, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendances
            (lecture_id, date, status, teacher_id, course_id, classroom_id, academic_year_id)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.lecture_id)
        .bind(record.date)
        .bind(AttendanceStatus::Absent.as_ref())
        .bind(record.teacher_id)
        .bind(record.course_id)
        .bind(record.classroom_id)
        .bind(record.academic_year_id)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(e) if is_duplicate_key(&e) => Ok(InsertOutcome::AlreadyExists),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_status(
        &self,
        lecture_id: u64,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE attendances
            SET status = ?
            WHERE lecture_id = ?
            AND date = ?
            "#,
        )
        .bind(status.as_ref())
        .bind(lecture_id)
        .bind(date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn record_check_in(
        &self,
        record: NewAttendanceRecord,
        at: NaiveDateTime,
    ) -> Result<CheckInOutcome, StoreError> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO attendances
            (lecture_id, date, check_in_time, teacher_id, course_id, classroom_id, academic_year_id)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.lecture_id)
        .bind(record.date)
        .bind(at)
        .bind(record.teacher_id)
        .bind(record.course_id)
        .bind(record.classroom_id)
        .bind(record.academic_year_id)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => Ok(CheckInOutcome::Recorded),
            // The row exists already, possibly created as absent by a reconciliation pass.
            Err(e) if is_duplicate_key(&e) => {
                let result = sqlx::query(
                    r#"
                    UPDATE attendances
                    SET check_in_time = ?
                    WHERE lecture_id = ?
                    AND date = ?
                    AND check_in_time IS NULL
                    "#,
                )
                .bind(at)
                .bind(record.lecture_id)
                .bind(record.date)
                .execute(&self.pool)
                .await?;

                if result.rows_affected() == 0 {
                    Ok(CheckInOutcome::AlreadyCheckedIn)
                } else {
                    Ok(CheckInOutcome::Recorded)
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn record_check_out(
        &self,
        lecture_id: u64,
        date: NaiveDate,
        at: NaiveDateTime,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE attendances
            SET check_out_time = ?
            WHERE lecture_id = ?
            AND date = ?
            AND check_in_time IS NOT NULL
            AND check_out_time IS NULL
            "#,
        )
        .bind(at)
        .bind(lecture_id)
        .bind(date)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_for_date(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>, StoreError> {
        let sql = format!("{ATTENDANCE_SELECT} WHERE date = ? ORDER BY lecture_id");

        sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(date)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(AttendanceRecord::try_from)
            .collect()
    }
}
