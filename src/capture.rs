// Check-in / check-out capture.
//
// Writes only the recorded times. Status belongs to the reconciliation pass.

use chrono::{Datelike, NaiveDateTime};
use std::sync::Arc;
use thiserror::Error;

use crate::model::attendance::NewAttendanceRecord;
use crate::model::lecture::{DataInconsistency, DayOfWeek, LectureOccurrence};
use crate::store::{AttendanceStore, CheckInOutcome, ScheduleCatalog, StoreError};

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("lecture {0} not found")]
    UnknownLecture(u64),

    #[error(transparent)]
    Inconsistent(#[from] DataInconsistency),

    #[error("lecture {lecture_id} is held on {scheduled}, not {today}")]
    NotScheduledToday {
        lecture_id: u64,
        scheduled: DayOfWeek,
        today: DayOfWeek,
    },

    #[error("already checked in to lecture {0} today")]
    AlreadyCheckedIn(u64),

    #[error("no active check-in for lecture {0} today")]
    NoActiveCheckIn(u64),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct AttendanceCapture {
    catalog: Arc<dyn ScheduleCatalog>,
    store: Arc<dyn AttendanceStore>,
}

impl AttendanceCapture {
    pub fn new(catalog: Arc<dyn ScheduleCatalog>, store: Arc<dyn AttendanceStore>) -> Self {
        Self { catalog, store }
    }

    async fn todays_lecture(
        &self,
        lecture_id: u64,
        now: NaiveDateTime,
    ) -> Result<LectureOccurrence, CaptureError> {
        let lecture = self
            .catalog
            .find_lecture(lecture_id)
            .await?
            .ok_or(CaptureError::UnknownLecture(lecture_id))?
            .resolve()?;

        let today = DayOfWeek::from(now.weekday());
        if lecture.day_of_week != today {
            return Err(CaptureError::NotScheduledToday {
                lecture_id,
                scheduled: lecture.day_of_week,
                today,
            });
        }
        Ok(lecture)
    }

    pub async fn check_in(&self, lecture_id: u64, now: NaiveDateTime) -> Result<(), CaptureError> {
        let lecture = self.todays_lecture(lecture_id, now).await?;
        let record = NewAttendanceRecord::for_lecture(&lecture, now.date());

        match self.store.record_check_in(record, now).await? {
            CheckInOutcome::Recorded => {
                tracing::info!(lecture_id, starts = %lecture.start_time, %now, "checked in");
                Ok(())
            }
            CheckInOutcome::AlreadyCheckedIn => Err(CaptureError::AlreadyCheckedIn(lecture_id)),
        }
    }

    pub async fn check_out(&self, lecture_id: u64, now: NaiveDateTime) -> Result<(), CaptureError> {
        self.todays_lecture(lecture_id, now).await?;

        if !self
            .store
            .record_check_out(lecture_id, now.date(), now)
            .await?
        {
            return Err(CaptureError::NoActiveCheckIn(lecture_id));
        }
        tracing::info!(lecture_id, %now, "checked out");
        Ok(())
    }
}
