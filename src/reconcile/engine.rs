// Reconciliation pass: turns check-in/check-out facts for lectures that have
// ended today into an attendance status.
//
// A pass works from a single captured `now`. Lectures are handled one by one.
// An inconsistent lecture or an unreadable attendance row is skipped, an
// unreachable store ends the pass. Status is always re-derived from the
// recorded times, so repeated passes converge.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use super::selector::{DueWindow, is_due};
use super::status::derive_status;
use crate::config::AttendanceSettings;
use crate::model::attendance::{AttendanceStatus, NewAttendanceRecord};
use crate::model::lecture::LectureOccurrence;
use crate::store::{AttendanceStore, InsertOutcome, ScheduleCatalog, StoreError};

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("reconciliation pass did not finish within {0:?}")]
    TimedOut(Duration),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct RunSummary {
    #[schema(example = "2026-01-05T10:05:00", value_type = String, format = "date-time")]
    pub now: NaiveDateTime,
    /// Lectures returned by the catalog for this pass
    pub due: usize,
    pub created_absent: usize,
    pub marked_incomplete: usize,
    pub marked_completed: usize,
    pub unchanged: usize,
    pub skipped_inconsistent: usize,
    pub not_yet_ended: usize,
    /// Absent inserts lost to a concurrent writer
    pub duplicate_inserts: usize,
}

#[derive(Clone)]
pub struct ReconciliationEngine {
    catalog: Arc<dyn ScheduleCatalog>,
    store: Arc<dyn AttendanceStore>,
    settings: AttendanceSettings,
}

impl ReconciliationEngine {
    pub fn new(
        catalog: Arc<dyn ScheduleCatalog>,
        store: Arc<dyn AttendanceStore>,
        settings: AttendanceSettings,
    ) -> Self {
        Self {
            catalog,
            store,
            settings,
        }
    }

    /// Run one pass, giving up once `limit` has elapsed.
    pub async fn run_bounded(
        &self,
        now: NaiveDateTime,
        limit: Duration,
    ) -> Result<RunSummary, ReconcileError> {
        tokio::time::timeout(limit, self.run(now))
            .await
            .map_err(|_| ReconcileError::TimedOut(limit))?
    }

    pub async fn run(&self, now: NaiveDateTime) -> Result<RunSummary, ReconcileError> {
        info!(%now, "attendance reconciliation started");
        debug!(
            late_threshold_minutes = self.settings.late_threshold_minutes,
            early_leave_threshold_minutes = self.settings.early_leave_threshold_minutes,
            "attendance thresholds are not applied to status"
        );

        let window = DueWindow::at(now);
        let entries = self.catalog.due_lectures(window.day, window.before).await?;
        let today = now.date();

        let mut summary = RunSummary {
            now,
            due: entries.len(),
            ..RunSummary::default()
        };

        for entry in entries {
            let lecture = match entry.resolve() {
                Ok(lecture) => lecture,
                Err(e) => {
                    warn!(error = %e, lecture_id = entry.id, "skipping inconsistent lecture");
                    summary.skipped_inconsistent += 1;
                    continue;
                }
            };

            // The catalog answered for a slightly different moment.
            if !is_due(&lecture, now) {
                summary.not_yet_ended += 1;
                continue;
            }

            match self.reconcile_lecture(&lecture, today, &mut summary).await {
                Ok(()) => {}
                Err(StoreError::Decode(reason)) => {
                    warn!(
                        lecture_id = lecture.id,
                        %reason,
                        "skipping unreadable attendance record"
                    );
                    summary.skipped_inconsistent += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        info!(
            %now,
            due = summary.due,
            created_absent = summary.created_absent,
            marked_incomplete = summary.marked_incomplete,
            marked_completed = summary.marked_completed,
            unchanged = summary.unchanged,
            skipped_inconsistent = summary.skipped_inconsistent,
            duplicate_inserts = summary.duplicate_inserts,
            "attendance reconciliation finished"
        );
        Ok(summary)
    }

    async fn reconcile_lecture(
        &self,
        lecture: &LectureOccurrence,
        date: NaiveDate,
        summary: &mut RunSummary,
    ) -> Result<(), StoreError> {
        let Some(record) = self.store.find(lecture.id, date).await? else {
            // Absent is final for this pass.
            let outcome = self
                .store
                .insert_absent(NewAttendanceRecord::for_lecture(lecture, date))
                .await?;
            match outcome {
                InsertOutcome::Inserted => summary.created_absent += 1,
                InsertOutcome::AlreadyExists => {
                    debug!(lecture_id = lecture.id, %date, "absent record already created");
                    summary.duplicate_inserts += 1;
                }
            }
            return Ok(());
        };

        match derive_status(&record) {
            Some(status) if record.status == Some(status) => summary.unchanged += 1,
            Some(status) => {
                self.store.update_status(lecture.id, date, status).await?;
                match status {
                    AttendanceStatus::Incomplete => summary.marked_incomplete += 1,
                    AttendanceStatus::Completed => summary.marked_completed += 1,
                    AttendanceStatus::Absent => {}
                }
            }
            None => {
                debug!(
                    lecture_id = lecture.id,
                    %date,
                    status = ?record.status,
                    "record has no check-in, status left as is"
                );
                summary.unchanged += 1;
            }
        }
        Ok(())
    }
}
