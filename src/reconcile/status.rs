use crate::model::attendance::{AttendanceRecord, AttendanceStatus};

/// Status implied by a record's check-in and check-out times.
///
/// `None` leaves the stored status untouched. That covers a record with
/// neither time set, which has no defined outcome yet.
pub fn derive_status(record: &AttendanceRecord) -> Option<AttendanceStatus> {
    match (record.check_in_time, record.check_out_time) {
        (Some(_), None) => Some(AttendanceStatus::Incomplete),
        (Some(_), Some(_)) => Some(AttendanceStatus::Completed),
        (None, _) => None,
    }
}
