// Shared fixtures for unit tests. Dates are anchored on Monday 2026-01-05.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::lecture::CatalogEntry;

pub fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
}

pub fn monday_at(hour: u32, minute: u32) -> NaiveDateTime {
    monday().and_hms_opt(hour, minute, 0).unwrap()
}

/// Catalog row with teacher 10, course 20, classroom 30, academic year 40.
pub fn lecture_entry(id: u64, day: &str, start: (u32, u32), end: (u32, u32)) -> CatalogEntry {
    CatalogEntry {
        id,
        day_of_week: day.to_string(),
        start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
        teacher_id: Some(10),
        course_id: Some(20),
        classroom_id: Some(30),
        academic_year_id: Some(40),
    }
}

/// Monday record for `lecture_id` with no check-in or check-out.
pub fn record_for(lecture_id: u64, status: Option<AttendanceStatus>) -> AttendanceRecord {
    AttendanceRecord {
        lecture_id,
        date: monday(),
        check_in_time: None,
        check_out_time: None,
        status,
        teacher_id: 10,
        course_id: 20,
        classroom_id: 30,
        academic_year_id: 40,
    }
}
