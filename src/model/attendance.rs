use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::model::lecture::LectureOccurrence;

#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AttendanceStatus {
    Absent,
    Incomplete,
    Completed,
}

/// One lecture on one date. `(lecture_id, date)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = 12)]
    pub lecture_id: u64,

    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "2026-01-05T09:02:11", value_type = Option<String>, format = "date-time")]
    pub check_in_time: Option<NaiveDateTime>,

    #[schema(example = "2026-01-05T10:01:40", value_type = Option<String>, format = "date-time")]
    pub check_out_time: Option<NaiveDateTime>,

    /// Unset until the first reconciliation pass after the lecture ends
    pub status: Option<AttendanceStatus>,

    #[schema(example = 3)]
    pub teacher_id: u64,
    #[schema(example = 5)]
    pub course_id: u64,
    #[schema(example = 2)]
    pub classroom_id: u64,
    #[schema(example = 1)]
    pub academic_year_id: u64,
}

/// Identity fields of a record, copied from the lecture when it is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttendanceRecord {
    pub lecture_id: u64,
    pub date: NaiveDate,
    pub teacher_id: u64,
    pub course_id: u64,
    pub classroom_id: u64,
    pub academic_year_id: u64,
}

impl NewAttendanceRecord {
    pub fn for_lecture(lecture: &LectureOccurrence, date: NaiveDate) -> Self {
        Self {
            lecture_id: lecture.id,
            date,
            teacher_id: lecture.teacher_id,
            course_id: lecture.course_id,
            classroom_id: lecture.classroom_id,
            academic_year_id: lecture.academic_year_id,
        }
    }
}
