use chrono::{Datelike, NaiveDateTime, NaiveTime};

use crate::model::lecture::{DayOfWeek, LectureOccurrence};

/// What the catalog is asked for: today's weekday and the time of day before
/// which a lecture must have ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DueWindow {
    pub day: DayOfWeek,
    pub before: NaiveTime,
}

impl DueWindow {
    pub fn at(now: NaiveDateTime) -> Self {
        Self {
            day: now.weekday().into(),
            before: now.time(),
        }
    }
}

/// A lecture is due once `now` is strictly past its end time on today's date
/// and it is scheduled on today's weekday. Ending exactly at `now` is not due.
pub fn is_due(lecture: &LectureOccurrence, now: NaiveDateTime) -> bool {
    lecture.day_of_week == DayOfWeek::from(now.weekday())
        && now > now.date().and_time(lecture.end_time)
}
