use chrono::{NaiveTime, Weekday};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Day names as stored in `timetables.day_of_week`. Parsing ignores case,
/// like the column's collation does.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Display, EnumString, AsRefStr)]
#[strum(ascii_case_insensitive)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

/// A timetable row as the catalog returns it.
///
/// Related tables are left-joined, so a dangling course, teacher, classroom
/// or academic year shows up here as `None`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CatalogEntry {
    pub id: u64,
    pub day_of_week: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub teacher_id: Option<u64>,
    pub course_id: Option<u64>,
    pub classroom_id: Option<u64>,
    pub academic_year_id: Option<u64>,
}

/// A fully resolved weekly lecture slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LectureOccurrence {
    pub id: u64,
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub teacher_id: u64,
    pub course_id: u64,
    pub classroom_id: u64,
    pub academic_year_id: u64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataInconsistency {
    #[error("lecture {lecture_id} references a missing {reference}")]
    MissingReference {
        lecture_id: u64,
        reference: &'static str,
    },

    #[error("lecture {lecture_id} has an unknown day of week {value:?}")]
    UnknownDay { lecture_id: u64, value: String },

    #[error("lecture {lecture_id} ends at {end} but starts at {start}")]
    InvertedTimes {
        lecture_id: u64,
        start: NaiveTime,
        end: NaiveTime,
    },
}

impl CatalogEntry {
    pub fn resolve(&self) -> Result<LectureOccurrence, DataInconsistency> {
        let missing = |reference| DataInconsistency::MissingReference {
            lecture_id: self.id,
            reference,
        };

        let day_of_week = self
            .day_of_week
            .parse::<DayOfWeek>()
            .map_err(|_| DataInconsistency::UnknownDay {
                lecture_id: self.id,
                value: self.day_of_week.clone(),
            })?;

        if self.start_time >= self.end_time {
            return Err(DataInconsistency::InvertedTimes {
                lecture_id: self.id,
                start: self.start_time,
                end: self.end_time,
            });
        }

        Ok(LectureOccurrence {
            id: self.id,
            day_of_week,
            start_time: self.start_time,
            end_time: self.end_time,
            course_id: self.course_id.ok_or_else(|| missing("course"))?,
            teacher_id: self.teacher_id.ok_or_else(|| missing("teacher"))?,
            classroom_id: self.classroom_id.ok_or_else(|| missing("classroom"))?,
            academic_year_id: self
                .academic_year_id
                .ok_or_else(|| missing("academic year"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn entry() -> CatalogEntry {
        CatalogEntry {
            id: 7,
            day_of_week: "Monday".to_string(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            teacher_id: Some(1),
            course_id: Some(2),
            classroom_id: Some(3),
            academic_year_id: Some(4),
        }
    }

    #[test]
    fn resolves_complete_entry() {
        let lecture = entry().resolve().unwrap();
        assert_eq!(lecture.day_of_week, DayOfWeek::Monday);
        assert_eq!(lecture.teacher_id, 1);
        assert_eq!(lecture.course_id, 2);
        assert_eq!(lecture.classroom_id, 3);
        assert_eq!(lecture.academic_year_id, 4);
    }

    #[rstest]
    #[case::course(CatalogEntry { course_id: None, ..entry() }, "course")]
    #[case::teacher(CatalogEntry { teacher_id: None, ..entry() }, "teacher")]
    #[case::classroom(CatalogEntry { classroom_id: None, ..entry() }, "classroom")]
    #[case::year(CatalogEntry { academic_year_id: None, ..entry() }, "academic year")]
    fn reports_missing_reference(#[case] entry: CatalogEntry, #[case] expected: &'static str) {
        assert_eq!(
            entry.resolve(),
            Err(DataInconsistency::MissingReference {
                lecture_id: 7,
                reference: expected
            })
        );
    }

    #[test]
    fn rejects_unknown_day() {
        let entry = CatalogEntry {
            day_of_week: "Funday".to_string(),
            ..entry()
        };
        assert!(matches!(
            entry.resolve(),
            Err(DataInconsistency::UnknownDay { lecture_id: 7, .. })
        ));
    }

    #[rstest]
    #[case("monday")]
    #[case("MONDAY")]
    #[case("Monday")]
    fn accepts_day_names_in_any_case(#[case] day: &str) {
        let entry = CatalogEntry {
            day_of_week: day.to_string(),
            ..entry()
        };
        assert_eq!(entry.resolve().unwrap().day_of_week, DayOfWeek::Monday);
    }

    #[test]
    fn rejects_end_not_after_start() {
        let entry = CatalogEntry {
            end_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            ..entry()
        };
        assert!(matches!(
            entry.resolve(),
            Err(DataInconsistency::InvertedTimes { .. })
        ));
    }

    #[test]
    fn day_of_week_follows_chrono_weekday() {
        assert_eq!(DayOfWeek::from(Weekday::Sun), DayOfWeek::Sunday);
        assert_eq!(DayOfWeek::Thursday.as_ref(), "Thursday");
    }
}
