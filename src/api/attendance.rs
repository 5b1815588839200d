use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::capture::{AttendanceCapture, CaptureError};
use crate::model::attendance::AttendanceRecord;
use crate::scheduler::local_now;
use crate::store::AttendanceStore;

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct AttendanceQuery {
    /// Day to list, defaults to today
    #[schema(example = "2026-01-05", value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,
}

fn capture_failure(e: CaptureError, lecture_id: u64) -> actix_web::Result<HttpResponse> {
    let message = e.to_string();
    match e {
        CaptureError::UnknownLecture(_) => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": message
        }))),
        CaptureError::NotScheduledToday { .. } => {
            Ok(HttpResponse::Conflict().json(serde_json::json!({
                "message": message
            })))
        }
        CaptureError::AlreadyCheckedIn(_) | CaptureError::NoActiveCheckIn(_) => {
            Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": message
            })))
        }
        CaptureError::Inconsistent(_) => {
            tracing::warn!(error = %message, lecture_id, "Lecture data is inconsistent");
            Ok(HttpResponse::UnprocessableEntity().json(serde_json::json!({
                "message": message
            })))
        }
        CaptureError::Store(err) => {
            tracing::error!(error = %err, lecture_id, "Attendance capture failed");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/{lecture_id}/check-in",
    params(
        ("lecture_id", description = "Timetable entry ID")
    ),
    responses(
        (status = 200, description = "Checked in successfully", body = Object, example = json!({
            "message": "Checked in successfully"
        })),
        (status = 400, description = "Already checked in today", body = Object, example = json!({
            "message": "already checked in to lecture 12 today"
        })),
        (status = 404, description = "Lecture not found"),
        (status = 409, description = "Lecture is not held today"),
        (status = 422, description = "Lecture references missing data"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    path: web::Path<u64>,
    capture: web::Data<AttendanceCapture>,
) -> actix_web::Result<impl Responder> {
    let lecture_id = path.into_inner();

    match capture.check_in(lecture_id, local_now()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "message": "Checked in successfully"
        }))),
        Err(e) => capture_failure(e, lecture_id),
    }
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/{lecture_id}/check-out",
    params(
        ("lecture_id", description = "Timetable entry ID")
    ),
    responses(
        (status = 200, description = "Checked out successfully", body = Object, example = json!({
            "message": "Checked out successfully"
        })),
        (status = 400, description = "No active check-in found for today", body = Object, example = json!({
            "message": "no active check-in for lecture 12 today"
        })),
        (status = 404, description = "Lecture not found"),
        (status = 409, description = "Lecture is not held today"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    path: web::Path<u64>,
    capture: web::Data<AttendanceCapture>,
) -> actix_web::Result<impl Responder> {
    let lecture_id = path.into_inner();

    match capture.check_out(lecture_id, local_now()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "message": "Checked out successfully"
        }))),
        Err(e) => capture_failure(e, lecture_id),
    }
}

/// Attendance records for one day
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, body = [AttendanceRecord]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    store: web::Data<dyn AttendanceStore>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    let date = query.date.unwrap_or_else(|| local_now().date());

    let records: Vec<AttendanceRecord> = store.list_for_date(date).await.map_err(|e| {
        tracing::error!(error = %e, %date, "Failed to fetch attendance");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(records))
}
