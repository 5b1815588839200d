use crate::api::attendance::AttendanceQuery;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::reconcile::RunSummary;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Timetable Attendance API",
        version = "0.1.0",
        description = r#"
## Teacher attendance against the timetable

Teachers check in and out of their scheduled lectures. A reconciliation pass,
run every few minutes, turns those facts into one status per lecture per day:

- **absent**: the lecture ended and nobody checked in
- **incomplete**: checked in, never checked out
- **completed**: checked in and out

Status is only ever written by reconciliation. Authentication is handled by
the gateway in front of this service.
"#,
    ),
    paths(
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::list_attendance,
        crate::api::reconcile::run_reconciliation
    ),
    components(
        schemas(
            AttendanceQuery,
            AttendanceRecord,
            AttendanceStatus,
            RunSummary
        )
    ),
    tags(
        (name = "Attendance", description = "Check-in, check-out and daily records"),
        (name = "Reconciliation", description = "Attendance status derivation"),
    )
)]
pub struct ApiDoc;
