use actix_web::{HttpResponse, Responder, web};

use crate::config::Config;
use crate::reconcile::{ReconcileError, ReconciliationEngine, RunSummary};
use crate::scheduler::local_now;

/// Run one reconciliation pass now
#[utoipa::path(
    post,
    path = "/api/reconcile",
    responses(
        (status = 200, description = "Pass finished", body = RunSummary),
        (status = 500, description = "Datastore failure"),
        (status = 503, description = "Pass exceeded its time limit")
    ),
    tag = "Reconciliation"
)]
pub async fn run_reconciliation(
    engine: web::Data<ReconciliationEngine>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let result: Result<RunSummary, ReconcileError> =
        engine.run_bounded(local_now(), config.reconcile_timeout).await;

    match result {
        Ok(summary) => Ok(HttpResponse::Ok().json(summary)),
        Err(e @ ReconcileError::TimedOut(_)) => {
            tracing::warn!(error = %e, "Manual reconciliation timed out");
            Ok(HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "message": e.to_string()
            })))
        }
        Err(e) => {
            tracing::error!(error = %e, "Manual reconciliation failed");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}
