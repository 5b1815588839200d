use crate::api::{attendance, reconcile};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::web;

pub type CaptureLimit = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-IP limiter for check-in / check-out.
pub fn capture_limit(requests_per_min: u32) -> Option<CaptureLimit> {
    let requests_per_min = requests_per_min.max(1);
    GovernorConfigBuilder::default()
        .milliseconds_per_request(60_000 / requests_per_min as u64)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
}

pub fn configure(cfg: &mut web::ServiceConfig, api_prefix: &str, capture_limit: &CaptureLimit) {
    cfg.service(
        web::scope(api_prefix)
            .service(
                web::scope("/attendance")
                    // /attendance?date=
                    .service(
                        web::resource("").route(web::get().to(attendance::list_attendance)),
                    )
                    // /attendance/{lecture_id}/check-in|check-out
                    .service(
                        web::scope("/{lecture_id}")
                            .wrap(Governor::new(capture_limit))
                            .service(
                                web::resource("/check-in")
                                    .route(web::post().to(attendance::check_in)),
                            )
                            .service(
                                web::resource("/check-out")
                                    .route(web::post().to(attendance::check_out)),
                            ),
                    ),
            )
            .service(
                web::resource("/reconcile").route(web::post().to(reconcile::run_reconciliation)),
            ),
    );
}
