use crate::AppState;
use actix_web::{get, http::header, post, web, HttpResponse, Responder};
use serde_json::json;
use tracing::error;

/// Drop both caches and go back to the dashboard, which then refetches.
#[post("/diagnostics/clear-cache")]
pub async fn clear_cache(state: web::Data<AppState>) -> impl Responder {
    state.dashboard.clear_cache().await;
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/?cleared=1"))
        .finish()
}

/// FRED connectivity check.
///
/// ```json
/// {
///     "status": 200,
///     "ok": true,
///     "error": null,
///     "sample": { "realtime_start": "2024-06-14", "realtime_end": "2024-06-14", "observations": [ ... ] }
/// }
/// ```
#[get("/diagnostics/fred")]
pub async fn fred(state: web::Data<AppState>) -> impl Responder {
    match state.dashboard.probe().await {
        Ok(probe) => HttpResponse::Ok().json(probe),
        Err(e) => {
            error!("FRED probe failed: {e}");
            HttpResponse::BadGateway().json(json!({ "ok": false, "error": e.to_string() }))
        }
    }
}
