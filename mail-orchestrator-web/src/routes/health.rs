use std::sync::atomic::Ordering;

use actix_web::{HttpResponse, get, http::header, web};
use mail_orchestrator_app::AppState;
use serde_json::json;

/// Liveness probe; also reports whether the deletion queue is running.
#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(json!({
            "status": "ok",
            "queueStarted": state.queue_started.load(Ordering::SeqCst),
        }))
}
