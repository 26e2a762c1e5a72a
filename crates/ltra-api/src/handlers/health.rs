use actix_web::HttpResponse;
use serde_json::json;

/// Liveness check
///
/// GET /health
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": "ltra-console",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
