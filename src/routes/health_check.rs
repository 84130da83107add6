use actix_web::HttpResponse;

/// Liveness probe. Does not touch the store.
#[utoipa::path(
    get,
    path = "/health_check",
    tag = "health",
    responses((status = 200, description = "Service is up"))
)]
#[tracing::instrument(name = "Health check")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().finish()
}
