// Liveness and API docs
use crate::app::AppState;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api_docs;

/// Create public routes router
pub fn create_public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", api_docs::ApiDoc::openapi()),
        )
        .route("/healthcheck", get(healthcheck))
}

/// Liveness only; empty body.
#[utoipa::path(
    get,
    path = "/healthcheck",
    tag = "Health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn healthcheck() -> StatusCode {
    StatusCode::OK
}
