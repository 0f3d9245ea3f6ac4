use crate::app::AppState;
use crate::handlers::instances;
use axum::routing::post;
use axum::Router;
use std::sync::Arc;

pub fn create_instance_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/v1/instances/create", post(instances::create_instance))
        .route("/v1/instances/ip", post(instances::instance_ip))
}
