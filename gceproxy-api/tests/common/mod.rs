// Common test utilities and fixtures
use axum::middleware;
use axum::Router;
use gceproxy_api::app::{create_cors, AppState};
use gceproxy_api::routes::create_router;
use gceproxy_api::simple_logger::log_request;
use gceproxy_common::ProviderConfig;
use gceproxy_providers::mock::MockProvider;
use std::sync::Arc;

/// Provider config for tests: polls back-to-back and gives up after a few seconds.
pub fn test_config() -> ProviderConfig {
    ProviderConfig {
        project_id: "demo-project".to_string(),
        region: "europe-west1".to_string(),
        zone: "europe-west1-b".to_string(),
        machine_type: "e2-small".to_string(),
        image_id: "debian-cloud/global/images/family/debian-12".to_string(),
        account_key: String::new(),
        disk_type: "pd-balanced".to_string(),
        disk_size_gb: 10,
        poll_interval_secs: 0,
        poll_timeout_secs: 5,
    }
}

/// Create a test application service wired to the given provider double,
/// with the same layers as main.rs.
pub fn create_test_app_service(provider: Arc<MockProvider>) -> Router {
    let state = AppState::new(test_config(), provider);
    create_router()
        .layer(middleware::from_fn(log_request))
        .layer(create_cors())
        .with_state(state)
}
