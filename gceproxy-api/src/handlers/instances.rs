use axum::{extract::State, Json};
use gceproxy_common::{InstanceNameRequest, ProvisionRequest, PublicIp};
use gceproxy_orchestrator::names;
use std::sync::Arc;

use super::ApiError;
use crate::app::state::AppState;

/// Create an instance with a login account and wait for its public address.
#[utoipa::path(
    post,
    path = "/v1/instances/create",
    tag = "Instances",
    request_body = ProvisionRequest,
    responses(
        (status = 200, description = "Instance is running", body = PublicIp),
        (status = 502, description = "Provider rejected or failed the request", body = gceproxy_common::ErrorResponse),
        (status = 504, description = "Instance did not reach RUNNING in time", body = gceproxy_common::ErrorResponse)
    )
)]
pub async fn create_instance(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ProvisionRequest>,
) -> Result<Json<PublicIp>, ApiError> {
    let result = state.provisioning.provision(&request).await?;
    tracing::info!(instance = %result.name, ip = %result.public_address, "instance ready");
    Ok(Json(PublicIp {
        ip: result.public_address,
    }))
}

/// Wait for an existing instance to be running and return its public address.
#[utoipa::path(
    post,
    path = "/v1/instances/ip",
    tag = "Instances",
    request_body = InstanceNameRequest,
    responses(
        (status = 200, description = "Instance is running", body = PublicIp),
        (status = 400, description = "Malformed instance name", body = gceproxy_common::ErrorResponse),
        (status = 404, description = "No such instance", body = gceproxy_common::ErrorResponse),
        (status = 502, description = "Provider failure", body = gceproxy_common::ErrorResponse),
        (status = 504, description = "Instance did not reach RUNNING in time", body = gceproxy_common::ErrorResponse)
    )
)]
pub async fn instance_ip(
    State(state): State<Arc<AppState>>,
    Json(request): Json<InstanceNameRequest>,
) -> Result<Json<PublicIp>, ApiError> {
    let name = request.name.trim();
    // The name ends up in the provider URL path.
    if !names::is_valid_instance_name(name) {
        return Err(ApiError::InvalidInstanceName(name.to_string()));
    }
    let ip = state.provisioning.await_running(name).await?;
    Ok(Json(PublicIp { ip }))
}
