// Handlers module - request handlers and their error mapping
pub mod instances;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gceproxy_common::{ErrorResponse, ProviderError};
use gceproxy_orchestrator::ProvisionError;

/// Request-scoped failure, rendered as `{"error": code, "message": text}`.
#[derive(Debug)]
pub enum ApiError {
    InvalidInstanceName(String),
    Provision(ProvisionError),
}

impl From<ProvisionError> for ApiError {
    fn from(err: ProvisionError) -> Self {
        ApiError::Provision(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInstanceName(_) => StatusCode::BAD_REQUEST,
            ApiError::Provision(ProvisionError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Provision(ProvisionError::StatusQuery {
                source: ProviderError::NotFound(_),
                ..
            }) => StatusCode::NOT_FOUND,
            ApiError::Provision(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInstanceName(_) => "invalid_instance_name",
            ApiError::Provision(err) => err.code(),
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::InvalidInstanceName(name) => {
                format!("'{}' is not a valid instance name", name)
            }
            ApiError::Provision(err) => err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = self.code(), "{}", self.message());
        } else {
            tracing::warn!(error = self.code(), "{}", self.message());
        }
        (
            status,
            Json(ErrorResponse {
                error: self.code().to_string(),
                message: self.message(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gceproxy_common::InstanceStatus;
    use std::time::Duration;

    #[test]
    fn maps_workflow_errors_to_statuses() {
        let not_found = ApiError::from(ProvisionError::StatusQuery {
            name: "missing-instance".to_string(),
            source: ProviderError::NotFound("missing-instance".to_string()),
        });
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.code(), "instance_not_found");

        let auth = ApiError::from(ProvisionError::Submit {
            name: "vm".to_string(),
            source: ProviderError::Authentication("bad token".to_string()),
        });
        assert_eq!(auth.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(auth.code(), "provider_auth_failed");

        let timeout = ApiError::from(ProvisionError::Timeout {
            name: "vm".to_string(),
            waited: Duration::from_secs(300),
            last_status: InstanceStatus::Staging,
        });
        assert_eq!(timeout.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(timeout.code(), "provisioning_timeout");

        // A 404 while submitting means the provider is misconfigured, not a missing instance.
        let create_not_found = ApiError::from(ProvisionError::Submit {
            name: "vm".to_string(),
            source: ProviderError::NotFound("vm".to_string()),
        });
        assert_eq!(create_not_found.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(create_not_found.code(), "provider_error");

        let invalid = ApiError::InvalidInstanceName("Bad Name".to_string());
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    }
}
