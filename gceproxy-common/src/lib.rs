use serde::{Deserialize, Serialize};
use std::fmt;

pub mod error;
pub mod instance;

pub use error::ProviderError;
pub use instance::{
    AccessConfig, AttachedDisk, AttachedDiskInitializeParams, InstanceSpec, InstanceStatus,
    InstanceView, Metadata, MetadataItem, NetworkInterface, COMPUTE_API_URL, STARTUP_SCRIPT_KEY,
};

// --- Configuration ---

fn default_poll_interval_secs() -> u64 {
    2
}

fn default_poll_timeout_secs() -> u64 {
    300
}

/// Static compute parameters, loaded once at startup and shared read-only by every request.
///
/// Field names follow the on-disk JSON config (`projectid`, `machinetype`, ...).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    #[serde(rename = "projectid")]
    pub project_id: String,
    pub region: String,
    pub zone: String,
    #[serde(rename = "machinetype")]
    pub machine_type: String,
    /// Image path relative to the projects root, e.g. `debian-cloud/global/images/family/debian-12`.
    #[serde(rename = "imageid")]
    pub image_id: String,
    /// Filesystem path to the service-account key file.
    #[serde(rename = "accountkey", default)]
    pub account_key: String,
    #[serde(rename = "disktype")]
    pub disk_type: String,
    #[serde(rename = "disksize")]
    pub disk_size_gb: i64,
    #[serde(rename = "pollinterval", default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(rename = "polltimeout", default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
}

// --- DTOs ---

/// Login account to create on the new instance.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, utoipa::ToSchema)]
pub struct ProvisionRequest {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for ProvisionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvisionRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, utoipa::ToSchema)]
pub struct InstanceNameRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, utoipa::ToSchema)]
pub struct PublicIp {
    pub ip: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code, e.g. `instance_not_found`.
    pub error: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_config_reads_flat_json_with_poll_defaults() {
        let raw = r#"{
            "projectid": "demo-project",
            "region": "europe-west1",
            "zone": "europe-west1-b",
            "machinetype": "e2-small",
            "imageid": "debian-cloud/global/images/family/debian-12",
            "accountkey": "/etc/gceproxy/key.json",
            "disktype": "pd-balanced",
            "disksize": 20
        }"#;
        let cfg: ProviderConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(cfg.project_id, "demo-project");
        assert_eq!(cfg.machine_type, "e2-small");
        assert_eq!(cfg.disk_size_gb, 20);
        assert_eq!(cfg.poll_interval_secs, 2);
        assert_eq!(cfg.poll_timeout_secs, 300);
    }

    #[test]
    fn provision_request_debug_hides_password() {
        let req = ProvisionRequest {
            username: "alice".to_string(),
            password: "S3cr3t!".to_string(),
        };
        let dbg = format!("{:?}", req);
        assert!(dbg.contains("alice"));
        assert!(!dbg.contains("S3cr3t!"));
    }
}
