//! Compute Engine instance resource, as sent on insert and read back on get.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Root of every Compute Engine resource URI.
pub const COMPUTE_API_URL: &str = "https://www.googleapis.com/compute/v1/projects/";

/// Metadata key under which the boot script is attached.
pub const STARTUP_SCRIPT_KEY: &str = "startup-script";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InstanceSpec {
    pub name: String,
    pub description: String,
    pub zone: String,
    pub machine_type: String,
    pub network_interfaces: Vec<NetworkInterface>,
    pub disks: Vec<AttachedDisk>,
    pub metadata: Metadata,
}

impl InstanceSpec {
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .items
            .iter()
            .find(|item| item.key == key)
            .map(|item| item.value.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnetwork: Option<String>,
    #[serde(default)]
    pub access_configs: Vec<AccessConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct AccessConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(rename = "natIP", default, skip_serializing_if = "Option::is_none")]
    pub nat_ip: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttachedDisk {
    #[serde(rename = "type")]
    pub kind: String,
    pub boot: bool,
    pub mode: String,
    pub auto_delete: bool,
    pub device_name: String,
    pub initialize_params: AttachedDiskInitializeParams,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttachedDiskInitializeParams {
    pub source_image: String,
    pub disk_type: String,
    pub disk_size_gb: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct Metadata {
    #[serde(default)]
    pub items: Vec<MetadataItem>,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct MetadataItem {
    pub key: String,
    pub value: String,
}

// Metadata values carry the rendered startup script, which embeds a password.
impl fmt::Debug for MetadataItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataItem")
            .field("key", &self.key)
            .field("value", &format_args!("<{} bytes>", self.value.len()))
            .finish()
    }
}

/// Lifecycle status reported by the provider.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum InstanceStatus {
    Provisioning,
    Staging,
    Running,
    Stopping,
    Stopped,
    Suspending,
    Suspended,
    Repairing,
    Terminated,
    Other(String),
}

impl InstanceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            InstanceStatus::Provisioning => "PROVISIONING",
            InstanceStatus::Staging => "STAGING",
            InstanceStatus::Running => "RUNNING",
            InstanceStatus::Stopping => "STOPPING",
            InstanceStatus::Stopped => "STOPPED",
            InstanceStatus::Suspending => "SUSPENDING",
            InstanceStatus::Suspended => "SUSPENDED",
            InstanceStatus::Repairing => "REPAIRING",
            InstanceStatus::Terminated => "TERMINATED",
            InstanceStatus::Other(s) => s.as_str(),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, InstanceStatus::Running)
    }

    /// Statuses from which a freshly created instance will not reach RUNNING on its own.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            InstanceStatus::Stopping
                | InstanceStatus::Stopped
                | InstanceStatus::Suspending
                | InstanceStatus::Suspended
                | InstanceStatus::Terminated
        )
    }
}

impl From<&str> for InstanceStatus {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "PROVISIONING" => InstanceStatus::Provisioning,
            "STAGING" => InstanceStatus::Staging,
            "RUNNING" => InstanceStatus::Running,
            "STOPPING" => InstanceStatus::Stopping,
            "STOPPED" => InstanceStatus::Stopped,
            "SUSPENDING" => InstanceStatus::Suspending,
            "SUSPENDED" => InstanceStatus::Suspended,
            "REPAIRING" => InstanceStatus::Repairing,
            "TERMINATED" => InstanceStatus::Terminated,
            _ => InstanceStatus::Other(s.to_string()),
        }
    }
}

impl From<String> for InstanceStatus {
    fn from(s: String) -> Self {
        InstanceStatus::from(s.as_str())
    }
}

impl From<InstanceStatus> for String {
    fn from(status: InstanceStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The subset of an instance resource the proxy reads back while polling.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InstanceView {
    pub name: String,
    pub status: InstanceStatus,
    #[serde(default)]
    pub network_interfaces: Vec<NetworkInterface>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_view_parses_compute_get_response() {
        let raw = r#"{
            "kind": "compute#instance",
            "name": "boldfalcon-x1",
            "status": "RUNNING",
            "networkInterfaces": [{
                "network": "https://www.googleapis.com/compute/v1/projects/p/global/networks/default",
                "networkIP": "10.132.0.2",
                "accessConfigs": [{"type": "ONE_TO_ONE_NAT", "name": "External NAT", "natIP": "203.0.113.5"}]
            }]
        }"#;
        let view: InstanceView = serde_json::from_str(raw).unwrap();
        assert!(view.status.is_running());
        assert_eq!(
            view.network_interfaces[0].access_configs[0].nat_ip.as_deref(),
            Some("203.0.113.5")
        );
    }

    #[test]
    fn unknown_status_is_kept_verbatim() {
        let status = InstanceStatus::from("PENDING_STOP");
        assert_eq!(status, InstanceStatus::Other("PENDING_STOP".to_string()));
        assert!(!status.is_terminal());
        assert!(!status.is_running());
        assert!(InstanceStatus::from("terminated").is_terminal());
    }

    #[test]
    fn metadata_debug_does_not_print_value() {
        let item = MetadataItem {
            key: STARTUP_SCRIPT_KEY.to_string(),
            value: "openssl passwd -6 'hunter2'".to_string(),
        };
        assert!(!format!("{:?}", item).contains("hunter2"));
    }
}
