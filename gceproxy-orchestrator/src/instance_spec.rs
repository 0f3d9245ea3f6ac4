use gceproxy_common::{
    AccessConfig, AttachedDisk, AttachedDiskInitializeParams, InstanceSpec, Metadata,
    MetadataItem, NetworkInterface, ProviderConfig, COMPUTE_API_URL, STARTUP_SCRIPT_KEY,
};

pub const INSTANCE_DESCRIPTION: &str = "Instance created with GCE Proxy";

/// Compose the insert body for one instance. Pure: same inputs, same spec.
pub fn build(config: &ProviderConfig, name: &str, startup_script: &str) -> InstanceSpec {
    let prefix = format!("{}{}", COMPUTE_API_URL, config.project_id);
    let zone_prefix = format!("{}/zones/{}", prefix, config.zone);

    InstanceSpec {
        name: name.to_string(),
        description: INSTANCE_DESCRIPTION.to_string(),
        zone: config.zone.clone(),
        machine_type: format!("{}/machineTypes/{}", zone_prefix, config.machine_type),
        network_interfaces: vec![NetworkInterface {
            network: Some(format!("{}/global/networks/default", prefix)),
            subnetwork: Some(format!(
                "{}/regions/{}/subnetworks/default",
                prefix, config.region
            )),
            access_configs: vec![AccessConfig {
                name: Some("External NAT".to_string()),
                kind: Some("ONE_TO_ONE_NAT".to_string()),
                nat_ip: None,
            }],
        }],
        disks: vec![AttachedDisk {
            kind: "PERSISTENT".to_string(),
            boot: true,
            mode: "READ_WRITE".to_string(),
            auto_delete: true,
            device_name: name.to_string(),
            initialize_params: AttachedDiskInitializeParams {
                source_image: format!("{}{}", COMPUTE_API_URL, config.image_id),
                disk_type: format!("{}/diskTypes/{}", zone_prefix, config.disk_type),
                disk_size_gb: config.disk_size_gb,
            },
        }],
        metadata: Metadata {
            items: vec![MetadataItem {
                key: STARTUP_SCRIPT_KEY.to_string(),
                value: startup_script.to_string(),
            }],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ProviderConfig {
        ProviderConfig {
            project_id: "demo-project".to_string(),
            region: "europe-west1".to_string(),
            zone: "europe-west1-b".to_string(),
            machine_type: "e2-small".to_string(),
            image_id: "debian-cloud/global/images/family/debian-12".to_string(),
            account_key: "/etc/gceproxy/key.json".to_string(),
            disk_type: "pd-balanced".to_string(),
            disk_size_gb: 20,
            poll_interval_secs: 2,
            poll_timeout_secs: 300,
        }
    }

    #[test]
    fn builds_resource_uris_from_config() {
        let spec = build(&config(), "jollyotter-abc", "#!/bin/bash\n");
        assert_eq!(
            spec.machine_type,
            "https://www.googleapis.com/compute/v1/projects/demo-project/zones/europe-west1-b/machineTypes/e2-small"
        );
        let nic = &spec.network_interfaces[0];
        assert_eq!(
            nic.network.as_deref(),
            Some("https://www.googleapis.com/compute/v1/projects/demo-project/global/networks/default")
        );
        assert_eq!(
            nic.subnetwork.as_deref(),
            Some("https://www.googleapis.com/compute/v1/projects/demo-project/regions/europe-west1/subnetworks/default")
        );
        assert_eq!(nic.access_configs[0].kind.as_deref(), Some("ONE_TO_ONE_NAT"));

        let disk = &spec.disks[0];
        assert!(disk.boot && disk.auto_delete);
        assert_eq!(disk.kind, "PERSISTENT");
        assert_eq!(disk.mode, "READ_WRITE");
        assert_eq!(disk.device_name, "jollyotter-abc");
        assert_eq!(
            disk.initialize_params.source_image,
            "https://www.googleapis.com/compute/v1/projects/debian-cloud/global/images/family/debian-12"
        );
        assert!(disk.initialize_params.disk_type.ends_with("/zones/europe-west1-b/diskTypes/pd-balanced"));
        assert_eq!(disk.initialize_params.disk_size_gb, 20);
        assert_eq!(spec.metadata_value(STARTUP_SCRIPT_KEY), Some("#!/bin/bash\n"));
    }

    #[test]
    fn same_name_gives_byte_identical_spec() {
        let a = serde_json::to_vec(&build(&config(), "vm-1", "script")).unwrap();
        let b = serde_json::to_vec(&build(&config(), "vm-1", "script")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn serializes_with_compute_field_names() {
        let json = serde_json::to_value(build(&config(), "vm-1", "s")).unwrap();
        assert_eq!(json["machineType"].as_str().map(|s| s.ends_with("/e2-small")), Some(true));
        assert_eq!(json["networkInterfaces"][0]["accessConfigs"][0]["name"], "External NAT");
        assert!(json["networkInterfaces"][0]["accessConfigs"][0].get("natIP").is_none());
        assert_eq!(json["disks"][0]["type"], "PERSISTENT");
        assert_eq!(json["disks"][0]["autoDelete"], true);
        assert_eq!(json["disks"][0]["initializeParams"]["diskSizeGb"], 20);
        assert_eq!(json["metadata"]["items"][0]["key"], "startup-script");
    }
}
