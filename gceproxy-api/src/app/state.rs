use gceproxy_common::ProviderConfig;
use gceproxy_orchestrator::ProvisioningClient;
use gceproxy_providers::CloudProvider;
use std::sync::Arc;

/// Shared by every request; nothing in here is mutated after startup.
#[derive(Clone)]
pub struct AppState {
    pub provisioning: ProvisioningClient,
}

impl AppState {
    pub fn new(config: ProviderConfig, provider: Arc<dyn CloudProvider>) -> Arc<Self> {
        let provisioning = ProvisioningClient::new(provider, Arc::new(config));
        Arc::new(Self { provisioning })
    }
}
