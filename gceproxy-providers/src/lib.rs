use async_trait::async_trait;
use gceproxy_common::{InstanceSpec, InstanceView, ProviderError};

pub type ProviderResult<T> = Result<T, ProviderError>;

/// What the provider hands back once it has accepted an insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceHandle {
    pub name: String,
    pub zone: String,
    /// Provider-side operation id tracking the asynchronous creation, when one is returned.
    pub operation: Option<String>,
}

#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// Short code used in logs and for provider selection ("gce", "mock").
    fn code(&self) -> &'static str;

    /// Submit a create request. Success means the provider accepted it and began
    /// provisioning asynchronously; the instance is not necessarily reachable yet.
    async fn create_instance(&self, spec: &InstanceSpec) -> ProviderResult<InstanceHandle>;

    /// Read back the current status and network interfaces of a named instance.
    async fn get_instance(&self, zone: &str, name: &str) -> ProviderResult<InstanceView>;
}

#[cfg(feature = "mock")]
pub mod mock;

#[cfg(feature = "gce")]
pub mod gce;
