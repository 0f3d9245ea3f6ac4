use gceproxy_common::{InstanceSpec, InstanceStatus, InstanceView, ProviderConfig, ProviderError, ProvisionRequest};
use gceproxy_providers::{CloudProvider, InstanceHandle};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, Instant};

use crate::{instance_spec, names, startup_script};

/// Bounded wait between status queries while an instance comes up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            timeout: Duration::from_secs(300),
        }
    }
}

impl PollPolicy {
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.poll_interval_secs),
            timeout: Duration::from_secs(config.poll_timeout_secs),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("create request for {name} rejected: {source}")]
    Submit { name: String, source: ProviderError },

    #[error("status query for {name} failed: {source}")]
    StatusQuery { name: String, source: ProviderError },

    #[error("instance {name} entered {status} and will not reach RUNNING")]
    NotRunnable { name: String, status: InstanceStatus },

    #[error("instance {name} not RUNNING after {waited:?} (last status {last_status})")]
    Timeout {
        name: String,
        waited: Duration,
        last_status: InstanceStatus,
    },

    #[error("instance {name} is RUNNING but has no network interface")]
    NoNetworkInterface { name: String },

    #[error("instance {name} is RUNNING but its first interface has no access config")]
    NoAccessConfig { name: String },

    #[error("instance {name} is RUNNING but has no public address assigned")]
    NoPublicAddress { name: String },
}

impl ProvisionError {
    /// Machine-readable code surfaced to API callers.
    pub fn code(&self) -> &'static str {
        match self {
            ProvisionError::Submit {
                source: ProviderError::NotFound(_),
                ..
            } => "provider_error",
            ProvisionError::Submit { source, .. } | ProvisionError::StatusQuery { source, .. } => {
                source.code()
            }
            ProvisionError::NotRunnable { .. } => "instance_not_runnable",
            ProvisionError::Timeout { .. } => "provisioning_timeout",
            ProvisionError::NoNetworkInterface { .. } => "no_network_interface",
            ProvisionError::NoAccessConfig { .. } => "no_access_config",
            ProvisionError::NoPublicAddress { .. } => "no_public_address",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionResult {
    pub name: String,
    pub public_address: String,
}

/// Read the address from the first interface's first access config.
fn extract_public_address(view: &InstanceView) -> Result<String, ProvisionError> {
    let name = || view.name.clone();
    let nic = view
        .network_interfaces
        .first()
        .ok_or_else(|| ProvisionError::NoNetworkInterface { name: name() })?;
    let access = nic
        .access_configs
        .first()
        .ok_or_else(|| ProvisionError::NoAccessConfig { name: name() })?;
    access
        .nat_ip
        .as_deref()
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ProvisionError::NoPublicAddress { name: name() })
}

/// Drives one provider through create + wait-for-address. Cheap to clone; safe to
/// share across concurrent requests.
#[derive(Clone)]
pub struct ProvisioningClient {
    provider: Arc<dyn CloudProvider>,
    config: Arc<ProviderConfig>,
    policy: PollPolicy,
}

impl ProvisioningClient {
    pub fn new(provider: Arc<dyn CloudProvider>, config: Arc<ProviderConfig>) -> Self {
        let policy = PollPolicy::from_config(&config);
        Self {
            provider,
            config,
            policy,
        }
    }

    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Full workflow for one request: fresh name, script, spec, submit, wait.
    pub async fn provision(
        &self,
        request: &ProvisionRequest,
    ) -> Result<ProvisionResult, ProvisionError> {
        let name = names::generate();
        let script = startup_script::render(&request.username, &request.password);
        let spec = instance_spec::build(&self.config, &name, &script);

        tracing::info!(instance = %name, username = %request.username, "provisioning instance");
        let handle = self.submit(&spec).await?;
        let public_address = self.await_running(&handle.name).await?;
        Ok(ProvisionResult {
            name: handle.name,
            public_address,
        })
    }

    /// Hand the spec to the provider. Any failure aborts the request; there is no retry.
    pub async fn submit(&self, spec: &InstanceSpec) -> Result<InstanceHandle, ProvisionError> {
        let started = Instant::now();
        match self.provider.create_instance(spec).await {
            Ok(handle) => {
                tracing::info!(
                    instance = %handle.name,
                    zone = %handle.zone,
                    provider = self.provider.code(),
                    duration_ms = started.elapsed().as_millis() as u64,
                    "create request accepted"
                );
                Ok(handle)
            }
            Err(source) => {
                tracing::error!(instance = %spec.name, error = %source, "create request rejected");
                Err(ProvisionError::Submit {
                    name: spec.name.clone(),
                    source,
                })
            }
        }
    }

    /// Poll until the instance is RUNNING and return its public address.
    ///
    /// Stops on the first failing query, on a status that cannot lead to RUNNING,
    /// or once the next wait would overrun the policy timeout.
    pub async fn await_running(&self, name: &str) -> Result<String, ProvisionError> {
        let started = Instant::now();
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let view = self
                .provider
                .get_instance(&self.config.zone, name)
                .await
                .map_err(|source| {
                    tracing::error!(instance = %name, attempt, error = %source, "status query failed");
                    ProvisionError::StatusQuery {
                        name: name.to_string(),
                        source,
                    }
                })?;

            if view.status.is_running() {
                let ip = extract_public_address(&view)?;
                tracing::info!(
                    instance = %name,
                    attempt,
                    waited_ms = started.elapsed().as_millis() as u64,
                    ip = %ip,
                    "instance running"
                );
                return Ok(ip);
            }

            if view.status.is_terminal() {
                tracing::warn!(instance = %name, status = %view.status, "instance cannot reach RUNNING");
                return Err(ProvisionError::NotRunnable {
                    name: name.to_string(),
                    status: view.status,
                });
            }

            let waited = started.elapsed();
            if waited + self.policy.interval > self.policy.timeout {
                tracing::warn!(instance = %name, attempt, status = %view.status, "gave up waiting for RUNNING");
                return Err(ProvisionError::Timeout {
                    name: name.to_string(),
                    waited,
                    last_status: view.status,
                });
            }

            if attempt % 10 == 0 {
                tracing::info!(
                    instance = %name,
                    attempt,
                    status = %view.status,
                    waited_s = waited.as_secs(),
                    "still waiting for RUNNING"
                );
            }

            if self.policy.interval.is_zero() {
                tokio::task::yield_now().await;
            } else {
                sleep(self.policy.interval).await;
            }
        }
    }
}
