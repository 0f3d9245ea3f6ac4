use crate::{CloudProvider, InstanceHandle, ProviderResult};
use async_trait::async_trait;
use gceproxy_common::{
    AccessConfig, InstanceSpec, InstanceStatus, InstanceView, NetworkInterface, ProviderError,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Documentation address (RFC 5737) handed out by default.
pub const MOCK_PUBLIC_IP: &str = "203.0.113.10";

/// One scripted answer to a status query.
#[derive(Debug, Clone)]
pub enum MockStep {
    /// Report this status with no network interfaces attached.
    Status(InstanceStatus),
    /// Report RUNNING with a single NAT access config carrying this address.
    Running(String),
    /// Report the given status and interfaces verbatim.
    Interfaces(InstanceStatus, Vec<NetworkInterface>),
    /// Fail the query.
    Fail(ProviderError),
}

impl MockStep {
    fn render(&self, name: &str) -> ProviderResult<InstanceView> {
        match self {
            MockStep::Status(status) => Ok(InstanceView {
                name: name.to_string(),
                status: status.clone(),
                network_interfaces: vec![],
            }),
            MockStep::Running(ip) => Ok(running_view(name, ip)),
            MockStep::Interfaces(status, interfaces) => Ok(InstanceView {
                name: name.to_string(),
                status: status.clone(),
                network_interfaces: interfaces.clone(),
            }),
            MockStep::Fail(err) => Err(err.clone()),
        }
    }
}

pub fn running_view(name: &str, ip: &str) -> InstanceView {
    InstanceView {
        name: name.to_string(),
        status: InstanceStatus::Running,
        network_interfaces: vec![NetworkInterface {
            access_configs: vec![AccessConfig {
                name: Some("External NAT".to_string()),
                kind: Some("ONE_TO_ONE_NAT".to_string()),
                nat_ip: Some(ip.to_string()),
            }],
            ..Default::default()
        }],
    }
}

/// In-memory provider double. Each instance replays a script of status answers;
/// the last step repeats once the script is exhausted. Unknown names are `NotFound`.
pub struct MockProvider {
    on_create: Mutex<Vec<MockStep>>,
    create_error: Mutex<Option<ProviderError>>,
    scripts: Mutex<HashMap<String, VecDeque<MockStep>>>,
    created: Mutex<Vec<InstanceSpec>>,
    get_calls: AtomicUsize,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    /// Created instances report RUNNING on the first query with [`MOCK_PUBLIC_IP`].
    pub fn new() -> Self {
        Self::with_address(MOCK_PUBLIC_IP)
    }

    pub fn with_address(ip: &str) -> Self {
        Self {
            on_create: Mutex::new(vec![MockStep::Running(ip.to_string())]),
            create_error: Mutex::new(None),
            scripts: Mutex::new(HashMap::new()),
            created: Mutex::new(Vec::new()),
            get_calls: AtomicUsize::new(0),
        }
    }

    /// Script replayed for every instance created from now on.
    pub fn with_created_script(self, steps: Vec<MockStep>) -> Self {
        if let Ok(mut on_create) = self.on_create.lock() {
            *on_create = steps;
        }
        self
    }

    /// Register an instance that already exists provider-side.
    pub fn with_instance(self, name: &str, steps: Vec<MockStep>) -> Self {
        if let Ok(mut scripts) = self.scripts.lock() {
            scripts.insert(name.to_string(), steps.into());
        }
        self
    }

    /// Reject every subsequent create request with this error.
    pub fn failing_create(self, err: ProviderError) -> Self {
        if let Ok(mut create_error) = self.create_error.lock() {
            *create_error = Some(err);
        }
        self
    }

    pub fn created_specs(&self) -> Vec<InstanceSpec> {
        self.created.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CloudProvider for MockProvider {
    fn code(&self) -> &'static str {
        "mock"
    }

    async fn create_instance(&self, spec: &InstanceSpec) -> ProviderResult<InstanceHandle> {
        if let Some(err) = self
            .create_error
            .lock()
            .map_err(|_| ProviderError::Transport("mock state poisoned".to_string()))?
            .clone()
        {
            return Err(err);
        }

        let mut scripts = self
            .scripts
            .lock()
            .map_err(|_| ProviderError::Transport("mock state poisoned".to_string()))?;
        if scripts.contains_key(&spec.name) {
            return Err(ProviderError::Api {
                status: 409,
                message: format!("The resource '{}' already exists", spec.name),
            });
        }
        let steps = self
            .on_create
            .lock()
            .map_err(|_| ProviderError::Transport("mock state poisoned".to_string()))?
            .clone();
        scripts.insert(spec.name.clone(), steps.into());
        drop(scripts);

        if let Ok(mut created) = self.created.lock() {
            created.push(spec.clone());
        }
        tracing::debug!(instance = %spec.name, "[Mock] instance created");

        Ok(InstanceHandle {
            name: spec.name.clone(),
            zone: spec.zone.clone(),
            operation: Some(format!("operation-mock-{}", spec.name)),
        })
    }

    async fn get_instance(&self, _zone: &str, name: &str) -> ProviderResult<InstanceView> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        let mut scripts = self
            .scripts
            .lock()
            .map_err(|_| ProviderError::Transport("mock state poisoned".to_string()))?;
        let Some(steps) = scripts.get_mut(name) else {
            return Err(ProviderError::NotFound(name.to_string()));
        };
        let step = if steps.len() > 1 {
            steps.pop_front()
        } else {
            steps.front().cloned()
        };
        match step {
            Some(step) => step.render(name),
            None => Err(ProviderError::NotFound(name.to_string())),
        }
    }
}
