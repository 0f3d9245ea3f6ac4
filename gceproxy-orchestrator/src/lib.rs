//! Instance provisioning workflow: name, bootstrap script, instance spec,
//! submit, then wait for the instance to come up with a public address.

pub mod instance_spec;
pub mod names;
pub mod provisioning;
pub mod startup_script;

pub use provisioning::{PollPolicy, ProvisionError, ProvisionResult, ProvisioningClient};
