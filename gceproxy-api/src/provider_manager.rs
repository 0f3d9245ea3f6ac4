use gceproxy_common::ProviderConfig;
use gceproxy_providers::CloudProvider;
use std::sync::Arc;

#[cfg(feature = "provider-gce")]
use gceproxy_providers::gce::GceProvider;
#[cfg(feature = "provider-mock")]
use gceproxy_providers::mock::MockProvider;

pub struct ProviderManager;

impl ProviderManager {
    /// Whether the named backend talks to the real provider and needs a credential.
    pub fn requires_credentials(provider_name: &str) -> bool {
        provider_name.eq_ignore_ascii_case("gce")
    }

    /// Build the selected backend. The gce backend loads the `accountkey` file.
    #[cfg_attr(not(feature = "provider-gce"), allow(unused_variables))]
    pub fn get_provider(
        provider_name: &str,
        config: &ProviderConfig,
    ) -> anyhow::Result<Arc<dyn CloudProvider>> {
        match provider_name.to_lowercase().as_str() {
            #[cfg(feature = "provider-gce")]
            "gce" => Ok(Arc::new(GceProvider::from_key_file(
                config.project_id.clone(),
                &config.account_key,
            )?)),
            #[cfg(feature = "provider-mock")]
            "mock" => Ok(Arc::new(MockProvider::new())),
            other => anyhow::bail!("unknown or disabled provider '{}'", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ProviderConfig {
        serde_json::from_str(
            r#"{"projectid":"p","region":"r","zone":"z","machinetype":"m","imageid":"i","disktype":"d","disksize":10}"#,
        )
        .unwrap()
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let err = ProviderManager::get_provider("ovh", &config()).err().unwrap();
        assert!(err.to_string().contains("ovh"));
    }

    #[cfg(feature = "provider-mock")]
    #[test]
    fn mock_provider_needs_no_credentials() {
        assert!(!ProviderManager::requires_credentials("mock"));
        let provider = ProviderManager::get_provider("MOCK", &config()).unwrap();
        assert_eq!(provider.code(), "mock");
    }
}
