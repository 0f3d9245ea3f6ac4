use gceproxy_common::ProviderConfig;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Well-known variable the compute client reads its key file from.
pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("config field '{0}' must not be empty")]
    EmptyField(&'static str),

    #[error("disksize must be positive, got {0}")]
    DiskSize(i64),

    #[error("pollinterval ({interval}s) must not exceed polltimeout ({timeout}s)")]
    PollPolicy { interval: u64, timeout: u64 },

    #[error("account key {path} is not readable: {source}")]
    AccountKey {
        path: String,
        source: std::io::Error,
    },
}

/// Read, parse and validate the JSON provider config.
pub fn load_provider_config(path: &Path) -> Result<ProviderConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: ProviderConfig = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &ProviderConfig) -> Result<(), ConfigError> {
    let required = [
        ("projectid", &config.project_id),
        ("region", &config.region),
        ("zone", &config.zone),
        ("machinetype", &config.machine_type),
        ("imageid", &config.image_id),
        ("disktype", &config.disk_type),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ConfigError::EmptyField(field));
        }
    }
    if config.disk_size_gb <= 0 {
        return Err(ConfigError::DiskSize(config.disk_size_gb));
    }
    if config.poll_interval_secs > config.poll_timeout_secs {
        return Err(ConfigError::PollPolicy {
            interval: config.poll_interval_secs,
            timeout: config.poll_timeout_secs,
        });
    }
    Ok(())
}

/// The real backend cannot start without a readable key file.
pub fn check_account_key(config: &ProviderConfig) -> Result<(), ConfigError> {
    if config.account_key.trim().is_empty() {
        return Err(ConfigError::EmptyField("accountkey"));
    }
    fs::metadata(&config.account_key)
        .and_then(|m| {
            if m.is_file() {
                Ok(())
            } else {
                Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "not a regular file",
                ))
            }
        })
        .map_err(|source| ConfigError::AccountKey {
            path: config.account_key.clone(),
            source,
        })
}

/// Publish the key path for Google client tooling on the host.
///
/// Mutates the process environment, so it must run before the async runtime
/// starts any worker threads.
pub fn export_credentials(config: &ProviderConfig) {
    std::env::set_var(CREDENTIALS_ENV, &config.account_key);
}
