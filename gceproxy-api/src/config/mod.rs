// Process configuration: command line + provider config file
pub mod cli;
pub mod provider;

pub use cli::Cli;
pub use provider::{check_account_key, export_credentials, load_provider_config, validate, ConfigError};
