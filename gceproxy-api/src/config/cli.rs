use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "gceproxy",
    version,
    about = "HTTP proxy that provisions Compute Engine instances"
)]
pub struct Cli {
    /// Location of the provider config file.
    #[arg(long, default_value = "config.json")]
    pub config: PathBuf,

    /// Listen port.
    #[arg(long, default_value_t = 8080)]
    pub port: u16,

    /// Compute backend: "gce" or "mock".
    #[arg(long, env = "PROVIDER", default_value = "gce")]
    pub provider: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cli = Cli::try_parse_from(["gceproxy"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("config.json"));
        assert_eq!(cli.port, 8080);
    }

    #[test]
    fn accepts_config_and_port() {
        let cli =
            Cli::try_parse_from(["gceproxy", "--config", "/etc/gceproxy.json", "--port", "9090"])
                .unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/gceproxy.json"));
        assert_eq!(cli.port, 9090);
        assert!(Cli::try_parse_from(["gceproxy", "--port", "not-a-port"]).is_err());
    }
}
