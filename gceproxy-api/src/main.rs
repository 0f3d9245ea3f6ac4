use anyhow::Context;
use axum::middleware;
use clap::Parser;
use gceproxy_api::app::{create_cors, AppState};
use gceproxy_api::config::{self, Cli};
use gceproxy_api::provider_manager::ProviderManager;
use gceproxy_api::routes::create_router;
use gceproxy_api::simple_logger::log_request;
use gceproxy_common::ProviderConfig;
use std::net::SocketAddr;
use tokio::runtime::Builder;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Any configuration problem stops the process before it serves traffic.
    let provider_config = config::load_provider_config(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if ProviderManager::requires_credentials(&cli.provider) {
        config::check_account_key(&provider_config)?;
        // Still single-threaded here; the runtime is built below.
        config::export_credentials(&provider_config);
    }

    Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?
        .block_on(serve(cli, provider_config))
}

async fn serve(cli: Cli, provider_config: ProviderConfig) -> anyhow::Result<()> {
    let provider = ProviderManager::get_provider(&cli.provider, &provider_config)
        .with_context(|| format!("initialising provider '{}'", cli.provider))?;

    tracing::info!(
        provider = provider.code(),
        project = %provider_config.project_id,
        zone = %provider_config.zone,
        machine_type = %provider_config.machine_type,
        "configuration loaded"
    );

    let state = AppState::new(provider_config, provider);
    let app = create_router()
        .layer(middleware::from_fn(log_request))
        .layer(create_cors())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    tracing::info!("GCE proxy listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
