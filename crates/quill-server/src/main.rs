//! # Quill Server
//!
//! Loads configuration, wires the cache clients and keeps them alive until
//! a shutdown signal arrives.

use quill_config::{ConfigLoader, ObservabilityConfig};
use quill_core::QuillResult;
use quill_server::app::AppBuilder;
use quill_server::startup::print_startup_info;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        // Logging may not be initialized if config failed to load.
        eprintln!("Application error: {}", e);
        error!("Application error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> QuillResult<()> {
    let config_loader = match std::env::var("QUILL_CONFIG_DIR") {
        Ok(dir) => ConfigLoader::new(dir)?,
        Err(_) => ConfigLoader::from_default_location()?,
    };
    let config = config_loader.get().await;

    init_logging(&config.observability);

    info!("Starting Quill Server...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let app = AppBuilder::new().with_config(config).build()?;
    app.verify_cache().await?;

    print_startup_info(app.config());

    #[cfg(unix)]
    reload_on_hangup(config_loader)?;

    shutdown_signal().await;

    info!("Shutdown complete");
    Ok(())
}

fn init_logging(config: &ObservabilityConfig) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},quill=debug", config.log_level)));

    let registry = tracing_subscriber::registry().with(filter);

    if config.is_json() {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }
}

/// Re-read configuration on SIGHUP. The cache clients keep their pool, so a
/// changed Redis URL only takes effect after a restart.
#[cfg(unix)]
fn reload_on_hangup(loader: ConfigLoader) -> QuillResult<()> {
    let mut hangup = signal::unix::signal(signal::unix::SignalKind::hangup())
        .map_err(|e| quill_core::QuillError::configuration(format!("failed to install SIGHUP handler: {}", e)))?;

    tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            let previous_url: Option<String> = loader.get_value("redis.url").await;
            if let Err(e) = loader.reload().await {
                tracing::warn!(error = %e, "Configuration reload failed; keeping previous values");
                continue;
            }
            let current_url: Option<String> = loader.get_value("redis.url").await;
            if current_url != previous_url {
                tracing::warn!("redis.url changed; restart to reconnect the cache clients");
            }
        }
    });

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        }
    }
}
