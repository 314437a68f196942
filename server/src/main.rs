use catan_server::config::load_config;
use catan_server::start_server;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    let config = match load_config().await {
        Ok(config) => config,
        Err(message) => {
            tracing::error!(message, "failed to load ServerConfig.json");
            std::process::exit(1);
        }
    };

    let port = config.port;
    let handle = match start_server(config).await {
        Ok(handle) => handle,
        Err(err) => {
            tracing::error!(%err, "failed to start server");
            std::process::exit(1);
        }
    };
    tracing::info!(port, "server listening");

    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutdown signal received");
    }
    handle.shutdown().await;
}
