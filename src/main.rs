//! gpt-relay HTTP server
//!
//! Starts an Axum web server that relays chat completion requests upstream.

use clap::Parser;
use gpt_relay::{
    cli::{Cli, Command, generate_config_template},
    config::Config,
    handlers::AppState,
    telemetry,
};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(Command::Config { output }) = cli.command {
        let template = generate_config_template();
        match output {
            Some(path) => {
                std::fs::write(&path, template)?;
                eprintln!("Configuration template written to {}", path.display());
            }
            None => print!("{}", template),
        }
        return Ok(());
    }

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    telemetry::init(&config.observability.log_level);

    let ip = config.server.host.parse::<std::net::IpAddr>().map_err(|e| {
        gpt_relay::error::AppError::Config(format!(
            "server.host '{}' is not an IP address: {}",
            config.server.host, e
        ))
    })?;
    let addr = SocketAddr::from((ip, config.server.port));

    tracing::info!(
        upstream = %config.upstream.chat_completions_url(),
        default_model = %config.upstream.default_model(),
        timeout_seconds = ?config.upstream.timeout_seconds(),
        "Starting gpt-relay"
    );

    let state = AppState::new(Arc::new(config))?;
    let app = gpt_relay::app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);
    tracing::info!("Relay available at http://{}/", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
