use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use authgate_server::{
    create_app, reaper::spawn_session_reaper, routes::paths, AuthgateServer, ServerConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = ServerConfig::parse();

    logger_redacted::init(&config.logger_config()).context("initialize logging")?;

    info!("Starting Authgate server");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    config.validate()?;
    if config.has_weak_secret() {
        warn!(
            min_len = authgate_server::config::MIN_RECOMMENDED_SECRET_LEN,
            "JWT_SECRET is shorter than recommended"
        );
    }
    let addr = config.socket_addr()?;
    let reaper_interval = config.session_reaper_interval();

    let server = AuthgateServer::new(config).await?;
    server
        .auth_service
        .warm_up()
        .await
        .context("prepare password hasher")?;
    let reaper = spawn_session_reaper(server.auth_service.clone(), reaper_interval);
    let app = create_app(server);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind to {addr}"))?;

    info!("Authgate server running on http://{}", addr);
    info!("Health check available at: http://{}{}", addr, paths::health::HEALTH);
    info!(
        "Authentication endpoints: http://{}{}",
        addr,
        paths::v1("/auth")
    );

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error");

    if let Some(handle) = reaper {
        handle.abort();
    }
    info!("Authgate server stopped");
    result
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
