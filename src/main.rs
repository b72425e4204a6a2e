use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use newsdesk::core::config::AppConfig;
use newsdesk::core::logging;
use newsdesk::server::router;
use newsdesk::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    logging::init(config.server.log_dir.as_deref());

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::initialize(config)?;

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;

    tracing::info!("Listening on {}", addr);
    tracing::info!("Chat completions at http://{}/v1/chat/completions", addr);

    let app: Router = router::router(state);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
