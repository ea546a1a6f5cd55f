use std::env;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use docchat_backend::logging;
use docchat_backend::server;
use docchat_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let state = AppState::initialize();
    logging::init(&state.paths);

    match state.provider.health_check().await {
        Ok(true) => tracing::info!("Ollama reachable at {}", state.config.ollama_url),
        _ => tracing::warn!(
            "Ollama not reachable at {}; answers will degrade until it is up",
            state.config.ollama_url
        ),
    }

    let port = env::var("PORT")
        .ok()
        .and_then(|val| val.parse::<u16>().ok())
        .unwrap_or(5006);
    let bind_addr = format!("127.0.0.1:{}", port);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;

    println!("DOCCHAT_PORT={}", addr.port());
    tracing::info!("Listening on {}", addr);

    let app: Router = server::router::router(state.clone());

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
