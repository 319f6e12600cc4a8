//! Standalone REST API server binary.
//!
//! Runs the JSON API on its own, without the server-rendered pages. Useful
//! for development and for deployments that front the pages elsewhere; the
//! workspace's main `prontuario-run` binary serves both surfaces together.

use api_shared::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("PRONTUARIO_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("-- Starting prontuario REST API on {}", addr);

    let state = AppState::from_env()?;
    let app = api_rest::router().with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
