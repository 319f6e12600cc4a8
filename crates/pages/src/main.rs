//! Standalone pages server binary.
//!
//! Serves only the server-rendered consultation pages. The workspace's main
//! `prontuario-run` binary serves the pages and the REST API together.

use api_shared::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pages=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("PRONTUARIO_PAGES_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".into());

    tracing::info!("-- Starting prontuario pages on {}", addr);

    let state = AppState::from_env()?;
    let app = pages::router().with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
