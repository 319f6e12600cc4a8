//! Combined server binary.
//!
//! Serves both surfaces of the consultation record system on one listener:
//! the server-rendered pages under `/consultas/...` and the JSON API under
//! `/consultas/api/...` (plus Swagger UI at `/swagger-ui`). Both share one
//! `AppState`, so the catalogs, user directory and access policy are loaded
//! once.
//!
//! # Environment Variables
//! - `PRONTUARIO_ADDR`: listen address (default: "0.0.0.0:3000")
//! - `PRONTUARIO_DATA_DIR`: record storage directory (default: "prontuario_data")
//! - `PRONTUARIO_PAGE_SIZE`: API page size (default: 10)
//! - `PRONTUARIO_API_ROLES`: comma-separated role restriction for the API
//!   (default: any authenticated caller)

use api_shared::AppState;
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("prontuario_run=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("pages=info".parse()?)
                .add_directive("prontuario_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("PRONTUARIO_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("-- Starting prontuario server on {}", addr);

    let state = AppState::from_env()?;
    let app = Router::new()
        .merge(pages::router())
        .merge(api_rest::router())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
