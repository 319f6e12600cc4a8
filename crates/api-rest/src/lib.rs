//! # API REST
//!
//! JSON REST surface for consultation records: collection listing (optionally
//! paginated) and creation, item retrieval, full replacement and deletion.
//! Every endpoint requires an authenticated caller; a role restriction can be
//! configured but is off by default.
//!
//! The router here is merged with the server-rendered pages by the combined
//! `prontuario-run` binary, and served alone by this crate's own binary.

pub mod dto;
pub mod handlers;
pub mod pagination;

use api_shared::{AppState, HealthRes, MessageRes, ValidationErrorRes};
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use dto::{ConsultaPayload, ConsultaRes};
pub use pagination::{PageQuery, PageRequest, PaginatedConsultasRes};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::list_consultas,
        handlers::create_consulta,
        handlers::get_consulta,
        handlers::update_consulta,
        handlers::delete_consulta,
    ),
    components(schemas(
        HealthRes,
        MessageRes,
        ValidationErrorRes,
        ConsultaRes,
        ConsultaPayload,
        PaginatedConsultasRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router, including the Swagger UI and a permissive CORS
/// layer scoped to these routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/consultas/api/",
            get(handlers::list_consultas).post(handlers::create_consulta),
        )
        .route(
            "/consultas/api/:id/",
            get(handlers::get_consulta)
                .put(handlers::update_consulta)
                .delete(handlers::delete_consulta),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
}
