//! REST handlers for the consultation collection and item resources.
//!
//! Every endpoint requires an authenticated caller; the role policy is only
//! enforced when an API role restriction is configured (see
//! `api_shared::policy`). Validation failures return 400 with the
//! operation-level message plus field-keyed detail, on create and update
//! alike.

use crate::dto::{ConsultaPayload, ConsultaRes};
use crate::pagination::{paginate, PageQuery, PageRequest};
use api_shared::{AppState, AuthUser, HealthRes, HealthService, MessageRes, ValidationErrorRes};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use prontuario_core::{ConsultaError, ConsultaService};

const NOT_FOUND_MSG: &str = "Consulta não encontrada.";

/// 403 body when a configured API role restriction denies the caller.
fn api_guard(state: &AppState, user: &AuthUser) -> Result<(), Response> {
    if state.policy.api_allows(user) {
        Ok(())
    } else {
        Err((
            StatusCode::FORBIDDEN,
            Json(MessageRes::new("Acesso negado.")),
        )
            .into_response())
    }
}

fn internal_error(context: &str, e: &ConsultaError) -> Response {
    tracing::error!("{context}: {e}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(MessageRes::new("Erro interno.")),
    )
        .into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(MessageRes::new(NOT_FOUND_MSG))).into_response()
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint used for monitoring and load balancer probes.
pub async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/consultas/api/",
    params(PageQuery),
    responses(
        (status = 200, description = "Consultations, paginated when `page` is present"),
        (status = 401, description = "Unauthenticated", body = MessageRes),
        (status = 404, description = "Page out of range", body = MessageRes)
    )
)]
/// Lists consultations.
///
/// With a `page` query parameter, returns a `{count, next, previous,
/// results}` envelope; without it, the full serialized list.
pub async fn list_consultas(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PageQuery>,
) -> Response {
    if let Err(denied) = api_guard(&state, &user) {
        return denied;
    }

    let service = ConsultaService::new(state.cfg.clone());
    let consultas = match service.list() {
        Ok(consultas) => consultas,
        Err(e) => return internal_error("list consultas", &e),
    };
    let results: Vec<ConsultaRes> = consultas.into_iter().map(ConsultaRes::from).collect();

    match query.request() {
        PageRequest::Full => (StatusCode::OK, Json(results)).into_response(),
        PageRequest::Invalid => invalid_page(),
        PageRequest::Page { page, page_size } => {
            let size = page_size.unwrap_or(state.cfg.api_page_size()).max(1);
            match paginate(results, page, size, page_size) {
                Some(envelope) => (StatusCode::OK, Json(envelope)).into_response(),
                None => invalid_page(),
            }
        }
    }
}

fn invalid_page() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(MessageRes::new("Página inválida.")),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/consultas/api/",
    request_body = ConsultaPayload,
    responses(
        (status = 201, description = "Consultation created", body = ConsultaRes),
        (status = 400, description = "Validation failed", body = ValidationErrorRes),
        (status = 401, description = "Unauthenticated", body = MessageRes)
    )
)]
/// Creates a consultation from a validated payload.
pub async fn create_consulta(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ConsultaPayload>,
) -> Response {
    if let Err(denied) = api_guard(&state, &user) {
        return denied;
    }

    let valid = match payload.into_draft().validate(&state.catalogs) {
        Ok(valid) => valid,
        Err(ConsultaError::Validation(errors)) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ValidationErrorRes::new("Erro ao criar Consulta.", errors)),
            )
                .into_response();
        }
        Err(e) => return internal_error("validate consulta payload", &e),
    };

    match ConsultaService::new(state.cfg.clone()).create(valid) {
        Ok(consulta) => {
            tracing::info!("consulta {} created by {}", consulta.id, user.username);
            (StatusCode::CREATED, Json(ConsultaRes::from(consulta))).into_response()
        }
        Err(e) => internal_error("create consulta", &e),
    }
}

#[utoipa::path(
    get,
    path = "/consultas/api/{id}/",
    responses(
        (status = 200, description = "Consultation", body = ConsultaRes),
        (status = 401, description = "Unauthenticated", body = MessageRes),
        (status = 404, description = "Unknown id", body = MessageRes)
    )
)]
/// Fetches one consultation by id.
pub async fn get_consulta(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<u64>,
) -> Response {
    if let Err(denied) = api_guard(&state, &user) {
        return denied;
    }

    match ConsultaService::new(state.cfg.clone()).get(id) {
        Ok(consulta) => (StatusCode::OK, Json(ConsultaRes::from(consulta))).into_response(),
        Err(ConsultaError::NotFound) => not_found(),
        Err(e) => internal_error("get consulta", &e),
    }
}

#[utoipa::path(
    put,
    path = "/consultas/api/{id}/",
    request_body = ConsultaPayload,
    responses(
        (status = 200, description = "Consultation replaced", body = ConsultaRes),
        (status = 400, description = "Validation failed", body = ValidationErrorRes),
        (status = 401, description = "Unauthenticated", body = MessageRes),
        (status = 404, description = "Unknown id", body = MessageRes)
    )
)]
/// Replaces an existing consultation (full replace, not a partial patch).
pub async fn update_consulta(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<u64>,
    Json(payload): Json<ConsultaPayload>,
) -> Response {
    if let Err(denied) = api_guard(&state, &user) {
        return denied;
    }

    let service = ConsultaService::new(state.cfg.clone());
    if let Err(e) = service.get(id) {
        return match e {
            ConsultaError::NotFound => not_found(),
            e => internal_error("get consulta for update", &e),
        };
    }

    let valid = match payload.into_draft().validate(&state.catalogs) {
        Ok(valid) => valid,
        Err(ConsultaError::Validation(errors)) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ValidationErrorRes::new("Erro ao atualizar Consulta.", errors)),
            )
                .into_response();
        }
        Err(e) => return internal_error("validate consulta payload", &e),
    };

    match service.update(id, valid) {
        Ok(consulta) => (StatusCode::OK, Json(ConsultaRes::from(consulta))).into_response(),
        Err(ConsultaError::NotFound) => not_found(),
        Err(e) => internal_error("update consulta", &e),
    }
}

#[utoipa::path(
    delete,
    path = "/consultas/api/{id}/",
    responses(
        (status = 200, description = "Consultation deleted", body = MessageRes),
        (status = 401, description = "Unauthenticated", body = MessageRes),
        (status = 404, description = "Unknown id", body = MessageRes)
    )
)]
/// Deletes a consultation and, by cascade, its prescription lines. The
/// deleted resource body is not returned.
pub async fn delete_consulta(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<u64>,
) -> Response {
    if let Err(denied) = api_guard(&state, &user) {
        return denied;
    }

    match ConsultaService::new(state.cfg.clone()).delete(id) {
        Ok(()) => {
            tracing::info!("consulta {id} deleted by {}", user.username);
            (
                StatusCode::OK,
                Json(MessageRes::new("Consulta deletada com sucesso.")),
            )
                .into_response()
        }
        Err(ConsultaError::NotFound) => not_found(),
        Err(e) => internal_error("delete consulta", &e),
    }
}
