//! Server-rendered page handlers for the consultation flows.
//!
//! Every handler requires an authenticated browser session and the page role
//! guard (authentication first, then the role check), and resolves the acting
//! medico from the authenticated user's id before rendering anything.
//! Success/info notices travel as a `notice` query key on the redirect back
//! to the list page.

use crate::form::{ConsultaForm, ReceitaForm};
use crate::render;
use api_shared::{AppState, AuthUser, PageUser};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use prontuario_core::{ConsultaError, ConsultaService, Medico, ReceitaService};
use serde::Deserialize;

const LIST_URL: &str = "/consultas/";

/// Role guard plus medico resolution.
///
/// A user outside the page roles is silently redirected to the fallback
/// location; an authenticated, authorized user without a medico row is a hard
/// internal error.
fn page_guard(state: &AppState, user: &AuthUser) -> Result<Medico, Response> {
    if !state.policy.page_allows(user) {
        return Err(Redirect::to("/").into_response());
    }

    match state.catalogs.medico(user.id) {
        Some(medico) => Ok(medico.clone()),
        None => {
            tracing::error!("no medico record for authenticated user {}", user.id);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Erro interno.").into_response())
        }
    }
}

fn page_not_found(message: &'static str) -> Response {
    (StatusCode::NOT_FOUND, message).into_response()
}

fn internal_error(context: &str, e: &ConsultaError) -> Response {
    tracing::error!("{context}: {e}");
    (StatusCode::INTERNAL_SERVER_ERROR, "Erro interno.").into_response()
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    notice: Option<String>,
}

fn notice_message(key: &str) -> Option<&'static str> {
    match key {
        "added" => Some("Consulta adicionada com sucesso!"),
        "updated" => Some("Consulta atualizada com sucesso!"),
        "removed" => Some("Consulta deletada com sucesso"),
        _ => None,
    }
}

/// GET `/consultas/` — all consultations plus a blank creation form.
pub async fn list(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    Query(query): Query<ListQuery>,
) -> Response {
    let medico = match page_guard(&state, &user) {
        Ok(medico) => medico,
        Err(denied) => return denied,
    };

    let consultas = match ConsultaService::new(state.cfg.clone()).list() {
        Ok(consultas) => consultas,
        Err(e) => return internal_error("list consultas", &e),
    };

    let mut body = String::new();
    if let Some(message) = query.notice.as_deref().and_then(notice_message) {
        body.push_str(&render::notice_banner(message));
    }
    body.push_str(&render::consultas_table(&consultas, &state.catalogs));
    body.push_str("<h2>Nova consulta</h2>\n");
    body.push_str(&render::consulta_form(
        "/consultas/add/",
        &ConsultaForm::default(),
        &Default::default(),
        &state.catalogs,
    ));

    Html(render::layout("Consultas", &medico, &body)).into_response()
}

/// GET `/consultas/add/` — blank creation form.
pub async fn add_form(State(state): State<AppState>, PageUser(user): PageUser) -> Response {
    let medico = match page_guard(&state, &user) {
        Ok(medico) => medico,
        Err(denied) => return denied,
    };

    let body = render::consulta_form(
        "/consultas/add/",
        &ConsultaForm::default(),
        &Default::default(),
        &state.catalogs,
    );
    Html(render::layout("Adicionar consulta", &medico, &body)).into_response()
}

/// POST `/consultas/add/` — validate and persist, or re-render with errors.
pub async fn add_submit(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    Form(form): Form<ConsultaForm>,
) -> Response {
    let medico = match page_guard(&state, &user) {
        Ok(medico) => medico,
        Err(denied) => return denied,
    };

    match form.validate(&state.catalogs) {
        Ok(valid) => match ConsultaService::new(state.cfg.clone()).create(valid) {
            Ok(consulta) => {
                tracing::info!("consulta {} created by {}", consulta.id, user.username);
                Redirect::to(&format!("{LIST_URL}?notice=added")).into_response()
            }
            Err(e) => internal_error("create consulta", &e),
        },
        Err(errors) => {
            let mut body = render::notice_banner(
                "Ocorreu um erro ao adicionar a consulta. Verifique os dados informados.",
            );
            body.push_str(&render::consulta_form(
                "/consultas/add/",
                &form,
                &errors,
                &state.catalogs,
            ));
            Html(render::layout("Adicionar consulta", &medico, &body)).into_response()
        }
    }
}

/// POST `/consultas/:id/remove/` — delete unconditionally, then redirect.
pub async fn remove(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    Path(consulta_id): Path<u64>,
) -> Response {
    if let Err(denied) = page_guard(&state, &user) {
        return denied;
    }

    match ConsultaService::new(state.cfg.clone()).delete(consulta_id) {
        Ok(()) => {
            tracing::info!("consulta {consulta_id} deleted by {}", user.username);
            Redirect::to(&format!("{LIST_URL}?notice=removed")).into_response()
        }
        Err(ConsultaError::NotFound) => page_not_found("Consulta não encontrada."),
        Err(e) => internal_error("delete consulta", &e),
    }
}

/// GET `/consultas/:id/edit/` — form pre-populated from the record.
pub async fn edit_form(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    Path(consulta_id): Path<u64>,
) -> Response {
    let medico = match page_guard(&state, &user) {
        Ok(medico) => medico,
        Err(denied) => return denied,
    };

    let consulta = match ConsultaService::new(state.cfg.clone()).get(consulta_id) {
        Ok(consulta) => consulta,
        Err(ConsultaError::NotFound) => return page_not_found("Consulta não encontrada."),
        Err(e) => return internal_error("get consulta", &e),
    };

    let body = render::consulta_form(
        &format!("/consultas/{consulta_id}/edit/"),
        &ConsultaForm::from_consulta(&consulta),
        &Default::default(),
        &state.catalogs,
    );
    Html(render::layout("Editar consulta", &medico, &body)).into_response()
}

/// POST `/consultas/:id/edit/` — validate against the existing record and
/// persist; on failure re-render with field messages (no flash banner here).
pub async fn edit_submit(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    Path(consulta_id): Path<u64>,
    Form(form): Form<ConsultaForm>,
) -> Response {
    let medico = match page_guard(&state, &user) {
        Ok(medico) => medico,
        Err(denied) => return denied,
    };

    let service = ConsultaService::new(state.cfg.clone());
    if let Err(e) = service.get(consulta_id) {
        return match e {
            ConsultaError::NotFound => page_not_found("Consulta não encontrada."),
            e => internal_error("get consulta", &e),
        };
    }

    match form.validate(&state.catalogs) {
        Ok(valid) => match service.update(consulta_id, valid) {
            Ok(_) => Redirect::to(&format!("{LIST_URL}?notice=updated")).into_response(),
            Err(ConsultaError::NotFound) => page_not_found("Consulta não encontrada."),
            Err(e) => internal_error("update consulta", &e),
        },
        Err(errors) => {
            let body = render::consulta_form(
                &format!("/consultas/{consulta_id}/edit/"),
                &form,
                &errors,
                &state.catalogs,
            );
            Html(render::layout("Editar consulta", &medico, &body)).into_response()
        }
    }
}

/// GET `/consultas/:id/detail/` — read-only view with diagnoses, medications
/// and this consultation's prescription lines.
pub async fn detail(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    Path(consulta_id): Path<u64>,
) -> Response {
    let medico = match page_guard(&state, &user) {
        Ok(medico) => medico,
        Err(denied) => return denied,
    };

    let consulta = match ConsultaService::new(state.cfg.clone()).get(consulta_id) {
        Ok(consulta) => consulta,
        Err(ConsultaError::NotFound) => return page_not_found("Consulta não encontrada."),
        Err(e) => return internal_error("get consulta", &e),
    };
    let receitas = match ReceitaService::new(state.cfg.clone()).list_for_consulta(consulta_id) {
        Ok(receitas) => receitas,
        Err(e) => return internal_error("list receitas", &e),
    };

    let body = render::consulta_detail(&consulta, &receitas, &state.catalogs);
    Html(render::layout(
        &format!("Consulta {consulta_id}"),
        &medico,
        &body,
    ))
    .into_response()
}

/// GET `/consultas/receita/:id/edit/` — prescription-line form
/// pre-populated from the record.
pub async fn edit_receita_form(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    Path(receita_id): Path<u64>,
) -> Response {
    let medico = match page_guard(&state, &user) {
        Ok(medico) => medico,
        Err(denied) => return denied,
    };

    let receita = match ReceitaService::new(state.cfg.clone()).get(receita_id) {
        Ok(receita) => receita,
        Err(ConsultaError::ReceitaNotFound) => return page_not_found("Receita não encontrada."),
        Err(e) => return internal_error("get receita", &e),
    };

    let body = render::receita_form(
        &format!("/consultas/receita/{receita_id}/edit/"),
        &ReceitaForm::from_receita(&receita),
        &Default::default(),
        &state.catalogs,
    );
    Html(render::layout("Editar receita", &medico, &body)).into_response()
}

/// POST `/consultas/receita/:id/edit/` — validate and save, redirecting to
/// the list on success.
pub async fn edit_receita_submit(
    State(state): State<AppState>,
    PageUser(user): PageUser,
    Path(receita_id): Path<u64>,
    Form(form): Form<ReceitaForm>,
) -> Response {
    let medico = match page_guard(&state, &user) {
        Ok(medico) => medico,
        Err(denied) => return denied,
    };

    let service = ReceitaService::new(state.cfg.clone());
    if let Err(e) = service.get(receita_id) {
        return match e {
            ConsultaError::ReceitaNotFound => page_not_found("Receita não encontrada."),
            e => internal_error("get receita", &e),
        };
    }

    match form.validate(&state.catalogs) {
        Ok(valid) => match service.update(receita_id, valid) {
            Ok(_) => Redirect::to(LIST_URL).into_response(),
            Err(ConsultaError::ReceitaNotFound) => page_not_found("Receita não encontrada."),
            Err(e) => internal_error("update receita", &e),
        },
        Err(errors) => {
            let body = render::receita_form(
                &format!("/consultas/receita/{receita_id}/edit/"),
                &form,
                &errors,
                &state.catalogs,
            );
            Html(render::layout("Editar receita", &medico, &body)).into_response()
        }
    }
}
