//! # Pages
//!
//! Server-rendered HTML surface for the consultation flows: list, add,
//! remove, edit, detail and prescription-line editing. All routes sit behind
//! the login gate and the page role guard ({Medico, Estudante} by default).
//!
//! The router here is merged with the REST API by the combined
//! `prontuario-run` binary, and served alone by this crate's own binary.

pub mod form;
pub mod handlers;
pub mod render;

use api_shared::AppState;
use axum::routing::{get, post};
use axum::Router;

pub use form::{ConsultaForm, ReceitaForm};

/// Builds the page router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/consultas/", get(handlers::list))
        .route(
            "/consultas/add/",
            get(handlers::add_form).post(handlers::add_submit),
        )
        .route("/consultas/:id/remove/", post(handlers::remove))
        .route(
            "/consultas/:id/edit/",
            get(handlers::edit_form).post(handlers::edit_submit),
        )
        .route("/consultas/:id/detail/", get(handlers::detail))
        .route(
            "/consultas/receita/:id/edit/",
            get(handlers::edit_receita_form).post(handlers::edit_receita_submit),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_shared::{Role, UserDirectory, UserRecord};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use prontuario_core::{
        Catalogs, Cid, ConsultaService, CoreConfig, Medicamento, Medico, Paciente, ReceitaService,
        ValidatedConsulta, ValidatedReceita,
    };
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::util::ServiceExt;

    const MEDICO_TOKEN: &str = "tok-medico";
    const RECEPCAO_TOKEN: &str = "tok-recepcao";

    fn test_state(temp_dir: &TempDir) -> AppState {
        let cfg = CoreConfig::new(temp_dir.path().to_path_buf(), 10)
            .expect("CoreConfig::new should succeed");
        let catalogs = Catalogs::from_records(
            vec![Cid {
                id: 1,
                codigo: "A00".into(),
                descricao: "Cólera".into(),
            }],
            vec![Medicamento {
                id: 1,
                nome: "Dipirona".into(),
                apresentacao: "500 mg".into(),
            }],
            vec![Paciente {
                id: 1,
                nome: "João Silva".into(),
            }],
            vec![Medico {
                id: 7,
                nome: "Dra. Ana Lima".into(),
                crm: "CRM-SP 12345".into(),
            }],
        );
        let users = UserDirectory::from_records(vec![
            UserRecord {
                id: 7,
                username: "ana".into(),
                token: MEDICO_TOKEN.into(),
                groups: vec![Role::Medico],
            },
            UserRecord {
                id: 8,
                username: "carla".into(),
                token: RECEPCAO_TOKEN.into(),
                groups: vec![Role::Recepcao],
            },
        ]);

        AppState {
            cfg: Arc::new(cfg),
            catalogs: Arc::new(catalogs),
            users: Arc::new(users),
            policy: Arc::new(api_shared::AccessPolicy::default()),
        }
    }

    fn app(state: AppState) -> Router {
        router().with_state(state)
    }

    fn get_request(uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::COOKIE, format!("session={token}"))
            .body(Body::empty())
            .unwrap()
    }

    fn form_request(uri: &str, token: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::COOKIE, format!("session={token}"))
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &axum::response::Response) -> String {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    fn seed_consulta(state: &AppState) -> u64 {
        ConsultaService::new(state.cfg.clone())
            .create(ValidatedConsulta {
                paciente_id: 1,
                observacoes: "primeira".into(),
                cids: vec![1],
                medicamentos: vec![1],
            })
            .expect("seed consulta should succeed")
            .id
    }

    #[tokio::test]
    async fn test_unauthenticated_browser_is_redirected_to_login() {
        let temp_dir = TempDir::new().unwrap();
        let app = app(test_state(&temp_dir));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/consultas/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
    }

    #[tokio::test]
    async fn test_wrong_role_redirects_without_mutating_storage() {
        let temp_dir = TempDir::new().unwrap();
        let state = test_state(&temp_dir);
        let app = app(state.clone());

        let response = app
            .clone()
            .oneshot(form_request(
                "/consultas/add/",
                RECEPCAO_TOKEN,
                "paciente=1&cids=1&medicamentos=1",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");

        assert!(ConsultaService::new(state.cfg.clone())
            .list()
            .unwrap()
            .is_empty());

        let response = app
            .oneshot(get_request("/consultas/", RECEPCAO_TOKEN))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn test_list_renders_consultas_and_notice() {
        let temp_dir = TempDir::new().unwrap();
        let state = test_state(&temp_dir);
        seed_consulta(&state);
        let app = app(state);

        let response = app
            .oneshot(get_request("/consultas/?notice=added", MEDICO_TOKEN))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Dra. Ana Lima"));
        assert!(html.contains("João Silva"));
        assert!(html.contains("Consulta adicionada com sucesso!"));
    }

    #[tokio::test]
    async fn test_add_persists_and_redirects_with_notice() {
        let temp_dir = TempDir::new().unwrap();
        let state = test_state(&temp_dir);
        let app = app(state.clone());

        let response = app
            .oneshot(form_request(
                "/consultas/add/",
                MEDICO_TOKEN,
                "paciente=1&cids=1&medicamentos=1&observacoes=ok",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/consultas/?notice=added");

        let consultas = ConsultaService::new(state.cfg.clone()).list().unwrap();
        assert_eq!(consultas.len(), 1);
        assert_eq!(consultas[0].cids, vec![1]);
    }

    #[tokio::test]
    async fn test_add_failure_rerenders_with_errors_and_banner() {
        let temp_dir = TempDir::new().unwrap();
        let state = test_state(&temp_dir);
        let app = app(state.clone());

        let response = app
            .oneshot(form_request(
                "/consultas/add/",
                MEDICO_TOKEN,
                "paciente=&cids=7&observacoes=oi",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Ocorreu um erro ao adicionar a consulta."));
        assert!(html.contains("Informe o paciente."));
        assert!(html.contains("CID desconhecido: 7."));
        // entered values survive the re-render
        assert!(html.contains("value=\"7\""));

        assert!(ConsultaService::new(state.cfg.clone())
            .list()
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_detail_shows_links_and_no_receitas() {
        let temp_dir = TempDir::new().unwrap();
        let state = test_state(&temp_dir);
        let id = seed_consulta(&state);
        let app = app(state);

        let response = app
            .oneshot(get_request(&format!("/consultas/{id}/detail/"), MEDICO_TOKEN))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert_eq!(html.matches("A00 - Cólera").count(), 1);
        assert_eq!(html.matches("Dipirona 500 mg").count(), 1);
        assert!(!html.contains("/consultas/receita/"));
    }

    #[tokio::test]
    async fn test_edit_updates_and_redirects() {
        let temp_dir = TempDir::new().unwrap();
        let state = test_state(&temp_dir);
        let id = seed_consulta(&state);
        let app = app(state.clone());

        let prefill = app
            .clone()
            .oneshot(get_request(&format!("/consultas/{id}/edit/"), MEDICO_TOKEN))
            .await
            .unwrap();
        let html = body_text(prefill).await;
        assert!(html.contains("value=\"1\" selected"));

        let response = app
            .oneshot(form_request(
                &format!("/consultas/{id}/edit/"),
                MEDICO_TOKEN,
                "paciente=1&cids=&medicamentos=&observacoes=retorno",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/consultas/?notice=updated");

        let consulta = ConsultaService::new(state.cfg.clone()).get(id).unwrap();
        assert_eq!(consulta.observacoes, "retorno");
        assert!(consulta.cids.is_empty());
    }

    #[tokio::test]
    async fn test_remove_deletes_and_redirects() {
        let temp_dir = TempDir::new().unwrap();
        let state = test_state(&temp_dir);
        let id = seed_consulta(&state);
        let app = app(state.clone());

        let response = app
            .clone()
            .oneshot(form_request(
                &format!("/consultas/{id}/remove/"),
                MEDICO_TOKEN,
                "",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/consultas/?notice=removed");

        let missing = app
            .oneshot(form_request(
                &format!("/consultas/{id}/remove/"),
                MEDICO_TOKEN,
                "",
            ))
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_edit_receita_flow() {
        let temp_dir = TempDir::new().unwrap();
        let state = test_state(&temp_dir);
        let consulta_id = seed_consulta(&state);
        let receita = ReceitaService::new(state.cfg.clone())
            .create(
                consulta_id,
                ValidatedReceita {
                    medicamento_id: 1,
                    dosagem: "500 mg a cada 8h".into(),
                    instrucoes: String::new(),
                },
            )
            .unwrap();
        let app = app(state.clone());

        let prefill = app
            .clone()
            .oneshot(get_request(
                &format!("/consultas/receita/{}/edit/", receita.id),
                MEDICO_TOKEN,
            ))
            .await
            .unwrap();
        assert_eq!(prefill.status(), StatusCode::OK);
        let html = body_text(prefill).await;
        assert!(html.contains("500 mg a cada 8h"));

        let response = app
            .clone()
            .oneshot(form_request(
                &format!("/consultas/receita/{}/edit/", receita.id),
                MEDICO_TOKEN,
                "medicamento=1&dosagem=250+mg&instrucoes=com+agua",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/consultas/");

        let updated = ReceitaService::new(state.cfg.clone())
            .get(receita.id)
            .unwrap();
        assert_eq!(updated.dosagem, "250 mg");

        let missing = app
            .oneshot(get_request("/consultas/receita/99/edit/", MEDICO_TOKEN))
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_user_without_medico_row_is_internal_error() {
        let temp_dir = TempDir::new().unwrap();
        let mut state = test_state(&temp_dir);
        state.users = Arc::new(UserDirectory::from_records(vec![UserRecord {
            id: 99,
            username: "ghost".into(),
            token: "tok-ghost".into(),
            groups: vec![Role::Medico],
        }]));
        let app = app(state);

        let response = app
            .oneshot(get_request("/consultas/", "tok-ghost"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
