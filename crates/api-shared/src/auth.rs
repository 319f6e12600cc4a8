//! Credential verification.
//!
//! Session issuance and login flows are external to this system. What lives
//! here is the thin verification step both surfaces need: resolving a
//! presented credential (an `Authorization: Bearer` token for API callers, a
//! `session` cookie for browsers) to a known user via the user directory
//! loaded at startup.

use crate::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use prontuario_core::{ConsultaError, ConsultaResult};
use serde::{Deserialize, Serialize};

/// Role a user may hold. Mirrors the user groups of the upstream identity
/// system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Medico,
    Estudante,
    Recepcao,
}

/// One entry of the user directory (`users.yaml`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: u64,
    pub username: String,
    /// Opaque credential issued by the external login system.
    pub token: String,
    #[serde(default)]
    pub groups: Vec<Role>,
}

/// The users known to credential verification, loaded once at startup.
#[derive(Clone, Debug, Default)]
pub struct UserDirectory {
    users: Vec<UserRecord>,
}

impl UserDirectory {
    /// Load the directory from a YAML file. A missing file yields an empty
    /// directory (every request is then unauthenticated).
    pub fn load(path: &std::path::Path) -> ConsultaResult<Self> {
        if !path.is_file() {
            tracing::warn!("user directory missing, no caller can authenticate: {}", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(ConsultaError::FileRead)?;
        let users = serde_yaml::from_str(&contents).map_err(ConsultaError::YamlDeserialization)?;
        Ok(Self { users })
    }

    pub fn from_records(users: Vec<UserRecord>) -> Self {
        Self { users }
    }

    pub fn lookup_token(&self, token: &str) -> Option<&UserRecord> {
        if token.is_empty() {
            return None;
        }
        self.users.iter().find(|u| u.token == token)
    }
}

/// The authenticated caller.
#[derive(Clone, Debug, PartialEq)]
pub struct AuthUser {
    pub id: u64,
    pub username: String,
    pub groups: Vec<Role>,
}

impl From<&UserRecord> for AuthUser {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id,
            username: record.username.clone(),
            groups: record.groups.clone(),
        }
    }
}

/// Extracts the presented credential from the request headers: a bearer
/// token first, then a `session` cookie.
pub fn credential_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        if let Ok(value) = value.to_str() {
            if let Some(token) = value.strip_prefix("Bearer ") {
                return Some(token.trim().to_string());
            }
        }
    }

    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == "session").then(|| value.to_string())
    })
}

fn authenticate(state: &AppState, parts: &Parts) -> Option<AuthUser> {
    let token = credential_from_headers(&parts.headers)?;
    state.users.lookup_token(&token).map(AuthUser::from)
}

/// Rejection for unauthenticated API calls.
pub struct ApiAuthRejection;

impl IntoResponse for ApiAuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "message": "Não autenticado." })),
        )
            .into_response()
    }
}

/// Authenticated caller for REST handlers. Rejects with 401 JSON.
#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiAuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(state, parts).ok_or(ApiAuthRejection)
    }
}

/// Authenticated caller for page handlers. An unauthenticated browser is
/// redirected to the login location instead of receiving a bare 401.
pub struct PageUser(pub AuthUser);

#[axum::async_trait]
impl FromRequestParts<AppState> for PageUser {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(state, parts)
            .map(PageUser)
            .ok_or_else(|| Redirect::to("/"))
    }
}
