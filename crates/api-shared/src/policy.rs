//! Role-based access policy.
//!
//! One injectable policy shared by both surfaces, evaluated as a pure
//! predicate over the authenticated user's groups. Page handlers always
//! enforce their role set; the API role set is optional and off by default,
//! which reproduces the historical behaviour (any authenticated caller may
//! use the API) as an explicit, configurable choice.

use crate::auth::{AuthUser, Role};
use prontuario_core::{ConsultaError, ConsultaResult};

#[derive(Clone, Debug)]
pub struct AccessPolicy {
    /// Roles allowed to use the server-rendered pages.
    pub page_roles: Vec<Role>,
    /// Roles allowed to use the REST API; `None` means any authenticated
    /// caller.
    pub api_roles: Option<Vec<Role>>,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            page_roles: vec![Role::Medico, Role::Estudante],
            api_roles: None,
        }
    }
}

impl AccessPolicy {
    /// True iff the user holds at least one of the required roles.
    pub fn allows(user: &AuthUser, required: &[Role]) -> bool {
        user.groups.iter().any(|g| required.contains(g))
    }

    pub fn page_allows(&self, user: &AuthUser) -> bool {
        Self::allows(user, &self.page_roles)
    }

    pub fn api_allows(&self, user: &AuthUser) -> bool {
        match &self.api_roles {
            Some(required) => Self::allows(user, required),
            None => true,
        }
    }
}

fn parse_role(value: &str) -> ConsultaResult<Role> {
    match value {
        "Medico" => Ok(Role::Medico),
        "Estudante" => Ok(Role::Estudante),
        "Recepcao" => Ok(Role::Recepcao),
        other => Err(ConsultaError::InvalidInput(format!(
            "unknown role: {other:?}"
        ))),
    }
}

/// Parse the API role restriction from an optional comma-separated value.
///
/// `None` or an empty/whitespace value leaves the API open to any
/// authenticated caller.
pub fn api_roles_from_env_value(value: Option<String>) -> ConsultaResult<Option<Vec<Role>>> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    value
        .map(|v| v.split(',').map(|r| parse_role(r.trim())).collect())
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(groups: Vec<Role>) -> AuthUser {
        AuthUser {
            id: 1,
            username: "u".into(),
            groups,
        }
    }

    #[test]
    fn test_page_roles_admit_medico_and_estudante_only() {
        let policy = AccessPolicy::default();
        assert!(policy.page_allows(&user(vec![Role::Medico])));
        assert!(policy.page_allows(&user(vec![Role::Estudante])));
        assert!(policy.page_allows(&user(vec![Role::Recepcao, Role::Medico])));
        assert!(!policy.page_allows(&user(vec![Role::Recepcao])));
        assert!(!policy.page_allows(&user(vec![])));
    }

    #[test]
    fn test_api_open_by_default() {
        let policy = AccessPolicy::default();
        assert!(policy.api_allows(&user(vec![Role::Recepcao])));
        assert!(policy.api_allows(&user(vec![])));
    }

    #[test]
    fn test_api_roles_restrict_when_configured() {
        let policy = AccessPolicy {
            api_roles: Some(vec![Role::Medico]),
            ..Default::default()
        };
        assert!(policy.api_allows(&user(vec![Role::Medico])));
        assert!(!policy.api_allows(&user(vec![Role::Estudante])));
    }

    #[test]
    fn test_api_roles_env_parsing() {
        assert_eq!(api_roles_from_env_value(None).unwrap(), None);
        assert_eq!(api_roles_from_env_value(Some("  ".into())).unwrap(), None);
        assert_eq!(
            api_roles_from_env_value(Some("Medico, Estudante".into())).unwrap(),
            Some(vec![Role::Medico, Role::Estudante])
        );
        assert!(api_roles_from_env_value(Some("Janitor".into())).is_err());
    }
}
