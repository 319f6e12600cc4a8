//! Shared application state.
//!
//! Everything a request handler needs, resolved once at startup: the core
//! configuration, the read-only reference catalogs, the user directory and
//! the access policy. Record services are constructed per request from the
//! configuration.

use crate::auth::UserDirectory;
use crate::policy::{api_roles_from_env_value, AccessPolicy};
use prontuario_core::config::api_page_size_from_env_value;
use prontuario_core::{Catalogs, ConsultaResult, CoreConfig, DEFAULT_DATA_DIR};
use std::path::PathBuf;
use std::sync::Arc;

/// Application state shared across page and REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<CoreConfig>,
    pub catalogs: Arc<Catalogs>,
    pub users: Arc<UserDirectory>,
    pub policy: Arc<AccessPolicy>,
}

impl AppState {
    /// Build state from an already-resolved configuration, loading catalogs
    /// and the user directory from the data directory.
    pub fn load(cfg: CoreConfig) -> ConsultaResult<Self> {
        let catalogs = Catalogs::load(&cfg)?;
        let users = UserDirectory::load(&cfg.users_file())?;

        Ok(Self {
            cfg: Arc::new(cfg),
            catalogs: Arc::new(catalogs),
            users: Arc::new(users),
            policy: Arc::new(AccessPolicy::default()),
        })
    }

    /// Build state from the process environment. Reads:
    ///
    /// - `PRONTUARIO_DATA_DIR`: record storage directory (default `prontuario_data`)
    /// - `PRONTUARIO_PAGE_SIZE`: API page size (default 10)
    /// - `PRONTUARIO_API_ROLES`: comma-separated role restriction for the API
    ///   (default: any authenticated caller)
    pub fn from_env() -> ConsultaResult<Self> {
        let data_dir = std::env::var("PRONTUARIO_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR));
        let page_size =
            api_page_size_from_env_value(std::env::var("PRONTUARIO_PAGE_SIZE").ok())?;
        let api_roles = api_roles_from_env_value(std::env::var("PRONTUARIO_API_ROLES").ok())?;

        let cfg = CoreConfig::new(data_dir, page_size)?;
        let mut state = Self::load(cfg)?;
        state.policy = Arc::new(AccessPolicy {
            api_roles,
            ..AccessPolicy::default()
        });
        Ok(state)
    }
}
