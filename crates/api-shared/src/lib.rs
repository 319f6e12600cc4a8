//! # API Shared
//!
//! Shared utilities and definitions for the prontuario HTTP surfaces.
//!
//! Contains:
//! - Application state (`AppState`) built once at startup
//! - Credential verification (bearer token / session cookie → `AuthUser`)
//! - The role-based access policy shared by pages and the REST API
//! - Shared response envelopes and the health service
//!
//! Used by `api-rest`, `pages` and the combined `prontuario-run` binary.

pub mod auth;
pub mod health;
pub mod policy;
pub mod responses;
pub mod state;

pub use auth::{AuthUser, PageUser, Role, UserDirectory, UserRecord};
pub use health::{HealthRes, HealthService};
pub use policy::AccessPolicy;
pub use responses::{MessageRes, ValidationErrorRes};
pub use state::AppState;
