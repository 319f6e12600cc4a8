//! # Prontuario Core
//!
//! Core business logic for the consultation record system.
//!
//! This crate contains pure data operations and file/folder management:
//! - Consultation and prescription-line records with per-record directory storage
//! - Reference catalogs (CIDs, medications, patients, medicos) loaded at startup
//! - Field-level validation of all writes against the catalogs
//!
//! **No API concerns**: authentication, authorization policy and HTTP servers
//! belong in `api-shared`, `api-rest` and `pages`.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod error;
pub mod model;
pub mod repositories;
pub mod validation;

pub use catalog::Catalogs;
pub use config::CoreConfig;
pub use constants::{DEFAULT_API_PAGE_SIZE, DEFAULT_DATA_DIR};
pub use error::{ConsultaError, ConsultaResult, FieldErrors};
pub use model::{Cid, ConsMedicamento, Consulta, Medicamento, Medico, Paciente};
pub use repositories::consultas::ConsultaService;
pub use repositories::receitas::ReceitaService;
pub use validation::{ConsultaDraft, ReceitaDraft, ValidatedConsulta, ValidatedReceita};
