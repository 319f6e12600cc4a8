//! Constants used throughout the prontuario core crate.
//!
//! This module contains all path and filename constants to ensure
//! consistency across the codebase and make maintenance easier.

/// Directory name for consultation records storage.
pub const CONSULTAS_DIR_NAME: &str = "consultas";

/// Directory name, inside a consultation directory, for its prescription lines.
pub const RECEITAS_DIR_NAME: &str = "receitas";

/// Filename for the consultation record inside its directory.
pub const CONSULTA_FILENAME: &str = "consulta.yaml";

/// Default directory for record storage when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "prontuario_data";

/// Filename for the CID (diagnosis code) reference catalog.
pub const CIDS_FILENAME: &str = "cids.yaml";

/// Filename for the medication reference catalog.
pub const MEDICAMENTOS_FILENAME: &str = "medicamentos.yaml";

/// Filename for the patient reference catalog.
pub const PACIENTES_FILENAME: &str = "pacientes.yaml";

/// Filename for the medico (treating professional) reference catalog.
pub const MEDICOS_FILENAME: &str = "medicos.yaml";

/// Filename for the user directory consumed by credential verification.
pub const USERS_FILENAME: &str = "users.yaml";

/// Default API page size when none is configured.
pub const DEFAULT_API_PAGE_SIZE: usize = 10;
