//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. The intent is to avoid reading process-wide environment variables
//! during request handling, which can lead to inconsistent behaviour in multi-threaded runtimes
//! and test harnesses.

use crate::constants::{
    CIDS_FILENAME, CONSULTAS_DIR_NAME, DEFAULT_API_PAGE_SIZE, MEDICAMENTOS_FILENAME,
    MEDICOS_FILENAME, PACIENTES_FILENAME, USERS_FILENAME,
};
use crate::{ConsultaError, ConsultaResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    api_page_size: usize,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(data_dir: PathBuf, api_page_size: usize) -> ConsultaResult<Self> {
        if api_page_size == 0 {
            return Err(ConsultaError::InvalidInput(
                "api_page_size must be at least 1".into(),
            ));
        }

        Ok(Self {
            data_dir,
            api_page_size,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn consultas_dir(&self) -> PathBuf {
        self.data_dir.join(CONSULTAS_DIR_NAME)
    }

    pub fn cids_file(&self) -> PathBuf {
        self.data_dir.join(CIDS_FILENAME)
    }

    pub fn medicamentos_file(&self) -> PathBuf {
        self.data_dir.join(MEDICAMENTOS_FILENAME)
    }

    pub fn pacientes_file(&self) -> PathBuf {
        self.data_dir.join(PACIENTES_FILENAME)
    }

    pub fn medicos_file(&self) -> PathBuf {
        self.data_dir.join(MEDICOS_FILENAME)
    }

    pub fn users_file(&self) -> PathBuf {
        self.data_dir.join(USERS_FILENAME)
    }

    pub fn api_page_size(&self) -> usize {
        self.api_page_size
    }
}

/// Parse the API page size from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default page size.
pub fn api_page_size_from_env_value(value: Option<String>) -> ConsultaResult<usize> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let parsed = value
        .map(|v| {
            v.parse::<usize>().map_err(|_| {
                ConsultaError::InvalidInput(format!("invalid API page size: {v:?}"))
            })
        })
        .transpose()?;

    match parsed {
        Some(0) => Err(ConsultaError::InvalidInput(
            "API page size must be at least 1".into(),
        )),
        Some(n) => Ok(n),
        None => Ok(DEFAULT_API_PAGE_SIZE),
    }
}
