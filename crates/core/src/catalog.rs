//! Read-only reference catalogs.
//!
//! CIDs, medications, patients and medicos are shared reference data, not
//! owned by the consultation store. They are loaded once at startup from YAML
//! files in the data directory and consulted during validation and page
//! rendering. A missing catalog file is treated as an empty catalog so a fresh
//! data directory boots cleanly.

use crate::model::{Cid, Medicamento, Medico, Paciente};
use crate::{ConsultaError, ConsultaResult, CoreConfig};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Clone, Debug, Default)]
pub struct Catalogs {
    cids: BTreeMap<u64, Cid>,
    medicamentos: BTreeMap<u64, Medicamento>,
    pacientes: BTreeMap<u64, Paciente>,
    medicos: BTreeMap<u64, Medico>,
}

fn load_catalog_file<T>(path: &Path) -> ConsultaResult<Vec<T>>
where
    T: DeserializeOwned,
{
    if !path.is_file() {
        tracing::warn!("catalog file missing, treating as empty: {}", path.display());
        return Ok(Vec::new());
    }

    let contents = std::fs::read_to_string(path).map_err(ConsultaError::FileRead)?;
    serde_yaml::from_str(&contents).map_err(ConsultaError::YamlDeserialization)
}

fn index_by_id<T>(records: Vec<T>, id: impl Fn(&T) -> u64) -> BTreeMap<u64, T> {
    records.into_iter().map(|r| (id(&r), r)).collect()
}

impl Catalogs {
    /// Load all catalogs from the configured data directory.
    pub fn load(cfg: &CoreConfig) -> ConsultaResult<Self> {
        Ok(Self::from_records(
            load_catalog_file(&cfg.cids_file())?,
            load_catalog_file(&cfg.medicamentos_file())?,
            load_catalog_file(&cfg.pacientes_file())?,
            load_catalog_file(&cfg.medicos_file())?,
        ))
    }

    /// Build catalogs directly from records. Used by tests and seed tooling.
    pub fn from_records(
        cids: Vec<Cid>,
        medicamentos: Vec<Medicamento>,
        pacientes: Vec<Paciente>,
        medicos: Vec<Medico>,
    ) -> Self {
        Self {
            cids: index_by_id(cids, |c| c.id),
            medicamentos: index_by_id(medicamentos, |m| m.id),
            pacientes: index_by_id(pacientes, |p| p.id),
            medicos: index_by_id(medicos, |m| m.id),
        }
    }

    pub fn cid(&self, id: u64) -> Option<&Cid> {
        self.cids.get(&id)
    }

    pub fn medicamento(&self, id: u64) -> Option<&Medicamento> {
        self.medicamentos.get(&id)
    }

    pub fn paciente(&self, id: u64) -> Option<&Paciente> {
        self.pacientes.get(&id)
    }

    /// Resolve the acting medico by the authenticated user's id.
    pub fn medico(&self, id: u64) -> Option<&Medico> {
        self.medicos.get(&id)
    }

    pub fn cids(&self) -> impl Iterator<Item = &Cid> {
        self.cids.values()
    }

    pub fn medicamentos(&self) -> impl Iterator<Item = &Medicamento> {
        self.medicamentos.values()
    }

    pub fn pacientes(&self) -> impl Iterator<Item = &Paciente> {
        self.pacientes.values()
    }
}
