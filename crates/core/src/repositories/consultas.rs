//! Consultation record store.
//!
//! Consultations are stored one directory per record:
//!
//! ```text
//! consultas/
//!   <id>/
//!     consulta.yaml     # the record, links embedded
//!     receitas/         # prescription lines owned by this consultation
//!       <rid>.yaml
//! ```
//!
//! The directory-per-record layout makes two properties cheap:
//!
//! - id claiming is an atomic `create_dir`, so concurrent creators cannot
//!   allocate the same id;
//! - cascade delete of a consultation and its prescription lines is a single
//!   directory removal.
//!
//! Links to CIDs and medications are embedded in `consulta.yaml` and written
//! together with the row, so a failed save never leaves a partially-linked
//! record behind.

use crate::constants::CONSULTA_FILENAME;
use crate::model::Consulta;
use crate::validation::ValidatedConsulta;
use crate::{ConsultaError, ConsultaResult, CoreConfig};
use chrono::Utc;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

/// Service for consultation data operations.
#[derive(Clone, Debug)]
pub struct ConsultaService {
    cfg: Arc<CoreConfig>,
}

impl ConsultaService {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    pub(crate) fn consulta_dir(&self, id: u64) -> PathBuf {
        self.cfg.consultas_dir().join(id.to_string())
    }

    fn consulta_file(&self, id: u64) -> PathBuf {
        self.consulta_dir(id).join(CONSULTA_FILENAME)
    }

    /// Lists all consultations, ordered by id.
    ///
    /// Entries that cannot be parsed are logged and skipped rather than
    /// failing the whole listing.
    pub fn list(&self) -> ConsultaResult<Vec<Consulta>> {
        let consultas_dir = self.cfg.consultas_dir();

        let entries = match fs::read_dir(&consultas_dir) {
            Ok(it) => it,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ConsultaError::FileRead(e)),
        };

        let mut consultas = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(id) = path
                .file_name()
                .and_then(|os| os.to_str())
                .and_then(|s| s.parse::<u64>().ok())
            else {
                continue;
            };

            match self.read_record(id) {
                Ok(consulta) => consultas.push(consulta),
                Err(e) => {
                    tracing::warn!("skipping unreadable consulta {id}: {e}");
                }
            }
        }

        consultas.sort_by_key(|c| c.id);
        Ok(consultas)
    }

    /// Fetches one consultation by id.
    ///
    /// # Errors
    ///
    /// Returns `ConsultaError::NotFound` if no record with this id exists.
    pub fn get(&self, id: u64) -> ConsultaResult<Consulta> {
        if !self.consulta_file(id).is_file() {
            return Err(ConsultaError::NotFound);
        }
        self.read_record(id)
    }

    /// Creates a new consultation from validated fields.
    ///
    /// The row and its diagnosis/medication links are written as one file in
    /// one operation; there is no window in which the row exists unlinked.
    pub fn create(&self, record: ValidatedConsulta) -> ConsultaResult<Consulta> {
        fs::create_dir_all(self.cfg.consultas_dir()).map_err(ConsultaError::StorageDirCreation)?;

        let id = self.allocate_id()?;
        let now = Utc::now();
        let consulta = Consulta {
            id,
            paciente_id: record.paciente_id,
            observacoes: record.observacoes,
            cids: record.cids,
            medicamentos: record.medicamentos,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.write_record(&consulta) {
            // The id directory was already claimed; release it so the id can
            // be reused instead of leaving an empty husk behind.
            if let Err(cleanup) = fs::remove_dir_all(self.consulta_dir(id)) {
                tracing::warn!("failed to clean up consulta dir {id} after write error: {cleanup}");
            }
            return Err(e);
        }

        Ok(consulta)
    }

    /// Replaces an existing consultation's fields (full replace, not a patch).
    ///
    /// `created_at` is preserved; `updated_at` is bumped.
    ///
    /// # Errors
    ///
    /// Returns `ConsultaError::NotFound` if no record with this id exists.
    pub fn update(&self, id: u64, record: ValidatedConsulta) -> ConsultaResult<Consulta> {
        let existing = self.get(id)?;

        let consulta = Consulta {
            id,
            paciente_id: record.paciente_id,
            observacoes: record.observacoes,
            cids: record.cids,
            medicamentos: record.medicamentos,
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };

        self.write_record(&consulta)?;
        Ok(consulta)
    }

    /// Deletes a consultation and, by cascade, all its prescription lines.
    ///
    /// # Errors
    ///
    /// Returns `ConsultaError::NotFound` if no record with this id exists.
    pub fn delete(&self, id: u64) -> ConsultaResult<()> {
        if !self.consulta_file(id).is_file() {
            return Err(ConsultaError::NotFound);
        }
        fs::remove_dir_all(self.consulta_dir(id)).map_err(ConsultaError::FileRemove)
    }

    fn read_record(&self, id: u64) -> ConsultaResult<Consulta> {
        let contents =
            fs::read_to_string(self.consulta_file(id)).map_err(ConsultaError::FileRead)?;
        serde_yaml::from_str(&contents).map_err(ConsultaError::YamlDeserialization)
    }

    fn write_record(&self, consulta: &Consulta) -> ConsultaResult<()> {
        let yaml = serde_yaml::to_string(consulta).map_err(ConsultaError::YamlSerialization)?;
        fs::write(self.consulta_file(consulta.id), yaml).map_err(ConsultaError::FileWrite)
    }

    /// Claims the next free id by creating its directory.
    ///
    /// `create_dir` fails with `AlreadyExists` if another request claimed the
    /// same id first; in that case the scan is retried.
    fn allocate_id(&self) -> ConsultaResult<u64> {
        loop {
            let id = self.max_existing_id()? + 1;
            match fs::create_dir(self.consulta_dir(id)) {
                Ok(()) => return Ok(id),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(ConsultaError::ConsultaDirCreation(e)),
            }
        }
    }

    fn max_existing_id(&self) -> ConsultaResult<u64> {
        let entries = match fs::read_dir(self.cfg.consultas_dir()) {
            Ok(it) => it,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(ConsultaError::FileRead(e)),
        };

        let max = entries
            .flatten()
            .filter_map(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .and_then(|s| s.parse::<u64>().ok())
            })
            .max()
            .unwrap_or(0);
        Ok(max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::receitas::ReceitaService;
    use crate::validation::ValidatedReceita;
    use tempfile::TempDir;

    fn test_cfg(temp_dir: &TempDir) -> Arc<CoreConfig> {
        Arc::new(
            CoreConfig::new(temp_dir.path().to_path_buf(), 10)
                .expect("CoreConfig::new should succeed"),
        )
    }

    fn valid_record(paciente_id: u64) -> ValidatedConsulta {
        ValidatedConsulta {
            paciente_id,
            observacoes: "primeira consulta".into(),
            cids: vec![1],
            medicamentos: vec![2],
        }
    }

    #[test]
    fn test_create_then_get_roundtrips() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = ConsultaService::new(test_cfg(&temp_dir));

        let created = service.create(valid_record(1)).expect("create should succeed");
        assert_eq!(created.id, 1);

        let fetched = service.get(created.id).expect("get should succeed");
        assert_eq!(fetched, created);
    }

    #[test]
    fn test_ids_are_sequential() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = ConsultaService::new(test_cfg(&temp_dir));

        let a = service.create(valid_record(1)).unwrap();
        let b = service.create(valid_record(2)).unwrap();
        let c = service.create(valid_record(3)).unwrap();
        assert_eq!((a.id, b.id, c.id), (1, 2, 3));
    }

    #[test]
    fn test_list_is_ordered_and_skips_garbage() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = ConsultaService::new(test_cfg(&temp_dir));

        service.create(valid_record(2)).unwrap();
        service.create(valid_record(1)).unwrap();

        // A stray directory that is not a record must not break listing.
        std::fs::create_dir_all(temp_dir.path().join("consultas/not-an-id")).unwrap();
        std::fs::create_dir_all(temp_dir.path().join("consultas/9")).unwrap();

        let consultas = service.list().expect("list should succeed");
        assert_eq!(
            consultas.iter().map(|c| c.id).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }

    #[test]
    fn test_get_unknown_id_is_not_found() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = ConsultaService::new(test_cfg(&temp_dir));

        let err = service.get(42).expect_err("should not find 42");
        assert!(matches!(err, ConsultaError::NotFound));
    }

    #[test]
    fn test_update_replaces_fields_and_keeps_created_at() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = ConsultaService::new(test_cfg(&temp_dir));

        let created = service.create(valid_record(1)).unwrap();
        let updated = service
            .update(
                created.id,
                ValidatedConsulta {
                    paciente_id: 2,
                    observacoes: "retorno".into(),
                    cids: vec![],
                    medicamentos: vec![],
                },
            )
            .expect("update should succeed");

        assert_eq!(updated.paciente_id, 2);
        assert_eq!(updated.cids, Vec::<u64>::new());
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[test]
    fn test_update_unknown_id_is_not_found() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = ConsultaService::new(test_cfg(&temp_dir));

        let err = service
            .update(7, valid_record(1))
            .expect_err("should not find 7");
        assert!(matches!(err, ConsultaError::NotFound));
    }

    #[test]
    fn test_delete_is_idempotent_absence() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = ConsultaService::new(test_cfg(&temp_dir));

        let created = service.create(valid_record(1)).unwrap();
        service.delete(created.id).expect("delete should succeed");

        assert!(matches!(
            service.get(created.id),
            Err(ConsultaError::NotFound)
        ));
        assert!(matches!(
            service.delete(created.id),
            Err(ConsultaError::NotFound)
        ));
    }

    #[test]
    fn test_delete_cascades_receitas() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = test_cfg(&temp_dir);
        let consultas = ConsultaService::new(cfg.clone());
        let receitas = ReceitaService::new(cfg);

        let consulta = consultas.create(valid_record(1)).unwrap();
        let receita = receitas
            .create(
                consulta.id,
                ValidatedReceita {
                    medicamento_id: 2,
                    dosagem: "500 mg".into(),
                    instrucoes: String::new(),
                },
            )
            .expect("receita create should succeed");

        consultas.delete(consulta.id).unwrap();
        assert!(matches!(
            receitas.get(receita.id),
            Err(ConsultaError::ReceitaNotFound)
        ));
    }
}
