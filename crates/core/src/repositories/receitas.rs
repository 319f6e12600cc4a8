//! Prescription-line ("receita") store.
//!
//! Prescription lines live inside their owning consultation's directory
//! (`consultas/<id>/receitas/<rid>.yaml`), which is what gives cascade delete
//! for free. Receita ids are globally unique so the edit flow can address a
//! line without knowing its consultation; lookups by bare receita id scan the
//! consultation directories.

use crate::constants::RECEITAS_DIR_NAME;
use crate::model::ConsMedicamento;
use crate::repositories::consultas::ConsultaService;
use crate::validation::ValidatedReceita;
use crate::{ConsultaError, ConsultaResult, CoreConfig};
use chrono::Utc;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

/// Service for prescription-line data operations.
#[derive(Clone, Debug)]
pub struct ReceitaService {
    cfg: Arc<CoreConfig>,
}

impl ReceitaService {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    fn consultas(&self) -> ConsultaService {
        ConsultaService::new(self.cfg.clone())
    }

    fn receitas_dir(&self, consulta_id: u64) -> PathBuf {
        self.consultas()
            .consulta_dir(consulta_id)
            .join(RECEITAS_DIR_NAME)
    }

    fn receita_file(&self, consulta_id: u64, receita_id: u64) -> PathBuf {
        self.receitas_dir(consulta_id)
            .join(format!("{receita_id}.yaml"))
    }

    /// Creates a prescription line under an existing consultation.
    ///
    /// # Errors
    ///
    /// Returns `ConsultaError::NotFound` if the owning consultation does not
    /// exist.
    pub fn create(
        &self,
        consulta_id: u64,
        record: ValidatedReceita,
    ) -> ConsultaResult<ConsMedicamento> {
        // Owning consultation must exist; its absence is the caller's error.
        self.consultas().get(consulta_id)?;

        fs::create_dir_all(self.receitas_dir(consulta_id))
            .map_err(ConsultaError::ReceitasDirCreation)?;

        let id = self.allocate_id(consulta_id)?;
        let now = Utc::now();
        let receita = ConsMedicamento {
            id,
            consulta_id,
            medicamento_id: record.medicamento_id,
            dosagem: record.dosagem,
            instrucoes: record.instrucoes,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.write_record(&receita) {
            self.release_claimed_id(consulta_id, id);
            return Err(e);
        }
        Ok(receita)
    }

    /// Lists the prescription lines of one consultation, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `ConsultaError::NotFound` if the consultation does not exist.
    pub fn list_for_consulta(&self, consulta_id: u64) -> ConsultaResult<Vec<ConsMedicamento>> {
        self.consultas().get(consulta_id)?;

        let entries = match fs::read_dir(self.receitas_dir(consulta_id)) {
            Ok(it) => it,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ConsultaError::FileRead(e)),
        };

        let mut receitas = Vec::new();
        for entry in entries.flatten() {
            match self.read_record(&entry.path()) {
                Ok(receita) => receitas.push(receita),
                Err(e) => {
                    tracing::warn!(
                        "skipping unreadable receita {}: {e}",
                        entry.path().display()
                    );
                }
            }
        }

        receitas.sort_by_key(|r| r.id);
        Ok(receitas)
    }

    /// Fetches one prescription line by its global id.
    ///
    /// # Errors
    ///
    /// Returns `ConsultaError::ReceitaNotFound` if no line with this id
    /// exists under any consultation.
    pub fn get(&self, receita_id: u64) -> ConsultaResult<ConsMedicamento> {
        for consulta in self.consultas().list()? {
            let path = self.receita_file(consulta.id, receita_id);
            if path.is_file() {
                return self.read_record(&path);
            }
        }
        Err(ConsultaError::ReceitaNotFound)
    }

    /// Replaces an existing prescription line's fields. The owning
    /// consultation and `created_at` are preserved; `updated_at` is bumped.
    ///
    /// # Errors
    ///
    /// Returns `ConsultaError::ReceitaNotFound` if no line with this id
    /// exists.
    pub fn update(
        &self,
        receita_id: u64,
        record: ValidatedReceita,
    ) -> ConsultaResult<ConsMedicamento> {
        let existing = self.get(receita_id)?;

        let receita = ConsMedicamento {
            id: receita_id,
            consulta_id: existing.consulta_id,
            medicamento_id: record.medicamento_id,
            dosagem: record.dosagem,
            instrucoes: record.instrucoes,
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };

        self.write_record(&receita)?;
        Ok(receita)
    }

    fn read_record(&self, path: &std::path::Path) -> ConsultaResult<ConsMedicamento> {
        let contents = fs::read_to_string(path).map_err(ConsultaError::FileRead)?;
        serde_yaml::from_str(&contents).map_err(ConsultaError::YamlDeserialization)
    }

    fn write_record(&self, receita: &ConsMedicamento) -> ConsultaResult<()> {
        let yaml = serde_yaml::to_string(receita).map_err(ConsultaError::YamlSerialization)?;
        fs::write(
            self.receita_file(receita.consulta_id, receita.id),
            yaml,
        )
        .map_err(ConsultaError::FileWrite)
    }

    /// Claims the next free global receita id by creating its file with
    /// `create_new`, retrying on a lost race.
    fn allocate_id(&self, consulta_id: u64) -> ConsultaResult<u64> {
        loop {
            let id = self.max_existing_id()? + 1;
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.receita_file(consulta_id, id))
            {
                Ok(_) => return Ok(id),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(ConsultaError::FileWrite(e)),
            }
        }
    }

    /// Removes the file claimed by `allocate_id` so the id can be reused,
    /// instead of surviving as an empty husk that every listing must skip.
    fn release_claimed_id(&self, consulta_id: u64, receita_id: u64) {
        if let Err(e) = fs::remove_file(self.receita_file(consulta_id, receita_id)) {
            tracing::warn!("failed to clean up receita {receita_id} after write error: {e}");
        }
    }

    fn max_existing_id(&self) -> ConsultaResult<u64> {
        let mut max = 0;
        for consulta in self.consultas().list()? {
            let entries = match fs::read_dir(self.receitas_dir(consulta.id)) {
                Ok(it) => it,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(ConsultaError::FileRead(e)),
            };
            for entry in entries.flatten() {
                if let Some(id) = entry
                    .path()
                    .file_stem()
                    .and_then(|os| os.to_str())
                    .and_then(|s| s.parse::<u64>().ok())
                {
                    max = max.max(id);
                }
            }
        }
        Ok(max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidatedConsulta;
    use tempfile::TempDir;

    fn test_cfg(temp_dir: &TempDir) -> Arc<CoreConfig> {
        Arc::new(
            CoreConfig::new(temp_dir.path().to_path_buf(), 10)
                .expect("CoreConfig::new should succeed"),
        )
    }

    fn seed_consulta(cfg: &Arc<CoreConfig>) -> u64 {
        ConsultaService::new(cfg.clone())
            .create(ValidatedConsulta {
                paciente_id: 1,
                observacoes: String::new(),
                cids: vec![],
                medicamentos: vec![],
            })
            .expect("consulta create should succeed")
            .id
    }

    fn valid_receita() -> ValidatedReceita {
        ValidatedReceita {
            medicamento_id: 1,
            dosagem: "500 mg a cada 8h".into(),
            instrucoes: "tomar com água".into(),
        }
    }

    #[test]
    fn test_create_requires_owning_consulta() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let service = ReceitaService::new(test_cfg(&temp_dir));

        let err = service
            .create(42, valid_receita())
            .expect_err("should fail without consulta");
        assert!(matches!(err, ConsultaError::NotFound));
    }

    #[test]
    fn test_create_then_get_roundtrips() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = test_cfg(&temp_dir);
        let consulta_id = seed_consulta(&cfg);
        let service = ReceitaService::new(cfg);

        let created = service
            .create(consulta_id, valid_receita())
            .expect("create should succeed");
        assert_eq!(created.id, 1);
        assert_eq!(created.consulta_id, consulta_id);

        let fetched = service.get(created.id).expect("get should succeed");
        assert_eq!(fetched, created);
    }

    #[test]
    fn test_receita_ids_are_global_across_consultas() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = test_cfg(&temp_dir);
        let first = seed_consulta(&cfg);
        let second = seed_consulta(&cfg);
        let service = ReceitaService::new(cfg);

        let a = service.create(first, valid_receita()).unwrap();
        let b = service.create(second, valid_receita()).unwrap();
        assert_eq!((a.id, b.id), (1, 2));
    }

    #[test]
    fn test_list_for_consulta_is_scoped() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = test_cfg(&temp_dir);
        let first = seed_consulta(&cfg);
        let second = seed_consulta(&cfg);
        let service = ReceitaService::new(cfg);

        service.create(first, valid_receita()).unwrap();
        service.create(first, valid_receita()).unwrap();
        service.create(second, valid_receita()).unwrap();

        let listed = service.list_for_consulta(first).expect("list should succeed");
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|r| r.consulta_id == first));

        // A consultation with no receitas lists empty, not an error.
        let third = seed_consulta(&service.cfg);
        assert!(service.list_for_consulta(third).unwrap().is_empty());
    }

    #[test]
    fn test_released_claim_frees_the_id_for_reuse() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = test_cfg(&temp_dir);
        let consulta_id = seed_consulta(&cfg);
        let service = ReceitaService::new(cfg);

        fs::create_dir_all(service.receitas_dir(consulta_id)).unwrap();
        let claimed = service.allocate_id(consulta_id).expect("claim should succeed");
        service.release_claimed_id(consulta_id, claimed);

        // The empty claim is gone: the next create takes the same id and
        // listing sees only the fully written record.
        let created = service
            .create(consulta_id, valid_receita())
            .expect("create should succeed");
        assert_eq!(created.id, claimed);
        assert_eq!(
            service.list_for_consulta(consulta_id).unwrap(),
            vec![created]
        );
    }

    #[test]
    fn test_update_preserves_owner_and_created_at() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = test_cfg(&temp_dir);
        let consulta_id = seed_consulta(&cfg);
        let service = ReceitaService::new(cfg);

        let created = service.create(consulta_id, valid_receita()).unwrap();
        let updated = service
            .update(
                created.id,
                ValidatedReceita {
                    medicamento_id: 2,
                    dosagem: "250 mg a cada 12h".into(),
                    instrucoes: String::new(),
                },
            )
            .expect("update should succeed");

        assert_eq!(updated.consulta_id, consulta_id);
        assert_eq!(updated.medicamento_id, 2);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[test]
    fn test_get_unknown_id_is_receita_not_found() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = test_cfg(&temp_dir);
        seed_consulta(&cfg);
        let service = ReceitaService::new(cfg);

        assert!(matches!(
            service.get(99),
            Err(ConsultaError::ReceitaNotFound)
        ));
        assert!(matches!(
            service.update(99, valid_receita()),
            Err(ConsultaError::ReceitaNotFound)
        ));
    }
}
