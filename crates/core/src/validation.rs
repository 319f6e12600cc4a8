//! Input validation for consultation and prescription writes.
//!
//! Every write goes through a draft type that is checked against the
//! reference catalogs before it reaches the store. Validation failures are
//! collected into a field-keyed error map rather than failing on the first
//! problem, so callers (form re-renders and the REST API alike) can surface
//! everything that is wrong with a submission in one pass.

use crate::catalog::Catalogs;
use crate::{ConsultaError, ConsultaResult, FieldErrors};

/// Maximum length for free-text observations on a consultation.
pub const MAX_OBSERVACOES_LEN: usize = 2000;

/// Maximum length for a prescription dosage line.
pub const MAX_DOSAGEM_LEN: usize = 200;

/// Maximum length for prescription instructions.
pub const MAX_INSTRUCOES_LEN: usize = 2000;

fn push_error(errors: &mut FieldErrors, field: &str, message: String) {
    errors.entry(field.to_string()).or_default().push(message);
}

/// Unvalidated consultation fields, as submitted.
#[derive(Clone, Debug, Default)]
pub struct ConsultaDraft {
    pub paciente_id: Option<u64>,
    pub observacoes: String,
    pub cids: Vec<u64>,
    pub medicamentos: Vec<u64>,
}

/// Consultation fields that passed validation against the catalogs.
///
/// Only this type can be handed to the store, so unchecked data cannot be
/// persisted. Link lists are deduplicated and sorted.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedConsulta {
    pub paciente_id: u64,
    pub observacoes: String,
    pub cids: Vec<u64>,
    pub medicamentos: Vec<u64>,
}

fn dedup_sorted(mut ids: Vec<u64>) -> Vec<u64> {
    ids.sort_unstable();
    ids.dedup();
    ids
}

impl ConsultaDraft {
    /// Validate this draft against the reference catalogs.
    ///
    /// # Errors
    ///
    /// Returns `ConsultaError::Validation` carrying one message list per
    /// offending field.
    pub fn validate(self, catalogs: &Catalogs) -> ConsultaResult<ValidatedConsulta> {
        let mut errors = FieldErrors::new();

        let paciente_id = match self.paciente_id {
            None => {
                push_error(&mut errors, "paciente", "Informe o paciente.".into());
                0
            }
            Some(id) if catalogs.paciente(id).is_none() => {
                push_error(&mut errors, "paciente", "Paciente inválido.".into());
                id
            }
            Some(id) => id,
        };

        let cids = dedup_sorted(self.cids);
        for id in &cids {
            if catalogs.cid(*id).is_none() {
                push_error(&mut errors, "cids", format!("CID desconhecido: {id}."));
            }
        }

        let medicamentos = dedup_sorted(self.medicamentos);
        for id in &medicamentos {
            if catalogs.medicamento(*id).is_none() {
                push_error(
                    &mut errors,
                    "medicamentos",
                    format!("Medicamento desconhecido: {id}."),
                );
            }
        }

        if self.observacoes.chars().count() > MAX_OBSERVACOES_LEN {
            push_error(
                &mut errors,
                "observacoes",
                format!("Observações excedem {MAX_OBSERVACOES_LEN} caracteres."),
            );
        }

        if !errors.is_empty() {
            return Err(ConsultaError::Validation(errors));
        }

        Ok(ValidatedConsulta {
            paciente_id,
            observacoes: self.observacoes,
            cids,
            medicamentos,
        })
    }
}

/// Unvalidated prescription-line fields, as submitted.
#[derive(Clone, Debug, Default)]
pub struct ReceitaDraft {
    pub medicamento_id: Option<u64>,
    pub dosagem: String,
    pub instrucoes: String,
}

/// Prescription-line fields that passed validation against the catalogs.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedReceita {
    pub medicamento_id: u64,
    pub dosagem: String,
    pub instrucoes: String,
}

impl ReceitaDraft {
    /// Validate this draft against the reference catalogs.
    ///
    /// # Errors
    ///
    /// Returns `ConsultaError::Validation` carrying one message list per
    /// offending field.
    pub fn validate(self, catalogs: &Catalogs) -> ConsultaResult<ValidatedReceita> {
        let mut errors = FieldErrors::new();

        let medicamento_id = match self.medicamento_id {
            None => {
                push_error(&mut errors, "medicamento", "Informe o medicamento.".into());
                0
            }
            Some(id) if catalogs.medicamento(id).is_none() => {
                push_error(&mut errors, "medicamento", "Medicamento inválido.".into());
                id
            }
            Some(id) => id,
        };

        let dosagem = self.dosagem.trim().to_string();
        if dosagem.is_empty() {
            push_error(&mut errors, "dosagem", "Informe a dosagem.".into());
        } else if dosagem.chars().count() > MAX_DOSAGEM_LEN {
            push_error(
                &mut errors,
                "dosagem",
                format!("Dosagem excede {MAX_DOSAGEM_LEN} caracteres."),
            );
        }

        if self.instrucoes.chars().count() > MAX_INSTRUCOES_LEN {
            push_error(
                &mut errors,
                "instrucoes",
                format!("Instruções excedem {MAX_INSTRUCOES_LEN} caracteres."),
            );
        }

        if !errors.is_empty() {
            return Err(ConsultaError::Validation(errors));
        }

        Ok(ValidatedReceita {
            medicamento_id,
            dosagem,
            instrucoes: self.instrucoes,
        })
    }
}
