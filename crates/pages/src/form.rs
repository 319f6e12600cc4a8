//! Form field parsing for the server-rendered pages.
//!
//! Browsers submit everything as strings; this module turns the raw fields
//! into core drafts and merges parse problems with catalog validation into
//! one field-keyed error map, so a re-rendered form can show every problem at
//! once. Link fields (`cids`, `medicamentos`) are submitted as
//! comma-separated id lists.

use prontuario_core::{
    Catalogs, ConsMedicamento, Consulta, ConsultaDraft, FieldErrors, ReceitaDraft,
    ValidatedConsulta, ValidatedReceita,
};
use serde::Deserialize;

fn push_error(errors: &mut FieldErrors, field: &str, message: String) {
    errors.entry(field.to_string()).or_default().push(message);
}

/// Merge catalog validation errors into parse errors. Parse errors win per
/// field: a field the user typed garbage into gets the parse message, not a
/// follow-on "required" message as well.
fn merge_validation_errors(parse_errors: &mut FieldErrors, validation_errors: FieldErrors) {
    for (field, messages) in validation_errors {
        if !parse_errors.contains_key(&field) {
            parse_errors.insert(field, messages);
        }
    }
}

fn parse_optional_id(field: &str, raw: &str, label: &str, errors: &mut FieldErrors) -> Option<u64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<u64>() {
        Ok(id) => Some(id),
        Err(_) => {
            push_error(errors, field, format!("{label} inválido."));
            // field already reported; keep validation from re-reporting it
            Some(u64::MAX)
        }
    }
}

fn parse_id_list(field: &str, raw: &str, label: &str, errors: &mut FieldErrors) -> Vec<u64> {
    let mut ids = Vec::new();
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match token.parse::<u64>() {
            Ok(id) => ids.push(id),
            Err(_) => push_error(errors, field, format!("{label} inválido: {token}.")),
        }
    }
    ids
}

fn join_ids(ids: &[u64]) -> String {
    ids.iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Raw consultation form fields, as submitted or re-rendered.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ConsultaForm {
    #[serde(default)]
    pub paciente: String,
    #[serde(default)]
    pub cids: String,
    #[serde(default)]
    pub medicamentos: String,
    #[serde(default)]
    pub observacoes: String,
}

impl ConsultaForm {
    /// Pre-populate the form from an existing record, for the edit flow.
    pub fn from_consulta(consulta: &Consulta) -> Self {
        Self {
            paciente: consulta.paciente_id.to_string(),
            cids: join_ids(&consulta.cids),
            medicamentos: join_ids(&consulta.medicamentos),
            observacoes: consulta.observacoes.clone(),
        }
    }

    /// Parse and validate the submitted fields.
    pub fn validate(&self, catalogs: &Catalogs) -> Result<ValidatedConsulta, FieldErrors> {
        let mut errors = FieldErrors::new();

        let draft = ConsultaDraft {
            paciente_id: parse_optional_id("paciente", &self.paciente, "Paciente", &mut errors),
            observacoes: self.observacoes.clone(),
            cids: parse_id_list("cids", &self.cids, "CID", &mut errors),
            medicamentos: parse_id_list(
                "medicamentos",
                &self.medicamentos,
                "Medicamento",
                &mut errors,
            ),
        };

        match draft.validate(catalogs) {
            Ok(valid) if errors.is_empty() => Ok(valid),
            Ok(_) => Err(errors),
            Err(e) => {
                if let Some(validation_errors) = e.field_errors() {
                    merge_validation_errors(&mut errors, validation_errors.clone());
                }
                Err(errors)
            }
        }
    }
}

/// Raw prescription-line form fields.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ReceitaForm {
    #[serde(default)]
    pub medicamento: String,
    #[serde(default)]
    pub dosagem: String,
    #[serde(default)]
    pub instrucoes: String,
}

impl ReceitaForm {
    pub fn from_receita(receita: &ConsMedicamento) -> Self {
        Self {
            medicamento: receita.medicamento_id.to_string(),
            dosagem: receita.dosagem.clone(),
            instrucoes: receita.instrucoes.clone(),
        }
    }

    pub fn validate(&self, catalogs: &Catalogs) -> Result<ValidatedReceita, FieldErrors> {
        let mut errors = FieldErrors::new();

        let draft = ReceitaDraft {
            medicamento_id: parse_optional_id(
                "medicamento",
                &self.medicamento,
                "Medicamento",
                &mut errors,
            ),
            dosagem: self.dosagem.clone(),
            instrucoes: self.instrucoes.clone(),
        };

        match draft.validate(catalogs) {
            Ok(valid) if errors.is_empty() => Ok(valid),
            Ok(_) => Err(errors),
            Err(e) => {
                if let Some(validation_errors) = e.field_errors() {
                    merge_validation_errors(&mut errors, validation_errors.clone());
                }
                Err(errors)
            }
        }
    }
}
