//! Record and reference-data types.
//!
//! `Consulta` and `ConsMedicamento` are the stored records owned by this
//! system. `Cid`, `Medicamento`, `Paciente` and `Medico` are shared reference
//! data: read-only catalogs loaded at startup and consulted during validation
//! and rendering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A medical consultation record.
///
/// Links to diagnoses and medications are embedded in the record itself and
/// written in the same store operation as the row, so a consultation is never
/// persisted partially linked.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Consulta {
    pub id: u64,
    /// Reference into the patient catalog. Must resolve at save time.
    pub paciente_id: u64,
    #[serde(default)]
    pub observacoes: String,
    /// Linked CID (diagnosis code) catalog ids.
    #[serde(default)]
    pub cids: Vec<u64>,
    /// Linked medication catalog ids.
    #[serde(default)]
    pub medicamentos: Vec<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A prescription line ("receita") linking a consultation to one medication,
/// carrying the prescription-specific dosage and instructions.
///
/// Owned by its consultation: deleted when the consultation is deleted,
/// editable independently through its own edit flow.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConsMedicamento {
    pub id: u64,
    pub consulta_id: u64,
    pub medicamento_id: u64,
    pub dosagem: String,
    #[serde(default)]
    pub instrucoes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A standardized diagnosis code.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cid {
    pub id: u64,
    pub codigo: String,
    pub descricao: String,
}

/// A medication known to the system.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Medicamento {
    pub id: u64,
    pub nome: String,
    #[serde(default)]
    pub apresentacao: String,
}

/// A patient known to the system.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Paciente {
    pub id: u64,
    pub nome: String,
}

/// The treating professional. Looked up by primary key equal to the
/// authenticated user's id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Medico {
    pub id: u64,
    pub nome: String,
    #[serde(default)]
    pub crm: String,
}
