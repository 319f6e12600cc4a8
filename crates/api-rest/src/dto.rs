//! JSON bodies for the consultation resources.

use prontuario_core::{Consulta, ConsultaDraft};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Serialized consultation, as returned by every endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ConsultaRes {
    pub id: u64,
    /// Patient catalog reference.
    pub paciente: u64,
    pub observacoes: String,
    pub cids: Vec<u64>,
    pub medicamentos: Vec<u64>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Consulta> for ConsultaRes {
    fn from(consulta: Consulta) -> Self {
        Self {
            id: consulta.id,
            paciente: consulta.paciente_id,
            observacoes: consulta.observacoes,
            cids: consulta.cids,
            medicamentos: consulta.medicamentos,
            created_at: consulta.created_at.to_rfc3339(),
            updated_at: consulta.updated_at.to_rfc3339(),
        }
    }
}

/// Create/replace payload. Fields are optional at the deserialization level
/// so a missing patient reference surfaces as a field-level validation error
/// (400) rather than a body-rejection.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct ConsultaPayload {
    #[serde(default)]
    pub paciente: Option<u64>,
    #[serde(default)]
    pub observacoes: Option<String>,
    #[serde(default)]
    pub cids: Vec<u64>,
    #[serde(default)]
    pub medicamentos: Vec<u64>,
}

impl ConsultaPayload {
    pub fn into_draft(self) -> ConsultaDraft {
        ConsultaDraft {
            paciente_id: self.paciente,
            observacoes: self.observacoes.unwrap_or_default(),
            cids: self.cids,
            medicamentos: self.medicamentos,
        }
    }
}
