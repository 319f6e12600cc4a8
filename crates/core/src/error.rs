use std::collections::BTreeMap;

/// Field-keyed validation messages, e.g. `{"paciente": ["Paciente inválido."]}`.
///
/// A `BTreeMap` keeps field ordering stable in serialized error bodies and in
/// rendered forms.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, thiserror::Error)]
pub enum ConsultaError {
    #[error("consulta not found")]
    NotFound,
    #[error("receita not found")]
    ReceitaNotFound,
    #[error("validation failed")]
    Validation(FieldErrors),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to create consulta directory: {0}")]
    ConsultaDirCreation(std::io::Error),
    #[error("failed to create receitas directory: {0}")]
    ReceitasDirCreation(std::io::Error),
    #[error("failed to write record file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read record file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to remove record: {0}")]
    FileRemove(std::io::Error),
    #[error("failed to serialize YAML: {0}")]
    YamlSerialization(serde_yaml::Error),
    #[error("failed to deserialize YAML: {0}")]
    YamlDeserialization(serde_yaml::Error),
}

pub type ConsultaResult<T> = std::result::Result<T, ConsultaError>;

impl ConsultaError {
    /// Field errors carried by a `Validation` error, if any.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ConsultaError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}
