//! Shared response envelopes.

use prontuario_core::FieldErrors;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Generic message body used for not-found and confirmation responses.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageRes {
    pub message: String,
}

impl MessageRes {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Validation failure body: the operation-level message plus field-keyed
/// detail, for create and update alike.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidationErrorRes {
    pub message: String,
    #[schema(value_type = Object)]
    pub errors: FieldErrors,
}

impl ValidationErrorRes {
    pub fn new(message: impl Into<String>, errors: FieldErrors) -> Self {
        Self {
            message: message.into(),
            errors,
        }
    }
}
