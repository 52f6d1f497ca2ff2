use crate::speed::config::ConfigField;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid {field}: {input:?} is not a finite number")]
    Parse { field: ConfigField, input: String },

    #[error("Validation failed: {0}")]
    Validation(String),
}

impl CoreError {
    /// The configuration field that failed to parse, if this is a parse error.
    pub fn field(&self) -> Option<ConfigField> {
        match self {
            Self::Parse { field, .. } => Some(*field),
            Self::Validation(_) => None,
        }
    }
}
