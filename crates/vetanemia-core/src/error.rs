use thiserror::Error;

/// Core error types for VetAnemia client operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid value for {field}: {value:?}")]
    InvalidLabValue { field: String, value: String },

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Unknown risk level: {0}")]
    InvalidRiskLevel(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl CoreError {
    /// Create a new InvalidLabValue error
    pub fn invalid_lab_value(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidLabValue {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a new MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    /// Errors caused by what the user typed, as opposed to the environment
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidLabValue { .. } | Self::MissingField(_) | Self::InvalidRiskLevel(_)
        )
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
