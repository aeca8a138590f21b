use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input for '{field}': {details}")]
    InvalidInput { field: String, details: String },

    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl EngineError {
    pub fn invalid_input(field: &str, details: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.to_string(),
            details: details.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
