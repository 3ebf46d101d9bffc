use thiserror::Error;

#[derive(Error, Debug)]
pub enum XrdError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Shape mismatch in {context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Linear algebra error: {0}")]
    LinAlg(String),
}

pub type XrdResult<T> = Result<T, XrdError>;
