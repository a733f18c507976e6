use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvalError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Metric {metric} failed: {message}")]
    Metric { metric: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl EvalError {
    pub fn metric(metric: impl Into<String>, message: impl Into<String>) -> Self {
        EvalError::Metric {
            metric: metric.into(),
            message: message.into(),
        }
    }

    /// Whether this error must abort the whole run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, EvalError::Metric { .. })
    }
}

pub type Result<T> = std::result::Result<T, EvalError>;

// Implement From for common error types
impl From<serde_json::Error> for EvalError {
    fn from(err: serde_json::Error) -> Self {
        EvalError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for EvalError {
    fn from(err: std::io::Error) -> Self {
        EvalError::Io(err.to_string())
    }
}

impl From<validator::ValidationErrors> for EvalError {
    fn from(err: validator::ValidationErrors) -> Self {
        EvalError::Config(err.to_string())
    }
}
