use thiserror::Error;

/// Errors raised by the model capability layer. These never cross the HTTP
/// boundary raw; every call site converts them into the endpoint's own
/// failure policy.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Request error: {0}")]
    Request(String),
    #[error("Response error: {0}")]
    Response(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("AWS error: {0}")]
    Aws(String),
    #[error("AWS service error: {0}")]
    AwsService(String),
    #[error("Deadline exceeded: {0}")]
    DeadlineExceeded(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
