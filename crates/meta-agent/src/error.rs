use thiserror::Error;

/// Errors from the insight accumulator.
#[derive(Debug, Error)]
pub enum AgentError {
    /// A record could not be brought into canonical JSON form.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Writing an insight batch to storage failed.
    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<std::io::Error> for AgentError {
    fn from(e: std::io::Error) -> Self {
        AgentError::Persistence(e.to_string())
    }
}

impl From<config::ConfigError> for AgentError {
    fn from(e: config::ConfigError) -> Self {
        AgentError::InvalidConfig(e.to_string())
    }
}

/// Convenience type alias for accumulator results.
pub type AgentResult<T> = Result<T, AgentError>;
