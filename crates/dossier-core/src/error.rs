use dossier_completion::CompletionError;
use dossier_sources::FetchError;

/// Invalid environment configuration.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a positive number of milliseconds, got '{value}'")]
    InvalidDuration { key: String, value: String },
    #[error("{key} must not be blank")]
    Blank { key: String },
}

/// Rejected session-level operations.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("query must not be empty")]
    EmptyQuery,
    #[error("unknown topic '{0}'")]
    UnknownTopic(String),
    #[error("topic '{0}' is registered twice")]
    DuplicateTopic(String),
}

/// Failures while assembling the dashboard from a config.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error(transparent)]
    Completion(#[from] CompletionError),
    #[error("http client: {0}")]
    Http(#[from] FetchError),
    #[error(transparent)]
    Session(#[from] SessionError),
}
