/// Failure of a single source fetch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The query was blank after trimming.
    #[error("query must not be empty")]
    InvalidQuery,
    /// Upstream answered with a non-success HTTP status.
    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },
    /// Network or connection failure.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The fetch did not finish within its deadline.
    #[error("source timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },
    /// The payload could not be parsed into records.
    #[error("malformed payload: {0}")]
    Malformed(String),
}

impl FetchError {
    /// Stable code used in structured log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidQuery => "source.invalid_query",
            Self::Status { status: 401, .. } => "http.auth.401",
            Self::Status { status: 403, .. } => "http.forbidden.403",
            Self::Status { status: 429, .. } => "http.rate_limited.429",
            Self::Status { status, .. } if *status >= 500 => "http.server_error.5xx",
            Self::Status { .. } => "http.invalid_request",
            Self::Transport(_) => "http.transport",
            Self::Timeout { .. } => "http.timeout",
            Self::Malformed(_) => "source.malformed_payload",
        }
    }
}
