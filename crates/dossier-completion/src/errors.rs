use crate::model::ProviderId;

/// Errors returned by a provider before they are normalized for the public
/// completion stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// Provider returned an application-level failure (HTTP status, auth, etc.).
    #[error("provider error ({provider}): {message}")]
    Provider {
        provider: ProviderId,
        message: String,
        status_code: Option<u16>,
    },
    /// Transport or stream I/O failed.
    #[error("transport error ({provider}): {message}")]
    Transport {
        provider: ProviderId,
        message: String,
    },
    /// Provider response shape or event sequencing was invalid.
    #[error("protocol error ({provider}): {message}")]
    Protocol {
        provider: ProviderId,
        message: String,
    },
}

impl ProviderError {
    /// Creates a provider-level error.
    pub fn provider(
        provider: impl Into<ProviderId>,
        message: impl Into<String>,
        status_code: Option<u16>,
    ) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
            status_code,
        }
    }

    /// Creates a transport-level error.
    pub fn transport(provider: impl Into<ProviderId>, message: impl Into<String>) -> Self {
        Self::Transport {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Creates a protocol-level error.
    pub fn protocol(provider: impl Into<ProviderId>, message: impl Into<String>) -> Self {
        Self::Protocol {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Returns the provider associated with this error.
    pub fn provider_id(&self) -> &ProviderId {
        match self {
            Self::Provider { provider, .. }
            | Self::Transport { provider, .. }
            | Self::Protocol { provider, .. } => provider,
        }
    }

    /// Returns the human-readable message for this error.
    pub fn message(&self) -> &str {
        match self {
            Self::Provider { message, .. }
            | Self::Transport { message, .. }
            | Self::Protocol { message, .. } => message,
        }
    }
}

/// Terminal stream failure sent through `StreamEvent::Error`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, serde::Serialize, serde::Deserialize)]
pub enum StreamFailure {
    /// Provider returned a terminal failure.
    #[error("provider failure ({provider}): {message}")]
    Provider { provider: String, message: String },
    /// Network/stream transport failed.
    #[error("transport failure ({provider}): {message}")]
    Transport { provider: String, message: String },
    /// The client detected a protocol or invariant error.
    #[error("protocol failure: {message}")]
    Protocol { message: String },
    /// The per-stream deadline elapsed before the provider finished.
    #[error("stream timed out after {elapsed_ms} ms")]
    Timeout { elapsed_ms: u64 },
    /// The stream was cancelled by the caller.
    #[error("stream cancelled")]
    Cancelled,
}

/// Top-level error type for the public completion API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompletionError {
    /// No API credential is available; raised before any network call.
    #[error("credential not configured")]
    MissingCredential,
    /// Invalid client/provider configuration.
    #[error("config error: {0}")]
    Config(String),
    /// Invalid caller input to the builder API.
    #[error("validation error: {0}")]
    Validation(String),
    /// The request names a provider other than the one this client wraps.
    #[error("provider mismatch: client wraps {expected}, request asked for {requested}")]
    ProviderMismatch {
        expected: ProviderId,
        requested: ProviderId,
    },
    /// Terminal failure returned from a started stream.
    #[error(transparent)]
    StreamFailed(StreamFailure),
    /// Internal protocol misuse or invariant violation.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl CompletionError {
    pub(crate) fn protocol_msg(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }
}

impl From<StreamFailure> for CompletionError {
    fn from(value: StreamFailure) -> Self {
        CompletionError::StreamFailed(value)
    }
}

pub(crate) fn stream_failure_from_provider_error(err: &ProviderError) -> StreamFailure {
    match err {
        ProviderError::Provider {
            provider, message, ..
        } => StreamFailure::Provider {
            provider: provider.to_string(),
            message: message.clone(),
        },
        ProviderError::Transport { provider, message } => StreamFailure::Transport {
            provider: provider.to_string(),
            message: message.clone(),
        },
        ProviderError::Protocol { provider, message } => StreamFailure::Protocol {
            message: format!("provider={provider}: {message}"),
        },
    }
}
