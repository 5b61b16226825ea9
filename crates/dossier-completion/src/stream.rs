use crate::{errors::StreamFailure, model::ProviderId};

/// Normalized stream events exposed by `CompletionStream`.
#[derive(Clone, Debug, PartialEq)]
pub enum StreamEvent {
    /// First event for every stream.
    Started {
        run_id: uuid::Uuid,
        provider: ProviderId,
        model: String,
    },
    /// One non-empty text increment, numbered from zero.
    Increment {
        run_id: uuid::Uuid,
        seq: u64,
        text: String,
    },
    /// Terminal success event.
    Completed {
        run_id: uuid::Uuid,
        increments: u64,
        finish_reason: Option<String>,
    },
    /// Terminal failure event.
    Error {
        run_id: uuid::Uuid,
        error: StreamFailure,
    },
}

impl StreamEvent {
    /// True for `Completed` and `Error`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Error { .. })
    }
}
