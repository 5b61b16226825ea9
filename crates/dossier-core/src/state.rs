use std::sync::Arc;

use dossier_sources::SourceItem;
use serde::Serialize;

/// Lifecycle of one topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Fetching,
    Streaming,
    Done,
    Failed,
    /// Cancelled mid-flight; content gathered so far stays visible.
    Stopped,
}

impl Phase {
    /// `Fetching` or `Streaming`.
    pub fn is_active(self) -> bool {
        matches!(self, Phase::Fetching | Phase::Streaming)
    }

    /// `Done`, `Failed` or `Stopped`. No writes are accepted in these phases.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Done | Phase::Failed | Phase::Stopped)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Fetching => "fetching",
            Phase::Streaming => "streaming",
            Phase::Done => "done",
            Phase::Failed => "failed",
            Phase::Stopped => "stopped",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observable state of one topic.
///
/// `buffer` only grows while a run is live; it is replaced wholesale only by
/// a reset or a new start.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamState {
    pub phase: Phase,
    pub buffer: String,
    pub error: Option<String>,
    /// Non-fatal source failure; the topic continued with no source data.
    pub warning: Option<String>,
    pub source_items: Arc<[SourceItem]>,
}

impl Default for StreamState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            buffer: String::new(),
            error: None,
            warning: None,
            source_items: Arc::from(Vec::new()),
        }
    }
}

impl StreamState {
    pub(crate) fn fetching() -> Self {
        Self {
            phase: Phase::Fetching,
            ..Self::default()
        }
    }

    pub(crate) fn failed(error: impl Into<String>) -> Self {
        Self {
            phase: Phase::Failed,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_idle_and_empty() {
        let state = StreamState::default();
        assert_eq!(state.phase, Phase::Idle);
        assert!(state.buffer.is_empty());
        assert!(state.error.is_none());
        assert!(state.warning.is_none());
        assert!(state.source_items.is_empty());
    }

    #[test]
    fn only_fetching_and_streaming_are_active() {
        let active: Vec<Phase> = [
            Phase::Idle,
            Phase::Fetching,
            Phase::Streaming,
            Phase::Done,
            Phase::Failed,
            Phase::Stopped,
        ]
        .into_iter()
        .filter(|phase| phase.is_active())
        .collect();
        assert_eq!(active, vec![Phase::Fetching, Phase::Streaming]);
        assert!(!Phase::Idle.is_terminal());
        assert!(Phase::Stopped.is_terminal());
    }

    #[test]
    fn serializes_phase_in_snake_case() {
        let json = serde_json::to_value(StreamState::failed("boom")).expect("json");
        assert_eq!(json["phase"], "failed");
        assert_eq!(json["error"], "boom");
        assert_eq!(json["source_items"], serde_json::json!([]));
    }
}
