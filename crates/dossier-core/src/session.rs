use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::info;
use uuid::Uuid;

use crate::controller::TopicController;
use crate::error::SessionError;
use crate::state::StreamState;

/// The query currently on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub id: Uuid,
    pub query: String,
    pub submitted_at: DateTime<Utc>,
    /// Set by `stop`; the content stays visible until the next reset.
    pub stopped: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicSnapshot {
    pub id: String,
    pub title: String,
    pub state: StreamState,
}

/// Point-in-time view of the whole dashboard, topics in registration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub session: Option<SessionState>,
    pub active: bool,
    pub topics: Vec<TopicSnapshot>,
}

/// Owns every topic controller for the current query and drives them as a group.
#[derive(Debug)]
pub struct SessionController {
    topics: Vec<TopicController>,
    state: Option<SessionState>,
}

impl SessionController {
    pub fn new(topics: Vec<TopicController>) -> Result<Self, SessionError> {
        let mut seen = HashSet::new();
        for topic in &topics {
            if !seen.insert(topic.id().to_string()) {
                return Err(SessionError::DuplicateTopic(topic.id().to_string()));
            }
        }
        Ok(Self {
            topics,
            state: None,
        })
    }

    /// Resets every topic, then starts all of them without waiting on any.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&mut self, query: &str) -> Result<(), SessionError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SessionError::EmptyQuery);
        }
        for topic in &mut self.topics {
            topic.reset();
        }
        for topic in &mut self.topics {
            topic.start(query);
        }
        let session = SessionState {
            id: Uuid::new_v4(),
            query: query.to_string(),
            submitted_at: Utc::now(),
            stopped: false,
        };
        info!(
            event = "session.submitted",
            session_id = %session.id,
            topics = self.topics.len()
        );
        self.state = Some(session);
        Ok(())
    }

    /// Cancels every topic. Last-known content stays visible.
    pub fn stop(&mut self) {
        for topic in &mut self.topics {
            topic.stop();
        }
        if let Some(session) = &mut self.state
            && !session.stopped
        {
            session.stopped = true;
            info!(event = "session.stopped", session_id = %session.id);
        }
    }

    /// Stops everything and returns every topic to `Idle`. Idempotent.
    pub fn reset(&mut self) {
        self.stop();
        for topic in &mut self.topics {
            topic.reset();
        }
        if let Some(session) = self.state.take() {
            info!(event = "session.reset", session_id = %session.id);
        }
    }

    pub fn is_active(&self) -> bool {
        self.topics.iter().any(TopicController::is_active)
    }

    /// Ids of topics currently fetching or streaming.
    pub fn active_topics(&self) -> Vec<&str> {
        self.topics
            .iter()
            .filter(|topic| topic.is_active())
            .map(TopicController::id)
            .collect()
    }

    /// Resolves once no topic is fetching or streaming.
    pub async fn wait_idle(&self) {
        for mut rx in self.topics.iter().map(TopicController::subscribe) {
            let _ = rx.wait_for(|state| !state.phase.is_active()).await;
        }
    }

    pub fn session(&self) -> Option<&SessionState> {
        self.state.as_ref()
    }

    pub fn topics(&self) -> &[TopicController] {
        &self.topics
    }

    pub fn topic(&self, id: &str) -> Option<&TopicController> {
        self.topics.iter().find(|topic| topic.id() == id)
    }

    pub fn subscribe(&self, id: &str) -> Result<watch::Receiver<StreamState>, SessionError> {
        self.topic(id)
            .map(TopicController::subscribe)
            .ok_or_else(|| SessionError::UnknownTopic(id.to_string()))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session: self.state.clone(),
            active: self.is_active(),
            topics: self
                .topics
                .iter()
                .map(|topic| TopicSnapshot {
                    id: topic.id().to_string(),
                    title: topic.title().to_string(),
                    state: topic.snapshot(),
                })
                .collect(),
        }
    }
}
