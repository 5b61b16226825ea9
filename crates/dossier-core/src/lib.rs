//! Concurrent multi-topic dashboard runtime.
//!
//! Each [`TopicController`] fetches supporting records through a source
//! adapter, then streams a completion seeded with them, publishing a
//! [`StreamState`] on a watch channel. A [`SessionController`] fans one query
//! out to every topic and can stop or reset them together.

pub mod config;
pub mod controller;
pub mod dashboard;
pub mod error;
pub mod observability;
pub mod prompts;
pub mod session;
pub mod state;
pub mod topic;

#[cfg(test)]
mod test_support;

pub use config::{DashboardConfig, SubjectKind};
pub use controller::TopicController;
pub use dashboard::{StandardSources, build_session, build_session_with, standard_topics};
pub use error::{ConfigError, SessionError, SetupError};
pub use observability::init_observability;
pub use session::{SessionController, SessionSnapshot, SessionState, TopicSnapshot};
pub use state::{Phase, StreamState};
pub use topic::{FetchPolicy, PromptFn, TopicSpec};
