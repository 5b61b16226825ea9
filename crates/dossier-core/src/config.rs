use std::time::Duration;

use dossier_completion::vendors::openai::API_KEY_ENV_VARS;

use crate::error::ConfigError;

pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_REDDIT_BASE_URL: &str = "https://www.reddit.com";
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_STREAM_TIMEOUT: Duration = Duration::from_secs(120);

/// Whether the query names an organisation or an individual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubjectKind {
    #[default]
    Company,
    Person,
}

impl SubjectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SubjectKind::Company => "company",
            SubjectKind::Person => "person",
        }
    }
}

/// Everything the dashboard needs, resolved once and passed in at
/// construction. Nothing reads the environment after this is built.
#[derive(Clone)]
pub struct DashboardConfig {
    /// API key for the completion provider. Absence fails each topic, not startup.
    pub credential: Option<String>,
    pub model: String,
    pub openai_base_url: String,
    pub reddit_base_url: String,
    pub user_agent: Option<String>,
    pub subject: SubjectKind,
    pub source_timeout: Duration,
    pub stream_timeout: Duration,
    /// Topic ids to run, in order. `None` runs the full standard set.
    pub topics: Option<Vec<String>>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            credential: None,
            model: DEFAULT_MODEL.to_string(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            reddit_base_url: DEFAULT_REDDIT_BASE_URL.to_string(),
            user_agent: None,
            subject: SubjectKind::Company,
            source_timeout: DEFAULT_SOURCE_TIMEOUT,
            stream_timeout: DEFAULT_STREAM_TIMEOUT,
            topics: None,
        }
    }
}

impl DashboardConfig {
    /// Reads the process environment.
    ///
    /// - `DOSSIER_OPENAI_API_KEY`, then `OPENAI_API_KEY`: credential (optional).
    /// - `DOSSIER_MODEL`: completion model (default `gpt-4o`).
    /// - `DOSSIER_OPENAI_BASE_URL`, `DOSSIER_REDDIT_BASE_URL`: endpoint overrides.
    /// - `DOSSIER_USER_AGENT`: user agent for source requests.
    /// - `DOSSIER_SOURCE_TIMEOUT_MS`, `DOSSIER_STREAM_TIMEOUT_MS`: deadlines.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let credential = API_KEY_ENV_VARS.iter().find_map(|key| non_blank(*key));
        let millis = |key: &str, fallback: Duration| -> Result<Duration, ConfigError> {
            match non_blank(key) {
                None => Ok(fallback),
                Some(raw) => match raw.trim().parse::<u64>() {
                    Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
                    _ => Err(ConfigError::InvalidDuration {
                        key: key.to_string(),
                        value: raw,
                    }),
                },
            }
        };

        Ok(Self {
            credential,
            model: non_blank("DOSSIER_MODEL")
                .map(|m| m.trim().to_string())
                .unwrap_or(defaults.model),
            openai_base_url: non_blank("DOSSIER_OPENAI_BASE_URL")
                .unwrap_or(defaults.openai_base_url),
            reddit_base_url: non_blank("DOSSIER_REDDIT_BASE_URL")
                .unwrap_or(defaults.reddit_base_url),
            user_agent: non_blank("DOSSIER_USER_AGENT"),
            subject: defaults.subject,
            source_timeout: millis("DOSSIER_SOURCE_TIMEOUT_MS", defaults.source_timeout)?,
            stream_timeout: millis("DOSSIER_STREAM_TIMEOUT_MS", defaults.stream_timeout)?,
            topics: None,
        })
    }

    pub fn credential(mut self, credential: Option<String>) -> Self {
        self.credential = credential.filter(|key| !key.trim().is_empty());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Result<Self, ConfigError> {
        let model = model.into();
        if model.trim().is_empty() {
            return Err(ConfigError::Blank {
                key: "model".to_string(),
            });
        }
        self.model = model;
        Ok(self)
    }

    pub fn subject(mut self, subject: SubjectKind) -> Self {
        self.subject = subject;
        self
    }

    pub fn topics(mut self, topics: Vec<String>) -> Self {
        self.topics = (!topics.is_empty()).then_some(topics);
        self
    }

    pub fn source_timeout(mut self, timeout: Duration) -> Self {
        self.source_timeout = timeout;
        self
    }

    pub fn stream_timeout(mut self, timeout: Duration) -> Self {
        self.stream_timeout = timeout;
        self
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }
}

impl std::fmt::Debug for DashboardConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardConfig")
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("openai_base_url", &self.openai_base_url)
            .field("reddit_base_url", &self.reddit_base_url)
            .field("user_agent", &self.user_agent)
            .field("subject", &self.subject)
            .field("source_timeout", &self.source_timeout)
            .field("stream_timeout", &self.stream_timeout)
            .field("topics", &self.topics)
            .finish()
    }
}
