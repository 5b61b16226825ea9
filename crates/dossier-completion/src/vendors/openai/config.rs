use std::time::Duration;

/// Environment variables consulted for the API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["DOSSIER_OPENAI_API_KEY", "OPENAI_API_KEY"];

/// Configuration for the OpenAI provider client.
#[derive(Clone)]
pub struct OpenAiClientConfig {
    /// API key used for bearer auth. `None` is allowed at construction; every
    /// request then fails fast with `CompletionError::MissingCredential`.
    pub api_key: Option<String>,
    /// Base URL for the OpenAI-compatible endpoint.
    ///
    /// Useful for proxies or local test servers.
    pub base_url: String,
    /// Default HTTP timeout for a request, including the streamed body.
    pub timeout: Duration,
}

impl OpenAiClientConfig {
    /// Creates a config with defaults and a provided API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::unauthenticated()
        }
    }

    /// Creates a config with defaults and no API key.
    pub fn unauthenticated() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com".to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    /// Builds a config from the first non-blank of [`API_KEY_ENV_VARS`].
    ///
    /// A missing key is not an error here.
    pub fn from_env() -> Self {
        let api_key = API_KEY_ENV_VARS
            .iter()
            .filter_map(|key| std::env::var(key).ok())
            .find(|value| !value.trim().is_empty());
        Self {
            api_key,
            ..Self::unauthenticated()
        }
    }

    /// Overrides the API key.
    pub fn api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Overrides the API base URL (for proxies or test servers).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the default HTTP timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// True when a non-blank API key is present.
    pub fn has_credential(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }

    pub(crate) fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl std::fmt::Debug for OpenAiClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClientConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_completions_url_trims_trailing_slash() {
        let config = OpenAiClientConfig::new("sk-test").base_url("http://localhost:8080/");
        assert_eq!(
            config.chat_completions_url(),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn blank_key_is_not_a_credential() {
        assert!(!OpenAiClientConfig::unauthenticated().has_credential());
        assert!(!OpenAiClientConfig::new("   ").has_credential());
        assert!(OpenAiClientConfig::new("sk-test").has_credential());
    }

    #[test]
    fn debug_output_redacts_key() {
        let rendered = format!("{:?}", OpenAiClientConfig::new("sk-secret"));
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
