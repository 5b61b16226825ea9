use tracing::debug;

use super::{HttpGet, HttpRequester, url_host};
use crate::error::FetchError;

const DEFAULT_USER_AGENT: &str = "dossier/0.1";
const ERROR_BODY_LIMIT: usize = 512;

/// Default requester backed by a shared async reqwest client.
#[derive(Clone)]
pub struct ReqwestHttpRequester {
    client: reqwest::Client,
}

impl ReqwestHttpRequester {
    /// Builds a requester; `None` uses the crate's default user agent.
    pub fn new(user_agent: Option<&str>) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent.unwrap_or(DEFAULT_USER_AGENT))
            .build()
            .map_err(|e| FetchError::Transport(format!("failed to build http client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl HttpRequester for ReqwestHttpRequester {
    async fn get(&self, request: HttpGet) -> Result<String, FetchError> {
        debug!(
            event = "http.request_attempt",
            domain = "http",
            url_host = url_host(&request.url),
            timeout_ms = request.timeout.as_millis() as u64
        );
        let timeout_ms = request.timeout.as_millis() as u64;
        let map_err = |e: reqwest::Error| {
            if e.is_timeout() {
                FetchError::Timeout {
                    after_ms: timeout_ms,
                }
            } else {
                FetchError::Transport(e.to_string())
            }
        };
        let resp = self
            .client
            .get(&request.url)
            .query(&request.query)
            .timeout(request.timeout)
            .send()
            .await
            .map_err(map_err)?;
        let status = resp.status();
        let text = resp.text().await.map_err(map_err)?;
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: text.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }
        debug!(
            event = "http.request_succeeded",
            domain = "http",
            response_bytes = text.len() as u64
        );
        Ok(text)
    }
}
