//! HTTP seam for live adapters.
//! Adapters take an `Arc<dyn HttpRequester>` so tests can answer without a network.

mod reqwest_requester;

use std::time::Duration;

use crate::error::FetchError;

pub use reqwest_requester::ReqwestHttpRequester;

/// One GET request issued by an adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpGet {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub timeout: Duration,
}

impl HttpGet {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            timeout,
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// Performs GET requests and returns the body of a successful response.
///
/// Non-success statuses map to [`FetchError::Status`].
#[async_trait::async_trait]
pub trait HttpRequester: Send + Sync {
    async fn get(&self, request: HttpGet) -> Result<String, FetchError>;
}

pub(crate) fn url_host(url: &str) -> &str {
    let without_scheme = url.split("://").nth(1).unwrap_or(url);
    without_scheme
        .split('/')
        .next()
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_host_strips_scheme_and_path() {
        assert_eq!(url_host("https://www.reddit.com/search.json"), "www.reddit.com");
        assert_eq!(url_host("localhost:8080/x"), "localhost:8080");
        assert_eq!(url_host(""), "unknown");
    }

    #[test]
    fn http_get_collects_params_in_order() {
        let req = HttpGet::new("https://x.test", Duration::from_secs(1))
            .param("q", "Acme")
            .param("limit", "10");
        assert_eq!(
            req.query,
            vec![
                ("q".to_string(), "Acme".to_string()),
                ("limit".to_string(), "10".to_string())
            ]
        );
    }
}
