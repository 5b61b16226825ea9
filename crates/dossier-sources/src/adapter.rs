use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::FetchError;
use crate::item::{SourceItem, SourceKind};

/// Normalizes one external data source into typed records.
///
/// `fetch` completes once per query; there is no partial delivery.
#[async_trait::async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Kind of records this adapter produces.
    fn kind(&self) -> SourceKind;

    /// Short name used in logs (for example `reddit`).
    fn name(&self) -> &'static str;

    /// Fetches records for a query, in source order.
    async fn fetch(&self, query: &str) -> Result<Vec<SourceItem>, FetchError>;
}

/// Result of a fetch after the degrade policy: records plus an optional warning.
#[derive(Debug, Clone)]
pub struct SourceOutcome {
    pub items: Arc<[SourceItem]>,
    pub warning: Option<FetchError>,
}

impl SourceOutcome {
    pub fn ok(items: Vec<SourceItem>) -> Self {
        Self {
            items: items.into(),
            warning: None,
        }
    }

    /// Empty result carrying the failure as a warning.
    pub fn degraded(error: FetchError) -> Self {
        Self {
            items: Arc::from(Vec::new()),
            warning: Some(error),
        }
    }
}

/// Trims the query and rejects blank input.
pub fn normalize_query(query: &str) -> Result<&str, FetchError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        Err(FetchError::InvalidQuery)
    } else {
        Ok(trimmed)
    }
}

/// Runs `fetch` under an optional deadline.
pub async fn fetch_with_timeout(
    adapter: &dyn SourceAdapter,
    query: &str,
    timeout: Option<Duration>,
) -> Result<Vec<SourceItem>, FetchError> {
    debug!(
        event = "source.fetch_started",
        source = adapter.name(),
        kind = %adapter.kind()
    );
    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, adapter.fetch(query)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                after_ms: limit.as_millis() as u64,
            }),
        },
        None => adapter.fetch(query).await,
    };
    if let Ok(items) = &result {
        debug!(
            event = "source.fetch_succeeded",
            source = adapter.name(),
            items = items.len() as u64
        );
    }
    result
}

/// Fetches and converts any failure into an empty, warned outcome.
///
/// A source outage degrades one panel, never the caller.
pub async fn fetch_or_degrade(
    adapter: &dyn SourceAdapter,
    query: &str,
    timeout: Option<Duration>,
) -> SourceOutcome {
    match fetch_with_timeout(adapter, query, timeout).await {
        Ok(items) => SourceOutcome::ok(items),
        Err(err) => {
            warn!(
                event = "source.fetch_degraded",
                source = adapter.name(),
                code = err.code(),
                error = %err
            );
            SourceOutcome::degraded(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Technology;

    struct Slow;

    #[async_trait::async_trait]
    impl SourceAdapter for Slow {
        fn kind(&self) -> SourceKind {
            SourceKind::MockedList
        }

        fn name(&self) -> &'static str {
            "slow"
        }

        async fn fetch(&self, _query: &str) -> Result<Vec<SourceItem>, FetchError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec![SourceItem::Technology(Technology {
                technology: "late".into(),
                category: String::new(),
                description: String::new(),
                confidence: String::new(),
            })])
        }
    }

    struct Broken;

    #[async_trait::async_trait]
    impl SourceAdapter for Broken {
        fn kind(&self) -> SourceKind {
            SourceKind::KeywordSearch
        }

        fn name(&self) -> &'static str {
            "broken"
        }

        async fn fetch(&self, _query: &str) -> Result<Vec<SourceItem>, FetchError> {
            Err(FetchError::Status {
                status: 502,
                body: "bad gateway".into(),
            })
        }
    }

    #[test]
    fn normalize_query_trims_and_rejects_blank() {
        assert_eq!(normalize_query("  Acme "), Ok("Acme"));
        assert_eq!(normalize_query(" \t"), Err(FetchError::InvalidQuery));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_maps_to_fetch_error() {
        let result = fetch_with_timeout(&Slow, "Acme", Some(Duration::from_millis(100))).await;
        assert_eq!(result, Err(FetchError::Timeout { after_ms: 100 }));
    }

    #[tokio::test]
    async fn degrade_returns_empty_items_with_warning() {
        let outcome = fetch_or_degrade(&Broken, "Acme", None).await;
        assert!(outcome.items.is_empty());
        assert!(matches!(
            outcome.warning,
            Some(FetchError::Status { status: 502, .. })
        ));
    }
}
