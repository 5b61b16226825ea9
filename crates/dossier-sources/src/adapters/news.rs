use chrono::{Duration, Utc};

use crate::adapter::{SourceAdapter, normalize_query};
use crate::error::FetchError;
use crate::item::{Article, SourceItem, SourceKind};

/// Generic-info adapter returning recent headline records about the query.
#[derive(Debug, Clone, Default)]
pub struct NewsFeedAdapter;

#[async_trait::async_trait]
impl SourceAdapter for NewsFeedAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::GenericInfo
    }

    fn name(&self) -> &'static str {
        "news_feed"
    }

    async fn fetch(&self, query: &str) -> Result<Vec<SourceItem>, FetchError> {
        let name = normalize_query(query)?;
        let now = Utc::now();
        Ok(vec![
            SourceItem::Article(Article {
                text: format!(
                    "Breaking: {name} announces new AI initiative that could revolutionize the industry"
                ),
                author: "TechCrunch".to_string(),
                published_at: now,
                likes: 423,
                shares: 156,
                replies: 89,
            }),
            SourceItem::Article(Article {
                text: format!("{name}'s latest quarterly results show strong growth in key markets"),
                author: "Bloomberg".to_string(),
                published_at: now - Duration::hours(1),
                likes: 234,
                shares: 87,
                replies: 45,
            }),
        ])
    }
}
