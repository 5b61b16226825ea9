use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::adapter::{SourceAdapter, normalize_query};
use crate::error::FetchError;
use crate::http::{HttpGet, HttpRequester};
use crate::item::{Post, SourceItem, SourceKind};

/// Settings for the public Reddit search endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct RedditSearchConfig {
    pub base_url: String,
    pub limit: u32,
    pub sort: String,
    pub timeout: Duration,
}

impl Default for RedditSearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.reddit.com".to_string(),
            limit: 10,
            sort: "relevance".to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

/// Keyword-search adapter over Reddit's public `search.json`.
pub struct RedditSearchAdapter {
    config: RedditSearchConfig,
    requester: Arc<dyn HttpRequester>,
}

impl RedditSearchAdapter {
    pub fn new(config: RedditSearchConfig, requester: Arc<dyn HttpRequester>) -> Self {
        Self { config, requester }
    }

    fn search_url(&self) -> String {
        format!("{}/search.json", self.config.base_url.trim_end_matches('/'))
    }
}

#[derive(Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<ListingChild>,
}

#[derive(Deserialize)]
struct ListingChild {
    data: RawPost,
}

#[derive(Deserialize)]
struct RawPost {
    #[serde(default)]
    title: String,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    subreddit: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    num_comments: u64,
    #[serde(default)]
    permalink: String,
    #[serde(default)]
    created_utc: f64,
}

impl From<RawPost> for Post {
    fn from(raw: RawPost) -> Self {
        Post {
            title: raw.title,
            content: raw.selftext,
            community: raw.subreddit,
            author: raw.author,
            score: raw.score,
            comment_count: raw.num_comments,
            url: format!("https://reddit.com{}", raw.permalink),
            created_utc: raw.created_utc as i64,
        }
    }
}

pub(crate) fn parse_listing(body: &str) -> Result<Vec<SourceItem>, FetchError> {
    let listing: Listing =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;
    Ok(listing
        .data
        .children
        .into_iter()
        .map(|child| SourceItem::Post(child.data.into()))
        .collect())
}

#[async_trait::async_trait]
impl SourceAdapter for RedditSearchAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::KeywordSearch
    }

    fn name(&self) -> &'static str {
        "reddit"
    }

    async fn fetch(&self, query: &str) -> Result<Vec<SourceItem>, FetchError> {
        let query = normalize_query(query)?;
        let request = HttpGet::new(self.search_url(), self.config.timeout)
            .param("q", query)
            .param("limit", self.config.limit.to_string())
            .param("sort", self.config.sort.clone());
        let body = self.requester.get(request).await?;
        parse_listing(&body)
    }
}
