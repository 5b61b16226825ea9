//! Typed records produced by source adapters.
//!
//! Each adapter emits exactly one variant; downstream code matches on the tag
//! instead of inspecting fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which kind of source produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    KeywordSearch,
    StructuredLookup,
    GenericInfo,
    MockedList,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::KeywordSearch => "keyword_search",
            Self::StructuredLookup => "structured_lookup",
            Self::GenericInfo => "generic_info",
            Self::MockedList => "mocked_list",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A community discussion post found by keyword search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub title: String,
    pub content: String,
    pub community: String,
    pub author: String,
    pub score: i64,
    pub comment_count: u64,
    pub url: String,
    pub created_utc: i64,
}

/// A structured company profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub name: String,
    pub description: String,
    pub industry: String,
    pub headcount: String,
    pub founded: Option<u16>,
    pub headquarters: String,
    pub website: String,
}

/// A free-text news or social record with engagement counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub text: String,
    pub author: String,
    pub published_at: DateTime<Utc>,
    pub likes: u64,
    pub shares: u64,
    pub replies: u64,
}

/// One entry of a detected technology list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technology {
    pub technology: String,
    pub category: String,
    pub description: String,
    pub confidence: String,
}

/// A record from any source, tagged by shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceItem {
    Post(Post),
    Company(CompanyRecord),
    Article(Article),
    Technology(Technology),
}

const POST_EXCERPT_CHARS: usize = 200;

impl SourceItem {
    /// The source kind this variant belongs to.
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Post(_) => SourceKind::KeywordSearch,
            Self::Company(_) => SourceKind::StructuredLookup,
            Self::Article(_) => SourceKind::GenericInfo,
            Self::Technology(_) => SourceKind::MockedList,
        }
    }

    /// Short one-line label for list displays.
    pub fn headline(&self) -> &str {
        match self {
            Self::Post(post) => &post.title,
            Self::Company(company) => &company.name,
            Self::Article(article) => &article.text,
            Self::Technology(tech) => &tech.technology,
        }
    }

    /// Multi-line block used as model context.
    pub fn context_block(&self) -> String {
        match self {
            Self::Post(post) => {
                let excerpt: String = post.content.chars().take(POST_EXCERPT_CHARS).collect();
                format!(
                    "Title: {}\nSubreddit: r/{}\nScore: {}\nComments: {}\nContent: {}...",
                    post.title, post.community, post.score, post.comment_count, excerpt
                )
            }
            Self::Company(company) => {
                let founded = company
                    .founded
                    .map(|year| year.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                format!(
                    "Name: {}\nDescription: {}\nIndustry: {}\nEmployee Count: {}\nFounded: {}\nHeadquarters: {}\nWebsite: {}",
                    company.name,
                    company.description,
                    company.industry,
                    company.headcount,
                    founded,
                    company.headquarters,
                    company.website
                )
            }
            Self::Article(article) => format!(
                "Article: {}\nSource: {}\nEngagement: {} likes, {} shares\nDate: {}",
                article.text,
                article.author,
                article.likes,
                article.shares,
                article.published_at.to_rfc3339()
            ),
            Self::Technology(tech) => format!(
                "Technology: {}\nCategory: {}\nDescription: {}\nConfidence: {}",
                tech.technology, tech.category, tech.description, tech.confidence
            ),
        }
    }
}

/// Joins context blocks with blank lines.
pub fn render_context(items: &[SourceItem]) -> String {
    items
        .iter()
        .map(SourceItem::context_block)
        .collect::<Vec<_>>()
        .join("\n\n")
}
