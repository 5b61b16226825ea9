use tracing::debug;

use crate::adapter::{SourceAdapter, normalize_query};
use crate::error::FetchError;
use crate::item::{SourceItem, SourceKind, Technology};

use super::company_domain;

/// Mocked-list adapter returning the detected technologies for a company's domain.
#[derive(Debug, Clone)]
pub struct TechStackAdapter {
    entries: Vec<Technology>,
}

fn tech(technology: &str, category: &str, description: &str, confidence: &str) -> Technology {
    Technology {
        technology: technology.to_string(),
        category: category.to_string(),
        description: description.to_string(),
        confidence: confidence.to_string(),
    }
}

impl Default for TechStackAdapter {
    fn default() -> Self {
        Self::with_entries(vec![
            tech(
                "React",
                "JavaScript Framework",
                "A JavaScript library for building user interfaces",
                "High",
            ),
            tech(
                "Cloudflare",
                "CDN",
                "Content delivery network and security services",
                "Medium",
            ),
            tech(
                "Vercel",
                "Hosting",
                "Platform for frontend frameworks and static sites",
                "Medium",
            ),
        ])
    }
}

impl TechStackAdapter {
    pub fn with_entries(entries: Vec<Technology>) -> Self {
        Self { entries }
    }
}

#[async_trait::async_trait]
impl SourceAdapter for TechStackAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::MockedList
    }

    fn name(&self) -> &'static str {
        "tech_stack"
    }

    async fn fetch(&self, query: &str) -> Result<Vec<SourceItem>, FetchError> {
        let domain = company_domain(normalize_query(query)?);
        debug!(event = "source.tech_stack_lookup", domain = %domain);
        Ok(self
            .entries
            .iter()
            .cloned()
            .map(SourceItem::Technology)
            .collect())
    }
}
