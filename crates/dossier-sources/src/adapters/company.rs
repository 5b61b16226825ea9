use crate::adapter::{SourceAdapter, normalize_query};
use crate::error::FetchError;
use crate::item::{CompanyRecord, SourceItem, SourceKind};

use super::company_domain;

/// Structured-lookup adapter returning one synthesized company profile.
#[derive(Debug, Clone)]
pub struct CompanyLookupAdapter {
    industry: String,
    headcount: String,
    headquarters: String,
}

impl Default for CompanyLookupAdapter {
    fn default() -> Self {
        Self {
            industry: "Technology".to_string(),
            headcount: "1000-5000".to_string(),
            headquarters: "San Francisco, CA".to_string(),
        }
    }
}

impl CompanyLookupAdapter {
    pub fn record_for(&self, name: &str) -> CompanyRecord {
        CompanyRecord {
            name: name.to_string(),
            description: format!(
                "{name} is a leading technology company focused on innovation and digital transformation."
            ),
            industry: self.industry.clone(),
            headcount: self.headcount.clone(),
            founded: None,
            headquarters: self.headquarters.clone(),
            website: format!("https://{}", company_domain(name)),
        }
    }
}

#[async_trait::async_trait]
impl SourceAdapter for CompanyLookupAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::StructuredLookup
    }

    fn name(&self) -> &'static str {
        "company_lookup"
    }

    async fn fetch(&self, query: &str) -> Result<Vec<SourceItem>, FetchError> {
        let name = normalize_query(query)?;
        Ok(vec![SourceItem::Company(self.record_for(name))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_single_record_named_after_query() {
        let items = CompanyLookupAdapter::default()
            .fetch(" Acme Rockets ")
            .await
            .expect("fetch");
        assert_eq!(items.len(), 1);
        let SourceItem::Company(record) = &items[0] else {
            panic!("expected company record");
        };
        assert_eq!(record.name, "Acme Rockets");
        assert_eq!(record.website, "https://acmerockets.com");
        assert_eq!(record.industry, "Technology");
        assert!(record.description.starts_with("Acme Rockets is"));
    }
}
