//! Built-in adapters, one per source kind.
//!
//! Only the keyword search talks to a live endpoint; the other three are demo
//! stand-ins that synthesize deterministic records from the query.

mod company;
mod news;
mod reddit;
mod tech_stack;

pub use company::CompanyLookupAdapter;
pub use news::NewsFeedAdapter;
pub use reddit::{RedditSearchAdapter, RedditSearchConfig};
pub use tech_stack::TechStackAdapter;

/// Derives a `.com` domain from a company name: lowercase, whitespace removed.
pub fn company_domain(name: &str) -> String {
    let compact: String = name
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    format!("{compact}.com")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn company_domain_lowercases_and_strips_whitespace() {
        assert_eq!(company_domain(" Acme Rocket Works "), "acmerocketworks.com");
        assert_eq!(company_domain("OpenAI"), "openai.com");
    }
}
