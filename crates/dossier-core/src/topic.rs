use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use dossier_completion::{CompletionOptions, ModelRef};
use dossier_sources::{SourceAdapter, SourceItem};

/// Builds the user prompt from the query and the fetched records.
pub type PromptFn = Arc<dyn Fn(&str, &[SourceItem]) -> String + Send + Sync>;

/// What a failed fetch does to the topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPolicy {
    /// Continue with no records and surface the failure as a warning.
    #[default]
    Degrade,
    /// Fail the topic.
    Required,
}

/// Everything one dashboard panel needs to run: where its data comes from
/// and how the completion request is shaped.
#[derive(Clone)]
pub struct TopicSpec {
    pub id: String,
    pub title: String,
    pub model: ModelRef,
    pub system_instruction: Option<String>,
    pub prompt: PromptFn,
    pub options: CompletionOptions,
    pub source: Option<Arc<dyn SourceAdapter>>,
    pub fetch_policy: FetchPolicy,
    pub source_timeout: Option<Duration>,
    /// Shown instead of a completion when the source returns no records.
    pub empty_message: Option<String>,
}

impl TopicSpec {
    /// A source-less topic whose prompt is the query itself.
    pub fn new(id: impl Into<String>, title: impl Into<String>, model: ModelRef) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            model,
            system_instruction: None,
            prompt: Arc::new(|query, _| query.to_string()),
            options: CompletionOptions::default(),
            source: None,
            fetch_policy: FetchPolicy::Degrade,
            source_timeout: None,
            empty_message: None,
        }
    }

    pub fn system_instruction(mut self, text: impl Into<String>) -> Self {
        self.system_instruction = Some(text.into());
        self
    }

    pub fn prompt<F>(mut self, build: F) -> Self
    where
        F: Fn(&str, &[SourceItem]) -> String + Send + Sync + 'static,
    {
        self.prompt = Arc::new(build);
        self
    }

    pub fn options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn source(mut self, adapter: Arc<dyn SourceAdapter>) -> Self {
        self.source = Some(adapter);
        self
    }

    pub fn required_source(mut self) -> Self {
        self.fetch_policy = FetchPolicy::Required;
        self
    }

    pub fn source_timeout(mut self, timeout: Duration) -> Self {
        self.source_timeout = Some(timeout);
        self
    }

    pub fn empty_message(mut self, message: impl Into<String>) -> Self {
        self.empty_message = Some(message.into());
        self
    }

    pub fn render_prompt(&self, query: &str, items: &[SourceItem]) -> String {
        (self.prompt)(query, items)
    }
}

impl fmt::Debug for TopicSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TopicSpec")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("model", &self.model)
            .field("source", &self.source.as_ref().map(|s| s.name()))
            .field("fetch_policy", &self.fetch_policy)
            .field("source_timeout", &self.source_timeout)
            .field("empty_message", &self.empty_message)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_sources::adapters::TechStackAdapter;

    #[test]
    fn builder_sets_source_and_policy() {
        let spec = TopicSpec::new("tech", "Tech", ModelRef::new("openai", "gpt-4o"))
            .source(Arc::new(TechStackAdapter::default()))
            .required_source()
            .empty_message("nothing")
            .prompt(|query, items| format!("{query}:{}", items.len()));
        assert_eq!(spec.fetch_policy, FetchPolicy::Required);
        assert_eq!(spec.render_prompt("Acme", &[]), "Acme:0");
        let debug = format!("{spec:?}");
        assert!(debug.contains("tech_stack"));
    }

    #[test]
    fn default_prompt_is_the_query() {
        let spec = TopicSpec::new("about", "About", ModelRef::new("openai", "gpt-4o"));
        assert_eq!(spec.render_prompt("Acme", &[]), "Acme");
        assert!(spec.source.is_none());
    }
}
