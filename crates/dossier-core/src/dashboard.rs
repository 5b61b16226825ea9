//! Assembly of the standard five-topic dashboard.

use std::sync::Arc;

use dossier_completion::vendors::openai::{OpenAiClientConfig, OpenAiProvider};
use dossier_completion::{CompletionClient, CompletionOptions, ModelRef};
use dossier_sources::SourceAdapter;
use dossier_sources::adapters::{
    CompanyLookupAdapter, NewsFeedAdapter, RedditSearchAdapter, RedditSearchConfig,
    TechStackAdapter,
};
use dossier_sources::http::{HttpRequester, ReqwestHttpRequester};
use tracing::info;

use crate::config::DashboardConfig;
use crate::controller::TopicController;
use crate::error::{SessionError, SetupError};
use crate::prompts;
use crate::session::SessionController;
use crate::topic::TopicSpec;

pub const OVERVIEW: &str = "overview";
pub const SENTIMENT: &str = "sentiment";
pub const TECH_STACK: &str = "tech_stack";
pub const COMPANY_INTEL: &str = "company_intel";
pub const NEWS: &str = "news";

/// Standard topic ids in display order.
pub const STANDARD_TOPICS: [&str; 5] = [OVERVIEW, SENTIMENT, TECH_STACK, COMPANY_INTEL, NEWS];

const OPENAI: &str = "openai";

/// One adapter per sourced topic.
#[derive(Clone)]
pub struct StandardSources {
    pub sentiment: Arc<dyn SourceAdapter>,
    pub tech_stack: Arc<dyn SourceAdapter>,
    pub company: Arc<dyn SourceAdapter>,
    pub news: Arc<dyn SourceAdapter>,
}

impl StandardSources {
    /// Live keyword search plus the three demo adapters.
    pub fn live(config: &DashboardConfig, requester: Arc<dyn HttpRequester>) -> Self {
        let reddit = RedditSearchConfig {
            base_url: config.reddit_base_url.clone(),
            timeout: config.source_timeout,
            ..RedditSearchConfig::default()
        };
        Self {
            sentiment: Arc::new(RedditSearchAdapter::new(reddit, requester)),
            tech_stack: Arc::new(TechStackAdapter::default()),
            company: Arc::new(CompanyLookupAdapter::default()),
            news: Arc::new(NewsFeedAdapter),
        }
    }
}

fn options(config: &DashboardConfig, temperature: f32, max_tokens: u32) -> CompletionOptions {
    CompletionOptions::default()
        .temperature(temperature)
        .max_tokens(max_tokens)
        .timeout(config.stream_timeout)
}

/// The five standard topics, in display order.
pub fn standard_topics(config: &DashboardConfig, sources: &StandardSources) -> Vec<TopicSpec> {
    let model = ModelRef::new(OPENAI, config.model.clone());
    let subject = config.subject;

    vec![
        TopicSpec::new(OVERVIEW, "About", model.clone())
            .system_instruction(prompts::OVERVIEW_SYSTEM)
            .prompt(move |query, _| prompts::overview_prompt(subject, query))
            .options(options(config, 0.8, 400)),
        TopicSpec::new(SENTIMENT, "Reddit Sentiment", model.clone())
            .system_instruction(prompts::SENTIMENT_SYSTEM)
            .prompt(prompts::sentiment_prompt)
            .options(options(config, 0.4, 1500))
            .source(sources.sentiment.clone())
            .source_timeout(config.source_timeout)
            .empty_message(prompts::NO_DISCUSSIONS_MESSAGE),
        TopicSpec::new(TECH_STACK, "Tech Stack", model.clone())
            .system_instruction(prompts::TECH_STACK_SYSTEM)
            .prompt(prompts::tech_stack_prompt)
            .options(options(config, 0.3, 1500))
            .source(sources.tech_stack.clone())
            .source_timeout(config.source_timeout),
        TopicSpec::new(COMPANY_INTEL, "Company Intelligence", model.clone())
            .system_instruction(prompts::COMPANY_INTEL_SYSTEM)
            .prompt(prompts::company_intel_prompt)
            .options(options(config, 0.5, 2000))
            .source(sources.company.clone())
            .source_timeout(config.source_timeout),
        TopicSpec::new(NEWS, "News", model)
            .system_instruction(prompts::NEWS_SYSTEM)
            .prompt(prompts::news_prompt)
            .options(options(config, 0.4, 1500))
            .source(sources.news.clone())
            .source_timeout(config.source_timeout),
    ]
}

/// Keeps the topics named in `ids`, in that order. `None` keeps all.
pub fn select_topics(
    topics: Vec<TopicSpec>,
    ids: Option<&[String]>,
) -> Result<Vec<TopicSpec>, SessionError> {
    let Some(ids) = ids else {
        return Ok(topics);
    };
    ids.iter()
        .map(|id| {
            topics
                .iter()
                .find(|topic| topic.id == *id)
                .cloned()
                .ok_or_else(|| SessionError::UnknownTopic(id.clone()))
        })
        .collect()
}

/// Builds a session from explicit parts.
pub fn build_session_with(
    config: &DashboardConfig,
    client: CompletionClient,
    sources: &StandardSources,
) -> Result<SessionController, SessionError> {
    let topics = select_topics(standard_topics(config, sources), config.topics.as_deref())?;
    let controllers = topics
        .into_iter()
        .map(|spec| TopicController::new(spec, client.clone()))
        .collect();
    SessionController::new(controllers)
}

/// Builds the live dashboard: OpenAI completions and the standard sources.
pub fn build_session(config: &DashboardConfig) -> Result<SessionController, SetupError> {
    let provider = OpenAiProvider::new(
        OpenAiClientConfig::unauthenticated()
            .api_key(config.credential.clone())
            .base_url(config.openai_base_url.clone())
            .timeout(config.stream_timeout),
    )?;
    let client = CompletionClient::new(Arc::new(provider));
    let requester = Arc::new(ReqwestHttpRequester::new(config.user_agent.as_deref())?);
    let sources = StandardSources::live(config, requester);

    let session = build_session_with(config, client, &sources)?;
    info!(
        event = "dashboard.built",
        model = %config.model,
        credential = config.has_credential(),
        topics = session.topics().len()
    );
    Ok(session)
}
