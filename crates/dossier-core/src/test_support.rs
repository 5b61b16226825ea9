//! Fakes shared by the controller and session tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dossier_completion::{
    CompletionClient, CompletionError, CompletionProvider, ModelRef, ProviderError,
    ProviderEvent, ProviderId, ProviderRequest, ProviderStreamHandle,
};
use dossier_sources::{FetchError, Post, SourceAdapter, SourceItem, SourceKind};
use futures::StreamExt as _;
use tokio::sync::{Notify, watch};

use crate::state::StreamState;
use crate::topic::TopicSpec;

pub(crate) type ReplyFn = Arc<dyn Fn(&ProviderRequest) -> Vec<String> + Send + Sync>;

#[derive(Clone)]
pub(crate) enum Script {
    Reply(ReplyFn),
    FailToStart(String),
    /// Emits `before`, waits on `gate`, then emits `after` and completes.
    Gated {
        before: Vec<String>,
        gate: Arc<Notify>,
        after: Vec<String>,
    },
}

#[derive(Clone)]
pub(crate) struct ScriptedProvider {
    ready: bool,
    script: Script,
    pub calls: Arc<AtomicUsize>,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedProvider {
    pub fn new(script: Script) -> Self {
        Self {
            ready: true,
            script,
            calls: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn replying(parts: &[&str]) -> Self {
        let parts: Vec<String> = parts.iter().map(|p| p.to_string()).collect();
        Self::new(Script::Reply(Arc::new(move |_| parts.clone())))
    }

    pub fn without_credential(mut self) -> Self {
        self.ready = false;
        self
    }

    pub fn client(&self) -> CompletionClient {
        CompletionClient::new(Arc::new(self.clone()))
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn delta(text: String) -> Result<ProviderEvent, ProviderError> {
    Ok(ProviderEvent::TextDelta { text })
}

fn completed() -> Result<ProviderEvent, ProviderError> {
    Ok(ProviderEvent::Completed {
        finish_reason: Some("stop".to_string()),
    })
}

#[async_trait::async_trait]
impl CompletionProvider for ScriptedProvider {
    fn id(&self) -> ProviderId {
        ProviderId::new("fake")
    }

    fn ensure_ready(&self) -> Result<(), CompletionError> {
        if self.ready {
            Ok(())
        } else {
            Err(CompletionError::MissingCredential)
        }
    }

    async fn start_stream(
        &self,
        req: ProviderRequest,
    ) -> Result<ProviderStreamHandle, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(req.user_prompt.clone());
        }
        let stream = match &self.script {
            Script::Reply(reply) => {
                let events: Vec<_> = reply(&req)
                    .into_iter()
                    .map(delta)
                    .chain(std::iter::once(completed()))
                    .collect();
                futures::stream::iter(events).boxed()
            }
            Script::FailToStart(message) => {
                return Err(ProviderError::provider("fake", message.clone(), Some(500)));
            }
            Script::Gated {
                before,
                gate,
                after,
            } => {
                let gate = gate.clone();
                let head = futures::stream::iter(before.clone().into_iter().map(delta));
                let wait = futures::stream::once(async move { gate.notified().await })
                    .filter_map(|()| async { None::<Result<ProviderEvent, ProviderError>> });
                let tail = futures::stream::iter(
                    after
                        .clone()
                        .into_iter()
                        .map(delta)
                        .chain(std::iter::once(completed())),
                );
                head.chain(wait).chain(tail).boxed()
            }
        };
        Ok(ProviderStreamHandle { stream })
    }
}

pub(crate) struct StaticAdapter {
    items: Vec<SourceItem>,
    delay: Option<Duration>,
    pub calls: Arc<AtomicUsize>,
}

impl StaticAdapter {
    pub fn new(items: Vec<SourceItem>) -> Self {
        Self {
            items,
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait::async_trait]
impl SourceAdapter for StaticAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::KeywordSearch
    }

    fn name(&self) -> &'static str {
        "static"
    }

    async fn fetch(&self, _query: &str) -> Result<Vec<SourceItem>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.items.clone())
    }
}

pub(crate) struct FailingAdapter;

#[async_trait::async_trait]
impl SourceAdapter for FailingAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::KeywordSearch
    }

    fn name(&self) -> &'static str {
        "failing"
    }

    async fn fetch(&self, _query: &str) -> Result<Vec<SourceItem>, FetchError> {
        Err(FetchError::Status {
            status: 503,
            body: "unavailable".to_string(),
        })
    }
}

pub(crate) fn post(title: &str) -> SourceItem {
    SourceItem::Post(Post {
        title: title.to_string(),
        content: format!("{title} body"),
        community: "technology".to_string(),
        author: "someone".to_string(),
        score: 10,
        comment_count: 2,
        url: format!("https://reddit.com/r/technology/{title}"),
        created_utc: 1_700_000_000,
    })
}

pub(crate) fn topic(id: &str) -> TopicSpec {
    TopicSpec::new(id, id, ModelRef::new("fake", "test-model"))
}

pub(crate) async fn wait_settled(rx: &mut watch::Receiver<StreamState>) -> StreamState {
    let state = tokio::time::timeout(
        Duration::from_secs(5),
        rx.wait_for(|state| !state.phase.is_active()),
    )
    .await
    .expect("topic settles")
    .expect("sender alive");
    state.clone()
}
