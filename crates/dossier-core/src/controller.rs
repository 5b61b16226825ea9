use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dossier_completion::{CompletionClient, StreamEvent};
use dossier_sources::{SourceOutcome, fetch_or_degrade, fetch_with_timeout};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::state::{Phase, StreamState};
use crate::topic::{FetchPolicy, TopicSpec};

/// Write access for one run of a topic.
///
/// Every write re-checks the run's generation inside the watch lock, so a run
/// that has been superseded by `start`, `stop` or `reset` can no longer touch
/// the state, even if its task has not been torn down yet.
struct StateWriter {
    tx: Arc<watch::Sender<StreamState>>,
    generation: Arc<AtomicU64>,
    run: u64,
}

impl StateWriter {
    fn apply(&self, mutate: impl FnOnce(&mut StreamState)) -> bool {
        let mut applied = false;
        self.tx.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != self.run || state.phase.is_terminal() {
                return false;
            }
            mutate(state);
            applied = true;
            true
        });
        applied
    }

    fn fail(&self, message: String) -> bool {
        self.apply(|state| {
            state.phase = Phase::Failed;
            state.error = Some(message);
        })
    }
}

/// Drives one topic: fetch supporting records, then stream a completion
/// seeded with them, publishing every step as a [`StreamState`].
pub struct TopicController {
    spec: Arc<TopicSpec>,
    client: CompletionClient,
    state: Arc<watch::Sender<StreamState>>,
    generation: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
}

impl TopicController {
    pub fn new(spec: TopicSpec, client: CompletionClient) -> Self {
        let (tx, _rx) = watch::channel(StreamState::default());
        Self {
            spec: Arc::new(spec),
            client,
            state: Arc::new(tx),
            generation: Arc::new(AtomicU64::new(0)),
            task: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.spec.id
    }

    pub fn title(&self) -> &str {
        &self.spec.title
    }

    pub fn spec(&self) -> &TopicSpec {
        &self.spec
    }

    pub fn subscribe(&self) -> watch::Receiver<StreamState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> StreamState {
        self.state.borrow().clone()
    }

    pub fn phase(&self) -> Phase {
        self.state.borrow().phase
    }

    pub fn is_active(&self) -> bool {
        self.phase().is_active()
    }

    /// Starts a new run for `query`, superseding any run in flight.
    ///
    /// Must be called from within a tokio runtime. With no credential the
    /// topic fails immediately and nothing is spawned.
    pub fn start(&mut self, query: &str) {
        self.abort_task();
        let ready = self.client.ensure_ready();
        let run = self.invalidate(|state| {
            *state = match &ready {
                Ok(()) => StreamState::fetching(),
                Err(err) => StreamState::failed(err.to_string()),
            };
            true
        });

        if let Err(err) = ready {
            warn!(
                event = "topic.not_ready",
                topic = %self.spec.id,
                error = %err
            );
            return;
        }

        info!(event = "topic.started", topic = %self.spec.id, run);
        let writer = StateWriter {
            tx: self.state.clone(),
            generation: self.generation.clone(),
            run,
        };
        self.task = Some(tokio::spawn(run_topic(
            self.spec.clone(),
            self.client.clone(),
            writer,
            query.to_string(),
        )));
    }

    /// Cancels the run in flight. Content gathered so far stays visible.
    pub fn stop(&mut self) {
        let was_running = self.abort_task();
        let run = self.invalidate(|state| {
            if state.phase.is_active() {
                state.phase = Phase::Stopped;
                true
            } else {
                false
            }
        });
        if was_running {
            info!(event = "topic.stopped", topic = %self.spec.id, run);
        }
    }

    /// Cancels any run and returns to a fresh `Idle` state.
    pub fn reset(&mut self) {
        self.abort_task();
        self.invalidate(|state| {
            let fresh = StreamState::default();
            if *state == fresh {
                false
            } else {
                *state = fresh;
                true
            }
        });
        debug!(event = "topic.reset", topic = %self.spec.id);
    }

    /// Bumps the generation and applies `mutate` under the same lock.
    /// Returns the new generation.
    fn invalidate(&self, mutate: impl FnOnce(&mut StreamState) -> bool) -> u64 {
        let mut run = 0;
        self.state.send_if_modified(|state| {
            run = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            mutate(state)
        });
        run
    }

    fn abort_task(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                let running = !task.is_finished();
                task.abort();
                running
            }
            None => false,
        }
    }
}

impl Drop for TopicController {
    fn drop(&mut self) {
        self.abort_task();
    }
}

impl std::fmt::Debug for TopicController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopicController")
            .field("id", &self.spec.id)
            .field("phase", &self.phase())
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish()
    }
}

async fn run_topic(
    spec: Arc<TopicSpec>,
    client: CompletionClient,
    writer: StateWriter,
    query: String,
) {
    let outcome = match (&spec.source, spec.fetch_policy) {
        (None, _) => SourceOutcome::ok(Vec::new()),
        (Some(adapter), FetchPolicy::Degrade) => {
            fetch_or_degrade(adapter.as_ref(), &query, spec.source_timeout).await
        }
        (Some(adapter), FetchPolicy::Required) => {
            match fetch_with_timeout(adapter.as_ref(), &query, spec.source_timeout).await {
                Ok(items) => SourceOutcome::ok(items),
                Err(err) => {
                    warn!(
                        event = "topic.fetch_failed",
                        topic = %spec.id,
                        code = err.code(),
                        error = %err
                    );
                    writer.fail(err.to_string());
                    return;
                }
            }
        }
    };

    let items = outcome.items;
    let warning = outcome.warning.map(|err| err.to_string());

    if items.is_empty()
        && spec.source.is_some()
        && let Some(message) = &spec.empty_message
    {
        writer.apply(|state| {
            state.source_items = items.clone();
            state.warning = warning;
            state.buffer.push_str(message);
            state.phase = Phase::Done;
        });
        debug!(event = "topic.empty_source", topic = %spec.id);
        return;
    }

    let published = writer.apply(|state| {
        state.source_items = items.clone();
        state.warning = warning;
        state.phase = Phase::Streaming;
    });
    if !published {
        return;
    }

    let mut request = client
        .request(spec.model.clone())
        .user_prompt(spec.render_prompt(&query, &items))
        .options(spec.options.clone());
    if let Some(system) = &spec.system_instruction {
        request = request.system_instruction(system.clone());
    }
    let mut stream = match request.start_stream() {
        Ok(stream) => stream,
        Err(err) => {
            writer.fail(err.to_string());
            return;
        }
    };

    while let Some(event) = stream.next_event().await {
        match event {
            StreamEvent::Started { .. } => {}
            StreamEvent::Increment { text, .. } => {
                // A superseded run drops the stream here, which cancels it.
                if !writer.apply(|state| state.buffer.push_str(&text)) {
                    return;
                }
            }
            StreamEvent::Completed { increments, .. } => {
                writer.apply(|state| state.phase = Phase::Done);
                info!(event = "topic.completed", topic = %spec.id, increments);
                return;
            }
            StreamEvent::Error { error, .. } => {
                warn!(event = "topic.stream_failed", topic = %spec.id, error = %error);
                writer.fail(error.to_string());
                return;
            }
        }
    }
    writer.fail("completion stream ended without a terminal event".to_string());
}
