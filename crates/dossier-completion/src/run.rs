use std::sync::Arc;

use futures::StreamExt as _;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::errors::{CompletionError, StreamFailure, stream_failure_from_provider_error};
use crate::model::{CompletionOptions, ModelRef, ProviderId};
use crate::provider::{CompletionProvider, ProviderEvent, ProviderRequest};
use crate::stream::StreamEvent;

/// Handle used to request cancellation of a running stream.
#[derive(Clone)]
pub struct AbortHandle {
    tx: watch::Sender<bool>,
}

impl AbortHandle {
    /// Requests cancellation.
    ///
    /// The provider stream is dropped (closing the upstream connection) and
    /// the consumer sees a terminal `StreamEvent::Error` with
    /// `StreamFailure::Cancelled` if it is still reading.
    pub fn abort(&self) {
        let _ = self.tx.send(true);
    }
}

/// Builder for configuring and starting a single completion stream.
pub struct RequestBuilder {
    provider: Arc<dyn CompletionProvider>,
    model: ModelRef,
    system_instruction: Option<String>,
    user_prompt: Option<String>,
    options: CompletionOptions,
}

impl RequestBuilder {
    pub(crate) fn new(provider: Arc<dyn CompletionProvider>, model: ModelRef) -> Self {
        Self {
            provider,
            model,
            system_instruction: None,
            user_prompt: None,
            options: CompletionOptions::default(),
        }
    }

    /// Sets the system instruction.
    pub fn system_instruction(mut self, text: impl Into<String>) -> Self {
        self.system_instruction = Some(text.into());
        self
    }

    /// Sets the user prompt (topic plus fetched context).
    pub fn user_prompt(mut self, text: impl Into<String>) -> Self {
        self.user_prompt = Some(text.into());
        self
    }

    /// Replaces all generation options at once.
    pub fn options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the sampling temperature (`0.0..=1.0`).
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options.temperature = Some(temperature);
        self
    }

    /// Sets the response token cap.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.options.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the deadline for the whole stream.
    pub fn timeout(mut self, timeout: std::time::Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }

    /// Sets the bounded buffer size between the stream task and the consumer.
    pub fn stream_buffer_capacity(mut self, capacity: usize) -> Self {
        self.options.stream_buffer_capacity = capacity;
        self
    }

    /// Checks readiness, validates, and spawns the stream task.
    ///
    /// The readiness check (credential presence) runs before anything else, so
    /// a missing credential never reaches the network. Must be called from
    /// within a Tokio runtime.
    pub fn start_stream(self) -> Result<CompletionStream, CompletionError> {
        self.provider.ensure_ready()?;
        let provider = self.provider.clone();
        let request = self.validate_and_build_request()?;

        let (tx, rx) = mpsc::channel(request.options.stream_buffer_capacity);
        let (abort_tx, abort_rx) = watch::channel(false);

        let run_id = request.run_id;
        let model = request.model.clone();
        tokio::spawn(run_task(provider, request, tx, abort_rx));

        Ok(CompletionStream {
            run_id,
            provider: model.provider,
            model: model.model,
            rx,
            abort_handle: AbortHandle { tx: abort_tx },
            saw_terminal: false,
        })
    }

    /// Streams to completion and returns the concatenated text.
    pub async fn collect_text(self) -> Result<String, CompletionError> {
        self.start_stream()?.collect_text().await
    }

    fn validate_and_build_request(self) -> Result<ProviderRequest, CompletionError> {
        let expected = self.provider.id();
        if self.model.provider != expected {
            return Err(CompletionError::ProviderMismatch {
                expected,
                requested: self.model.provider,
            });
        }
        if self.model.model.trim().is_empty() {
            return Err(CompletionError::Validation("model must not be empty".into()));
        }
        if self.options.stream_buffer_capacity == 0 {
            return Err(CompletionError::Validation(
                "stream_buffer_capacity must be greater than 0".into(),
            ));
        }
        if let Some(temperature) = self.options.temperature
            && !(0.0..=1.0).contains(&temperature)
        {
            return Err(CompletionError::Validation(format!(
                "temperature must be within 0.0..=1.0, got {temperature}"
            )));
        }
        if self.options.max_tokens == Some(0) {
            return Err(CompletionError::Validation(
                "max_tokens must be greater than 0".into(),
            ));
        }
        let user_prompt = self
            .user_prompt
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| CompletionError::Validation("user prompt must not be empty".into()))?;

        Ok(ProviderRequest {
            run_id: uuid::Uuid::new_v4(),
            model: self.model,
            system_instruction: self.system_instruction.filter(|s| !s.trim().is_empty()),
            user_prompt,
            options: self.options,
        })
    }
}

/// Streaming handle returned by `RequestBuilder::start_stream`.
///
/// Dropping the handle before the terminal event cancels the stream.
pub struct CompletionStream {
    run_id: uuid::Uuid,
    provider: ProviderId,
    model: String,
    rx: mpsc::Receiver<StreamEvent>,
    abort_handle: AbortHandle,
    saw_terminal: bool,
}

impl CompletionStream {
    /// Returns the run id for this stream.
    pub fn run_id(&self) -> uuid::Uuid {
        self.run_id
    }

    /// Returns a handle that can cancel the stream.
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort_handle.clone()
    }

    /// Waits for and returns the next normalized event.
    ///
    /// Returns `None` once the terminal event has been delivered and the task
    /// has exited.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        let event = self.rx.recv().await;
        if event.as_ref().is_some_and(StreamEvent::is_terminal) {
            self.saw_terminal = true;
        }
        event
    }

    /// Drains the stream and returns all increments concatenated in order.
    pub async fn collect_text(mut self) -> Result<String, CompletionError> {
        let mut text = String::new();
        while let Some(event) = self.next_event().await {
            match event {
                StreamEvent::Increment { text: delta, .. } => text.push_str(&delta),
                StreamEvent::Completed { .. } => return Ok(text),
                StreamEvent::Error { error, .. } => return Err(error.into()),
                StreamEvent::Started { .. } => {}
            }
        }
        Err(CompletionError::protocol_msg(format!(
            "stream task ended without terminal event (provider={}, model={})",
            self.provider, self.model
        )))
    }
}

impl Drop for CompletionStream {
    fn drop(&mut self) {
        if !self.saw_terminal {
            self.abort_handle.abort();
        }
    }
}

enum Outcome {
    Completed {
        increments: u64,
        finish_reason: Option<String>,
    },
    Failed(StreamFailure),
    ReceiverGone,
}

async fn run_task(
    provider: Arc<dyn CompletionProvider>,
    request: ProviderRequest,
    tx: mpsc::Sender<StreamEvent>,
    mut abort_rx: watch::Receiver<bool>,
) {
    let run_id = request.run_id;
    let provider_id = request.model.provider.clone();
    let model_name = request.model.model.clone();
    let started_at = Instant::now();
    let deadline = request.options.timeout.map(|t| started_at + t);

    if !send_event(
        &tx,
        StreamEvent::Started {
            run_id,
            provider: provider_id.clone(),
            model: model_name.clone(),
        },
    )
    .await
    {
        return;
    }

    // Losing branches are dropped, which drops the provider stream and closes
    // the upstream connection.
    let outcome = tokio::select! {
        biased;
        _ = cancelled(&mut abort_rx) => Outcome::Failed(StreamFailure::Cancelled),
        _ = deadline_elapsed(deadline) => Outcome::Failed(StreamFailure::Timeout {
            elapsed_ms: started_at.elapsed().as_millis() as u64,
        }),
        outcome = pump(provider, request, &tx) => outcome,
    };

    match outcome {
        Outcome::Completed {
            increments,
            finish_reason,
        } => {
            debug!(
                event = "completion.stream_completed",
                run_id = %run_id,
                provider = %provider_id,
                model = %model_name,
                increments,
                finish_reason = ?finish_reason
            );
            let _ = send_event(
                &tx,
                StreamEvent::Completed {
                    run_id,
                    increments,
                    finish_reason,
                },
            )
            .await;
        }
        Outcome::Failed(error) => {
            warn!(
                event = "completion.stream_failed",
                run_id = %run_id,
                provider = %provider_id,
                model = %model_name,
                error = %error
            );
            let _ = send_event(&tx, StreamEvent::Error { run_id, error }).await;
        }
        Outcome::ReceiverGone => {
            debug!(
                event = "completion.receiver_dropped",
                run_id = %run_id,
                provider = %provider_id
            );
        }
    }
}

async fn pump(
    provider: Arc<dyn CompletionProvider>,
    request: ProviderRequest,
    tx: &mpsc::Sender<StreamEvent>,
) -> Outcome {
    let run_id = request.run_id;
    let provider_id = request.model.provider.clone();
    let mut handle = match provider.start_stream(request).await {
        Ok(handle) => handle,
        Err(err) => return Outcome::Failed(stream_failure_from_provider_error(&err)),
    };

    let mut seq = 0_u64;
    loop {
        match handle.stream.next().await {
            Some(Ok(ProviderEvent::TextDelta { text })) => {
                if text.is_empty() {
                    continue;
                }
                debug!(run_id = %run_id, provider = %provider_id, seq, "provider text delta");
                if !send_event(tx, StreamEvent::Increment { run_id, seq, text }).await {
                    return Outcome::ReceiverGone;
                }
                seq = seq.saturating_add(1);
            }
            Some(Ok(ProviderEvent::Completed { finish_reason })) => {
                return Outcome::Completed {
                    increments: seq,
                    finish_reason,
                };
            }
            Some(Err(err)) => return Outcome::Failed(stream_failure_from_provider_error(&err)),
            None => {
                return Outcome::Failed(StreamFailure::Protocol {
                    message: format!("provider stream ended without completion ({provider_id})"),
                });
            }
        }
    }
}

async fn cancelled(abort_rx: &mut watch::Receiver<bool>) {
    if abort_rx.wait_for(|aborted| *aborted).await.is_err() {
        // Every abort handle is gone, so cancellation can no longer be requested.
        std::future::pending::<()>().await;
    }
}

async fn deadline_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

async fn send_event(tx: &mpsc::Sender<StreamEvent>, event: StreamEvent) -> bool {
    tx.send(event).await.is_ok()
}
