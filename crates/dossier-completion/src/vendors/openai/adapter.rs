use std::collections::VecDeque;
use std::pin::Pin;

use futures::StreamExt as _;
use futures::stream;
use tracing::debug;

use crate::ProviderId;
use crate::errors::{CompletionError, ProviderError};
use crate::provider::{CompletionProvider, ProviderEvent, ProviderRequest, ProviderStreamHandle};

use super::config::OpenAiClientConfig;
use super::transport::{ChunkEvent, SseDecoder, SseFrame, map_chat_frame};

const OPENAI_PROVIDER: &str = "openai";

type ByteStream =
    Pin<Box<dyn futures::Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static>>;

/// Provider for OpenAI's streaming Chat Completions API.
pub struct OpenAiProvider {
    client: reqwest::Client,
    config: OpenAiClientConfig,
}

impl OpenAiProvider {
    /// Creates a provider from explicit client configuration.
    ///
    /// A config without an API key is accepted; requests then fail fast in
    /// [`CompletionProvider::ensure_ready`].
    pub fn new(config: OpenAiClientConfig) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CompletionError::Config(format!("failed to build OpenAI client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Creates a provider using the API key from the environment, if any.
    pub fn from_env() -> Result<Self, CompletionError> {
        Self::new(OpenAiClientConfig::from_env())
    }
}

#[async_trait::async_trait]
impl CompletionProvider for OpenAiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::new(OPENAI_PROVIDER)
    }

    fn ensure_ready(&self) -> Result<(), CompletionError> {
        if self.config.has_credential() {
            Ok(())
        } else {
            Err(CompletionError::MissingCredential)
        }
    }

    async fn start_stream(
        &self,
        req: ProviderRequest,
    ) -> Result<ProviderStreamHandle, ProviderError> {
        let provider_id = ProviderId::new(OPENAI_PROVIDER);
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::provider(provider_id.clone(), "credential not configured", None)
            })?;
        let body = build_request_body(&req);
        debug!(
            event = "openai.request_started",
            run_id = %req.run_id,
            model = %req.model.model,
            prompt_len = req.user_prompt.len() as u64
        );

        let mut http_req = self
            .client
            .post(self.config.chat_completions_url())
            .bearer_auth(api_key)
            .json(&body);
        if let Some(timeout) = req.options.timeout {
            http_req = http_req.timeout(timeout);
        }

        let response = http_req.send().await.map_err(|e| {
            ProviderError::transport(provider_id.clone(), format!("OpenAI request failed: {e}"))
        })?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ProviderError::provider(
                provider_id,
                format!("OpenAI chat completions request failed with status {status}: {body}"),
                Some(status.as_u16()),
            ));
        }

        let bytes_stream: ByteStream = Box::pin(response.bytes_stream());
        Ok(ProviderStreamHandle {
            stream: Box::pin(chat_event_stream(provider_id, bytes_stream)),
        })
    }
}

pub(crate) fn build_request_body(req: &ProviderRequest) -> serde_json::Value {
    let mut messages = Vec::new();
    if let Some(system) = req
        .system_instruction
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        messages.push(serde_json::json!({ "role": "system", "content": system }));
    }
    messages.push(serde_json::json!({ "role": "user", "content": req.user_prompt }));

    let mut body = serde_json::json!({
        "model": req.model.model,
        "messages": messages,
        "stream": true,
    });
    if let Some(temperature) = req.options.temperature {
        body["temperature"] = serde_json::json!(temperature);
    }
    if let Some(max_tokens) = req.options.max_tokens {
        body["max_tokens"] = serde_json::json!(max_tokens);
    }
    body
}

struct ChatStreamState {
    provider_id: ProviderId,
    bytes_stream: ByteStream,
    decoder: SseDecoder,
    pending: VecDeque<ProviderEvent>,
    finish_reason: Option<String>,
    done: bool,
}

impl ChatStreamState {
    fn apply_frame(&mut self, frame: &SseFrame) -> Result<(), ProviderError> {
        if self.done {
            return Ok(());
        }
        for event in map_chat_frame(&self.provider_id, frame)? {
            match event {
                ChunkEvent::Text(text) => self.pending.push_back(ProviderEvent::TextDelta { text }),
                ChunkEvent::Finish(reason) => self.finish_reason = Some(reason),
                ChunkEvent::Done => {
                    self.finish_stream();
                    break;
                }
            }
        }
        Ok(())
    }

    fn finish_stream(&mut self) {
        self.pending.push_back(ProviderEvent::Completed {
            finish_reason: self.finish_reason.take(),
        });
        self.done = true;
    }
}

fn chat_event_stream(
    provider_id: ProviderId,
    bytes_stream: ByteStream,
) -> impl futures::Stream<Item = Result<ProviderEvent, ProviderError>> + Send {
    stream::try_unfold(
        ChatStreamState {
            provider_id,
            bytes_stream,
            decoder: SseDecoder::default(),
            pending: VecDeque::new(),
            finish_reason: None,
            done: false,
        },
        |mut state| async move {
            loop {
                if let Some(event) = state.pending.pop_front() {
                    return Ok(Some((event, state)));
                }
                if state.done {
                    return Ok(None);
                }

                match state.bytes_stream.next().await {
                    Some(Ok(chunk)) => {
                        for frame in state.decoder.push_chunk(&chunk) {
                            state.apply_frame(&frame)?;
                        }
                    }
                    Some(Err(e)) => {
                        return Err(ProviderError::transport(
                            state.provider_id,
                            format!("OpenAI streaming read failed: {e}"),
                        ));
                    }
                    None => {
                        if let Some(frame) = state.decoder.finish() {
                            state.apply_frame(&frame)?;
                        }
                        // A finish_reason without the [DONE] marker still counts as a clean end.
                        if !state.done && state.finish_reason.is_some() {
                            state.finish_stream();
                        }
                        state.done = true;
                    }
                }
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CompletionOptions, ModelRef};
    use crate::{CompletionClient, CompletionStream, StreamEvent};
    use std::sync::Arc;

    fn request(options: CompletionOptions) -> ProviderRequest {
        ProviderRequest {
            run_id: uuid::Uuid::new_v4(),
            model: ModelRef::new("openai", "gpt-4o"),
            system_instruction: Some("sys".into()),
            user_prompt: "hello".into(),
            options,
        }
    }

    fn byte_stream(chunks: Vec<&'static str>) -> ByteStream {
        Box::pin(stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok(bytes::Bytes::from_static(c.as_bytes()))),
        ))
    }

    async fn collect(
        chunks: Vec<&'static str>,
    ) -> Vec<Result<ProviderEvent, ProviderError>> {
        chat_event_stream(ProviderId::new("openai"), byte_stream(chunks))
            .collect()
            .await
    }

    #[test]
    fn request_body_carries_messages_and_generation_options() {
        let body = build_request_body(&request(
            CompletionOptions::default().temperature(0.4).max_tokens(1500),
        ));
        assert_eq!(body.get("stream").and_then(|v| v.as_bool()), Some(true));
        assert_eq!(body.get("model").and_then(|v| v.as_str()), Some("gpt-4o"));
        assert_eq!(body.get("max_tokens").and_then(|v| v.as_u64()), Some(1500));
        let temperature = body.get("temperature").and_then(|v| v.as_f64()).expect("temp");
        assert!((temperature - 0.4).abs() < 1e-6);
        let messages = body.get("messages").and_then(|v| v.as_array()).expect("messages");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["content"], "hello");
    }

    #[test]
    fn request_body_omits_unset_options_and_blank_system() {
        let mut req = request(CompletionOptions::default());
        req.system_instruction = Some("  ".into());
        let body = build_request_body(&req);
        assert!(body.get("temperature").is_none());
        assert!(body.get("max_tokens").is_none());
        assert_eq!(body["messages"].as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn chat_stream_yields_deltas_then_completed() {
        let events = collect(vec![
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\",\"content\":\"\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"Acme \"}}]}\n\ndata: {\"choices\":[{\"delta\":{\"content\":\"is \"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"a company.\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
            "data: [DONE]\n\n",
        ])
        .await;
        let events: Vec<ProviderEvent> = events.into_iter().map(|e| e.expect("ok")).collect();
        assert_eq!(
            events,
            vec![
                ProviderEvent::TextDelta { text: "Acme ".into() },
                ProviderEvent::TextDelta { text: "is ".into() },
                ProviderEvent::TextDelta { text: "a company.".into() },
                ProviderEvent::Completed {
                    finish_reason: Some("stop".into())
                },
            ]
        );
    }

    #[tokio::test]
    async fn finish_reason_without_done_marker_still_completes() {
        let events = collect(vec![
            "data: {\"choices\":[{\"delta\":{\"content\":\"x\"},\"finish_reason\":\"length\"}]}",
        ])
        .await;
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events.last(),
            Some(Ok(ProviderEvent::Completed { finish_reason: Some(reason) })) if reason == "length"
        ));
    }

    #[tokio::test]
    async fn truncated_body_ends_without_completion() {
        let events = collect(vec!["data: {\"choices\":[{\"delta\":{\"content\":\"x\"}}]}\n\n"]).await;
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Ok(ProviderEvent::TextDelta { .. })));
    }

    #[tokio::test]
    async fn error_frame_terminates_stream_with_provider_error() {
        let events = collect(vec![
            "data: {\"choices\":[{\"delta\":{\"content\":\"x\"}}]}\n\n",
            "data: {\"error\":{\"message\":\"rate limited\"}}\n\n",
        ])
        .await;
        assert!(matches!(events[0], Ok(ProviderEvent::TextDelta { .. })));
        assert!(matches!(&events[1], Err(ProviderError::Provider { message, .. }) if message == "rate limited"));
    }

    #[tokio::test]
    async fn missing_credential_is_reported_by_ensure_ready() {
        let provider = OpenAiProvider::new(OpenAiClientConfig::unauthenticated()).expect("provider");
        let client = CompletionClient::new(Arc::new(provider));
        let result = client
            .request(ModelRef::new("openai", "gpt-4o"))
            .user_prompt("hello")
            .start_stream();
        assert!(matches!(result, Err(CompletionError::MissingCredential)));
    }

    #[tokio::test]
    async fn env_gated_smoke_stream_if_key_present() {
        let config = OpenAiClientConfig::from_env();
        if !config.has_credential() {
            eprintln!("skipping OpenAI stream smoke test (OPENAI_API_KEY missing)");
            return;
        }
        let client = CompletionClient::new(Arc::new(OpenAiProvider::new(config).expect("provider")));
        let mut stream: CompletionStream = client
            .request(ModelRef::new("openai", "gpt-4o-mini"))
            .system_instruction("Reply with a short greeting.")
            .user_prompt("hello")
            .max_tokens(20)
            .timeout(std::time::Duration::from_secs(30))
            .start_stream()
            .expect("start stream");

        let mut saw_started = false;
        let mut saw_terminal = false;
        while let Some(event) = stream.next_event().await {
            match event {
                StreamEvent::Started { .. } => saw_started = true,
                StreamEvent::Completed { .. } | StreamEvent::Error { .. } => saw_terminal = true,
                StreamEvent::Increment { .. } => {}
            }
        }
        assert!(saw_started, "expected Started event");
        assert!(saw_terminal, "expected terminal event");
    }
}
