use crate::errors::ProviderError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SseFrame {
    pub event: Option<String>,
    pub data: String,
}

#[derive(Default)]
pub(crate) struct SseDecoder {
    buf: Vec<u8>,
}

impl SseDecoder {
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buf.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some((idx, delim_len)) = find_frame_delimiter(&self.buf) {
            let frame_bytes = self.buf[..idx].to_vec();
            self.buf.drain(..idx + delim_len);
            if let Some(frame) = parse_sse_frame(&frame_bytes) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Parses whatever is left once the body ends without a trailing blank line.
    pub fn finish(&mut self) -> Option<SseFrame> {
        let rest = std::mem::take(&mut self.buf);
        parse_sse_frame(&rest)
    }
}

fn find_frame_delimiter(buf: &[u8]) -> Option<(usize, usize)> {
    let mut i = 0;
    while i + 1 < buf.len() {
        if buf[i] == b'\n' && buf[i + 1] == b'\n' {
            return Some((i, 2));
        }
        if i + 3 < buf.len()
            && buf[i] == b'\r'
            && buf[i + 1] == b'\n'
            && buf[i + 2] == b'\r'
            && buf[i + 3] == b'\n'
        {
            return Some((i, 4));
        }
        i += 1;
    }
    None
}

fn parse_sse_frame(bytes: &[u8]) -> Option<SseFrame> {
    if bytes.is_empty() {
        return None;
    }
    let text = String::from_utf8_lossy(bytes);
    let mut event: Option<String> = None;
    let mut data_lines: Vec<String> = Vec::new();
    for raw_line in text.split('\n') {
        let line = raw_line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        if let Some(rest) = line.strip_prefix("event:") {
            event = Some(rest.trim_start().to_string());
            continue;
        }
        if let Some(rest) = line.strip_prefix("data:") {
            data_lines.push(rest.trim_start().to_string());
        }
    }
    if event.is_none() && data_lines.is_empty() {
        return None;
    }
    Some(SseFrame {
        event,
        data: data_lines.join("\n"),
    })
}

/// What one chat-completions chunk contributes to the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ChunkEvent {
    Text(String),
    Finish(String),
    Done,
}

pub(crate) fn map_chat_frame(
    provider: &crate::ProviderId,
    frame: &SseFrame,
) -> Result<Vec<ChunkEvent>, ProviderError> {
    let data = frame.data.trim();
    if data.is_empty() {
        return Ok(Vec::new());
    }
    if data == "[DONE]" {
        return Ok(vec![ChunkEvent::Done]);
    }
    let value: serde_json::Value = serde_json::from_str(data).map_err(|e| {
        ProviderError::protocol(provider.clone(), format!("invalid SSE JSON frame: {e}"))
    })?;
    map_chat_chunk(provider, &value)
}

pub(crate) fn map_chat_chunk(
    provider: &crate::ProviderId,
    value: &serde_json::Value,
) -> Result<Vec<ChunkEvent>, ProviderError> {
    if let Some(error) = value.get("error") {
        let message = error
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("OpenAI stream error");
        return Err(ProviderError::provider(provider.clone(), message, None));
    }
    let mut events = Vec::new();
    let Some(choice) = value
        .get("choices")
        .and_then(|v| v.as_array())
        .and_then(|choices| choices.first())
    else {
        return Ok(events);
    };
    if let Some(content) = choice
        .get("delta")
        .and_then(|d| d.get("content"))
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
    {
        events.push(ChunkEvent::Text(content.to_string()));
    }
    if let Some(reason) = choice.get("finish_reason").and_then(|v| v.as_str()) {
        events.push(ChunkEvent::Finish(reason.to_string()));
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sse_decoder_handles_partial_chunk_boundaries() {
        let mut decoder = SseDecoder::default();
        let part1 = b"data: {\"choices\":[{\"delta\":{\"content\":\"hel";
        let part2 = b"lo\"}}]}\n\n";
        assert!(decoder.push_chunk(part1).is_empty());
        let frames = decoder.push_chunk(part2);
        assert_eq!(frames.len(), 1);
        assert!(frames[0].data.contains("hello"));
    }

    #[test]
    fn sse_decoder_accepts_crlf_and_skips_comments() {
        let mut decoder = SseDecoder::default();
        let frames = decoder.push_chunk(b": keep-alive\r\n\r\ndata: [DONE]\r\n\r\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "[DONE]");
    }

    #[test]
    fn decoder_finish_flushes_unterminated_frame() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push_chunk(b"data: [DONE]").is_empty());
        let frame = decoder.finish().expect("trailing frame");
        assert_eq!(frame.data, "[DONE]");
        assert!(decoder.finish().is_none());
    }

    #[test]
    fn maps_delta_finish_and_done() {
        let provider = crate::ProviderId::new("openai");
        let delta = serde_json::json!({"choices":[{"index":0,"delta":{"content":"Hi"},"finish_reason":null}]});
        let finish = serde_json::json!({"choices":[{"index":0,"delta":{},"finish_reason":"stop"}]});
        assert_eq!(
            map_chat_chunk(&provider, &delta).expect("delta"),
            vec![ChunkEvent::Text("Hi".into())]
        );
        assert_eq!(
            map_chat_chunk(&provider, &finish).expect("finish"),
            vec![ChunkEvent::Finish("stop".into())]
        );
        let done = SseFrame {
            event: None,
            data: "[DONE]".into(),
        };
        assert_eq!(
            map_chat_frame(&provider, &done).expect("done"),
            vec![ChunkEvent::Done]
        );
    }

    #[test]
    fn role_only_first_chunk_yields_nothing() {
        let provider = crate::ProviderId::new("openai");
        let first = serde_json::json!({"choices":[{"delta":{"role":"assistant","content":""},"finish_reason":null}]});
        assert!(map_chat_chunk(&provider, &first).expect("map").is_empty());
    }

    #[test]
    fn maps_error_object_to_provider_error() {
        let provider = crate::ProviderId::new("openai");
        let failed = serde_json::json!({"error": {"message": "quota exceeded"}});
        let err = map_chat_chunk(&provider, &failed).expect_err("should fail");
        assert!(matches!(err, ProviderError::Provider { ref message, .. } if message == "quota exceeded"));
    }

    #[test]
    fn invalid_json_is_protocol_error() {
        let provider = crate::ProviderId::new("openai");
        let frame = SseFrame {
            event: None,
            data: "{not json".into(),
        };
        let err = map_chat_frame(&provider, &frame).expect_err("should fail");
        assert!(matches!(err, ProviderError::Protocol { .. }));
    }
}
