use std::collections::VecDeque;

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream};
use futures_util::StreamExt;
use memchr::memchr;
use tracing::debug;

use crate::api::{summarize_api_error, Content, GenerateContentRequest, GenerateContentResponse};
use crate::core::credential::Credential;
use crate::core::service::{FragmentStream, GenerationService, ServiceError, StreamRequest};
use crate::utils::url::{construct_api_url, model_method_path};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// REST client for the Gemini `generateContent` family of endpoints.
#[derive(Clone)]
pub struct GeminiService {
    client: reqwest::Client,
    base_url: String,
}

impl GeminiService {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn post(
        &self,
        endpoint: &str,
        credential: &Credential,
        body: &GenerateContentRequest,
    ) -> reqwest::RequestBuilder {
        self.client
            .post(construct_api_url(&self.base_url, endpoint))
            .header("Content-Type", "application/json")
            .header(API_KEY_HEADER, credential.expose())
            .json(body)
    }
}

async fn error_from_response(response: reqwest::Response) -> ServiceError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<no body>".to_string());
    ServiceError::Api {
        status: Some(status),
        message: summarize_api_error(&body),
    }
}

#[async_trait]
impl GenerationService for GeminiService {
    async fn generate_once(
        &self,
        credential: &Credential,
        model: &str,
        text: &str,
    ) -> Result<String, ServiceError> {
        let request = GenerateContentRequest {
            contents: vec![Content::user(text)],
            system_instruction: None,
        };
        let endpoint = model_method_path(model, "generateContent");
        let response = self.post(&endpoint, credential, &request).send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body = response.text().await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|err| ServiceError::Malformed(err.to_string()))?;
        if let Some(reason) = parsed.block_reason() {
            return Err(blocked(reason));
        }
        Ok(parsed.text())
    }

    async fn open_stream(&self, request: StreamRequest) -> Result<FragmentStream, ServiceError> {
        let body = GenerateContentRequest {
            contents: request.contents(),
            system_instruction: request
                .system_instruction
                .as_deref()
                .map(Content::instruction),
        };
        let endpoint = format!(
            "{}?alt=sse",
            model_method_path(&request.model, "streamGenerateContent")
        );
        debug!(model = %request.model, turns = body.contents.len(), "opening generation stream");

        let response = self
            .post(&endpoint, &request.credential, &body)
            .header("Accept", "text/event-stream")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let bytes = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
            .boxed();
        Ok(sse_fragments(bytes))
    }
}

fn blocked(reason: &str) -> ServiceError {
    ServiceError::Api {
        status: None,
        message: format!("Response blocked: {reason}"),
    }
}

/// Splits a byte stream into trimmed text lines.
#[derive(Default)]
pub(crate) struct SseLineBuffer {
    buffer: Vec<u8>,
}

impl SseLineBuffer {
    pub(crate) fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(newline_pos) = memchr(b'\n', &self.buffer) {
            match std::str::from_utf8(&self.buffer[..newline_pos]) {
                Ok(line) => lines.push(line.trim().to_string()),
                Err(err) => debug!("dropping invalid UTF-8 line in stream: {err}"),
            }
            self.buffer.drain(..=newline_pos);
        }
        lines
    }

    /// Returns the unterminated tail, if any, once the body has ended.
    pub(crate) fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        let line = String::from_utf8(rest).ok()?;
        let line = line.trim();
        (!line.is_empty()).then(|| line.to_string())
    }
}

/// Decodes one SSE line. `None` means the line carries no text.
pub(crate) fn parse_sse_line(line: &str) -> Option<Result<String, ServiceError>> {
    let payload = line.strip_prefix("data:")?.trim_start();
    if payload.is_empty() || payload == "[DONE]" {
        return None;
    }

    let value: serde_json::Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(err) => return Some(Err(ServiceError::Malformed(err.to_string()))),
    };
    if value.get("error").is_some() {
        return Some(Err(ServiceError::Api {
            status: None,
            message: summarize_api_error(payload),
        }));
    }

    let response: GenerateContentResponse = match serde_json::from_value(value) {
        Ok(response) => response,
        Err(err) => return Some(Err(ServiceError::Malformed(err.to_string()))),
    };
    if let Some(reason) = response.block_reason() {
        return Some(Err(blocked(reason)));
    }
    let text = response.text();
    (!text.is_empty()).then_some(Ok(text))
}

struct SseState {
    body: BoxStream<'static, Result<Vec<u8>, reqwest::Error>>,
    lines: SseLineBuffer,
    pending: VecDeque<Result<String, ServiceError>>,
    finished: bool,
}

impl SseState {
    fn queue_lines(&mut self, lines: impl IntoIterator<Item = String>) {
        for line in lines {
            if let Some(item) = parse_sse_line(&line) {
                self.pending.push_back(item);
            }
        }
    }
}

/// Turns an SSE byte stream into text fragments. The first error ends the
/// stream.
fn sse_fragments(body: BoxStream<'static, Result<Vec<u8>, reqwest::Error>>) -> FragmentStream {
    let state = SseState {
        body,
        lines: SseLineBuffer::default(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                if item.is_err() {
                    state.finished = true;
                    state.pending.clear();
                }
                return Some((item, state));
            }
            if state.finished {
                return None;
            }

            match state.body.next().await {
                Some(Ok(chunk)) => {
                    let lines = state.lines.push(&chunk);
                    state.queue_lines(lines);
                }
                Some(Err(err)) => state.pending.push_back(Err(err.into())),
                None => {
                    state.finished = true;
                    let tail = state.lines.finish();
                    state.queue_lines(tail);
                }
            }
        }
    })
    .boxed()
}
