use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use log::{debug, error, warn};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{ApiCaller, ApiOptions, StatusCallback};
use crate::translation::status::TranslationStatus;

/// Characters of accumulated output shown in a progress update
const PROGRESS_TAIL_CHARS: usize = 16;

/// OpenAI client for streaming chat completions
pub struct OpenAi {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL, e.g. `https://api.openai.com/v1`
    endpoint: String,
}

impl fmt::Debug for OpenAi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the key
        f.debug_struct("OpenAi").field("endpoint", &self.endpoint).finish()
    }
}

/// Chat completions request
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    stream: bool,
}

/// A message in the conversation
#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// One streamed `data:` payload
#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    content: Option<String>,
}

/// Error body returned by the API
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, PartialEq, Deserialize)]
struct ErrorDetail {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

/// What a single server-sent event line means for the translation
#[derive(Debug, PartialEq)]
enum StreamEvent {
    /// New output text
    Delta(String),
    /// The model finished its answer, with any text carried by the final chunk
    Stop(String),
    /// The model stopped because it hit its output limit
    Truncated,
    /// The server reported an error inside the stream
    Failed(ErrorDetail),
    /// End of stream
    Done,
    /// Comment, keep-alive or empty line
    Ignore,
}

impl OpenAi {
    /// Create a new OpenAI client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(300))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Create a new OpenAI client with timeout and optional HTTPS proxy
    pub fn new_with_config(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        timeout_secs: u64,
        https_proxy: Option<&str>,
    ) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60));

        if let Some(proxy) = https_proxy.filter(|p| !p.is_empty()) {
            let proxy = reqwest::Proxy::https(proxy)
                .with_context(|| format!("Invalid HTTPS proxy: {}", proxy))?;
            builder = builder.proxy(proxy);
        }

        Ok(Self {
            client: builder.build().context("Failed to build HTTP client")?,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        })
    }

    fn completions_url(&self) -> String {
        if self.endpoint.is_empty() {
            "https://api.openai.com/v1/chat/completions".to_string()
        } else {
            format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
        }
    }

    /// Map a non-success HTTP response to a provider error
    fn error_from_response(status: StatusCode, body: &str) -> ProviderError {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => Self::error_from_detail(status, parsed.error),
            Err(_) => Self::classify(status, body.to_string(), None),
        }
    }

    /// Map an error object sent by the API, in a response body or in the stream
    fn error_from_detail(status: StatusCode, detail: ErrorDetail) -> ProviderError {
        Self::classify(status, detail.message, detail.code.as_deref())
    }

    fn classify(status: StatusCode, message: String, code: Option<&str>) -> ProviderError {
        match (status, code) {
            (_, Some("context_length_exceeded")) => ProviderError::InputTooLong(message),
            (StatusCode::UNAUTHORIZED, _) | (_, Some("invalid_api_key")) => {
                ProviderError::AuthenticationError(message)
            }
            (StatusCode::TOO_MANY_REQUESTS, _) | (_, Some("rate_limit_exceeded")) => {
                ProviderError::RateLimitExceeded(message)
            }
            _ => {
                let error = ProviderError::ApiError {
                    status_code: status.as_u16(),
                    message: message.clone(),
                };
                if error.is_input_too_long() {
                    ProviderError::InputTooLong(message)
                } else {
                    error
                }
            }
        }
    }

    /// Interpret one line of the event stream
    fn parse_event(line: &str) -> Result<StreamEvent, ProviderError> {
        let line = line.trim();
        let Some(payload) = line.strip_prefix("data:") else {
            return Ok(StreamEvent::Ignore);
        };

        let payload = payload.trim();
        if payload == "[DONE]" {
            return Ok(StreamEvent::Done);
        }

        if let Ok(body) = serde_json::from_str::<ErrorBody>(payload) {
            return Ok(StreamEvent::Failed(body.error));
        }

        let chunk: ChatChunk = serde_json::from_str(payload)
            .map_err(|e| ProviderError::ParseError(format!("{}: {}", e, payload)))?;

        let mut delta = String::new();
        let mut stopped = false;
        for choice in chunk.choices {
            if let Some(content) = choice.delta.content {
                delta.push_str(&content);
            }
            match choice.finish_reason.as_deref() {
                Some("length") => return Ok(StreamEvent::Truncated),
                Some(_) => stopped = true,
                None => {}
            }
        }

        if stopped {
            Ok(StreamEvent::Stop(delta))
        } else if delta.is_empty() {
            Ok(StreamEvent::Ignore)
        } else {
            Ok(StreamEvent::Delta(delta))
        }
    }

    /// Last few characters of the output so far, on one line
    fn progress_tail(output: &str) -> String {
        let count = output.chars().count();
        output
            .chars()
            .skip(count.saturating_sub(PROGRESS_TAIL_CHARS))
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect()
    }
}

#[async_trait]
impl ApiCaller for OpenAi {
    async fn call(
        &self,
        text: &str,
        instruction: &str,
        options: &ApiOptions,
        on_status: StatusCallback<'_>,
    ) -> Result<String, ProviderError> {
        let request = ChatRequest {
            model: &options.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: instruction,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
            temperature: options.temperature,
            stream: true,
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    ProviderError::ConnectionError(e.to_string())
                } else {
                    ProviderError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("OpenAI API error ({}): {}", status, body);
            return Err(Self::error_from_response(status, &body));
        }

        Self::read_stream(status, response.bytes_stream(), on_status).await
    }
}

impl OpenAi {
    /// Collect the streamed answer of a successful response
    async fn read_stream<S, E>(
        status: StatusCode,
        stream: S,
        on_status: StatusCallback<'_>,
    ) -> Result<String, ProviderError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: fmt::Display,
    {
        let mut stream = std::pin::pin!(stream);
        let mut buffer = BytesMut::new();
        let mut output = String::new();
        let mut finished = false;
        let mut closed = false;

        while !closed {
            match stream.next().await {
                Some(chunk) => {
                    let chunk = chunk.map_err(|e| ProviderError::StreamError(e.to_string()))?;
                    buffer.extend_from_slice(&chunk);
                }
                None => {
                    // Flush a last line sent without its newline
                    if !buffer.is_empty() && !buffer.ends_with(b"\n") {
                        buffer.extend_from_slice(b"\n");
                    }
                    closed = true;
                }
            }

            while let Some(newline) = buffer.iter().position(|b| *b == b'\n') {
                let line = buffer.split_to(newline + 1);
                match Self::parse_event(&String::from_utf8_lossy(&line))? {
                    StreamEvent::Delta(delta) => {
                        output.push_str(&delta);
                        on_status(TranslationStatus::pending(Self::progress_tail(&output)));
                    }
                    StreamEvent::Stop(delta) => {
                        output.push_str(&delta);
                        finished = true;
                    }
                    StreamEvent::Truncated => {
                        return Err(ProviderError::InputTooLong(
                            "Response was cut off at the model's output limit".to_string(),
                        ));
                    }
                    StreamEvent::Failed(detail) => {
                        let error = Self::error_from_detail(status, detail);
                        error!("OpenAI stream error: {}", error);
                        return Err(error);
                    }
                    StreamEvent::Done => {
                        debug!("OpenAI stream finished with {} chars", output.len());
                        return Ok(output);
                    }
                    StreamEvent::Ignore => {}
                }
            }
        }

        // Some compatible servers close the stream without [DONE] after the final chunk
        if finished {
            return Ok(output);
        }

        warn!(
            "OpenAI stream closed before the answer was complete ({} chars received)",
            output.len()
        );
        Err(ProviderError::StreamError(
            "Stream closed before the answer was complete".to_string(),
        ))
    }
}
