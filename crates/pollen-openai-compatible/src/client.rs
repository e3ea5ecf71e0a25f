use async_stream::try_stream;

use bytes::BytesMut;
use futures_core::Stream;
use futures_util::StreamExt;
use reqwest::{
    Client as HttpClient, Response,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use std::time::Duration;

use crate::{
    api_v1::{
        ChatCompletionChunkResponse, ChatCompletionRequest, ChatCompletionResponse, StreamPayload,
    },
    error::OpenAiCompatibleError,
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Longest silence tolerated between two reads of a response body.
const READ_TIMEOUT: Duration = Duration::from_secs(120);
/// Total deadline of a non-streaming request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// How often, and how patiently, failed requests are repeated.
///
/// Only connection failures, timeouts, `429` and `5xx` answers are retried.
/// Streams are retried while opening; once the first byte arrived a failure
/// is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Fail on the first error.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    pub fn with_max_backoff(mut self, backoff: Duration) -> Self {
        self.max_backoff = backoff;
        self
    }

    /// Delay before retry number `attempt + 1` (doubling, capped).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.initial_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

/// Minimal HTTP client for an OpenAI-compatible *chat/completions* endpoint.
///
/// * Accepts and returns the `api_v1` request / response structs defined
///   in this crate.
/// * Shares a single `reqwest::Client`, so cloning is cheap.
/// * The bearer token is optional; hosts like Pollinations serve anonymous
///   requests on a lower tier.
#[derive(Clone)]
pub struct OpenAiCompatibleClient {
    provider: String,
    api_key: Option<String>,
    http: HttpClient,
    base: String,
    headers: HeaderMap,
    retry: RetryPolicy,
    request_timeout: Duration,
}

impl std::fmt::Debug for OpenAiCompatibleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleClient")
            .field("provider", &self.provider)
            .field("base", &self.base)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("retry", &self.retry)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl OpenAiCompatibleClient {
    /// Convenience constructor building a default `reqwest` client.
    ///
    /// The client only bounds connecting and idle reads, so long streams from
    /// reasoning models stay open while data keeps arriving. Non-streaming
    /// calls additionally get a total deadline, see [`Self::with_request_timeout`].
    pub fn new(
        provider: impl Into<String>,
        base_url: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, OpenAiCompatibleError> {
        let http = HttpClient::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .read_timeout(READ_TIMEOUT)
            .build()?;

        Ok(Self::with_http(provider, http, base_url, api_key))
    }

    /// Build with a custom `reqwest::Client` in case the caller needs proxy
    /// settings, custom TLS, etc.
    pub fn with_http(
        provider: impl Into<String>,
        http: HttpClient,
        base_url: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            api_key,
            http,
            base: base_url.into().trim_end_matches('/').to_owned(),
            headers: HeaderMap::new(),
            retry: RetryPolicy::default(),
            request_timeout: REQUEST_TIMEOUT,
        }
    }

    /// Total deadline for non-streaming calls; streams are never cut by it.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Extra headers sent with every request.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Whether requests carry a bearer token.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Perform a **non-streaming** chat completion.
    pub async fn chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, OpenAiCompatibleError> {
        let resp = self.post(&request, false).await?;

        let bytes = resp.bytes().await?;
        let parsed: ChatCompletionResponse = serde_json::from_slice(&bytes)?;
        Ok(parsed)
    }

    /// Perform a **streaming** chat completion.
    pub fn chat_completion_stream(
        &self,
        mut request: ChatCompletionRequest,
    ) -> impl Stream<Item = Result<ChatCompletionChunkResponse, OpenAiCompatibleError>> + Send + '_
    {
        request.stream = Some(true);

        try_stream! {
            let resp = self.post(&request, true).await?;

            let mut bytes_stream = resp.bytes_stream();
            let mut frames = SseFrames::default();

            while let Some(chunk) = bytes_stream.next().await {
                frames.extend(&chunk?);

                while let Some(frame) = frames.next_frame()? {
                    match frame {
                        SseFrame::Done => {
                            tracing::trace!(provider = %self.provider, "stream finished with [DONE]");
                            return;
                        }
                        SseFrame::Data(data) => {
                            let parsed = parse_chunk(&data)?;
                            yield parsed;
                        }
                    }
                }
            }

            // Some hosts close the connection without a trailing blank line.
            if let Some(SseFrame::Data(data)) = frames.finish()? {
                let parsed = parse_chunk(&data)?;
                yield parsed;
            }
            tracing::trace!(provider = %self.provider, "stream closed by host");
        }
    }

    fn request_headers(&self, streaming: bool) -> Result<HeaderMap, OpenAiCompatibleError> {
        let mut headers = self.headers.clone();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if streaming {
            headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
        }
        if let Some(api_key) = &self.api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|_| {
                OpenAiCompatibleError::Format("API key contains invalid header characters".into())
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    async fn post(
        &self,
        request: &ChatCompletionRequest,
        streaming: bool,
    ) -> Result<Response, OpenAiCompatibleError> {
        let headers = self.request_headers(streaming)?;
        let url = format!("{}/chat/completions", self.base);

        tracing::debug!(
            provider = %self.provider,
            %url,
            model = %request.model,
            stream = streaming,
            "sending chat completion request"
        );

        let mut attempt = 0;
        loop {
            let mut builder = self.http.post(&url).headers(headers.clone()).json(request);
            if !streaming {
                builder = builder.timeout(self.request_timeout);
            }

            let err = match builder.send().await {
                Ok(resp) if resp.status().is_success() => return Ok(resp),
                Ok(resp) => {
                    let status = resp.status();
                    let body = resp.text().await.unwrap_or_default();
                    OpenAiCompatibleError::Api { status, body }
                }
                Err(err) => OpenAiCompatibleError::Http(err),
            };

            if attempt >= self.retry.max_retries || !err.is_retryable() {
                return Err(err);
            }

            let delay = self.retry.backoff(attempt);
            attempt += 1;
            tracing::warn!(
                provider = %self.provider,
                attempt,
                max_retries = self.retry.max_retries,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "chat completion request failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

/// Decode one `data:` payload, turning in-band error reports into errors.
fn parse_chunk(data: &str) -> Result<ChatCompletionChunkResponse, OpenAiCompatibleError> {
    match serde_json::from_str(data)? {
        StreamPayload::Chunk(chunk) => Ok(chunk),
        StreamPayload::Error(envelope) => Err(OpenAiCompatibleError::Stream(envelope.message())),
    }
}

#[derive(Debug, PartialEq, Eq)]
enum SseFrame {
    Data(String),
    Done,
}

/// Incremental splitter for `text/event-stream` bodies.
#[derive(Debug, Default)]
struct SseFrames {
    buf: BytesMut,
}

impl SseFrames {
    fn extend(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Next frame carrying data; frames with only comments or other fields
    /// are skipped.
    fn next_frame(&mut self) -> Result<Option<SseFrame>, OpenAiCompatibleError> {
        while let Some((end, sep_len)) = find_frame_end(&self.buf) {
            let frame = self.buf.split_to(end + sep_len);
            if let Some(parsed) = parse_frame(&frame[..end])? {
                return Ok(Some(parsed));
            }
        }
        Ok(None)
    }

    /// Flush whatever is left once the body ended.
    fn finish(&mut self) -> Result<Option<SseFrame>, OpenAiCompatibleError> {
        if let Some(frame) = self.next_frame()? {
            return Ok(Some(frame));
        }
        let rest = self.buf.split();
        parse_frame(&rest)
    }
}

fn find_frame_end(buf: &[u8]) -> Option<(usize, usize)> {
    let lf = buf.windows(2).position(|w| w == b"\n\n").map(|pos| (pos, 2));
    let crlf = buf
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|pos| (pos, 4));

    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

fn parse_frame(frame: &[u8]) -> Result<Option<SseFrame>, OpenAiCompatibleError> {
    let text = std::str::from_utf8(frame)?;

    let mut data: Option<String> = None;
    for line in text.lines() {
        let Some(value) = line.strip_prefix("data:") else {
            continue;
        };
        let value = value.strip_prefix(' ').unwrap_or(value);
        match data.as_mut() {
            Some(existing) => {
                existing.push('\n');
                existing.push_str(value);
            }
            None => data = Some(value.to_owned()),
        }
    }

    Ok(data.map(|data| {
        if data.trim() == "[DONE]" {
            SseFrame::Done
        } else {
            SseFrame::Data(data)
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy::default()
            .with_initial_backoff(Duration::from_millis(100))
            .with_max_backoff(Duration::from_millis(350));

        assert_eq!(policy.backoff(0), Duration::from_millis(100));
        assert_eq!(policy.backoff(1), Duration::from_millis(200));
        assert_eq!(policy.backoff(2), Duration::from_millis(350));
        assert_eq!(policy.backoff(40), Duration::from_millis(350));
    }

    #[test]
    fn frames_split_across_chunks() {
        let mut frames = SseFrames::default();
        frames.extend(b"data: {\"a\":");
        assert_eq!(frames.next_frame().unwrap(), None);

        frames.extend(b"1}\n\ndata: [DONE]\n\n");
        assert_eq!(
            frames.next_frame().unwrap(),
            Some(SseFrame::Data("{\"a\":1}".into()))
        );
        assert_eq!(frames.next_frame().unwrap(), Some(SseFrame::Done));
        assert_eq!(frames.next_frame().unwrap(), None);
    }

    #[test]
    fn comments_and_crlf_are_handled() {
        let mut frames = SseFrames::default();
        frames.extend(b": keep-alive\r\n\r\nevent: message\r\ndata:{\"b\":2}\r\n\r\n");

        assert_eq!(
            frames.next_frame().unwrap(),
            Some(SseFrame::Data("{\"b\":2}".into()))
        );
    }

    #[test]
    fn trailing_frame_without_separator_is_flushed() {
        let mut frames = SseFrames::default();
        frames.extend(b"data: {\"c\":3}");
        assert_eq!(frames.next_frame().unwrap(), None);
        assert_eq!(
            frames.finish().unwrap(),
            Some(SseFrame::Data("{\"c\":3}".into()))
        );
    }

    #[test]
    fn error_frames_become_errors() {
        let err = parse_chunk(r#"{"error":{"message":"upstream model crashed","code":500}}"#)
            .unwrap_err();
        assert!(
            matches!(&err, OpenAiCompatibleError::Stream(msg) if msg == "upstream model crashed")
        );

        let err = parse_chunk(r#"{"error":"rate limited"}"#).unwrap_err();
        assert!(matches!(&err, OpenAiCompatibleError::Stream(msg) if msg == "rate limited"));

        let chunk = parse_chunk(r#"{"choices":[{"index":0,"delta":{"content":"Hi"}}]}"#).unwrap();
        assert_eq!(chunk.choices[0].delta.content.as_deref(), Some("Hi"));
    }

    #[test]
    fn api_key_is_optional() {
        let anonymous = OpenAiCompatibleClient::with_http(
            "test",
            HttpClient::new(),
            "http://localhost/v1/",
            None,
        );
        assert_eq!(anonymous.base_url(), "http://localhost/v1");
        let headers = anonymous.request_headers(true).unwrap();
        assert!(headers.get(AUTHORIZATION).is_none());
        assert_eq!(headers[ACCEPT], "text/event-stream");

        let authed = OpenAiCompatibleClient::with_http(
            "test",
            HttpClient::new(),
            "http://localhost/v1",
            Some("tok".into()),
        );
        let headers = authed.request_headers(false).unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer tok");
        assert!(headers.get(ACCEPT).is_none());
    }
}
