use std::{sync::Arc, time::Duration};

use pollen_core::error::{PollenError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::{
    OpenAiCompatibleChatSettings,
    api_v1::ChatCompletionRequest,
    client::{OpenAiCompatibleClient, RetryPolicy},
};

/// Wires the HTTP client [`OpenAiCompatibleClient`] and a set of
/// [`OpenAiCompatibleChatSettings`] into a value that implements the
/// `pollen-core` provider traits.
///
/// Cloning is cheap: the client sits behind an `Arc`, so several adapters with
/// different settings can share one connection pool.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleAdapter {
    pub(crate) client: Arc<OpenAiCompatibleClient>,
    pub(crate) settings: OpenAiCompatibleChatSettings,
}

impl OpenAiCompatibleAdapter {
    pub fn settings(&self) -> &OpenAiCompatibleChatSettings {
        &self.settings
    }

    pub fn provider(&self) -> &str {
        self.client.provider()
    }

    pub fn client(&self) -> &OpenAiCompatibleClient {
        &self.client
    }

    /// Same connection, different settings.
    pub fn with_settings(&self, settings: impl Into<OpenAiCompatibleChatSettings>) -> Self {
        Self {
            client: Arc::clone(&self.client),
            settings: settings.into(),
        }
    }

    /// Apply per-model settings that have a wire representation.
    pub(crate) fn apply_settings(&self, mut request: ChatCompletionRequest) -> ChatCompletionRequest {
        if let Some(user) = &self.settings.user {
            request.user = Some(user.clone());
        }
        request
    }
}

/// Builder for [`OpenAiCompatibleAdapter`].
///
/// ```rust,no_run
/// use pollen_openai_compatible::OpenAiCompatibleAdapterBuilder;
///
/// let backend = OpenAiCompatibleAdapterBuilder::new("my-host")
///     .with_base_url("https://llm.example.com/v1")
///     .with_api_key("secret")
///     .build()
///     .expect("base URL is set");
/// ```
#[derive(Debug, Default)]
pub struct OpenAiCompatibleAdapterBuilder {
    pub(crate) provider: String,
    pub(crate) base_url: Option<String>,
    pub(crate) api_key: Option<String>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) retry: Option<RetryPolicy>,
    pub(crate) request_timeout: Option<Duration>,
    pub(crate) settings: OpenAiCompatibleChatSettings,
    pub(crate) http: Option<reqwest::Client>,
}

impl OpenAiCompatibleAdapterBuilder {
    /// `provider` shows up in logs and error messages.
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Like [`Self::with_api_key`] but keeps anonymous access on `None`.
    pub fn with_optional_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set a retry policy for HTTP calls.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Total deadline for non-streaming calls. Streams are only bounded by
    /// the HTTP client's connect and read timeouts.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_settings(mut self, settings: impl Into<OpenAiCompatibleChatSettings>) -> Self {
        self.settings = settings.into();
        self
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Finalise the builder and return a ready-to-use adapter.
    ///
    /// # Errors
    ///
    /// * [`PollenError::Invalid`] – missing or malformed base URL, or a header
    ///   that is not valid HTTP.
    /// * [`PollenError::Backend`] – the HTTP client could not be built.
    pub fn build(self) -> Result<OpenAiCompatibleAdapter> {
        let base_url = self
            .base_url
            .map(|url| url.trim().trim_end_matches('/').to_owned())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                PollenError::Invalid(format!("missing base URL for provider `{}`", self.provider))
            })?;

        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(PollenError::Invalid(format!(
                "base URL must start with http:// or https://, got `{base_url}`"
            )));
        }

        let mut headers = HeaderMap::new();
        for (name, value) in self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| PollenError::Invalid(format!("invalid header name `{name}`")))?;
            let header_value = HeaderValue::from_str(&value)
                .map_err(|_| PollenError::Invalid(format!("invalid value for header `{name}`")))?;
            headers.insert(header_name, header_value);
        }

        let client = match self.http {
            Some(http) => {
                OpenAiCompatibleClient::with_http(self.provider, http, base_url, self.api_key)
            }
            None => OpenAiCompatibleClient::new(self.provider, base_url, self.api_key)?,
        }
        .with_headers(headers);

        let client = match self.retry {
            Some(retry) => client.with_retry_policy(retry),
            None => client,
        };
        let client = match self.request_timeout {
            Some(timeout) => client.with_request_timeout(timeout),
            None => client,
        };

        Ok(OpenAiCompatibleAdapter {
            client: Arc::new(client),
            settings: self.settings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_required() {
        let err = OpenAiCompatibleAdapterBuilder::new("host").build().unwrap_err();
        assert!(matches!(err, PollenError::Invalid(msg) if msg.contains("host")));
    }

    #[test]
    fn base_url_needs_scheme() {
        let err = OpenAiCompatibleAdapterBuilder::new("host")
            .with_base_url("llm.example.com")
            .build()
            .unwrap_err();
        assert!(matches!(err, PollenError::Invalid(_)));
    }

    #[test]
    fn invalid_header_is_rejected() {
        let err = OpenAiCompatibleAdapterBuilder::new("host")
            .with_base_url("https://llm.example.com")
            .with_header("bad header", "x")
            .build()
            .unwrap_err();
        assert!(matches!(err, PollenError::Invalid(msg) if msg.contains("bad header")));
    }

    #[test]
    fn settings_user_is_applied_to_requests() {
        let adapter = OpenAiCompatibleAdapterBuilder::new("host")
            .with_base_url("https://llm.example.com/v1/")
            .with_settings(OpenAiCompatibleChatSettings::new().with_user("u-1"))
            .build()
            .unwrap();
        assert_eq!(adapter.client().base_url(), "https://llm.example.com/v1");

        let request = adapter.apply_settings(ChatCompletionRequest::new("openai".into(), vec![]));
        assert_eq!(request.user.as_deref(), Some("u-1"));

        let plain = adapter.with_settings(OpenAiCompatibleChatSettings::default());
        let request = plain.apply_settings(ChatCompletionRequest::new("openai".into(), vec![]));
        assert!(request.user.is_none());
    }
}
