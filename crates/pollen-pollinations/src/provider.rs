use std::{env, time::Duration};

use pollen_core::error::{PollenError, Result};
use pollen_openai_compatible::{OpenAiCompatibleAdapter, OpenAiCompatibleAdapterBuilder, RetryPolicy};

use crate::{PollinationsChatModel, PollinationsChatModelId, PollinationsChatSettings};

/// OpenAI-compatible text endpoint of Pollinations.
pub const DEFAULT_BASE_URL: &str = "https://text.pollinations.ai/openai";

/// Name used in logs and error messages.
pub const PROVIDER_NAME: &str = "pollinations";

/// Optional API token; without it requests are anonymous.
pub const ENV_API_TOKEN: &str = "POLLINATIONS_API_TOKEN";

/// Optional override of [`DEFAULT_BASE_URL`].
pub const ENV_BASE_URL: &str = "POLLINATIONS_BASE_URL";

/// Factory for Pollinations chat models.
///
/// All models created by one provider share its HTTP connection pool.
#[derive(Debug, Clone)]
pub struct PollinationsProvider {
    adapter: OpenAiCompatibleAdapter,
}

impl PollinationsProvider {
    /// Chat model for `model_id` configured with `settings`.
    pub fn chat_model(
        &self,
        model_id: impl Into<PollinationsChatModelId>,
        settings: PollinationsChatSettings,
    ) -> PollinationsChatModel {
        let model_id = model_id.into();
        tracing::debug!(
            provider = PROVIDER_NAME,
            model = %model_id,
            known = model_id.is_known(),
            "creating chat model"
        );
        PollinationsChatModel::new(model_id, self.adapter.with_settings(settings.clone()), settings)
    }

    pub fn base_url(&self) -> &str {
        self.adapter.client().base_url()
    }
}

/// Builder for [`PollinationsProvider`].
///
/// ```rust
/// use pollen_pollinations::{PollinationsProviderBuilder, DEFAULT_BASE_URL};
///
/// let provider = PollinationsProviderBuilder::new().build().unwrap();
/// assert_eq!(provider.base_url(), DEFAULT_BASE_URL);
/// ```
#[derive(Debug, Default)]
pub struct PollinationsProviderBuilder {
    api_token: Option<String>,
    base_url: Option<String>,
    headers: Vec<(String, String)>,
    retry: Option<RetryPolicy>,
    request_timeout: Option<Duration>,
    http: Option<reqwest::Client>,
}

impl PollinationsProviderBuilder {
    /// Anonymous access against [`DEFAULT_BASE_URL`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads [`ENV_API_TOKEN`] and [`ENV_BASE_URL`]; both are optional.
    ///
    /// An unusable base URL only surfaces during [`Self::build`].
    pub fn new_from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`Self::new_from_env`] but reads variables through `lookup`.
    /// Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            api_token: read(ENV_API_TOKEN),
            base_url: read(ENV_BASE_URL),
            ..Self::default()
        }
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Deadline for non-streaming calls. Streams stay open as long as data
    /// keeps arriving.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// # Errors
    ///
    /// * [`PollenError::Invalid`] – empty base URL, a URL without an
    ///   `http(s)://` scheme, or an invalid header.
    pub fn build(self) -> Result<PollinationsProvider> {
        let base_url = self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        if base_url.trim().is_empty() {
            return Err(PollenError::Invalid("Pollinations base URL is empty".into()));
        }

        let mut builder = OpenAiCompatibleAdapterBuilder::new(PROVIDER_NAME)
            .with_base_url(base_url)
            .with_optional_api_key(self.api_token);
        for (name, value) in self.headers {
            builder = builder.with_header(name, value);
        }
        if let Some(retry) = self.retry {
            builder = builder.with_retry_policy(retry);
        }
        if let Some(timeout) = self.request_timeout {
            builder = builder.with_request_timeout(timeout);
        }
        if let Some(http) = self.http {
            builder = builder.with_http_client(http);
        }

        let adapter = builder.build()?;
        tracing::debug!(
            provider = PROVIDER_NAME,
            base_url = adapter.client().base_url(),
            "Pollinations provider ready"
        );

        Ok(PollinationsProvider { adapter })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn env_token_and_base_url_are_picked_up() {
        let builder = PollinationsProviderBuilder::from_lookup(lookup(&[
            (ENV_API_TOKEN, "tok-1"),
            (ENV_BASE_URL, "http://localhost:9000/openai/"),
        ]));
        assert_eq!(builder.api_token.as_deref(), Some("tok-1"));

        let provider = builder.build().unwrap();
        assert_eq!(provider.base_url(), "http://localhost:9000/openai");
        assert!(provider.adapter.client().has_api_key());
    }

    #[test]
    fn blank_env_values_count_as_unset() {
        let builder = PollinationsProviderBuilder::from_lookup(lookup(&[
            (ENV_API_TOKEN, "   "),
            (ENV_BASE_URL, ""),
        ]));
        assert!(builder.api_token.is_none());
        assert!(builder.base_url.is_none());
        assert_eq!(builder.build().unwrap().base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn missing_env_means_anonymous_default_endpoint() {
        let builder = PollinationsProviderBuilder::from_lookup(lookup(&[]));
        assert!(builder.api_token.is_none());

        let provider = builder.build().unwrap();
        assert_eq!(provider.base_url(), DEFAULT_BASE_URL);
        assert!(!provider.adapter.client().has_api_key());
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let provider = PollinationsProviderBuilder::new()
            .with_base_url("http://localhost:8080/openai/")
            .build()
            .unwrap();
        assert_eq!(provider.base_url(), "http://localhost:8080/openai");
    }

    #[test]
    fn empty_or_schemeless_base_url_fails() {
        let empty = PollinationsProviderBuilder::new().with_base_url("  ").build();
        assert!(matches!(empty, Err(PollenError::Invalid(_))));

        let schemeless = PollinationsProviderBuilder::new()
            .with_base_url("text.pollinations.ai/openai")
            .build();
        assert!(matches!(schemeless, Err(PollenError::Invalid(_))));
    }

    #[test]
    fn chat_model_keeps_id_and_settings() {
        let provider = PollinationsProviderBuilder::new().build().unwrap();
        let model = provider.chat_model(
            "openai-reasoning",
            PollinationsChatSettings::new().with_user("u-3"),
        );

        assert_eq!(model.model_id(), &PollinationsChatModelId::OpenAiReasoning);
        assert_eq!(model.settings().user.as_deref(), Some("u-3"));
    }
}
