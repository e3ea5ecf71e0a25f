use std::{future::Future, pin::Pin};

use crate::{
    error::Result,
    generic::{GenericChatCompletionResponse, GenericFunctionSpec, GenericMessage, StreamEvent},
    model::Model,
    schema_util::derive_response_schema,
};
use futures_core::stream::Stream;
use schemars::JsonSchema;

/// A **backend** turns a chat request into a network call to a concrete
/// provider and parses the chat response.
///
/// * **One associated type** – the in-memory `Message` representation this
///   provider accepts.
/// * **One async-ish method** – `chat_complete`, which performs a *single*
///   non-streaming round-trip.
///
/// The method returns a [`Pin<Box<dyn Future>>`] so we stay object-safe
/// without pulling in `async_trait`.
pub trait ChatCompletionProvider: Send + Sync {
    /// Chat message type consumed by this backend.
    type Message: Send + Sync + 'static;

    fn chat_complete<'p, M>(
        &'p self,
        params: ChatCompleteParameters<M>,
    ) -> Pin<
        Box<dyn Future<Output = Result<GenericChatCompletionResponse<GenericMessage>>> + Send + 'p>,
    >
    where
        M: Into<Self::Message> + Clone + Send + Sync + 'p;
}

/// A provider that can deliver the model’s answer **incrementally**.
///
/// The stream yields UTF-8 text *deltas* only.  Use
/// [`StreamingEventsProvider`] when tool calls or usage matter.
pub trait StreamingChatProvider: ChatCompletionProvider {
    type Delta<'s>: Stream<Item = Result<String>> + Send + 's
    where
        Self: 's;

    /// Start a streaming chat completion.
    fn chat_complete_stream<'s, M>(&'s self, params: ChatCompleteParameters<M>) -> Self::Delta<'s>
    where
        M: Into<Self::Message> + Clone + Send + Sync + 's;
}

/// Provider-agnostic trait for streaming structured events (text, reasoning,
/// tool-calls and usage).
pub trait StreamingEventsProvider: ChatCompletionProvider {
    type EventStream<'s>: Stream<Item = Result<StreamEvent>> + Send + 's
    where
        Self: 's;

    fn chat_complete_events_stream<'s, M>(
        &'s self,
        params: ChatCompleteParameters<M>,
    ) -> Self::EventStream<'s>
    where
        M: Into<Self::Message> + Clone + Send + Sync + 's;
}

#[derive(Debug, Clone)]
pub struct ChatCompleteParameters<M> {
    pub messages: Vec<M>,
    pub model: Model,
    pub tools: Option<Vec<GenericFunctionSpec>>,
    pub temperature: Option<f64>,
    pub response_format: Option<serde_json::Value>,
}

impl<M> ChatCompleteParameters<M> {
    pub fn new(messages: Vec<M>, model: impl Into<Model>) -> Self {
        Self {
            messages,
            model: model.into(),
            tools: None,
            temperature: None,
            response_format: None,
        }
    }

    pub fn messages(&self) -> &Vec<M> {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<M> {
        self.messages
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn tools(&self) -> Option<&Vec<GenericFunctionSpec>> {
        self.tools.as_ref()
    }

    pub fn with_model(mut self, model: impl Into<Model>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_response_format(mut self, response_format: serde_json::Value) -> Self {
        self.response_format = Some(response_format);
        self
    }

    /// Request structured output matching the JSON Schema of `T`.
    ///
    /// No `strict` flag is sent, so hosts that reject it still accept the
    /// request. Use [`Self::with_strict_json_schema`] to opt in.
    ///
    /// ```rust
    /// use pollen_core::{generic::GenericMessage, provider::ChatCompleteParameters};
    ///
    /// #[derive(schemars::JsonSchema)]
    /// struct Verdict { ok: bool }
    ///
    /// let params = ChatCompleteParameters::new(vec![GenericMessage::user("ok?")], "openai")
    ///     .with_json_schema::<Verdict>("verdict");
    /// let format = params.response_format.unwrap();
    /// assert_eq!(format["type"], "json_schema");
    /// assert_eq!(format["json_schema"]["name"], "verdict");
    /// assert!(format["json_schema"].get("strict").is_none());
    /// ```
    pub fn with_json_schema<T>(self, name: &str) -> Self
    where
        T: JsonSchema + 'static,
    {
        self.with_schema_format::<T>(name, None)
    }

    /// Like [`Self::with_json_schema`] but asks the host to enforce the schema.
    pub fn with_strict_json_schema<T>(self, name: &str) -> Self
    where
        T: JsonSchema + 'static,
    {
        self.with_schema_format::<T>(name, Some(true))
    }

    fn with_schema_format<T>(self, name: &str, strict: Option<bool>) -> Self
    where
        T: JsonSchema + 'static,
    {
        let mut json_schema = serde_json::json!({
            "name": name,
            "schema": derive_response_schema::<T>(),
        });
        if let Some(strict) = strict {
            json_schema["strict"] = serde_json::Value::Bool(strict);
        }
        self.with_response_format(serde_json::json!({
            "type": "json_schema",
            "json_schema": json_schema,
        }))
    }

    pub fn with_tools(mut self, tools: Vec<GenericFunctionSpec>) -> Self {
        self.tools = Some(tools);
        self
    }
}
