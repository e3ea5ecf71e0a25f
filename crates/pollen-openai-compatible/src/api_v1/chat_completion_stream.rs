use serde::Deserialize;

use super::{
    chat_completion::{FinishReason, MessageRole},
    common::Usage,
    tools::ToolCallDelta,
};

/// A delta message as returned when `stream = true`.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionMessageDelta {
    #[serde(default)]
    pub role: Option<MessageRole>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub reasoning_content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCallDelta>>,
}

/// A single streaming choice payload.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionChunkChoice {
    #[serde(default)]
    pub index: i64,
    pub delta: ChatCompletionMessageDelta,
    #[serde(default)]
    pub finish_reason: Option<FinishReason>,
}

/// The outermost object sent for each SSE chunk.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionChunkResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChatCompletionChunkChoice>,
    /// Only present on the final chunk, and only on hosts that report usage
    /// for streams.
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// Error object some hosts emit as a `data:` frame after the stream started.
#[derive(Debug, Deserialize)]
pub struct StreamErrorEnvelope {
    pub error: StreamErrorBody,
}

/// `{"error": "..."}` or `{"error": {"message": "...", ...}}`. A `null` error
/// matches neither, so such frames still decode as chunks.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StreamErrorBody {
    Message(String),
    Object(serde_json::Map<String, serde_json::Value>),
}

impl StreamErrorEnvelope {
    /// Human-readable message: `error.message`, a bare string, or the raw JSON.
    pub fn message(&self) -> String {
        match &self.error {
            StreamErrorBody::Message(message) => message.clone(),
            StreamErrorBody::Object(object) => object
                .get("message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned)
                .unwrap_or_else(|| serde_json::Value::Object(object.clone()).to_string()),
        }
    }
}

/// One `data:` payload: either a chunk or an error report.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StreamPayload {
    Error(StreamErrorEnvelope),
    Chunk(ChatCompletionChunkResponse),
}
