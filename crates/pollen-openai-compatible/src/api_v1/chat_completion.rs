use pollen_core::error::PollenError;
use pollen_core::generic::{GenericMessage, GenericRole};
use pollen_core::provider::ChatCompleteParameters;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use std::fmt;

use crate::impl_builder_methods;
use crate::model_map::map_model;

use super::common;
use super::tools::{ToolCall, ToolChoice, ToolSpec};

#[derive(Debug, Serialize, Clone)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatCompletionMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolSpec>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl ChatCompletionRequest {
    pub fn new(model: String, messages: Vec<ChatCompletionMessage>) -> Self {
        Self {
            model,
            messages,
            temperature: None,
            top_p: None,
            n: None,
            response_format: None,
            stream: None,
            tools: None,
            tool_choice: None,
            user: None,
        }
    }
}

impl_builder_methods!(
    ChatCompletionRequest,
    temperature: f64,
    top_p: f64,
    n: i64,
    response_format: serde_json::Value,
    stream: bool,
    tools: Vec<ToolSpec>,
    tool_choice: ToolChoice,
    user: String
);

impl<M> TryFrom<ChatCompleteParameters<M>> for ChatCompletionRequest
where
    M: Into<ChatCompletionMessage>,
{
    type Error = PollenError;

    fn try_from(value: ChatCompleteParameters<M>) -> Result<Self, Self::Error> {
        let model = map_model(&value.model).ok_or_else(|| {
            PollenError::InvalidRequest(format!(
                "backend does not support selected model: {:?}",
                value.model.as_str()
            ))
        })?;

        Ok(Self {
            model: model.into_owned(),
            messages: value.messages.into_iter().map(Into::into).collect(),
            tools: value
                .tools
                .map(|tools| tools.into_iter().map(Into::into).collect()),
            temperature: value.temperature,
            top_p: None,
            n: None,
            response_format: value.response_format,
            stream: None,
            tool_choice: None,
            user: None,
        })
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    System,
    Assistant,
    Function,
    Tool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
}

impl serde::Serialize for Content {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match *self {
            Content::Text(ref text) => {
                if text.is_empty() {
                    serializer.serialize_none()
                } else {
                    serializer.serialize_str(text)
                }
            }
        }
    }
}

impl<'de> Deserialize<'de> for Content {
    fn deserialize<D>(deserializer: D) -> Result<Content, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ContentVisitor;

        impl<'de> Visitor<'de> for ContentVisitor {
            type Value = Content;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or null")
            }

            fn visit_str<E>(self, value: &str) -> Result<Content, E>
            where
                E: de::Error,
            {
                Ok(Content::Text(value.to_string()))
            }

            fn visit_none<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Content::Text(String::new()))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Content::Text(String::new()))
            }
        }

        deserializer.deserialize_any(ContentVisitor)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChatCompletionMessage {
    pub role: MessageRole,
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatCompletionMessageForResponse {
    pub role: MessageRole,
    #[serde(default)]
    pub content: Option<String>,
    /// Chain of thought returned by reasoning models (`openai-reasoning`,
    /// `deepseek` reasoning variants, …).
    #[serde(default)]
    pub reasoning_content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default)]
    pub tool_call_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl From<ChatCompletionMessageForResponse> for GenericMessage {
    fn from(value: ChatCompletionMessageForResponse) -> Self {
        GenericMessage {
            content: value.content,
            role: value.role.into(),
            tool_calls: value
                .tool_calls
                .map(|calls| calls.into_iter().map(Into::into).collect()),
            name: value.name,
            tool_call_id: value.tool_call_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionChoice {
    #[serde(default)]
    pub index: i64,
    pub message: ChatCompletionMessageForResponse,
    #[serde(default)]
    pub finish_reason: Option<FinishReason>,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub model: Option<String>,
    pub choices: Vec<ChatCompletionChoice>,
    #[serde(default)]
    pub usage: Option<common::Usage>,
    #[serde(default)]
    pub system_fingerprint: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    ToolCalls,
    #[serde(other)]
    Other,
}

impl From<GenericRole> for MessageRole {
    fn from(value: GenericRole) -> Self {
        match value {
            GenericRole::System => MessageRole::System,
            GenericRole::Assistant => MessageRole::Assistant,
            GenericRole::User => MessageRole::User,
            GenericRole::Tool => MessageRole::Tool,
        }
    }
}

impl From<MessageRole> for GenericRole {
    fn from(value: MessageRole) -> Self {
        match value {
            MessageRole::User => GenericRole::User,
            MessageRole::System => GenericRole::System,
            MessageRole::Assistant => GenericRole::Assistant,
            MessageRole::Function => GenericRole::Tool,
            MessageRole::Tool => GenericRole::Tool,
        }
    }
}

impl From<GenericMessage> for ChatCompletionMessage {
    fn from(value: GenericMessage) -> Self {
        Self {
            role: value.role.into(),
            content: value.content.map(Content::Text),
            name: value.name,
            tool_calls: value
                .tool_calls
                .map(|calls| calls.into_iter().map(Into::into).collect()),
            tool_call_id: value.tool_call_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollen_core::generic::GenericFunctionSpec;
    use serde_json::json;

    #[test]
    fn request_omits_unset_fields() {
        let params = ChatCompleteParameters::new(vec![GenericMessage::user("Hi")], "mistral");
        let request = ChatCompletionRequest::try_from(params).unwrap();

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            json!({
                "model": "mistral",
                "messages": [{"role": "user", "content": "Hi"}]
            })
        );
    }

    #[test]
    fn request_carries_tools_and_user() {
        let params = ChatCompleteParameters::new(vec![GenericMessage::user("Hi")], "openai")
            .with_temperature(0.2)
            .with_tools(vec![GenericFunctionSpec::new(
                "weather",
                "Current weather",
                json!({"type": "object"}),
            )]);
        let request = ChatCompletionRequest::try_from(params)
            .unwrap()
            .user("u-7".to_string());

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["user"], "u-7");
        assert_eq!(json["temperature"], 0.2);
        assert_eq!(json["tools"][0]["type"], "function");
        assert_eq!(json["tools"][0]["function"]["name"], "weather");
        assert!(json["tools"][0]["function"].get("strict").is_none());
    }

    #[test]
    fn blank_model_is_rejected() {
        let params = ChatCompleteParameters::new(vec![GenericMessage::user("Hi")], "");
        let err = ChatCompletionRequest::try_from(params).unwrap_err();
        assert!(matches!(err, PollenError::InvalidRequest(_)));
    }

    #[test]
    fn response_tolerates_missing_metadata() {
        let response: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{
                "message": {"role": "assistant", "content": null, "reasoning_content": "hmm"},
                "finish_reason": "stop"
            }]
        }))
        .unwrap();

        assert!(response.usage.is_none());
        let choice = &response.choices[0];
        assert_eq!(choice.finish_reason, Some(FinishReason::Stop));
        assert_eq!(choice.message.reasoning_content.as_deref(), Some("hmm"));
        assert!(choice.message.content.is_none());
    }

    #[test]
    fn unknown_finish_reason_maps_to_other() {
        let reason: FinishReason = serde_json::from_value(json!("function_call")).unwrap();
        assert_eq!(reason, FinishReason::Other);
    }
}
