//! Generic message and role types used by the *pollen-core* crate.
//!
//! They mirror the concepts exposed by most chat APIs: “system”, “user”,
//! “assistant”, and “tool”.  Provider crates convert them into their wire
//! structs via plain `From`/`Into` impls.
use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Lightweight container representing a single chat message that is
/// independent of any specific LLM provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericMessage {
    pub content: Option<String>,
    pub role: GenericRole,
    pub name: Option<String>,
    pub tool_calls: Option<Vec<GenericFunctionCallIntent>>,
    pub tool_call_id: Option<String>,
}

impl GenericMessage {
    /// ```rust
    /// use pollen_core::generic::{GenericMessage, GenericRole};
    ///
    /// let sys = GenericMessage::new("You are a helpful bot.".into(),
    ///                               GenericRole::System);
    /// assert_eq!(sys.content.as_deref(), Some("You are a helpful bot."));
    /// ```
    pub fn new(message: String, role: GenericRole) -> Self {
        Self {
            content: Some(message),
            role,
            name: None,
            tool_call_id: None,
            tool_calls: None,
        }
    }

    pub fn system(message: impl Into<String>) -> Self {
        Self::new(message.into(), GenericRole::System)
    }

    pub fn user(message: impl Into<String>) -> Self {
        Self::new(message.into(), GenericRole::User)
    }

    pub fn assistant(message: impl Into<String>) -> Self {
        Self::new(message.into(), GenericRole::Assistant)
    }

    /// Tool result answering the call with `tool_call_id`.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            role: GenericRole::Tool,
            name: None,
            tool_calls: None,
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    pub fn new_tool_call(tool_calls: Vec<GenericFunctionCallIntent>) -> Self {
        Self {
            content: None,
            role: GenericRole::Assistant,
            name: None,
            tool_calls: Some(tool_calls),
            tool_call_id: None,
        }
    }

    pub fn with_name(mut self, name: impl ToString) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_tool_call_id(mut self, tool_call_id: impl ToString) -> Self {
        self.tool_call_id = Some(tool_call_id.to_string());
        self
    }
}

/// High-level chat roles recognised by most LLM providers.
///
/// The `Display` implementation renders the canonical lowercase name.
#[derive(Debug, Clone, Serialize, Deserialize, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GenericRole {
    System,
    Assistant,
    User,
    /// Result of a **tool call** injected back into the conversation.
    Tool,
}

impl Display for GenericRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenericRole::System => write!(f, "system"),
            GenericRole::Assistant => write!(f, "assistant"),
            GenericRole::User => write!(f, "user"),
            GenericRole::Tool => write!(f, "tool"),
        }
    }
}

#[derive(Debug)]
pub struct GenericChatCompletionResponse<T> {
    pub content: ResponseContent<T>,
    pub usage: Option<GenericUsageReport>,
}

#[derive(Debug)]
pub enum ResponseContent<T> {
    Finished(T),
    ToolCalls(GenericMessage),
}

impl<T> ResponseContent<T> {
    pub fn finished(self) -> Option<T> {
        match self {
            ResponseContent::Finished(value) => Some(value),
            ResponseContent::ToolCalls(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenericUsageReport {
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub total_tokens: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericFunctionCallIntent {
    pub id: String,
    pub function: GenericFunctionCall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericFunctionCall {
    pub name: String,
    pub arguments: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct GenericFunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
    /// Ask the host to enforce `parameters` exactly. Left unset, the flag is
    /// not sent and the host's default applies.
    pub strict: Option<bool>,
}

impl GenericFunctionSpec {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            strict: None,
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Plain text delta emitted by the assistant.
    TextDelta(String),

    /// Reasoning text emitted by reasoning models ahead of the answer.
    ReasoningDelta(String),

    /// A tool-call was initiated (OpenAI-style indexed stream).
    ToolCallStart {
        index: usize,
        id: Option<String>,
        name: Option<String>,
    },

    /// A partial arguments JSON fragment for tool-call at `index`.
    ToolCallArgumentsDelta {
        index: usize,
        arguments_fragment: String,
    },

    /// A completed tool-call intent (arguments parsed into JSON).
    ToolCallComplete {
        index: usize,
        intent: GenericFunctionCallIntent,
    },

    /// The assistant finished the message (e.g. stop or tool_calls).
    MessageEnd,

    /// Token usage report, usually right before the stream closes.
    Usage(GenericUsageReport),
}
