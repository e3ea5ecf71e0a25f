use pollen_core::generic::{GenericFunctionCall, GenericFunctionCallIntent, GenericFunctionSpec};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct ToolSpec {
    pub function: ToolFunctionSpec,
    pub r#type: ToolType,
}

impl From<GenericFunctionSpec> for ToolSpec {
    fn from(value: GenericFunctionSpec) -> Self {
        ToolSpec {
            function: ToolFunctionSpec {
                name: value.name,
                description: value.description,
                parameters: value.parameters,
                strict: value.strict,
            },
            r#type: ToolType::Function,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct ToolFunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

#[derive(Debug, Deserialize, Serialize, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ToolType {
    Function,
}

#[derive(Debug, Deserialize, Serialize, Copy, Clone)]
#[serde(rename_all = "snake_case")]
pub enum ToolChoice {
    None,
    Auto,
    Required,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolCall {
    pub id: String,
    pub function: ToolCallFunction,
    pub r#type: ToolType,
}

impl From<ToolCall> for GenericFunctionCallIntent {
    fn from(value: ToolCall) -> Self {
        GenericFunctionCallIntent {
            id: value.id,
            function: value.function.into(),
        }
    }
}

impl From<GenericFunctionCallIntent> for ToolCall {
    fn from(value: GenericFunctionCallIntent) -> Self {
        Self {
            id: value.id,
            function: value.function.into(),
            r#type: ToolType::Function,
        }
    }
}

/// Function call as it travels on the wire: `arguments` is a JSON document
/// encoded as a string.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolCallFunction {
    pub name: String,
    pub arguments: String,
}

impl From<ToolCallFunction> for GenericFunctionCall {
    fn from(value: ToolCallFunction) -> Self {
        // Models occasionally emit arguments that are not valid JSON; keep them
        // as a raw string instead of dropping the call.
        let arguments = serde_json::from_str(&value.arguments)
            .unwrap_or(serde_json::Value::String(value.arguments));
        GenericFunctionCall {
            name: value.name,
            arguments,
        }
    }
}

impl From<GenericFunctionCall> for ToolCallFunction {
    fn from(value: GenericFunctionCall) -> Self {
        let arguments = match value.arguments {
            serde_json::Value::String(raw) => raw,
            other => other.to_string(),
        };
        Self {
            name: value.name,
            arguments,
        }
    }
}

/// Indexed tool-call fragment inside a streamed delta.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallDelta {
    pub index: usize,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub r#type: Option<ToolType>,
    #[serde(default)]
    pub function: Option<ToolCallFunctionDelta>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallFunctionDelta {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strict_is_only_sent_when_asked_for() {
        let spec = GenericFunctionSpec::new("weather", "Current weather", json!({"type": "object"}));

        let plain = serde_json::to_value(ToolSpec::from(spec.clone())).unwrap();
        assert!(plain["function"].get("strict").is_none());

        let strict = serde_json::to_value(ToolSpec::from(spec.with_strict(true))).unwrap();
        assert_eq!(strict["function"]["strict"], true);
    }

    #[test]
    fn wire_arguments_are_parsed_into_json() {
        let call: ToolCall = serde_json::from_value(json!({
            "id": "call_1",
            "type": "function",
            "function": {"name": "weather", "arguments": "{\"city\":\"Berlin\"}"}
        }))
        .unwrap();

        let intent: GenericFunctionCallIntent = call.into();
        assert_eq!(intent.id, "call_1");
        assert_eq!(intent.function.arguments, json!({"city": "Berlin"}));
    }

    #[test]
    fn broken_arguments_survive_as_string() {
        let function = ToolCallFunction {
            name: "weather".into(),
            arguments: "{city:".into(),
        };
        let generic: GenericFunctionCall = function.into();
        assert_eq!(generic.arguments, json!("{city:"));

        let back: ToolCallFunction = generic.into();
        assert_eq!(back.arguments, "{city:");
    }

    #[test]
    fn json_arguments_are_encoded_as_string() {
        let back: ToolCallFunction = GenericFunctionCall {
            name: "weather".into(),
            arguments: json!({"city": "Oslo"}),
        }
        .into();
        assert_eq!(back.arguments, r#"{"city":"Oslo"}"#);
    }
}
