use serde::{Deserialize, Serialize};

/// Chat settings shared by every OpenAI-compatible chat model.
///
/// Provider crates may wrap this struct to attach their own options; the
/// adapter only needs something that converts into it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenAiCompatibleChatSettings {
    /// Unique identifier of the end-user, forwarded as the `user` field so the
    /// host can monitor and detect abuse.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Serve streaming calls from a single non-streaming request and replay
    /// the result as stream events. Useful for hosts or models that do not
    /// stream reliably.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulate_streaming: Option<bool>,
}

impl OpenAiCompatibleChatSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_simulate_streaming(mut self, simulate: bool) -> Self {
        self.simulate_streaming = Some(simulate);
        self
    }

    pub(crate) fn simulates_streaming(&self) -> bool {
        self.simulate_streaming.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_serialises_to_empty_object() {
        let json = serde_json::to_value(OpenAiCompatibleChatSettings::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn fields_use_camel_case() {
        let settings = OpenAiCompatibleChatSettings::new()
            .with_user("u-1")
            .with_simulate_streaming(true);
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json, serde_json::json!({"user": "u-1", "simulateStreaming": true}));

        let back: OpenAiCompatibleChatSettings = serde_json::from_value(json).unwrap();
        assert_eq!(back, settings);
        assert!(back.simulates_streaming());
    }
}
