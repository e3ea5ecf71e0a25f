use std::ops::{Deref, DerefMut};

use pollen_openai_compatible::OpenAiCompatibleChatSettings;
use serde::{Deserialize, Serialize};

/// Chat settings for Pollinations models.
///
/// Pollinations currently needs nothing beyond the OpenAI-compatible
/// settings, so this type only embeds them.  Base fields are reachable
/// through `Deref`, and both types convert into each other without loss.
/// Pollinations-specific options belong here.
///
/// ```rust
/// use pollen_openai_compatible::OpenAiCompatibleChatSettings;
/// use pollen_pollinations::PollinationsChatSettings;
///
/// let mut settings = PollinationsChatSettings::default();
/// settings.user = Some("user-42".into());
///
/// let base: OpenAiCompatibleChatSettings = settings.clone().into();
/// assert_eq!(PollinationsChatSettings::from(base), settings);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollinationsChatSettings {
    #[serde(flatten)]
    base: OpenAiCompatibleChatSettings,
}

impl PollinationsChatSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.base = self.base.with_user(user);
        self
    }

    pub fn with_simulate_streaming(mut self, simulate: bool) -> Self {
        self.base = self.base.with_simulate_streaming(simulate);
        self
    }

    pub fn base(&self) -> &OpenAiCompatibleChatSettings {
        &self.base
    }

    pub fn into_base(self) -> OpenAiCompatibleChatSettings {
        self.base
    }
}

impl Deref for PollinationsChatSettings {
    type Target = OpenAiCompatibleChatSettings;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl DerefMut for PollinationsChatSettings {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.base
    }
}

impl From<OpenAiCompatibleChatSettings> for PollinationsChatSettings {
    fn from(base: OpenAiCompatibleChatSettings) -> Self {
        Self { base }
    }
}

impl From<PollinationsChatSettings> for OpenAiCompatibleChatSettings {
    fn from(value: PollinationsChatSettings) -> Self {
        value.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn conversions_are_lossless_both_ways() {
        let base = OpenAiCompatibleChatSettings::new()
            .with_user("u")
            .with_simulate_streaming(true);

        let extended = PollinationsChatSettings::from(base.clone());
        assert_eq!(extended.base(), &base);
        assert_eq!(OpenAiCompatibleChatSettings::from(extended), base);
    }

    #[test]
    fn base_fields_are_reachable_through_deref() {
        let mut settings = PollinationsChatSettings::new().with_simulate_streaming(false);
        settings.user = Some("u-9".into());

        assert_eq!(settings.user.as_deref(), Some("u-9"));
        assert_eq!(settings.simulate_streaming, Some(false));
    }

    #[test]
    fn serialises_exactly_like_the_base() {
        let extended = PollinationsChatSettings::new().with_user("u-1");
        let base = OpenAiCompatibleChatSettings::new().with_user("u-1");

        let json = serde_json::to_value(&extended).unwrap();
        assert_eq!(json, serde_json::to_value(&base).unwrap());
        assert_eq!(json, json!({"user": "u-1"}));

        let parsed: PollinationsChatSettings =
            serde_json::from_value(json!({"simulateStreaming": true})).unwrap();
        assert_eq!(parsed.simulate_streaming, Some(true));
        assert!(parsed.user.is_none());
    }
}
