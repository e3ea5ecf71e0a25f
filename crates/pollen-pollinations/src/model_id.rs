use std::{convert::Infallible, fmt, str::FromStr};

use pollen_core::model::Model;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Text-generation models served by Pollinations.
///
/// The named variants are the models available with a *seed* tier token.
/// Any other name is carried verbatim in [`PollinationsChatModelId::Custom`],
/// so new or private models work without a crate release.  Whether the API
/// accepts a name is decided by the API.
///
/// ```rust
/// use pollen_pollinations::PollinationsChatModelId;
///
/// let known: PollinationsChatModelId = "deepseek".parse().unwrap();
/// assert_eq!(known, PollinationsChatModelId::DeepSeek);
///
/// let custom = PollinationsChatModelId::from("custom-model-xyz");
/// assert!(!custom.is_known());
/// assert_eq!(custom.as_str(), "custom-model-xyz");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PollinationsChatModelId {
    /// `openai`
    OpenAi,
    /// `openai-reasoning`
    OpenAiReasoning,
    /// `deepseek`
    DeepSeek,
    /// `mistral`
    Mistral,
    /// `llama`
    Llama,
    /// Any other model name.
    Custom(String),
}

impl PollinationsChatModelId {
    pub const KNOWN: [PollinationsChatModelId; 5] = [
        PollinationsChatModelId::OpenAi,
        PollinationsChatModelId::OpenAiReasoning,
        PollinationsChatModelId::DeepSeek,
        PollinationsChatModelId::Mistral,
        PollinationsChatModelId::Llama,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            PollinationsChatModelId::OpenAi => "openai",
            PollinationsChatModelId::OpenAiReasoning => "openai-reasoning",
            PollinationsChatModelId::DeepSeek => "deepseek",
            PollinationsChatModelId::Mistral => "mistral",
            PollinationsChatModelId::Llama => "llama",
            PollinationsChatModelId::Custom(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, PollinationsChatModelId::Custom(_))
    }

    fn known(name: &str) -> Option<Self> {
        Self::KNOWN.into_iter().find(|id| id.as_str() == name)
    }
}

impl From<&str> for PollinationsChatModelId {
    fn from(value: &str) -> Self {
        Self::known(value).unwrap_or_else(|| PollinationsChatModelId::Custom(value.to_owned()))
    }
}

impl From<String> for PollinationsChatModelId {
    fn from(value: String) -> Self {
        Self::known(&value).unwrap_or(PollinationsChatModelId::Custom(value))
    }
}

impl FromStr for PollinationsChatModelId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for PollinationsChatModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<PollinationsChatModelId> for Model {
    fn from(value: PollinationsChatModelId) -> Self {
        match value {
            PollinationsChatModelId::Custom(name) => Model::from(name),
            PollinationsChatModelId::OpenAi => Model::new_static("openai"),
            PollinationsChatModelId::OpenAiReasoning => Model::new_static("openai-reasoning"),
            PollinationsChatModelId::DeepSeek => Model::new_static("deepseek"),
            PollinationsChatModelId::Mistral => Model::new_static("mistral"),
            PollinationsChatModelId::Llama => Model::new_static("llama"),
        }
    }
}

impl Serialize for PollinationsChatModelId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PollinationsChatModelId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(PollinationsChatModelId::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_map_to_named_variants() {
        for (name, id) in [
            ("openai", PollinationsChatModelId::OpenAi),
            ("openai-reasoning", PollinationsChatModelId::OpenAiReasoning),
            ("deepseek", PollinationsChatModelId::DeepSeek),
            ("mistral", PollinationsChatModelId::Mistral),
            ("llama", PollinationsChatModelId::Llama),
        ] {
            let parsed = PollinationsChatModelId::from(name);
            assert_eq!(parsed, id);
            assert!(parsed.is_known());
            assert_eq!(parsed.as_str(), name);
            assert_eq!(Model::from(parsed).as_str(), name);
        }
    }

    #[test]
    fn arbitrary_names_are_kept_verbatim() {
        let id = PollinationsChatModelId::from(String::from("custom-model-xyz"));
        assert_eq!(id, PollinationsChatModelId::Custom("custom-model-xyz".into()));
        assert_eq!(id.to_string(), "custom-model-xyz");
        assert_eq!(Model::from(id).as_str(), "custom-model-xyz");
    }

    #[test]
    fn names_are_case_sensitive() {
        assert!(!PollinationsChatModelId::from("Mistral").is_known());
    }

    #[test]
    fn known_list_is_in_declaration_order() {
        let names: Vec<_> = PollinationsChatModelId::KNOWN
            .iter()
            .map(|id| id.as_str().to_owned())
            .collect();
        assert_eq!(
            names,
            ["openai", "openai-reasoning", "deepseek", "mistral", "llama"]
        );
    }

    #[test]
    fn serde_uses_plain_strings() {
        let ids: Vec<PollinationsChatModelId> =
            serde_json::from_str(r#"["llama", "my-finetune"]"#).unwrap();
        assert_eq!(
            ids,
            vec![
                PollinationsChatModelId::Llama,
                PollinationsChatModelId::Custom("my-finetune".into())
            ]
        );
        assert_eq!(
            serde_json::to_string(&ids).unwrap(),
            r#"["llama","my-finetune"]"#
        );
    }
}
