//! Model names used throughout the **pollen** workspace.
//!
//! Back-ends speak plain strings (`"openai"`, `"mistral"`, …) while provider
//! crates usually expose a typed identifier on top.  [`Model`] is the meeting
//! point: an *open* name that any typed identifier converts into and that the
//! transport maps onto the wire.
//!
//! # Example
//!
//! ```rust
//! use pollen_core::model::Model;
//!
//! let fixed = Model::from("mistral");
//! let owned = Model::from(String::from("mistral"));
//! assert_eq!(fixed, owned);
//! assert_eq!(fixed.as_str(), "mistral");
//! ```
use std::{borrow::Cow, fmt};

/// Universal identifier for an LLM model.
///
/// Static names stay borrowed, so `Model::from("llama")` never allocates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Model(Cow<'static, str>);

impl Model {
    pub const fn new_static(name: &'static str) -> Self {
        Model(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> Cow<'static, str> {
        self.0
    }
}

impl From<&'static str> for Model {
    fn from(value: &'static str) -> Self {
        Model(Cow::Borrowed(value))
    }
}

impl From<String> for Model {
    fn from(value: String) -> Self {
        Model(Cow::Owned(value))
    }
}

impl From<Cow<'static, str>> for Model {
    fn from(value: Cow<'static, str>) -> Self {
        Model(value)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_names_stay_borrowed() {
        const LLAMA: Model = Model::new_static("llama");
        assert!(matches!(LLAMA.into_inner(), Cow::Borrowed("llama")));
    }

    #[test]
    fn display_prints_raw_name() {
        assert_eq!(Model::from("openai-reasoning").to_string(), "openai-reasoning");
    }
}
