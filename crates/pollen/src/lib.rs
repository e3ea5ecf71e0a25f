//! # `pollen` – The umbrella crate
//!
//! This crate is a *one-stop import* that glues together the crates in the
//! workspace:
//!
//! | Crate                          | What it provides                                                     |
//! |--------------------------------|----------------------------------------------------------------------|
//! | **`pollen-core`**              | Messages, model names, provider traits, generic client, errors       |
//! | **`pollen-openai-compatible`** | Chat settings and HTTP backend for OpenAI-compatible hosts *(opt.)*  |
//! | **`pollen-pollinations`**      | Pollinations model ids, chat settings and provider *(optional)*      |
//!
//! Both backend crates are enabled by default through the `pollinations`
//! feature.  Disable default features to stay provider-agnostic:
//!
//! ```toml
//! [dependencies]
//! pollen = { version = "0.1", default-features = false }
//! ```
//!
//! ## Quick example
//!
//! ```rust,no_run
//! use pollen::{
//!     PollenClient,
//!     generic::GenericMessage,
//!     pollinations::{PollinationsChatModelId, PollinationsProviderBuilder},
//!     provider::ChatCompletionProvider,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let provider = PollinationsProviderBuilder::new_from_env().build()?;
//!     let model = provider.chat_model(PollinationsChatModelId::OpenAi, Default::default());
//!     let client = PollenClient::new(model);
//!
//!     let params = client.backend().parameters(vec![GenericMessage::user("Say hello!")]);
//!     let answer = client.chat_complete(params).await?;
//!     println!("{:?}", answer.content.finished().and_then(|m| m.content));
//!     Ok(())
//! }
//! ```
#![doc(html_root_url = "https://docs.rs/pollen/latest")]

pub use pollen_core::*;

#[cfg(feature = "openai-compatible")]
pub use pollen_openai_compatible as openai_compatible;

#[cfg(feature = "pollinations")]
pub use pollen_pollinations as pollinations;
