//! Pollinations text generation for the *pollen* SDK.
//!
//! Pollinations exposes an OpenAI-compatible `chat/completions` endpoint, so
//! this crate is a thin layer over `pollen-openai-compatible`:
//!
//! * [`PollinationsChatModelId`] names the known models while still accepting
//!   any other string,
//! * [`PollinationsChatSettings`] extends
//!   [`OpenAiCompatibleChatSettings`](pollen_openai_compatible::OpenAiCompatibleChatSettings),
//! * [`PollinationsProvider`] hands out ready-to-use [`PollinationsChatModel`]s.
//!
//! ```rust,no_run
//! use pollen_core::{generic::GenericMessage, provider::ChatCompletionProvider};
//! use pollen_pollinations::{PollinationsChatModelId, PollinationsProviderBuilder};
//!
//! # async fn run() -> pollen_core::error::Result<()> {
//! let provider = PollinationsProviderBuilder::new_from_env().build()?;
//! let model = provider.chat_model(PollinationsChatModelId::Mistral, Default::default());
//!
//! let reply = model
//!     .chat_complete(model.parameters(vec![GenericMessage::user("Hello!")]))
//!     .await?;
//! println!("{:?}", reply.content);
//! # Ok(())
//! # }
//! ```
mod chat_model;
mod model_id;
mod provider;
mod settings;

pub use chat_model::PollinationsChatModel;
pub use model_id::PollinationsChatModelId;
pub use provider::{
    DEFAULT_BASE_URL, ENV_API_TOKEN, ENV_BASE_URL, PROVIDER_NAME, PollinationsProvider,
    PollinationsProviderBuilder,
};
pub use settings::PollinationsChatSettings;
