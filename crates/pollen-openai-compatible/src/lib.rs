//! Backend for any host that speaks the OpenAI *chat/completions* dialect.
//!
//! The crate owns [`OpenAiCompatibleChatSettings`], the per-model chat
//! settings that provider crates such as `pollen-pollinations` extend, and
//! [`OpenAiCompatibleAdapter`], which implements the `pollen-core` provider
//! traits on top of a small `reqwest` client.
mod adapter;
mod model_map;
mod provider_impl_chat;
mod provider_impl_chat_stream;
mod settings;

pub use adapter::{OpenAiCompatibleAdapter, OpenAiCompatibleAdapterBuilder};
pub use client::{OpenAiCompatibleClient, RetryPolicy};
pub use settings::OpenAiCompatibleChatSettings;
pub mod api_v1;
mod client;
pub mod error;
