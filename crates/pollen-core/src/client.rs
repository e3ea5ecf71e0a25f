//! Generic, lightweight client that forwards chat requests to a single
//! concrete backend.
//!
//! The client is **generic over the backend type `B`**, so the compiler
//! guarantees that the messages you hand in match what the backend expects.
//! No dynamic dispatch appears in user code.
//!
//! Any backend crate (e.g. `pollen-openai-compatible`) just implements the
//! provider traits and the same client works out of the box.
use std::sync::Arc;

use crate::{
    error::Result,
    generic::{GenericChatCompletionResponse, GenericMessage},
    provider::{
        ChatCompleteParameters, ChatCompletionProvider, StreamingChatProvider,
        StreamingEventsProvider,
    },
};

/// A client bound to a single provider.
///
/// Cloning only bumps a reference count.
#[derive(Debug)]
pub struct PollenClient<B> {
    backend: Arc<B>,
}

impl<B> Clone for PollenClient<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B> PollenClient<B>
where
    B: ChatCompletionProvider,
{
    /// Create a new client that delegates all calls to `backend`.
    pub fn new(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Access the underlying backend (e.g. to inspect provider-specific settings).
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: ChatCompletionProvider> ChatCompletionProvider for PollenClient<B> {
    type Message = B::Message;

    fn chat_complete<'p, M>(
        &'p self,
        params: ChatCompleteParameters<M>,
    ) -> std::pin::Pin<
        Box<
            dyn Future<Output = Result<GenericChatCompletionResponse<GenericMessage>>> + Send + 'p,
        >,
    >
    where
        M: Into<Self::Message> + Clone + Send + Sync + 'p,
    {
        self.backend.chat_complete(params)
    }
}

impl<B: StreamingChatProvider> StreamingChatProvider for PollenClient<B> {
    type Delta<'s>
        = B::Delta<'s>
    where
        Self: 's;

    fn chat_complete_stream<'s, M>(&'s self, params: ChatCompleteParameters<M>) -> Self::Delta<'s>
    where
        M: Into<Self::Message> + Clone + Send + Sync + 's,
    {
        self.backend.chat_complete_stream(params)
    }
}

impl<B: StreamingEventsProvider> StreamingEventsProvider for PollenClient<B> {
    type EventStream<'s>
        = B::EventStream<'s>
    where
        Self: 's;

    fn chat_complete_events_stream<'s, M>(
        &'s self,
        params: ChatCompleteParameters<M>,
    ) -> Self::EventStream<'s>
    where
        M: Into<Self::Message> + Clone + Send + Sync + 's,
    {
        self.backend.chat_complete_events_stream(params)
    }
}
